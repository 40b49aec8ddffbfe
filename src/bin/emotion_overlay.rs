//! emotion_overlay - live webcam emotion persona overlay
//!
//! 1. Opens the camera (V4L2 device or stub://)
//! 2. Classifies every Nth frame and holds the last result
//! 3. Draws the face box, persona image and label on every frame
//! 4. Shows frames in a window (feature display-window) or headless
//!
//! Exit with Escape in the window, or ctrl-c.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use emotion_overlay::{
    build_classifier, open_camera, AssetTable, ClassifierKind, DetectionCache, DisplaySink,
    EmotionClassifier, FrameSource, HeadlessSink, OverlayConfig, RenderLoop,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Camera index, device path, or stub://name.
    #[arg(long)]
    camera: Option<String>,
    /// Directory holding <emotion>.png persona images.
    #[arg(long)]
    assets: Option<PathBuf>,
    /// Run the classifier on every Nth frame.
    #[arg(long)]
    every_n: Option<u64>,
    /// Classifier backend (synthetic, tract).
    #[arg(long)]
    backend: Option<ClassifierKind>,
    /// ONNX model for the tract backend.
    #[arg(long)]
    model: Option<PathBuf>,
    /// Overlay size relative to the face box.
    #[arg(long)]
    scale: Option<f32>,
    /// Overlay opacity in [0, 1].
    #[arg(long)]
    opacity: Option<f32>,
    /// Do not mirror the camera image.
    #[arg(long)]
    no_mirror: bool,
    /// Hide the "last analysis" age line.
    #[arg(long)]
    hide_age: bool,
    /// Never open a window.
    #[arg(long)]
    headless: bool,
    /// Stop after this many frames (headless only).
    #[arg(long)]
    frames: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let cfg = resolve_config(&args)?;

    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        handler_stop.store(true, Ordering::SeqCst);
    })
    .context("install ctrl-c handler")?;

    let assets = AssetTable::load(&cfg.assets_dir);
    let mut classifier = build_classifier(
        cfg.detection.backend,
        cfg.detection.model_path.as_deref(),
        cfg.detection.tract,
    )?;
    if let Err(err) = classifier.warm_up() {
        log::warn!("classifier warm-up failed: {}", err);
    }
    let cache = DetectionCache::new(classifier, cfg.detection.every_n_frames);

    let camera = open_camera(cfg.camera.clone())
        .with_context(|| format!("cannot open webcam {}", cfg.camera.device))?;
    let sink = build_sink(&args, &cfg, Arc::clone(&stop))?;

    println!("Press ESC (window) or ctrl-c to exit.");
    let mut render = RenderLoop::new(camera, sink, cache, assets, cfg.render.clone())
        .with_stop_flag(stop);
    let summary = render.run()?;

    let (camera, _sink) = render.into_parts();
    let stats = camera.stats();
    drop(camera);

    println!("emotion_overlay summary:");
    println!("  camera: {}", stats.device);
    println!("  frames rendered: {}", summary.frames);
    println!("  classifier calls: {}", summary.classifier_calls);
    println!("  frames with overlay: {}", summary.frames_with_overlay);
    Ok(())
}

fn resolve_config(args: &Args) -> Result<OverlayConfig> {
    let mut cfg = OverlayConfig::load()?;
    if let Some(camera) = &args.camera {
        cfg.camera.device = camera.clone();
    }
    if let Some(assets) = &args.assets {
        cfg.assets_dir = assets.clone();
    }
    if let Some(every_n) = args.every_n {
        cfg.detection.every_n_frames = every_n;
    }
    if let Some(backend) = args.backend {
        cfg.detection.backend = backend;
    }
    if let Some(model) = &args.model {
        cfg.detection.model_path = Some(model.clone());
    }
    if let Some(scale) = args.scale {
        cfg.render.overlay_scale = scale;
    }
    if let Some(opacity) = args.opacity {
        cfg.render.overlay_opacity = opacity;
    }
    if args.no_mirror {
        cfg.render.mirror = false;
    }
    if args.hide_age {
        cfg.render.show_age = false;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn build_sink(
    args: &Args,
    cfg: &OverlayConfig,
    stop: Arc<AtomicBool>,
) -> Result<Box<dyn DisplaySink>> {
    let headless = || {
        let mut sink = HeadlessSink::new().with_stop_flag(Arc::clone(&stop));
        if let Some(limit) = args.frames {
            sink = sink.with_frame_limit(limit);
        }
        sink
    };

    if args.headless {
        return Ok(Box::new(headless()));
    }

    #[cfg(feature = "display-window")]
    {
        let window = emotion_overlay::display::WindowSink::new(
            "Emotion Persona Overlay",
            cfg.camera.width as usize,
            cfg.camera.height as usize,
        )?;
        Ok(Box::new(window))
    }
    #[cfg(not(feature = "display-window"))]
    {
        log::warn!(
            "built without display-window; running headless for {}",
            cfg.camera.device
        );
        Ok(Box::new(headless()))
    }
}
