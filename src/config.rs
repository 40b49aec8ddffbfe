use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cache::DEFAULT_EVERY_N_FRAMES;
use crate::detect::{ClassifierKind, TractOptions};
use crate::ingest::CameraConfig;
use crate::render::RenderSettings;

const DEFAULT_DEVICE: &str = "/dev/video0";
const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 480;
const DEFAULT_FPS: u32 = 30;
const DEFAULT_ASSETS_DIR: &str = "assets";

#[derive(Debug, Deserialize, Default)]
struct OverlayConfigFile {
    assets_dir: Option<PathBuf>,
    camera: Option<CameraConfigFile>,
    detection: Option<DetectionConfigFile>,
    overlay: Option<OverlayStyleFile>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    device: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    target_fps: Option<u32>,
    mirror: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectionConfigFile {
    every_n_frames: Option<u64>,
    backend: Option<ClassifierKind>,
    model_path: Option<PathBuf>,
    input_scale: Option<f32>,
    face_fraction: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct OverlayStyleFile {
    scale: Option<f32>,
    gap: Option<u32>,
    opacity: Option<f32>,
    show_age: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct OverlayConfig {
    pub camera: CameraConfig,
    pub assets_dir: PathBuf,
    pub detection: DetectionSettings,
    pub render: RenderSettings,
}

#[derive(Debug, Clone)]
pub struct DetectionSettings {
    pub every_n_frames: u64,
    pub backend: ClassifierKind,
    pub model_path: Option<PathBuf>,
    pub tract: TractOptions,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self::from_file(OverlayConfigFile::default())
    }
}

impl OverlayConfig {
    /// Defaults, then the file named by `EMOTION_OVERLAY_CONFIG`, then
    /// `EMOTION_OVERLAY_*` environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("EMOTION_OVERLAY_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: OverlayConfigFile) -> Self {
        let camera = file.camera.unwrap_or_default();
        let detection = file.detection.unwrap_or_default();
        let overlay = file.overlay.unwrap_or_default();
        let render_defaults = RenderSettings::default();
        let tract_defaults = TractOptions::default();

        Self {
            camera: CameraConfig {
                device: camera.device.unwrap_or_else(|| DEFAULT_DEVICE.to_string()),
                width: camera.width.unwrap_or(DEFAULT_WIDTH),
                height: camera.height.unwrap_or(DEFAULT_HEIGHT),
                target_fps: camera.target_fps.unwrap_or(DEFAULT_FPS),
            },
            assets_dir: file
                .assets_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR)),
            detection: DetectionSettings {
                every_n_frames: detection.every_n_frames.unwrap_or(DEFAULT_EVERY_N_FRAMES),
                backend: detection.backend.unwrap_or(ClassifierKind::Synthetic),
                model_path: detection.model_path,
                tract: TractOptions {
                    input_scale: detection.input_scale.unwrap_or(tract_defaults.input_scale),
                    face_fraction: detection
                        .face_fraction
                        .unwrap_or(tract_defaults.face_fraction),
                },
            },
            render: RenderSettings {
                overlay_scale: overlay.scale.unwrap_or(render_defaults.overlay_scale),
                overlay_gap: overlay.gap.unwrap_or(render_defaults.overlay_gap),
                overlay_opacity: overlay.opacity.unwrap_or(render_defaults.overlay_opacity),
                show_age: overlay.show_age.unwrap_or(render_defaults.show_age),
                mirror: camera.mirror.unwrap_or(render_defaults.mirror),
            },
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(device) = std::env::var("EMOTION_OVERLAY_DEVICE") {
            if !device.trim().is_empty() {
                self.camera.device = device;
            }
        }
        if let Ok(dir) = std::env::var("EMOTION_OVERLAY_ASSETS") {
            if !dir.trim().is_empty() {
                self.assets_dir = PathBuf::from(dir);
            }
        }
        if let Ok(every_n) = std::env::var("EMOTION_OVERLAY_EVERY_N") {
            self.detection.every_n_frames = every_n
                .trim()
                .parse()
                .map_err(|_| anyhow!("EMOTION_OVERLAY_EVERY_N must be a positive integer"))?;
        }
        if let Ok(backend) = std::env::var("EMOTION_OVERLAY_BACKEND") {
            if !backend.trim().is_empty() {
                self.detection.backend = backend.parse()?;
            }
        }
        if let Ok(model) = std::env::var("EMOTION_OVERLAY_MODEL") {
            if !model.trim().is_empty() {
                self.detection.model_path = Some(PathBuf::from(model));
            }
        }
        Ok(())
    }

    /// Reject settings the render loop cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.camera.device.trim().is_empty() {
            return Err(anyhow!("camera device must not be empty"));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(anyhow!("camera resolution must be non-zero"));
        }
        if self.detection.every_n_frames == 0 {
            return Err(anyhow!("every_n_frames must be at least 1"));
        }
        let input_scale = self.detection.tract.input_scale;
        if !(input_scale.is_finite() && input_scale > 0.0) {
            return Err(anyhow!("input_scale must be positive, got {}", input_scale));
        }
        let fraction = self.detection.tract.face_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(anyhow!("face_fraction must be in (0, 1], got {}", fraction));
        }
        let scale = self.render.overlay_scale;
        if !(scale > 0.0 && scale <= 1.0) {
            return Err(anyhow!("overlay scale must be in (0, 1], got {}", scale));
        }
        let opacity = self.render.overlay_opacity;
        if !(0.0..=1.0).contains(&opacity) {
            return Err(anyhow!("overlay opacity must be in [0, 1], got {}", opacity));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<OverlayConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    let cfg = if is_toml {
        toml::from_str(&raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_desktop_demo() {
        let cfg = OverlayConfig::default();
        assert_eq!(cfg.camera.device, "/dev/video0");
        assert_eq!(cfg.detection.every_n_frames, 6);
        assert_eq!(cfg.detection.backend, ClassifierKind::Synthetic);
        assert_eq!(cfg.assets_dir, PathBuf::from("assets"));
        assert_eq!(cfg.render.overlay_scale, 0.6);
        assert_eq!(cfg.render.overlay_opacity, 0.95);
        assert!(cfg.render.mirror);
        assert_eq!(cfg.detection.tract, TractOptions::default());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = OverlayConfig::default();
        cfg.detection.every_n_frames = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = OverlayConfig::default();
        cfg.render.overlay_scale = 1.5;
        assert!(cfg.validate().is_err());

        let mut cfg = OverlayConfig::default();
        cfg.render.overlay_opacity = -0.1;
        assert!(cfg.validate().is_err());

        let mut cfg = OverlayConfig::default();
        cfg.detection.tract.input_scale = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = OverlayConfig::default();
        cfg.detection.tract.face_fraction = 1.2;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn toml_file_is_parsed_by_extension() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("overlay.toml");
        std::fs::write(
            &path,
            "assets_dir = \"personas\"\n[detection]\nevery_n_frames = 3\nbackend = \"tract\"\n\
             input_scale = 0.25\nface_fraction = 0.75\n",
        )?;

        let cfg = OverlayConfig::from_file(read_config_file(&path)?);
        assert_eq!(cfg.assets_dir, PathBuf::from("personas"));
        assert_eq!(cfg.detection.every_n_frames, 3);
        assert_eq!(cfg.detection.backend, ClassifierKind::Tract);
        assert_eq!(cfg.detection.tract.input_scale, 0.25);
        assert_eq!(cfg.detection.tract.face_fraction, 0.75);
        Ok(())
    }
}
