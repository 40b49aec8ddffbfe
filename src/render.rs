//! Per-frame orchestration.
//!
//! Each iteration: capture, mirror, consult the detection cache, decorate a
//! copy of the frame (box, persona overlay, label, age) and present it. The
//! classifier always sees the undecorated frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::assets::AssetTable;
use crate::cache::{CacheOutcome, DetectionCache};
use crate::compositor::composite;
use crate::detect::DetectionResult;
use crate::display::DisplaySink;
use crate::draw::{draw_rect, draw_text, GREEN, LIGHT_GRAY, WHITE};
use crate::emotion::confidence_percent;
use crate::frame::{BoundingBox, Frame, Rect};
use crate::ingest::FrameSource;

const BOX_THICKNESS: u32 = 2;
const LABEL_OFFSET: i64 = 10;
const LABEL_SCALE: u32 = 3;
const AGE_SCALE: u32 = 2;
const AGE_ORIGIN: (i64, i64) = (10, 30);

/// How detections are drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    /// Overlay size as a fraction of the face box.
    pub overlay_scale: f32,
    /// Vertical gap in pixels between overlay and face box.
    pub overlay_gap: u32,
    /// Opacity multiplier applied on top of the persona's own alpha.
    pub overlay_opacity: f32,
    /// Draw "Last analysis: Ns ago".
    pub show_age: bool,
    /// Mirror frames left-to-right before anything else.
    pub mirror: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            overlay_scale: 0.6,
            overlay_gap: 10,
            overlay_opacity: 0.95,
            show_age: true,
            mirror: true,
        }
    }
}

/// Where the persona goes for a face box: scaled, centred, above the box.
pub fn overlay_placement(bbox: BoundingBox, scale: f32, gap: u32) -> Rect {
    let ow = (bbox.width as f32 * scale) as u32;
    let oh = (bbox.height as f32 * scale) as u32;
    let ox = bbox.x as i64 + (bbox.width.saturating_sub(ow) / 2) as i64;
    let oy = bbox.y as i64 - oh as i64 - gap as i64;
    Rect::new(ox, oy, ow, oh)
}

/// Text shown next to a face, e.g. `happy (80%)`.
pub fn label_text(result: &DetectionResult) -> String {
    let (label, score) = result.dominant();
    format!("{} ({}%)", label, confidence_percent(score))
}

fn age_text(age: Duration) -> String {
    format!("Last analysis: {:.1}s ago", age.as_secs_f32())
}

/// Draw the cached detection onto a copy of `frame`.
pub fn decorate(
    frame: &Frame,
    outcome: &CacheOutcome,
    assets: &AssetTable,
    settings: &RenderSettings,
) -> Frame {
    let mut display = frame.clone();

    if let Some(result) = &outcome.result {
        let bbox = result.bbox;
        draw_rect(&mut display, bbox, GREEN, BOX_THICKNESS);

        let (label, _) = result.dominant();
        let placement = overlay_placement(bbox, settings.overlay_scale, settings.overlay_gap);
        let persona = assets.resolve(label).map(|asset| asset.image());
        composite(&mut display, persona, placement, settings.overlay_opacity);

        draw_text(
            &mut display,
            bbox.x as i64,
            bbox.y as i64 - LABEL_OFFSET,
            &label_text(result),
            WHITE,
            LABEL_SCALE,
        );
    }

    if settings.show_age {
        if let Some(age) = outcome.age {
            draw_text(
                &mut display,
                AGE_ORIGIN.0,
                AGE_ORIGIN.1,
                &age_text(age),
                LIGHT_GRAY,
                AGE_SCALE,
            );
        }
    }

    display
}

/// What happened on one iteration.
#[derive(Clone, Debug)]
pub struct FrameReport {
    pub frame_index: u64,
    pub classified: bool,
    pub detection: Option<DetectionResult>,
    pub age: Option<Duration>,
    /// Label drawn this frame, if any.
    pub label: Option<String>,
}

/// Totals for a finished run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub classifier_calls: u64,
    pub frames_with_overlay: u64,
}

/// Capture, detect, decorate, present.
pub struct RenderLoop<S: FrameSource, D: DisplaySink> {
    source: S,
    sink: D,
    cache: DetectionCache,
    assets: AssetTable,
    settings: RenderSettings,
    stop: Option<Arc<AtomicBool>>,
    summary: RunSummary,
}

impl<S: FrameSource, D: DisplaySink> RenderLoop<S, D> {
    pub fn new(
        source: S,
        sink: D,
        cache: DetectionCache,
        assets: AssetTable,
        settings: RenderSettings,
    ) -> Self {
        Self {
            source,
            sink,
            cache,
            assets,
            settings,
            stop: None,
            summary: RunSummary::default(),
        }
    }

    /// Also stop when `stop` is set, checked once per iteration.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Release the camera and sink.
    pub fn into_parts(self) -> (S, D) {
        (self.source, self.sink)
    }

    /// One iteration using the wall clock.
    pub fn step(&mut self) -> Result<FrameReport> {
        self.step_at(Instant::now())
    }

    /// One iteration as if observed at `now`.
    ///
    /// Only a camera failure is returned as an error. A sink that fails to
    /// present is logged and the loop carries on.
    pub fn step_at(&mut self, now: Instant) -> Result<FrameReport> {
        let mut frame = self
            .source
            .next_frame()
            .context("cannot read from camera")?;
        if self.settings.mirror {
            frame.flip_horizontal();
        }

        let outcome = self.cache.on_frame_at(&frame, now);
        let display = decorate(&frame, &outcome, &self.assets, &self.settings);
        if let Err(err) = self.sink.present(&display) {
            log::warn!("frame {}: display failed: {:#}", outcome.frame_index, err);
        }

        self.summary.frames += 1;
        if outcome.classified {
            self.summary.classifier_calls += 1;
        }
        if outcome.result.is_some() {
            self.summary.frames_with_overlay += 1;
        }

        let label = outcome.result.as_ref().map(label_text);
        Ok(FrameReport {
            frame_index: outcome.frame_index,
            classified: outcome.classified,
            detection: outcome.result,
            age: outcome.age,
            label,
        })
    }

    fn exit_requested(&self) -> bool {
        self.sink.should_exit()
            || self
                .stop
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Run until the sink or stop flag asks to exit.
    ///
    /// Returns an error only when the camera fails.
    pub fn run(&mut self) -> Result<RunSummary> {
        log::info!(
            "render loop started: classifier={}, every {} frames",
            self.cache.classifier_name(),
            self.cache.every_n()
        );
        while !self.exit_requested() {
            if let Err(err) = self.step() {
                log::error!(
                    "render loop stopped after {} frames: {:#}",
                    self.summary.frames,
                    err
                );
                return Err(err);
            }
        }
        log::info!(
            "render loop finished: {} frames, {} classifier calls, {} with overlay",
            self.summary.frames,
            self.summary.classifier_calls,
            self.summary.frames_with_overlay
        );
        Ok(self.summary.clone())
    }
}
