//! Emotion Overlay
//!
//! Live webcam compositor that shows the wearer's dominant facial emotion
//! as a persona image floating above their face.
//!
//! # Architecture
//!
//! The pipeline is a single-threaded, blocking loop:
//!
//! 1. **Capture**: a `FrameSource` yields one BGR frame per iteration.
//! 2. **Detect**: the `DetectionCache` runs the classifier on every Nth
//!    frame and holds the last successful result in between.
//! 3. **Compose**: the render loop draws the face box, composites the
//!    persona for the dominant emotion and writes the label.
//! 4. **Display**: a `DisplaySink` shows the frame and reports exit.
//!
//! Only a camera failure stops the loop. Classifier misses and errors keep
//! the previous result on screen; missing persona images fall back to the
//! neutral one or are skipped.
//!
//! # Module Structure
//!
//! - `emotion`: label vocabulary and score maps
//! - `frame`: BGR frames and rectangles
//! - `assets`: persona image table
//! - `compositor`: alpha blending with clipping
//! - `detect`: classifier trait and backends
//! - `cache`: throttled detection with hold-last-result
//! - `draw`: box outlines and bitmap text
//! - `render`: per-frame orchestration
//! - `ingest`: camera sources
//! - `display`: display sinks
//! - `config`: file + environment configuration

pub mod assets;
pub mod cache;
pub mod compositor;
pub mod config;
pub mod detect;
pub mod display;
pub mod draw;
pub mod emotion;
pub mod frame;
pub mod ingest;
pub mod render;

pub use assets::{AssetTable, OverlayAsset};
pub use cache::{CacheOutcome, CachedDetection, DetectionCache, DEFAULT_EVERY_N_FRAMES};
pub use compositor::composite;
pub use config::{DetectionSettings, OverlayConfig};
pub use detect::{
    build_classifier, ClassifierError, ClassifierKind, DetectionResult, EmotionClassifier,
    ScriptStep, ScriptedClassifier, SyntheticClassifier, TractOptions,
};
pub use display::{DisplaySink, HeadlessSink};
pub use emotion::{confidence_percent, EmotionLabel, EmotionScores};
pub use frame::{BoundingBox, Frame, Rect};
pub use ingest::{open_camera, CameraConfig, CameraStats, FrameSource, SyntheticCamera};
pub use render::{
    decorate, label_text, overlay_placement, FrameReport, RenderLoop, RenderSettings, RunSummary,
};
