//! Camera frame sources.
//!
//! - `SyntheticCamera`: `stub://` devices, no hardware needed
//! - `V4l2Camera`: local webcams (feature: ingest-v4l2)
//!
//! Every source yields BGR `Frame`s at the device's current resolution.
//! A failed capture is fatal to the render loop; there is no retry here.
//! Dropping a source releases the device.

#[cfg(feature = "ingest-v4l2")]
mod normalize;
mod synthetic;
#[cfg(feature = "ingest-v4l2")]
mod v4l2;

use anyhow::Result;

use crate::frame::Frame;

pub use synthetic::SyntheticCamera;
#[cfg(feature = "ingest-v4l2")]
pub use v4l2::V4l2Camera;

/// Capture settings for a camera.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    /// Device path (e.g. "/dev/video0") or `stub://name`.
    pub device: String,
    /// Preferred frame width.
    pub width: u32,
    /// Preferred frame height.
    pub height: u32,
    /// Requested frame rate; 0 leaves the driver default.
    pub target_fps: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            width: 640,
            height: 480,
            target_fps: 30,
        }
    }
}

/// Capture counters for a camera.
#[derive(Clone, Debug)]
pub struct CameraStats {
    pub frames_captured: u64,
    pub device: String,
}

/// Source of live frames.
pub trait FrameSource {
    /// Block until the next frame is available.
    fn next_frame(&mut self) -> Result<Frame>;

    fn stats(&self) -> CameraStats;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Frame> {
        (**self).next_frame()
    }

    fn stats(&self) -> CameraStats {
        (**self).stats()
    }
}

/// Map a bare camera index to its device node (`2` -> `/dev/video2`).
/// Anything else is returned unchanged.
pub fn device_path(device: &str) -> String {
    match device.trim().parse::<u32>() {
        Ok(index) => format!("/dev/video{}", index),
        Err(_) => device.to_string(),
    }
}

/// Open the camera named by `config.device`.
pub fn open_camera(config: CameraConfig) -> Result<Box<dyn FrameSource>> {
    let config = CameraConfig {
        device: device_path(&config.device),
        ..config
    };
    if config.device.starts_with("stub://") {
        return Ok(Box::new(SyntheticCamera::new(config)));
    }
    open_device(config)
}

#[cfg(feature = "ingest-v4l2")]
fn open_device(config: CameraConfig) -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(V4l2Camera::open(config)?))
}

#[cfg(not(feature = "ingest-v4l2"))]
fn open_device(config: CameraConfig) -> Result<Box<dyn FrameSource>> {
    Err(anyhow::anyhow!(
        "camera {} requires the ingest-v4l2 feature (use stub:// for a synthetic camera)",
        config.device
    ))
}
