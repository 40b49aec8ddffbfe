use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{CameraConfig, CameraStats, FrameSource};
use crate::frame::Frame;

/// Camera stand-in for `stub://` devices.
///
/// Produces a diagonal gradient that drifts one pixel per frame, with a
/// little seeded sensor noise so consecutive frames are never identical.
pub struct SyntheticCamera {
    config: CameraConfig,
    frame_count: u64,
    rng: StdRng,
    /// Stop producing frames after this many. `None` means never.
    frame_limit: Option<u64>,
}

impl SyntheticCamera {
    pub fn new(config: CameraConfig) -> Self {
        log::info!(
            "SyntheticCamera: connected to {} ({}x{})",
            config.device,
            config.width,
            config.height
        );
        Self {
            config,
            frame_count: 0,
            rng: StdRng::seed_from_u64(0x5eed),
            frame_limit: None,
        }
    }

    /// Simulate the device going away after `limit` frames.
    pub fn with_frame_limit(mut self, limit: u64) -> Self {
        self.frame_limit = Some(limit);
        self
    }

    fn generate_pixels(&mut self) -> Vec<u8> {
        let w = self.config.width as usize;
        let h = self.config.height as usize;
        let shift = self.frame_count as usize;
        let mut pixels = vec![0u8; w * h * 3];
        for y in 0..h {
            for x in 0..w {
                let i = (y * w + x) * 3;
                let noise: u8 = self.rng.gen_range(0..4);
                pixels[i] = ((x + shift) % 256) as u8;
                pixels[i + 1] = ((y + shift) % 256) as u8;
                pixels[i + 2] = (((x + y) / 2) % 256) as u8 ^ noise;
            }
        }
        pixels
    }
}

impl FrameSource for SyntheticCamera {
    fn next_frame(&mut self) -> Result<Frame> {
        if let Some(limit) = self.frame_limit {
            if self.frame_count >= limit {
                anyhow::bail!(
                    "synthetic camera {} exhausted after {} frames",
                    self.config.device,
                    limit
                );
            }
        }
        self.frame_count += 1;
        let pixels = self.generate_pixels();
        Frame::from_bgr(pixels, self.config.width, self.config.height)
    }

    fn stats(&self) -> CameraStats {
        CameraStats {
            frames_captured: self.frame_count,
            device: self.config.device.clone(),
        }
    }
}
