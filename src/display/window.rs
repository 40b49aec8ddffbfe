use std::time::Duration;

use anyhow::{anyhow, Result};

use super::DisplaySink;
use crate::frame::Frame;

/// Native window. Closing it or pressing Escape requests exit.
pub struct WindowSink {
    window: minifb::Window,
    buffer: Vec<u32>,
}

impl WindowSink {
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = minifb::Window::new(
            title,
            width,
            height,
            minifb::WindowOptions {
                resize: true,
                ..minifb::WindowOptions::default()
            },
        )
        .map_err(|e| anyhow!("failed to create window: {}", e))?;

        // ~60 FPS
        window.limit_update_rate(Some(Duration::from_micros(16_600)));

        Ok(Self {
            window,
            buffer: vec![0; width * height],
        })
    }
}

impl DisplaySink for WindowSink {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        let width = frame.width() as usize;
        let height = frame.height() as usize;
        self.buffer.resize(width * height, 0);

        for (dst, px) in self.buffer.iter_mut().zip(frame.as_bytes().chunks_exact(3)) {
            let (b, g, r) = (px[0] as u32, px[1] as u32, px[2] as u32);
            *dst = (r << 16) | (g << 8) | b;
        }

        self.window
            .update_with_buffer(&self.buffer, width, height)
            .map_err(|e| anyhow!("window update failed: {}", e))
    }

    fn should_exit(&self) -> bool {
        !self.window.is_open() || self.window.is_key_down(minifb::Key::Escape)
    }
}
