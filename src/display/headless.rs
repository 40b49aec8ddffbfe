use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;

use super::DisplaySink;
use crate::frame::Frame;

/// Sink with no window: counts frames and honours a stop flag.
///
/// Used for demos over ssh, for ctrl-c driven runs, and in tests.
#[derive(Default)]
pub struct HeadlessSink {
    presented: u64,
    frame_limit: Option<u64>,
    stop: Option<Arc<AtomicBool>>,
    keep_frames: bool,
    frames: Vec<Frame>,
}

impl HeadlessSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request exit after `limit` frames have been presented.
    pub fn with_frame_limit(mut self, limit: u64) -> Self {
        self.frame_limit = Some(limit);
        self
    }

    /// Request exit once `stop` is set (e.g. by a ctrl-c handler).
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Keep a copy of every presented frame.
    pub fn retaining_frames(mut self) -> Self {
        self.keep_frames = true;
        self
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

impl DisplaySink for HeadlessSink {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.presented += 1;
        if self.keep_frames {
            self.frames.push(frame.clone());
        }
        Ok(())
    }

    fn should_exit(&self) -> bool {
        let limit_hit = self
            .frame_limit
            .is_some_and(|limit| self.presented >= limit);
        let stopped = self
            .stop
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst));
        limit_hit || stopped
    }
}
