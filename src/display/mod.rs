//! Display sinks for decorated frames.
//!
//! The render loop pushes one frame per iteration and polls the sink for an
//! exit request once per iteration.

mod headless;
#[cfg(feature = "display-window")]
mod window;

use anyhow::Result;

use crate::frame::Frame;

pub use headless::HeadlessSink;
#[cfg(feature = "display-window")]
pub use window::WindowSink;

/// Consumer of fully decorated frames.
pub trait DisplaySink {
    /// Show one frame.
    fn present(&mut self, frame: &Frame) -> Result<()>;

    /// True once the operator asked to stop.
    fn should_exit(&self) -> bool;
}

impl<S: DisplaySink + ?Sized> DisplaySink for Box<S> {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        (**self).present(frame)
    }

    fn should_exit(&self) -> bool {
        (**self).should_exit()
    }
}
