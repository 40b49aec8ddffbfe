use thiserror::Error;

use crate::detect::result::DetectionResult;
use crate::frame::Frame;

/// Why a classifier produced nothing for a frame.
///
/// Both variants are non-fatal to the render loop. They differ only in how
/// loudly they are logged.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The model ran but could not classify this frame.
    #[error("inference failed: {0}")]
    Inference(String),
    /// The backend itself is in a bad state.
    #[error("classifier backend fault: {0}")]
    Backend(String),
}

impl ClassifierError {
    pub fn inference(err: impl std::fmt::Display) -> Self {
        ClassifierError::Inference(err.to_string())
    }

    pub fn backend(err: impl std::fmt::Display) -> Self {
        ClassifierError::Backend(err.to_string())
    }
}

/// Facial emotion classifier.
///
/// Implementations receive the raw, undecorated frame and return zero or
/// more faces, primary face first.
pub trait EmotionClassifier {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Classify every face visible in `frame`.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectionResult>, ClassifierError>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<(), ClassifierError> {
        Ok(())
    }
}

impl<C: EmotionClassifier + ?Sized> EmotionClassifier for Box<C> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectionResult>, ClassifierError> {
        (**self).detect(frame)
    }

    fn warm_up(&mut self) -> Result<(), ClassifierError> {
        (**self).warm_up()
    }
}
