use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::detect::classifier::{ClassifierError, EmotionClassifier};
use crate::detect::result::DetectionResult;
use crate::frame::Frame;

/// Outcome of one scripted classifier call.
#[derive(Clone, Debug)]
pub enum ScriptStep {
    Faces(Vec<DetectionResult>),
    NoFaces,
    InferenceError(String),
    BackendFault(String),
}

/// Replays a fixed sequence of outcomes, one per `detect` call.
///
/// Once the script runs out every call reports no faces. The call counter is
/// shared so callers can observe invocations after handing the classifier
/// over to a cache.
pub struct ScriptedClassifier {
    steps: VecDeque<ScriptStep>,
    calls: Arc<AtomicU64>,
}

impl ScriptedClassifier {
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            calls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Classifier that never finds a face.
    pub fn silent() -> Self {
        Self::new(Vec::<ScriptStep>::new())
    }

    /// Shared handle to the number of `detect` calls made so far.
    pub fn call_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.calls)
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl EmotionClassifier for ScriptedClassifier {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn detect(&mut self, _frame: &Frame) -> Result<Vec<DetectionResult>, ClassifierError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match self.steps.pop_front() {
            Some(ScriptStep::Faces(faces)) => Ok(faces),
            Some(ScriptStep::NoFaces) | None => Ok(Vec::new()),
            Some(ScriptStep::InferenceError(msg)) => Err(ClassifierError::Inference(msg)),
            Some(ScriptStep::BackendFault(msg)) => Err(ClassifierError::Backend(msg)),
        }
    }
}
