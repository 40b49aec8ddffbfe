mod backends;
mod classifier;
mod factory;
mod result;

pub use backends::{ScriptStep, ScriptedClassifier, SyntheticClassifier};
#[cfg(feature = "backend-tract")]
pub use backends::TractClassifier;
pub use classifier::{ClassifierError, EmotionClassifier};
pub use factory::{build_classifier, ClassifierKind, TractOptions};
pub use result::DetectionResult;
