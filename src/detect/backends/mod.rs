pub mod scripted;
pub mod synthetic;

#[cfg(feature = "backend-tract")]
pub mod tract;

pub use scripted::{ScriptStep, ScriptedClassifier};
pub use synthetic::SyntheticClassifier;

#[cfg(feature = "backend-tract")]
pub use tract::TractClassifier;
