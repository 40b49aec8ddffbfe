use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::detect::backends::SyntheticClassifier;
use crate::detect::classifier::EmotionClassifier;

/// Classifier backends selectable from configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    Synthetic,
    Tract,
}

impl ClassifierKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassifierKind::Synthetic => "synthetic",
            ClassifierKind::Tract => "tract",
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassifierKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "synthetic" => Ok(ClassifierKind::Synthetic),
            "tract" => Ok(ClassifierKind::Tract),
            other => Err(anyhow!("unknown classifier backend '{}'", other)),
        }
    }
}

/// Input preparation for the tract backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TractOptions {
    /// Multiplier applied to 0..255 luma (1.0 for FER+, 1/255 for models
    /// trained on normalized input).
    pub input_scale: f32,
    /// Fraction of the shorter frame edge covered by the face region.
    pub face_fraction: f32,
}

impl Default for TractOptions {
    fn default() -> Self {
        Self {
            input_scale: 1.0,
            face_fraction: 0.6,
        }
    }
}

/// Build the configured classifier.
///
/// `tract` needs both the `backend-tract` feature and a model path. Without
/// the feature it falls back to the synthetic backend; a missing or
/// unloadable model is an error, since the operator asked for it.
pub fn build_classifier(
    kind: ClassifierKind,
    model_path: Option<&Path>,
    tract: TractOptions,
) -> Result<Box<dyn EmotionClassifier>> {
    match kind {
        ClassifierKind::Synthetic => Ok(Box::new(SyntheticClassifier::new())),
        ClassifierKind::Tract => build_tract(model_path, tract),
    }
}

#[cfg(feature = "backend-tract")]
fn build_tract(
    model_path: Option<&Path>,
    options: TractOptions,
) -> Result<Box<dyn EmotionClassifier>> {
    let path = model_path.ok_or_else(|| anyhow!("tract backend requires a model path"))?;
    let classifier = crate::detect::backends::TractClassifier::new(path)?
        .with_input_scale(options.input_scale)
        .with_face_fraction(options.face_fraction);
    Ok(Box::new(classifier))
}

#[cfg(not(feature = "backend-tract"))]
fn build_tract(
    _model_path: Option<&Path>,
    _options: TractOptions,
) -> Result<Box<dyn EmotionClassifier>> {
    log::warn!("tract backend not compiled in (feature backend-tract); using synthetic classifier");
    Ok(Box::new(SyntheticClassifier::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_names() {
        assert_eq!("Synthetic".parse::<ClassifierKind>().unwrap(), ClassifierKind::Synthetic);
        assert_eq!("tract".parse::<ClassifierKind>().unwrap(), ClassifierKind::Tract);
        assert!("opencv".parse::<ClassifierKind>().is_err());
    }

    #[test]
    fn synthetic_backend_builds_without_model() {
        let classifier = build_classifier(ClassifierKind::Synthetic, None, TractOptions::default()).unwrap();
        assert_eq!(classifier.name(), "synthetic");
    }

    #[cfg(not(feature = "backend-tract"))]
    #[test]
    fn tract_without_feature_falls_back_to_synthetic() {
        let classifier = build_classifier(ClassifierKind::Tract, None, TractOptions::default()).unwrap();
        assert_eq!(classifier.name(), "synthetic");
    }

    #[cfg(feature = "backend-tract")]
    #[test]
    fn tract_without_model_path_is_an_error() {
        assert!(build_classifier(ClassifierKind::Tract, None, TractOptions::default()).is_err());
    }
}
