#![cfg(feature = "backend-tract")]

use std::path::Path;

use anyhow::{Context, Result};
use tract_onnx::prelude::*;

use crate::detect::classifier::{ClassifierError, EmotionClassifier};
use crate::detect::result::DetectionResult;
use crate::emotion::{EmotionLabel, EmotionScores};
use crate::frame::{BoundingBox, Frame};

/// Model input edge, in pixels. Input shape is `1x1xSIDExSIDE` grayscale.
const INPUT_SIDE: usize = 64;

/// FER2013 output order (7 classes).
const FER2013_LABELS: [Option<EmotionLabel>; 7] = [
    Some(EmotionLabel::Angry),
    Some(EmotionLabel::Disgust),
    Some(EmotionLabel::Fear),
    Some(EmotionLabel::Happy),
    Some(EmotionLabel::Sad),
    Some(EmotionLabel::Surprise),
    Some(EmotionLabel::Neutral),
];

/// FER+ output order (8 classes). Contempt has no label and is dropped.
const FERPLUS_LABELS: [Option<EmotionLabel>; 8] = [
    Some(EmotionLabel::Neutral),
    Some(EmotionLabel::Happy),
    Some(EmotionLabel::Surprise),
    Some(EmotionLabel::Sad),
    Some(EmotionLabel::Angry),
    Some(EmotionLabel::Disgust),
    Some(EmotionLabel::Fear),
    None,
];

/// Tract-based backend for ONNX facial-expression models.
///
/// The model classifies a single centred square face region. Outputs with
/// 7 logits are read in FER2013 order, 8 logits in FER+ order.
pub struct TractClassifier {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>>,
    face_fraction: f32,
    input_scale: f32,
}

impl TractClassifier {
    /// Load an ONNX model from disk and prepare it for inference.
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, 1, INPUT_SIDE, INPUT_SIDE)),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        Ok(Self {
            model,
            face_fraction: 0.6,
            input_scale: 1.0,
        })
    }

    /// Fraction of the shorter frame edge covered by the face region.
    pub fn with_face_fraction(mut self, fraction: f32) -> Self {
        self.face_fraction = fraction.clamp(0.05, 1.0);
        self
    }

    /// Multiplier applied to 0..255 luma before inference (e.g. 1/255).
    pub fn with_input_scale(mut self, scale: f32) -> Self {
        self.input_scale = scale;
        self
    }

    fn face_region(&self, frame: &Frame) -> Option<BoundingBox> {
        let side = (frame.width().min(frame.height()) as f32 * self.face_fraction) as u32;
        if side == 0 {
            return None;
        }
        Some(BoundingBox::new(
            (frame.width() - side) / 2,
            (frame.height() - side) / 2,
            side,
            side,
        ))
    }

    fn build_input(&self, frame: &Frame, face: BoundingBox) -> Tensor {
        let side = face.width as f32;
        let scale = self.input_scale;
        let input = tract_ndarray::Array4::from_shape_fn(
            (1, 1, INPUT_SIDE, INPUT_SIDE),
            |(_, _, y, x)| {
                // Nearest-neighbour sample of the face region.
                let sx = face.x + ((x as f32 + 0.5) * side / INPUT_SIDE as f32) as u32;
                let sy = face.y + ((y as f32 + 0.5) * side / INPUT_SIDE as f32) as u32;
                let [b, g, r] = frame.pixel(sx, sy).unwrap_or([0, 0, 0]);
                luma(r, g, b) * scale
            },
        );
        input.into_tensor()
    }

    fn extract_scores(outputs: TVec<TValue>) -> Result<EmotionScores, ClassifierError> {
        let output = outputs
            .first()
            .ok_or_else(|| ClassifierError::inference("model produced no outputs"))?;
        let logits: Vec<f32> = output
            .to_array_view::<f32>()
            .map_err(ClassifierError::inference)?
            .iter()
            .copied()
            .collect();

        let labels: &[Option<EmotionLabel>] = match logits.len() {
            7 => &FER2013_LABELS,
            8 => &FERPLUS_LABELS,
            n => {
                return Err(ClassifierError::inference(format!(
                    "expected 7 or 8 class scores, model produced {}",
                    n
                )))
            }
        };

        let probs = softmax(&logits);
        Ok(labels
            .iter()
            .zip(probs)
            .filter_map(|(label, p)| label.map(|l| (l, p)))
            .collect())
    }
}

impl EmotionClassifier for TractClassifier {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectionResult>, ClassifierError> {
        let Some(face) = self.face_region(frame) else {
            return Ok(Vec::new());
        };
        let input = self.build_input(frame, face);
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .map_err(|err| ClassifierError::inference(format!("ONNX inference failed: {err}")))?;
        let scores = Self::extract_scores(outputs)?;
        Ok(vec![DetectionResult::new(face, scores)])
    }
}

fn luma(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        exps.into_iter().map(|v| v / sum).collect()
    } else {
        vec![0.0; logits.len()]
    }
}
