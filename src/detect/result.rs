use crate::emotion::{EmotionLabel, EmotionScores};
use crate::frame::BoundingBox;

/// One face reported by a classifier. Never mutated after creation.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionResult {
    /// Face box in pixel coordinates of the frame it was detected on.
    pub bbox: BoundingBox,
    /// Per-label scores in [0, 1].
    pub scores: EmotionScores,
}

impl DetectionResult {
    pub fn new(bbox: BoundingBox, scores: EmotionScores) -> Self {
        Self { bbox, scores }
    }

    /// Dominant label and its score. Faces with no scores read as neutral at 0.
    pub fn dominant(&self) -> (EmotionLabel, f32) {
        self.scores
            .dominant()
            .unwrap_or((EmotionLabel::Neutral, 0.0))
    }
}
