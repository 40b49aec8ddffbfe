use crate::detect::classifier::{ClassifierError, EmotionClassifier};
use crate::detect::result::DetectionResult;
use crate::emotion::{EmotionLabel, EmotionScores};
use crate::frame::{BoundingBox, Frame};

const DOMINANT_SCORE: f32 = 0.8;

/// Demo backend: one centred face whose emotion cycles on every call.
///
/// Lets the full pipeline run without a model file.
#[derive(Default)]
pub struct SyntheticClassifier {
    calls: usize,
}

impl SyntheticClassifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EmotionClassifier for SyntheticClassifier {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectionResult>, ClassifierError> {
        let label = EmotionLabel::ALL[self.calls % EmotionLabel::ALL.len()];
        self.calls += 1;

        let side = frame.width().min(frame.height()) / 2;
        if side == 0 {
            return Ok(Vec::new());
        }
        let bbox = BoundingBox::new(
            (frame.width() - side) / 2,
            (frame.height() - side) / 2,
            side,
            side,
        );

        let rest = (1.0 - DOMINANT_SCORE) / (EmotionLabel::ALL.len() - 1) as f32;
        let scores: EmotionScores = EmotionLabel::ALL
            .into_iter()
            .map(|l| (l, if l == label { DOMINANT_SCORE } else { rest }))
            .collect();

        Ok(vec![DetectionResult::new(bbox, scores)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_labels_with_centred_box() {
        let mut classifier = SyntheticClassifier::new();
        let frame = Frame::filled(200, 100, [0, 0, 0]).unwrap();

        let first = classifier.detect(&frame).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].bbox, BoundingBox::new(75, 25, 50, 50));
        assert_eq!(first[0].dominant().0, EmotionLabel::Happy);

        let second = classifier.detect(&frame).unwrap();
        assert_eq!(second[0].dominant().0, EmotionLabel::Sad);
    }

    #[test]
    fn tiny_frame_has_no_face() {
        let mut classifier = SyntheticClassifier::new();
        let frame = Frame::filled(1, 1, [0, 0, 0]).unwrap();
        assert!(classifier.detect(&frame).unwrap().is_empty());
    }
}
