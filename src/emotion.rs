//! Emotion vocabulary and score maps.
//!
//! The classifier reports scores over a closed set of seven labels. Anything
//! outside that set is rejected at parse time.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};

/// One of the seven emotions the classifier can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EmotionLabel {
    Happy,
    Sad,
    Angry,
    Surprise,
    Neutral,
    Fear,
    Disgust,
}

impl EmotionLabel {
    /// Declaration order. Dominant-label ties resolve to the earliest entry.
    pub const ALL: [EmotionLabel; 7] = [
        EmotionLabel::Happy,
        EmotionLabel::Sad,
        EmotionLabel::Angry,
        EmotionLabel::Surprise,
        EmotionLabel::Neutral,
        EmotionLabel::Fear,
        EmotionLabel::Disgust,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EmotionLabel::Happy => "happy",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Angry => "angry",
            EmotionLabel::Surprise => "surprise",
            EmotionLabel::Neutral => "neutral",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Disgust => "disgust",
        }
    }

    /// File name of the persona image for this label inside the asset directory.
    pub fn asset_file_name(self) -> &'static str {
        match self {
            EmotionLabel::Happy => "happy.png",
            EmotionLabel::Sad => "sad.png",
            EmotionLabel::Angry => "angry.png",
            EmotionLabel::Surprise => "surprise.png",
            EmotionLabel::Neutral => "neutral.png",
            EmotionLabel::Fear => "fear.png",
            EmotionLabel::Disgust => "disgust.png",
        }
    }

    fn index(self) -> usize {
        match self {
            EmotionLabel::Happy => 0,
            EmotionLabel::Sad => 1,
            EmotionLabel::Angry => 2,
            EmotionLabel::Surprise => 3,
            EmotionLabel::Neutral => 4,
            EmotionLabel::Fear => 5,
            EmotionLabel::Disgust => 6,
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        EmotionLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == normalized)
            .ok_or_else(|| anyhow!("unknown emotion label '{}'", s))
    }
}

/// Per-label scores for one face. Missing labels read as absent, not zero.
///
/// Scores are compared, never normalised; they need not sum to one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmotionScores {
    scores: [Option<f32>; 7],
}

impl EmotionScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, label: EmotionLabel, score: f32) -> Self {
        self.set(label, score);
        self
    }

    /// Set a score, clamped to [0, 1]. Non-finite scores are ignored.
    pub fn set(&mut self, label: EmotionLabel, score: f32) {
        if score.is_finite() {
            self.scores[label.index()] = Some(score.clamp(0.0, 1.0));
        }
    }

    pub fn get(&self, label: EmotionLabel) -> Option<f32> {
        self.scores[label.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.scores.iter().all(Option::is_none)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EmotionLabel, f32)> + '_ {
        EmotionLabel::ALL
            .into_iter()
            .filter_map(|label| self.get(label).map(|score| (label, score)))
    }

    /// Label with the strictly highest score.
    ///
    /// Exact ties keep the label that comes first in `EmotionLabel::ALL`.
    pub fn dominant(&self) -> Option<(EmotionLabel, f32)> {
        let mut best: Option<(EmotionLabel, f32)> = None;
        for (label, score) in self.iter() {
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((label, score)),
            }
        }
        best
    }
}

impl FromIterator<(EmotionLabel, f32)> for EmotionScores {
    fn from_iter<I: IntoIterator<Item = (EmotionLabel, f32)>>(iter: I) -> Self {
        let mut scores = EmotionScores::new();
        for (label, score) in iter {
            scores.set(label, score);
        }
        scores
    }
}

/// Integer percentage shown in labels. Truncates, so 0.999 reads as 99%.
pub fn confidence_percent(score: f32) -> u32 {
    (score.clamp(0.0, 1.0) * 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_picks_highest_score() {
        let scores = EmotionScores::new()
            .with(EmotionLabel::Happy, 0.2)
            .with(EmotionLabel::Sad, 0.7)
            .with(EmotionLabel::Angry, 0.1);

        let (label, score) = scores.dominant().unwrap();
        assert_eq!(label, EmotionLabel::Sad);
        assert_eq!(confidence_percent(score), 70);
    }

    #[test]
    fn dominant_tie_keeps_declaration_order() {
        let scores = EmotionScores::new()
            .with(EmotionLabel::Fear, 0.5)
            .with(EmotionLabel::Sad, 0.5);
        assert_eq!(scores.dominant().unwrap().0, EmotionLabel::Sad);
    }

    #[test]
    fn empty_scores_have_no_dominant() {
        assert!(EmotionScores::new().dominant().is_none());
        assert!(EmotionScores::new().is_empty());
    }

    #[test]
    fn unknown_labels_do_not_parse() {
        assert!("contempt".parse::<EmotionLabel>().is_err());
    }

    #[test]
    fn scores_are_clamped_and_non_finite_ignored() {
        let mut scores = EmotionScores::new();
        scores.set(EmotionLabel::Angry, 1.7);
        scores.set(EmotionLabel::Fear, f32::NAN);
        assert_eq!(scores.get(EmotionLabel::Angry), Some(1.0));
        assert_eq!(scores.get(EmotionLabel::Fear), None);
    }

    #[test]
    fn every_label_has_a_png_asset_name() {
        for label in EmotionLabel::ALL {
            assert_eq!(label.asset_file_name(), format!("{}.png", label));
        }
    }
}
