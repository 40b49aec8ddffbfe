//! Throttled detection with a hold-last-result cache.
//!
//! The classifier runs on every Nth frame only. Between runs, and whenever a
//! run yields nothing, the last successful detection is reused unchanged and
//! simply grows older. There is no smoothing of scores.

use std::time::{Duration, Instant};

use crate::detect::{ClassifierError, DetectionResult, EmotionClassifier};
use crate::frame::Frame;

/// Default throttle interval: classify one frame in six.
pub const DEFAULT_EVERY_N_FRAMES: u64 = 6;

/// Last successful detection and when it was captured.
#[derive(Clone, Debug)]
pub struct CachedDetection {
    pub result: DetectionResult,
    pub captured_at: Instant,
}

/// What the cache reports for one frame.
#[derive(Clone, Debug)]
pub struct CacheOutcome {
    /// 1-based index of the frame just seen.
    pub frame_index: u64,
    /// Whether the classifier was invoked on this frame.
    pub classified: bool,
    /// Result to display, if any detection has ever succeeded.
    pub result: Option<DetectionResult>,
    /// Time since `result` was captured.
    pub age: Option<Duration>,
}

/// Owns the classifier and the last known detection.
pub struct DetectionCache {
    classifier: Box<dyn EmotionClassifier>,
    every_n: u64,
    frame_counter: u64,
    last: Option<CachedDetection>,
}

impl DetectionCache {
    /// `every_n` of 0 is treated as 1.
    pub fn new(classifier: Box<dyn EmotionClassifier>, every_n: u64) -> Self {
        Self {
            classifier,
            every_n: every_n.max(1),
            frame_counter: 0,
            last: None,
        }
    }

    pub fn every_n(&self) -> u64 {
        self.every_n
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }

    pub fn last(&self) -> Option<&CachedDetection> {
        self.last.as_ref()
    }

    /// Process one frame using the wall clock.
    pub fn on_frame(&mut self, frame: &Frame) -> CacheOutcome {
        self.on_frame_at(frame, Instant::now())
    }

    /// Process one frame as if observed at `now`.
    pub fn on_frame_at(&mut self, frame: &Frame, now: Instant) -> CacheOutcome {
        self.frame_counter += 1;
        let classified = self.frame_counter % self.every_n == 0;
        if classified {
            self.classify(frame, now);
        }

        let (result, age) = match &self.last {
            Some(cached) => (
                Some(cached.result.clone()),
                Some(now.saturating_duration_since(cached.captured_at)),
            ),
            None => (None, None),
        };

        CacheOutcome {
            frame_index: self.frame_counter,
            classified,
            result,
            age,
        }
    }

    fn classify(&mut self, frame: &Frame, now: Instant) {
        match self.classifier.detect(frame) {
            Ok(faces) => match faces.into_iter().next() {
                Some(primary) => {
                    log::debug!(
                        "frame {}: {} detected {} at {:?}",
                        self.frame_counter,
                        self.classifier.name(),
                        primary.dominant().0,
                        primary.bbox
                    );
                    self.last = Some(CachedDetection {
                        result: primary,
                        captured_at: now,
                    });
                }
                None => {
                    log::debug!("frame {}: no faces, keeping last result", self.frame_counter);
                }
            },
            Err(err @ ClassifierError::Inference(_)) => {
                log::debug!("frame {}: {}; keeping last result", self.frame_counter, err);
            }
            Err(err @ ClassifierError::Backend(_)) => {
                log::warn!("frame {}: {}; keeping last result", self.frame_counter, err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{ScriptStep, ScriptedClassifier};
    use crate::emotion::{EmotionLabel, EmotionScores};
    use crate::frame::BoundingBox;

    fn face(label: EmotionLabel, score: f32) -> DetectionResult {
        DetectionResult::new(
            BoundingBox::new(10, 10, 50, 50),
            EmotionScores::new().with(label, score),
        )
    }

    fn frame() -> Frame {
        Frame::filled(8, 8, [0, 0, 0]).unwrap()
    }

    #[test]
    fn classifier_runs_only_on_multiples_of_n() {
        for n in 1..=7u64 {
            let classifier = ScriptedClassifier::silent();
            let calls = classifier.call_counter();
            let mut cache = DetectionCache::new(Box::new(classifier), n);

            for i in 1..=30u64 {
                let outcome = cache.on_frame(&frame());
                assert_eq!(outcome.frame_index, i);
                assert_eq!(outcome.classified, i % n == 0, "n={n} frame={i}");
            }
            assert_eq!(calls.load(std::sync::atomic::Ordering::Relaxed), 30 / n);
        }
    }

    #[test]
    fn zero_interval_is_treated_as_one() {
        let cache = DetectionCache::new(Box::new(ScriptedClassifier::silent()), 0);
        assert_eq!(cache.every_n(), 1);
    }

    #[test]
    fn nothing_to_show_before_first_detection() {
        let mut cache = DetectionCache::new(Box::new(ScriptedClassifier::silent()), 2);
        for _ in 0..4 {
            let outcome = cache.on_frame(&frame());
            assert!(outcome.result.is_none());
            assert!(outcome.age.is_none());
        }
    }

    #[test]
    fn stale_result_survives_misses_and_errors() {
        let happy = face(EmotionLabel::Happy, 0.8);
        let classifier = ScriptedClassifier::new([
            ScriptStep::Faces(vec![happy.clone()]),
            ScriptStep::NoFaces,
            ScriptStep::InferenceError("shape mismatch".into()),
            ScriptStep::BackendFault("poisoned".into()),
        ]);
        let mut cache = DetectionCache::new(Box::new(classifier), 1);
        let start = Instant::now();

        let first = cache.on_frame_at(&frame(), start);
        assert_eq!(first.result.as_ref(), Some(&happy));
        assert_eq!(first.age, Some(Duration::ZERO));

        for step in 1..=3u64 {
            let now = start + Duration::from_millis(100 * step);
            let outcome = cache.on_frame_at(&frame(), now);
            assert!(outcome.classified);
            assert_eq!(outcome.result.as_ref(), Some(&happy));
            assert_eq!(outcome.age, Some(Duration::from_millis(100 * step)));
        }
    }

    #[test]
    fn newer_detection_replaces_cached_one() {
        let happy = face(EmotionLabel::Happy, 0.8);
        let sad = face(EmotionLabel::Sad, 0.6);
        let classifier = ScriptedClassifier::new([
            ScriptStep::Faces(vec![happy]),
            ScriptStep::Faces(vec![sad.clone(), face(EmotionLabel::Fear, 0.9)]),
        ]);
        let mut cache = DetectionCache::new(Box::new(classifier), 1);
        let start = Instant::now();

        cache.on_frame_at(&frame(), start);
        let later = start + Duration::from_secs(1);
        let outcome = cache.on_frame_at(&frame(), later);

        assert_eq!(outcome.result, Some(sad));
        assert_eq!(outcome.age, Some(Duration::ZERO));
        assert_eq!(cache.last().unwrap().captured_at, later);
    }
}
