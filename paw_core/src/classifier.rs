//! Single-frame gesture classification from hand landmarks.
//!
//! Purely geometric: each finger is "open" when its tip sits clearly above
//! its middle joint, the thumb is judged sideways using handedness, and the
//! open count decides the shape.
//!
//! # Decision order
//!
//! 1. four or more fingers open → **paper**
//! 2. index and middle open, ring and pinky closed → **scissors**
//!    (thumb ignored)
//! 3. no finger open → **rock**
//! 4. anything else → indeterminate (`None`)
//!
//! A missing or non-finite landmark makes only its own finger read as
//! closed; the classifier never fails.

use tracing::trace;

use crate::config::ClassifierConfig;
use crate::gesture::Gesture;
use crate::landmark::{HandLandmark, HandSample, Handedness};

/// Open/closed state of each finger, thumb first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerStates {
    pub thumb:  bool,
    pub index:  bool,
    pub middle: bool,
    pub ring:   bool,
    pub pinky:  bool,
}

impl FingerStates {
    pub fn open_count(&self) -> usize {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
            .iter()
            .filter(|&&open| open)
            .count()
    }

    /// Apply the decision order from the module docs.
    pub fn gesture(&self) -> Option<Gesture> {
        let open = self.open_count();
        if open >= 4 {
            Some(Gesture::Paper)
        } else if self.index && self.middle && !self.ring && !self.pinky {
            Some(Gesture::Scissors)
        } else if open == 0 {
            Some(Gesture::Rock)
        } else {
            None
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureClassifier
// ════════════════════════════════════════════════════════════════════════════

/// Stateless landmark → gesture classifier.
#[derive(Clone, Copy, Debug, Default)]
pub struct GestureClassifier {
    cfg: ClassifierConfig,
}

impl GestureClassifier {
    pub fn new(cfg: ClassifierConfig) -> Self {
        GestureClassifier { cfg }
    }

    /// Classify one hand.  `handedness` overrides whatever the sample
    /// carries; pass `sample.handedness` for the detector's own guess.
    pub fn classify(&self, sample: &HandSample, handedness: Handedness) -> Option<Gesture> {
        let fingers = self.finger_states(sample, handedness);
        let gesture = fingers.gesture();
        trace!(?fingers, ?gesture, hand = handedness.as_str(), "classified");
        gesture
    }

    /// Classify using the sample's own handedness tag.
    pub fn classify_sample(&self, sample: &HandSample) -> Option<Gesture> {
        self.classify(sample, sample.handedness)
    }

    pub fn finger_states(&self, sample: &HandSample, handedness: Handedness) -> FingerStates {
        use HandLandmark::*;
        FingerStates {
            thumb:  self.thumb_open(sample, handedness),
            index:  self.finger_open(sample, IndexTip,  IndexPip),
            middle: self.finger_open(sample, MiddleTip, MiddlePip),
            ring:   self.finger_open(sample, RingTip,   RingPip),
            pinky:  self.finger_open(sample, PinkyTip,  PinkyPip),
        }
    }

    /// Height of `tip` above `joint` (positive = above; image y grows down).
    fn rise(sample: &HandSample, tip: HandLandmark, joint: HandLandmark) -> Option<f32> {
        Some(sample.point(joint)?.y - sample.point(tip)?.y)
    }

    fn finger_open(&self, sample: &HandSample, tip: HandLandmark, pip: HandLandmark) -> bool {
        Self::rise(sample, tip, pip).is_some_and(|dy| dy > self.cfg.finger_open_y)
    }

    fn thumb_open(&self, sample: &HandSample, handedness: Handedness) -> bool {
        use HandLandmark::{ThumbIp, ThumbTip};
        let dx = match (sample.point(ThumbTip), sample.point(ThumbIp)) {
            (Some(tip), Some(ip)) => Some(tip.x - ip.x),
            _ => None,
        };
        let t = self.cfg.thumb_open_x;
        match handedness {
            Handedness::Right   => dx.is_some_and(|dx| dx > t),
            Handedness::Left    => dx.is_some_and(|dx| dx < -t),
            Handedness::Unknown => {
                dx.is_some_and(|dx| dx.abs() > t)
                    || self.finger_open(sample, ThumbTip, ThumbIp)
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{Landmark, LANDMARK_COUNT};
    use crate::pose::{posed_hand, FingerPose};

    fn classifier() -> GestureClassifier {
        GestureClassifier::default()
    }

    fn hand(pose: FingerPose, handedness: Handedness) -> HandSample {
        posed_hand(pose, handedness)
    }

    #[test]
    fn all_open_is_paper() {
        let h = hand(FingerPose::ALL_OPEN, Handedness::Right);
        assert_eq!(classifier().classify_sample(&h), Some(Gesture::Paper));
    }

    #[test]
    fn four_open_without_thumb_is_paper() {
        let pose = FingerPose { thumb: false, ..FingerPose::ALL_OPEN };
        let h = hand(pose, Handedness::Left);
        assert_eq!(classifier().classify_sample(&h), Some(Gesture::Paper));
    }

    #[test]
    fn fist_is_rock() {
        for hd in [Handedness::Left, Handedness::Right, Handedness::Unknown] {
            let h = hand(FingerPose::ALL_CLOSED, hd);
            assert_eq!(classifier().classify_sample(&h), Some(Gesture::Rock), "{:?}", hd);
        }
    }

    #[test]
    fn scissors_regardless_of_thumb() {
        for thumb in [false, true] {
            let pose = FingerPose { thumb, index: true, middle: true, ring: false, pinky: false };
            let h = hand(pose, Handedness::Right);
            assert_eq!(classifier().classify_sample(&h), Some(Gesture::Scissors), "thumb={}", thumb);
        }
    }

    #[test]
    fn one_finger_is_indeterminate() {
        let pose = FingerPose { index: true, ..FingerPose::ALL_CLOSED };
        let h = hand(pose, Handedness::Right);
        assert_eq!(classifier().classify_sample(&h), None);
    }

    #[test]
    fn three_fingers_is_indeterminate() {
        let pose = FingerPose { index: true, middle: true, ring: true, ..FingerPose::ALL_CLOSED };
        let h = hand(pose, Handedness::Right);
        assert_eq!(classifier().classify_sample(&h), None);
    }

    #[test]
    fn thumb_direction_follows_handedness() {
        // Posed as a right thumb (tip to the right of the IP joint).
        let h = hand(FingerPose { thumb: true, ..FingerPose::ALL_CLOSED }, Handedness::Right);
        let c = classifier();
        assert!(c.finger_states(&h, Handedness::Right).thumb);
        assert!(!c.finger_states(&h, Handedness::Left).thumb);
        assert!(c.finger_states(&h, Handedness::Unknown).thumb);
    }

    #[test]
    fn unknown_handedness_accepts_vertical_thumb() {
        let mut pts = vec![Landmark::new(0.5, 0.5); LANDMARK_COUNT];
        pts[HandLandmark::ThumbIp.index()]  = Landmark::new(0.40, 0.50);
        pts[HandLandmark::ThumbTip.index()] = Landmark::new(0.40, 0.40);
        let h = HandSample::new(pts, Handedness::Unknown);
        let c = classifier();
        assert!(c.finger_states(&h, Handedness::Unknown).thumb);
        assert!(!c.finger_states(&h, Handedness::Right).thumb);
    }

    #[test]
    fn threshold_is_strict() {
        let mut pts = vec![Landmark::new(0.5, 0.5); LANDMARK_COUNT];
        pts[HandLandmark::IndexPip.index()] = Landmark::new(0.5, 0.50);
        pts[HandLandmark::IndexTip.index()] = Landmark::new(0.5, 0.47);
        let h = HandSample::new(pts, Handedness::Right);
        assert!(!classifier().finger_states(&h, Handedness::Right).index);
    }

    #[test]
    fn custom_threshold_changes_verdict() {
        let pose = FingerPose::ALL_OPEN;
        let h = hand(pose, Handedness::Right);
        let strict = GestureClassifier::new(ClassifierConfig { finger_open_y: 0.5, thumb_open_x: 0.5 });
        assert_eq!(strict.classify_sample(&h), Some(Gesture::Rock));
    }

    #[test]
    fn empty_sample_reads_as_rock() {
        // Every finger test degrades to "closed".
        let h = HandSample::default();
        assert_eq!(classifier().classify_sample(&h), Some(Gesture::Rock));
    }

    #[test]
    fn truncated_sample_degrades_per_finger() {
        let mut h = hand(FingerPose::ALL_OPEN, Handedness::Right);
        h.landmarks.truncate(HandLandmark::MiddlePip.index());
        let f = classifier().finger_states(&h, Handedness::Right);
        assert!(f.thumb && f.index);
        assert!(!f.middle && !f.ring && !f.pinky);
        assert_eq!(f.gesture(), None);
    }

    #[test]
    fn nan_tip_reads_closed() {
        let mut h = hand(FingerPose::ALL_OPEN, Handedness::Right);
        h.landmarks[HandLandmark::PinkyTip.index()].y = f32::NAN;
        h.landmarks[HandLandmark::RingTip.index()].y = f32::INFINITY;
        let f = classifier().finger_states(&h, Handedness::Right);
        assert!(!f.ring && !f.pinky);
        assert_eq!(f.gesture(), Some(Gesture::Scissors));
    }
}
