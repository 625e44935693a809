//! Hand skeleton data as delivered by a landmark detector.
//!
//! A [`HandSample`] is one detected hand in one frame: 21 image-relative
//! points in the usual palm-model order plus the detector's handedness
//! guess.  Samples are produced and consumed within a single tick.

// ── Landmark indices ──────────────────────────────────────

/// The 21 points of the hand model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Number of landmarks in a complete sample.
pub const LANDMARK_COUNT: usize = 21;

impl HandLandmark {
    /// Position of this landmark in a sample's point list.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

// ── Points ────────────────────────────────────────────────

/// One normalized landmark.  `x` and `y` are in `[0, 1]` relative to the
/// image, with `y` growing downward.  `z` is relative depth and unused by
/// the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Landmark { x, y, z: 0.0 }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

// ── Handedness ────────────────────────────────────────────

/// Which hand the detector believes it saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Unknown,
}

impl Handedness {
    /// Map a detector label ("Left", "right", ...) to a handedness.
    /// Anything unrecognised becomes `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "left"  => Handedness::Left,
            "right" => Handedness::Right,
            _       => Handedness::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Handedness::Left    => "left",
            Handedness::Right   => "right",
            Handedness::Unknown => "unknown",
        }
    }
}

// ── Sample ────────────────────────────────────────────────

/// One detected hand in one frame.
///
/// The point list is normally complete, but nothing here enforces it:
/// short or corrupted lists are tolerated and read back as `None` by
/// [`HandSample::point`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HandSample {
    pub landmarks:  Vec<Landmark>,
    pub handedness: Handedness,
}

impl HandSample {
    pub fn new(landmarks: Vec<Landmark>, handedness: Handedness) -> Self {
        HandSample { landmarks, handedness }
    }

    /// Look up a landmark.  Missing entries and non-finite coordinates
    /// both read as `None`.
    pub fn point(&self, which: HandLandmark) -> Option<Landmark> {
        self.landmarks
            .get(which.index())
            .copied()
            .filter(Landmark::is_finite)
    }

    /// True when all 21 points are present.
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() >= LANDMARK_COUNT
    }
}
