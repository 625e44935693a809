//! Synthetic hand poses.
//!
//! Builds plausible 21-point landmark sets for a given finger layout so the
//! keyboard simulator (and tests) can exercise the real classifier instead
//! of bypassing it.

use rand::Rng;

use crate::gesture::Gesture;
use crate::landmark::{HandLandmark, HandSample, Handedness, Landmark, LANDMARK_COUNT};

/// Which fingers are extended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FingerPose {
    pub thumb:  bool,
    pub index:  bool,
    pub middle: bool,
    pub ring:   bool,
    pub pinky:  bool,
}

impl FingerPose {
    pub const ALL_OPEN: FingerPose =
        FingerPose { thumb: true, index: true, middle: true, ring: true, pinky: true };
    pub const ALL_CLOSED: FingerPose =
        FingerPose { thumb: false, index: false, middle: false, ring: false, pinky: false };

    /// The canonical pose for a gesture.  `None` yields a lone pointing
    /// finger, which no rule accepts.
    pub fn for_gesture(gesture: Option<Gesture>) -> FingerPose {
        match gesture {
            Some(Gesture::Rock)     => FingerPose::ALL_CLOSED,
            Some(Gesture::Paper)    => FingerPose::ALL_OPEN,
            Some(Gesture::Scissors) => FingerPose { index: true, middle: true, ..FingerPose::ALL_CLOSED },
            None                    => FingerPose { index: true, ..FingerPose::ALL_CLOSED },
        }
    }
}

// Layout of a right hand seen palm-on; left hands are mirrored in x.
const WRIST:    (f32, f32) = (0.50, 0.85);
const MCP_Y:    f32 = 0.62;
const PIP_Y:    f32 = 0.52;
const OPEN_DIP: f32 = 0.43;
const OPEN_TIP: f32 = 0.36;
const SHUT_DIP: f32 = 0.57;
const SHUT_TIP: f32 = 0.60;
const FINGER_X: [f32; 4] = [0.42, 0.48, 0.54, 0.60];

/// Build a full landmark set for `pose`.
pub fn posed_hand(pose: FingerPose, handedness: Handedness) -> HandSample {
    use HandLandmark::*;
    let mut pts = vec![Landmark::default(); LANDMARK_COUNT];
    let mut put = |which: HandLandmark, x: f32, y: f32| pts[which.index()] = Landmark::new(x, y);

    put(Wrist, WRIST.0, WRIST.1);

    // Thumb: sideways reach decides "open"; a closed tip tucks under the IP.
    put(ThumbCmc, 0.44, 0.78);
    put(ThumbMcp, 0.39, 0.72);
    put(ThumbIp,  0.35, 0.67);
    if pose.thumb {
        put(ThumbTip, 0.43, 0.66);
    } else {
        put(ThumbTip, 0.35, 0.69);
    }

    let fingers = [
        (pose.index,  [IndexMcp,  IndexPip,  IndexDip,  IndexTip ]),
        (pose.middle, [MiddleMcp, MiddlePip, MiddleDip, MiddleTip]),
        (pose.ring,   [RingMcp,   RingPip,   RingDip,   RingTip  ]),
        (pose.pinky,  [PinkyMcp,  PinkyPip,  PinkyDip,  PinkyTip ]),
    ];
    for (i, (open, [mcp, pip, dip, tip])) in fingers.into_iter().enumerate() {
        let x = FINGER_X[i];
        put(mcp, x, MCP_Y);
        put(pip, x, PIP_Y);
        if open {
            put(dip, x, OPEN_DIP);
            put(tip, x, OPEN_TIP);
        } else {
            put(dip, x, SHUT_DIP);
            put(tip, x, SHUT_TIP);
        }
    }

    if handedness == Handedness::Left {
        for p in &mut pts { p.x = 1.0 - p.x; }
    }
    HandSample::new(pts, handedness)
}

/// Canonical hand for a gesture.
pub fn hand_for(gesture: Option<Gesture>, handedness: Handedness) -> HandSample {
    posed_hand(FingerPose::for_gesture(gesture), handedness)
}

/// Shake every landmark by up to `amplitude` in x and y.
pub fn jitter<R: Rng + ?Sized>(sample: &mut HandSample, amplitude: f32, rng: &mut R) {
    if amplitude <= 0.0 { return; }
    for p in &mut sample.landmarks {
        p.x = (p.x + rng.gen_range(-amplitude..amplitude)).clamp(0.0, 1.0);
        p.y = (p.y + rng.gen_range(-amplitude..amplitude)).clamp(0.0, 1.0);
    }
}
