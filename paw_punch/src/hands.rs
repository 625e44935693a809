//! Hand sources: where each tick's landmark sets come from.
//!
//! The public interface is [`HandSource::poll`], called once per tick.
//! The game loop doesn't need to know whether hands came from an external
//! landmark detector or the keyboard simulator.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use paw_core::landmark::{HandSample, Handedness, Landmark};
use paw_core::pose::{hand_for, jitter};
use paw_core::Gesture;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use tracing::{debug, info, warn};

// ════════════════════════════════════════════════════════════════════════════
// HandSource trait — unified interface for detector and simulator
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver one frame of hands per tick.
pub trait HandSource {
    /// Hands seen this tick, in no particular order.  `None` when no frame
    /// arrived; `Some(vec![])` when a frame arrived with no hands in it.
    fn poll(&mut self) -> Option<Vec<HandSample>>;

    /// One-line description for the status bar.
    fn describe(&self) -> String {
        String::from("detector")
    }
}

// ════════════════════════════════════════════════════════════════════════════
// JsonLinesSource — external landmark detector
// ════════════════════════════════════════════════════════════════════════════

/// Frames read from an external detector process, one JSON object per line:
///
/// ```text
/// {"hands":[{"handedness":"Right","landmarks":[[0.51,0.84,0.0], ...]}]}
/// ```
///
/// Reading happens on its own thread so a slow detector never stalls the
/// tick loop; `poll` returns the newest complete frame since the last
/// tick.
pub struct JsonLinesSource {
    rx: Receiver<Vec<HandSample>>,
}

impl JsonLinesSource {
    /// Spawn the reader thread over any buffered reader (stdin, a pipe, a
    /// file).
    pub fn spawn<R: BufRead + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || read_frames(reader, tx));
        JsonLinesSource { rx }
    }
}

impl HandSource for JsonLinesSource {
    fn poll(&mut self) -> Option<Vec<HandSample>> {
        let mut newest = None;
        loop {
            match self.rx.try_recv() {
                Ok(frame) => newest = Some(frame),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        newest
    }
}

fn read_frames<R: BufRead>(reader: R, tx: Sender<Vec<HandSample>>) {
    for (lineno, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l)  => l,
            Err(e) => {
                warn!(error = %e, "landmark stream read failed, stopping reader");
                return;
            }
        };
        if line.trim().is_empty() { continue; }
        match parse_frame(&line) {
            Ok(frame) => {
                if tx.send(frame).is_err() { return; }
            }
            Err(e) => warn!(line = lineno + 1, error = %e, "skipping malformed landmark line"),
        }
    }
    info!("landmark stream ended");
}

#[derive(Deserialize)]
struct RawFrame {
    #[serde(default)]
    hands: Vec<RawHand>,
}

#[derive(Deserialize)]
struct RawHand {
    #[serde(default)]
    handedness: Option<String>,
    landmarks:  Vec<Vec<f32>>,
}

/// Decode one line.  A point with fewer than two coordinates is kept as a
/// NaN placeholder so later indices stay aligned; the classifier reads it
/// as missing.
pub fn parse_frame(line: &str) -> Result<Vec<HandSample>, serde_json::Error> {
    let raw: RawFrame = serde_json::from_str(line)?;
    let hands = raw.hands.into_iter().map(|h| {
        let landmarks = h.landmarks.iter().map(|p| match p.as_slice() {
            [x, y, z, ..] => Landmark { x: *x, y: *y, z: *z },
            [x, y]        => Landmark::new(*x, *y),
            _             => Landmark::new(f32::NAN, f32::NAN),
        }).collect();
        let handedness = h.handedness.as_deref()
            .map(Handedness::from_label)
            .unwrap_or_default();
        HandSample::new(landmarks, handedness)
    }).collect();
    Ok(hands)
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandSource — keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    KeyDown(SimKey),
}

/// Simulated key codes (mapped from minifb Key).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    Rock,            // R
    Paper,           // P
    Scissors,        // S
    Ambiguous,       // X
    HideHand,        // H
    CycleHandedness, // L
    ToggleJitter,    // J
    DropFrame,       // F
}

/// Hand source driven by [`SimInput`] events from the visualizer's window.
///
/// Holds a current pose and re-synthesizes a full landmark set every tick,
/// so the real classifier and smoothing run exactly as they would on
/// detector output.
pub struct SimHandSource {
    rx:         Receiver<SimInput>,
    /// `None` = no hand in view; `Some(None)` = an ambiguous hand.
    pose:       Option<Option<Gesture>>,
    handedness: Handedness,
    jitter:     bool,
    drop_next:  bool,
    rng:        StdRng,
}

/// Landmark noise while jitter is on, in normalized image units.
const JITTER: f32 = 0.012;

impl SimHandSource {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimHandSource {
            rx,
            pose:       None,
            handedness: Handedness::Right,
            jitter:     false,
            drop_next:  false,
            rng:        StdRng::from_entropy(),
        }
    }

    fn apply(&mut self, key: SimKey) {
        match key {
            SimKey::Rock      => self.pose = Some(Some(Gesture::Rock)),
            SimKey::Paper     => self.pose = Some(Some(Gesture::Paper)),
            SimKey::Scissors  => self.pose = Some(Some(Gesture::Scissors)),
            SimKey::Ambiguous => self.pose = Some(None),
            SimKey::HideHand  => self.pose = None,
            SimKey::CycleHandedness => {
                self.handedness = match self.handedness {
                    Handedness::Right   => Handedness::Left,
                    Handedness::Left    => Handedness::Unknown,
                    Handedness::Unknown => Handedness::Right,
                };
            }
            SimKey::ToggleJitter => self.jitter = !self.jitter,
            SimKey::DropFrame    => self.drop_next = true,
        }
        debug!(?key, pose = ?self.pose, hand = self.handedness.as_str(), jitter = self.jitter, "sim input");
    }
}

impl HandSource for SimHandSource {
    fn poll(&mut self) -> Option<Vec<HandSample>> {
        while let Ok(SimInput::KeyDown(key)) = self.rx.try_recv() {
            self.apply(key);
        }
        if self.drop_next {
            self.drop_next = false;
            return None;
        }
        let Some(pose) = self.pose else { return Some(Vec::new()) };
        let mut hand = hand_for(pose, self.handedness);
        if self.jitter {
            jitter(&mut hand, JITTER, &mut self.rng);
        }
        Some(vec![hand])
    }

    fn describe(&self) -> String {
        let pose = match self.pose {
            None           => "no hand",
            Some(None)     => "unsure",
            Some(Some(g))  => g.as_str(),
        };
        format!("sim: {} {}{}", pose, self.handedness.as_str(), if self.jitter { " jitter" } else { "" })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
