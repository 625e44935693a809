//! # paw_core
//!
//! Decision core for a gesture-controlled rock-paper-scissors game.  Turns a
//! noisy per-frame stream of hand landmarks into one trusted move per
//! round, throws the opponent's move, and scores the round.
//!
//! ## Pipeline
//!
//! | Stage | Type | State |
//! |---|---|---|
//! | landmarks → gesture | [`GestureClassifier`] | none |
//! | gestures → round start | [`TriggerDetector`] | 3-reading window |
//! | gestures → final move | [`RevealCollector`] | 5-reading window |
//! | moves → outcome | [`outcome::resolve`] | none |
//! | sequencing | [`RoundStateMachine`] | phase, timers, opponent |
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use paw_core::{GameConfig, Gesture, Handedness, RoundEvent, RoundStateMachine, ScriptedMoves};
//! use paw_core::pose::hand_for;
//!
//! let mut round = RoundStateMachine::new(&GameConfig::default(), ScriptedMoves::new([Gesture::Scissors]));
//! let t0 = Instant::now();
//! let fist = [hand_for(Some(Gesture::Rock), Handedness::Right)];
//!
//! round.tick(t0, Some(&fist[..]));
//! round.tick(t0, Some(&fist[..]));
//! let ev = round.tick(t0, Some(&fist[..]));
//! assert_eq!(ev, Some(RoundEvent::Triggered { player: Gesture::Rock }));
//!
//! let ev = round.tick(t0 + Duration::from_secs(3), None);
//! assert_eq!(ev, Some(RoundEvent::Revealing { opponent: Gesture::Scissors }));
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod gesture;
pub mod landmark;
pub mod outcome;
pub mod pose;
pub mod round;
pub mod smoothing;

pub use classifier::{FingerStates, GestureClassifier};
pub use config::GameConfig;
pub use error::GameError;
pub use gesture::Gesture;
pub use landmark::{HandLandmark, HandSample, Handedness, Landmark};
pub use outcome::Outcome;
pub use round::{MoveSource, RandomMoves, RoundEvent, RoundPhase, RoundStateMachine, ScriptedMoves};
pub use smoothing::{Resolution, RevealCollector, SmoothingBuffer, TriggerDetector};
