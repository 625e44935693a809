//! # paw_punch
//!
//! Rock-paper-scissors against a cat paw, played with hand gestures.
//! Wraps the [`paw_core`] round state machine in a software-rendered
//! window with MIDI sound cues over a quiet background loop (`--no-music`
//! keeps the cues only, `--mute` silences everything).
//!
//! ## Round flow
//!
//! | Phase | On screen | Leaves when |
//! |---|---|---|
//! | Awaiting trigger | idle paw peeking in, "Show hand to start" | 3 steady rock/paper readings |
//! | Countdown | 3, 2, 1 | 3 s elapsed |
//! | Revealing | paw slides down showing the cat's move | paw reaches its mark |
//! | Showing result | "You Win!" / "You Lose!" / "Draw" | 5 s elapsed |
//!
//! ## Hand sources
//!
//! * `--source sim` (default) — **Simulation**: keyboard keys pose a
//!   synthetic hand, which is classified exactly like detector output.
//! * `--source stdin` — **Detector**: one JSON frame of landmarks per line
//!   on stdin, e.g. piped from a MediaPipe hand tracker.
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Action |
//! |---|---|
//! | `R` / `P` / `S` | Show rock / paper / scissors |
//! | `X` | Show an ambiguous hand |
//! | `H` | Hide the hand |
//! | `L` | Cycle handedness (right, left, unknown) |
//! | `J` | Toggle landmark jitter |
//! | `F` | Drop the next frame |
//! | `Q` / `Esc` | Quit |

pub mod app;
pub mod error;
pub mod hands;
pub mod sound;
pub mod visualizer;
