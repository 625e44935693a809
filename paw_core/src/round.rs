//! The round state machine.
//!
//! `RoundStateMachine` owns every piece of per-round state and is advanced
//! once per frame by [`RoundStateMachine::tick`].  Phases:
//!
//! ```text
//!   AwaitingTrigger ──(stable rock/paper)──▶ Countdown ──(3 s)──▶ Revealing
//!         ▲                                                          │
//!         └────────────(5 s)──── ShowingResult ◀──(paw arrives)──────┘
//! ```
//!
//! Each phase exits on elapsed time or animation position alone, so no
//! sequence of frames (including no frames at all) can stall a round once
//! it has started.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::classifier::GestureClassifier;
use crate::config::{GameConfig, RevealConfig};
use crate::gesture::{describe, Gesture};
use crate::landmark::HandSample;
use crate::outcome::{self, Outcome};
use crate::smoothing::{Resolution, RevealCollector, TriggerDetector};

// ════════════════════════════════════════════════════════════════════════════
// MoveSource — the opponent
// ════════════════════════════════════════════════════════════════════════════

/// Supplies the opponent's throws.
pub trait MoveSource {
    /// The opponent's move for the round being revealed.
    fn next_move(&mut self) -> Gesture;

    /// Paw shown on the idle screen after a reset.  Purely cosmetic.
    fn idle_pose(&mut self) -> Gesture {
        Gesture::Paper
    }
}

/// Uniformly random opponent.
pub struct RandomMoves<R = StdRng> {
    rng: R,
}

impl RandomMoves<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        RandomMoves { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        RandomMoves { rng: StdRng::from_entropy() }
    }
}

impl<R: Rng> MoveSource for RandomMoves<R> {
    fn next_move(&mut self) -> Gesture {
        Gesture::random(&mut self.rng)
    }

    fn idle_pose(&mut self) -> Gesture {
        Gesture::random(&mut self.rng)
    }
}

/// Replays a fixed list of moves, cycling when exhausted.
#[derive(Clone, Debug)]
pub struct ScriptedMoves {
    moves: VecDeque<Gesture>,
}

impl ScriptedMoves {
    pub fn new(moves: impl IntoIterator<Item = Gesture>) -> Self {
        ScriptedMoves { moves: moves.into_iter().collect() }
    }
}

impl MoveSource for ScriptedMoves {
    fn next_move(&mut self) -> Gesture {
        match self.moves.pop_front() {
            Some(g) => {
                self.moves.push_back(g);
                g
            }
            None => Gesture::Rock,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Phases and events
// ════════════════════════════════════════════════════════════════════════════

/// Where the round currently is.  Exactly one phase is active.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RoundPhase {
    /// Watching for a stable rock/paper hand.
    AwaitingTrigger,
    /// Counting down; no sampling.  `trigger` is the gesture that started
    /// the round.
    Countdown { started_at: Instant, trigger: Gesture },
    /// The opponent's paw slides in from `reveal.start` toward
    /// `reveal.target` while the player's hand is sampled.
    Revealing { offset: f32, trigger: Gesture, opponent: Gesture },
    /// Outcome on screen.
    ShowingResult { outcome: Outcome, shown_at: Instant },
}

impl RoundPhase {
    pub fn name(&self) -> &'static str {
        match self {
            RoundPhase::AwaitingTrigger     => "awaiting-trigger",
            RoundPhase::Countdown { .. }    => "countdown",
            RoundPhase::Revealing { .. }    => "revealing",
            RoundPhase::ShowingResult { .. } => "showing-result",
        }
    }
}

/// Transitions reported by [`RoundStateMachine::tick`].  At most one per
/// tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RoundEvent {
    /// A stable hand started the countdown.
    Triggered { player: Gesture },
    /// The countdown ended and the opponent has thrown.
    Revealing { opponent: Gesture },
    /// The round is decided.  Fired exactly once per round.
    RoundResult {
        player:     Gesture,
        opponent:   Gesture,
        outcome:    Outcome,
        resolution: Resolution,
    },
    /// The result screen timed out; back to waiting.
    Reset,
}

// ════════════════════════════════════════════════════════════════════════════
// RoundStateMachine
// ════════════════════════════════════════════════════════════════════════════

pub struct RoundStateMachine<M = RandomMoves> {
    phase:      RoundPhase,
    classifier: GestureClassifier,
    trigger:    TriggerDetector,
    reveal:     RevealCollector,
    moves:      M,

    // ── per-round results ─────────────────────────────────────────────────
    player_gesture:   Option<Gesture>,
    opponent_gesture: Option<Gesture>,
    outcome:          Option<Outcome>,
    idle_paw:         Gesture,

    // ── timing ────────────────────────────────────────────────────────────
    countdown:   Duration,
    result_for:  Duration,
    reveal_path: RevealConfig,
}

impl RoundStateMachine<RandomMoves> {
    /// Random opponent, seeded from `cfg.seed` when set.
    pub fn from_config(cfg: &GameConfig) -> Self {
        let moves = match cfg.seed {
            Some(seed) => RandomMoves::seeded(seed),
            None       => RandomMoves::from_entropy(),
        };
        RoundStateMachine::new(cfg, moves)
    }
}

impl<M: MoveSource> RoundStateMachine<M> {
    pub fn new(cfg: &GameConfig, moves: M) -> Self {
        RoundStateMachine {
            phase:            RoundPhase::AwaitingTrigger,
            classifier:       GestureClassifier::new(cfg.classifier),
            trigger:          TriggerDetector::new(cfg.smoothing.trigger_window),
            reveal:           RevealCollector::new(cfg.smoothing.reveal_window),
            moves,
            player_gesture:   None,
            opponent_gesture: None,
            outcome:          None,
            idle_paw:         Gesture::Paper,
            countdown:        cfg.timing.countdown(),
            result_for:       cfg.timing.result(),
            reveal_path:      cfg.reveal,
        }
    }

    /// Advance one frame.
    ///
    /// `frame` carries the hands detected this tick; `None` means the
    /// frame itself was missing, which skips sampling but still lets timers
    /// and the reveal animation run.
    pub fn tick(&mut self, now: Instant, frame: Option<&[HandSample]>) -> Option<RoundEvent> {
        match self.phase {
            RoundPhase::AwaitingTrigger => {
                let hands = frame?;
                for hand in hands {
                    let reading = self.classifier.classify_sample(hand);
                    debug!(reading = describe(reading), "trigger sample");
                    if let Some(player) = self.trigger.observe(reading) {
                        return Some(self.start_countdown(now, player));
                    }
                }
                None
            }

            RoundPhase::Countdown { started_at, trigger } => {
                if now.saturating_duration_since(started_at) < self.countdown {
                    return None;
                }
                let opponent = self.moves.next_move();
                self.opponent_gesture = Some(opponent);
                self.phase = RoundPhase::Revealing {
                    offset: self.reveal_path.start,
                    trigger,
                    opponent,
                };
                info!(%opponent, "countdown finished, revealing");
                Some(RoundEvent::Revealing { opponent })
            }

            RoundPhase::Revealing { offset, trigger, opponent } => {
                let hands = frame.unwrap_or(&[]);
                if let Some(hand) = hands.first() {
                    let reading = self.classifier.classify_sample(hand);
                    debug!(reading = describe(reading), "reveal sample");
                    self.reveal.collect(reading);
                }

                let target = self.reveal_path.target;
                let mut offset = offset;
                if offset < target {
                    offset += self.reveal_path.step;
                }
                if offset < target {
                    self.phase = RoundPhase::Revealing { offset, trigger, opponent };
                    return None;
                }
                Some(self.finish_reveal(now, hands, trigger, opponent))
            }

            RoundPhase::ShowingResult { shown_at, .. } => {
                if now.saturating_duration_since(shown_at) <= self.result_for {
                    return None;
                }
                self.reset();
                Some(RoundEvent::Reset)
            }
        }
    }

    fn start_countdown(&mut self, now: Instant, player: Gesture) -> RoundEvent {
        self.player_gesture = Some(player);
        self.trigger.clear();
        self.reveal.clear();
        self.phase = RoundPhase::Countdown { started_at: now, trigger: player };
        info!(%player, "round triggered, counting down");
        RoundEvent::Triggered { player }
    }

    fn finish_reveal(
        &mut self,
        now:      Instant,
        current:  &[HandSample],
        trigger:  Gesture,
        opponent: Gesture,
    ) -> RoundEvent {
        // The first hand is already in the vote; the fresh reading looks at
        // the other hands of the final frame.
        let classifier = self.classifier;
        let fresh = || current.iter().skip(1).find_map(|hand| classifier.classify_sample(hand));
        let (player, resolution) = self.reveal.resolve(fresh, trigger);

        let outcome = outcome::resolve(Some(player), Some(opponent));
        self.player_gesture = Some(player);
        self.outcome = Some(outcome);
        self.phase = RoundPhase::ShowingResult { outcome, shown_at: now };
        info!(%player, %opponent, %outcome, ?resolution, "round decided");
        RoundEvent::RoundResult { player, opponent, outcome, resolution }
    }

    /// Forget the round and wait for the next trigger.
    pub fn reset(&mut self) {
        self.phase            = RoundPhase::AwaitingTrigger;
        self.player_gesture   = None;
        self.opponent_gesture = None;
        self.outcome          = None;
        self.trigger.clear();
        self.reveal.clear();
        self.idle_paw = self.moves.idle_pose();
        info!(idle = %self.idle_paw, "round reset");
    }

    // ── Read-only view for the renderer ───────────────────────────────────

    pub fn phase(&self)            -> &RoundPhase               { &self.phase }
    pub fn player_gesture(&self)   -> Option<Gesture>           { self.player_gesture }
    pub fn opponent_gesture(&self) -> Option<Gesture>           { self.opponent_gesture }
    pub fn outcome(&self)          -> Option<Outcome>           { self.outcome }
    pub fn idle_paw(&self)         -> Gesture                   { self.idle_paw }
    pub fn classifier(&self)       -> &GestureClassifier        { &self.classifier }
    pub fn trigger(&self)          -> &TriggerDetector          { &self.trigger }
    pub fn reveal(&self)           -> &RevealCollector          { &self.reveal }
    pub fn reveal_path(&self)      -> &RevealConfig             { &self.reveal_path }

    /// Whether the "show hand to start" hint belongs on screen.
    pub fn hint_visible(&self) -> bool {
        matches!(self.phase, RoundPhase::AwaitingTrigger)
    }

    /// Whole seconds left on the countdown, `None` outside the countdown.
    pub fn countdown_remaining(&self, now: Instant) -> Option<u64> {
        match self.phase {
            RoundPhase::Countdown { started_at, .. } => {
                let elapsed = now.saturating_duration_since(started_at).as_secs();
                Some(self.countdown.as_secs().saturating_sub(elapsed))
            }
            _ => None,
        }
    }

    /// Vertical position of the opponent's paw.
    pub fn paw_offset(&self) -> f32 {
        match self.phase {
            RoundPhase::Revealing { offset, .. } => offset,
            RoundPhase::ShowingResult { .. }     => self.reveal_path.target,
            _                                    => self.reveal_path.start,
        }
    }

    /// Gesture to draw for the opponent's paw, if it is visible at all.
    pub fn visible_paw(&self) -> Option<Gesture> {
        match self.phase {
            RoundPhase::Countdown { .. }         => None,
            RoundPhase::AwaitingTrigger          => Some(self.idle_paw),
            RoundPhase::Revealing { opponent, .. } => Some(opponent),
            RoundPhase::ShowingResult { .. }     => self.opponent_gesture.or(Some(self.idle_paw)),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
