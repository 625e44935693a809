//! Top-level application loop.
//!
//! `AppState` owns the round state machine and the sound handle.  Each
//! tick it takes one frame from the active [`HandSource`], advances the
//! round, turns round events into sound cues and status text, and hands a
//! read-only view to the visualizer.

use std::io;
use std::sync::mpsc;
use std::time::Instant;

use clap::ValueEnum;
use paw_core::{GameConfig, HandSample, MoveSource, RandomMoves, RoundEvent, RoundStateMachine};
use tracing::info;

use crate::error::AppError;
use crate::hands::{HandSource, JsonLinesSource, SimHandSource};
use crate::sound::{Cue, Sound};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Where hand landmarks come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Keyboard simulator in the game window.
    #[default]
    Sim,
    /// JSON lines from an external detector on stdin.
    Stdin,
}

/// Configuration for the full application.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub game:           GameConfig,
    pub source:         SourceKind,
    /// Play sound cues on a MIDI output.
    pub audio:          bool,
    /// Loop quiet background music under the cues.
    pub music:          bool,
    /// Draw the hand skeleton and finger states.
    pub show_landmarks: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

const IDLE_STATUS: &str = "Show a steady open hand or fist to start";

pub struct AppState<M = RandomMoves> {
    round:      RoundStateMachine<M>,
    sound:      Sound,
    last_hands: Vec<HandSample>,
    rounds:     u64,
    pub status: String,
}

impl AppState<RandomMoves> {
    pub fn new(cfg: &AppConfig, sound: Sound) -> Self {
        AppState::with_round(RoundStateMachine::from_config(&cfg.game), sound)
    }
}

impl<M: MoveSource> AppState<M> {
    pub fn with_round(round: RoundStateMachine<M>, sound: Sound) -> Self {
        AppState {
            round,
            sound,
            last_hands: Vec::new(),
            rounds:     0,
            status:     IDLE_STATUS.to_string(),
        }
    }

    // ── advance one tick ─────────────────────────────────────────────────

    /// Feed one frame to the round.  A missing frame keeps the previous
    /// hands on screen.
    pub fn step(&mut self, now: Instant, frame: Option<Vec<HandSample>>) -> Option<RoundEvent> {
        let event = self.round.tick(now, frame.as_deref());
        if let Some(hands) = frame {
            self.last_hands = hands;
        }
        if let Some(ev) = event {
            self.handle_event(ev);
        }
        event
    }

    fn handle_event(&mut self, event: RoundEvent) {
        match event {
            RoundEvent::Triggered { player } => {
                self.status = format!("{} seen, here comes the paw", player);
            }
            RoundEvent::Revealing { .. } => {
                self.status = "Rock, paper, scissors...".to_string();
            }
            RoundEvent::RoundResult { player, opponent, outcome, resolution } => {
                self.rounds += 1;
                self.sound.play(Cue::RoundResult(outcome));
                self.status = format!("{} (you {}, cat {})", outcome, player, opponent);
                info!(round = self.rounds, %player, %opponent, %outcome, ?resolution, "round result");
            }
            RoundEvent::Reset => {
                self.status = IDLE_STATUS.to_string();
            }
        }
    }

    // ── read-only view ────────────────────────────────────────────────────

    pub fn round(&self)      -> &RoundStateMachine<M> { &self.round }
    pub fn sound(&self)      -> &Sound                { &self.sound }
    pub fn last_hands(&self) -> &[HandSample]         { &self.last_hands }
    pub fn rounds(&self)     -> u64                   { self.rounds }
}

// ════════════════════════════════════════════════════════════════════════════
// run — opens the window and drives the tick loop until quit
// ════════════════════════════════════════════════════════════════════════════

pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    let (sim_tx, sim_rx) = mpsc::channel();

    let mut source: Box<dyn HandSource> = match cfg.source {
        SourceKind::Sim   => Box::new(SimHandSource::new(sim_rx)),
        SourceKind::Stdin => Box::new(JsonLinesSource::spawn(io::BufReader::new(io::stdin()))),
    };
    info!(source = ?cfg.source, "hand source ready");

    let mut vis = Visualizer::new(sim_tx, cfg.game.timing.tick_rate, cfg.show_landmarks)?;

    let mut sound = if cfg.audio { Sound::spawn(cfg.music) } else { Sound::muted() };
    sound.play(Cue::Startup);

    let mut app = AppState::new(&cfg, sound);

    while vis.is_open() {
        if !vis.poll_input() { break; }

        let now = Instant::now();
        let frame = source.poll();
        app.step(now, frame);

        let status = format!("{}  |  {}", app.status, source.describe());
        vis.render(app.round(), now, app.last_hands(), &status);
    }

    info!(rounds = app.rounds(), "window closed");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use paw_core::pose::hand_for;
    use paw_core::{Gesture, Handedness, Outcome, RoundPhase, ScriptedMoves};
    use std::time::Duration;

    const TICK: Duration = Duration::from_millis(33);

    fn app(opponents: &[Gesture]) -> AppState<ScriptedMoves> {
        let round = RoundStateMachine::new(&GameConfig::default(), ScriptedMoves::new(opponents.to_vec()));
        AppState::with_round(round, Sound::muted())
    }

    fn hands(g: Gesture) -> Option<Vec<HandSample>> {
        Some(vec![hand_for(Some(g), Handedness::Right)])
    }

    /// Trigger with `trigger`, wait out the countdown, then show `shown`
    /// until the round resolves.  Returns the time of the result.
    fn play_round(app: &mut AppState<ScriptedMoves>, start: Instant, trigger: Gesture, shown: Gesture) -> Instant {
        let mut now = start;
        for _ in 0..3 {
            now += TICK;
            app.step(now, hands(trigger));
        }
        assert!(matches!(app.round().phase(), RoundPhase::Countdown { .. }));
        now += Duration::from_secs(3);
        app.step(now, None);
        for _ in 0..40 {
            now += TICK;
            if let Some(RoundEvent::RoundResult { .. }) = app.step(now, hands(shown)) {
                return now;
            }
        }
        panic!("round never resolved");
    }

    #[test]
    fn starts_idle() {
        let a = app(&[Gesture::Rock]);
        assert_eq!(a.status, IDLE_STATUS);
        assert_eq!(a.sound().cue_count(), 0);
        assert!(a.last_hands().is_empty());
    }

    #[test]
    fn one_cue_per_round() {
        let mut a = app(&[Gesture::Rock]);
        let shown_at = play_round(&mut a, Instant::now(), Gesture::Paper, Gesture::Paper);
        assert_eq!(a.round().outcome(), Some(Outcome::Win));
        assert_eq!(a.sound().cue_count(), 1);
        assert!(a.status.contains("You Win!"));

        // Sitting on the result screen plays nothing more.
        let mut now = shown_at;
        for _ in 0..30 {
            now += TICK;
            a.step(now, hands(Gesture::Scissors));
        }
        assert_eq!(a.sound().cue_count(), 1);
        assert_eq!(a.rounds(), 1);
    }

    #[test]
    fn reset_restores_idle_status() {
        let mut a = app(&[Gesture::Scissors]);
        let shown_at = play_round(&mut a, Instant::now(), Gesture::Rock, Gesture::Paper);
        assert_eq!(a.round().outcome(), Some(Outcome::Lose));

        let ev = a.step(shown_at + Duration::from_millis(5_100), Some(vec![]));
        assert_eq!(ev, Some(RoundEvent::Reset));
        assert_eq!(a.status, IDLE_STATUS);
        assert!(a.round().hint_visible());
    }

    #[test]
    fn two_rounds_two_cues() {
        let mut a = app(&[Gesture::Rock, Gesture::Paper]);
        let t = play_round(&mut a, Instant::now(), Gesture::Rock, Gesture::Rock);
        assert_eq!(a.round().outcome(), Some(Outcome::Draw));
        let t = t + Duration::from_millis(5_100);
        assert_eq!(a.step(t, None), Some(RoundEvent::Reset));

        play_round(&mut a, t, Gesture::Rock, Gesture::Rock);
        assert_eq!(a.round().outcome(), Some(Outcome::Lose));
        assert_eq!(a.sound().cue_count(), 2);
        assert_eq!(a.rounds(), 2);
    }

    #[test]
    fn missing_frame_keeps_last_hands() {
        let mut a = app(&[Gesture::Rock]);
        let now = Instant::now();
        a.step(now, hands(Gesture::Scissors));
        assert_eq!(a.last_hands().len(), 1);
        a.step(now + TICK, None);
        assert_eq!(a.last_hands().len(), 1);
        a.step(now + TICK * 2, Some(vec![]));
        assert!(a.last_hands().is_empty());
    }

    #[test]
    fn status_names_trigger_gesture() {
        let mut a = app(&[Gesture::Rock]);
        let now = Instant::now();
        for i in 0..3 {
            a.step(now + TICK * i, hands(Gesture::Rock));
        }
        assert!(a.status.starts_with("rock seen"));
    }
}
