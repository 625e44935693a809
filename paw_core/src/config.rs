//! Tunable constants for a game, loadable from TOML and the environment.
//!
//! Every section has a `Default` matching the shipped game, so a missing
//! file (or a file that only overrides one key) is fine.

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::GameError;

/// Environment prefix: `PAW_TIMING__COUNTDOWN_SECS=5` overrides
/// `timing.countdown_secs`.
pub const ENV_PREFIX: &str = "PAW";

// ════════════════════════════════════════════════════════════════════════════
// Sections
// ════════════════════════════════════════════════════════════════════════════

/// Geometric thresholds for the finger tests, in normalized image units.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// A finger is open when its tip sits this far above its PIP joint.
    pub finger_open_y: f32,
    /// A thumb is open when its tip sits this far outside its IP joint.
    pub thumb_open_x:  f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig { finger_open_y: 0.04, thumb_open_x: 0.03 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Consecutive agreeing readings required to start a round.
    pub trigger_window: usize,
    /// Readings kept for the reveal vote.
    pub reveal_window:  usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        SmoothingConfig { trigger_window: 3, reveal_window: 5 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub countdown_secs: u64,
    pub result_secs:    u64,
    /// Target frame rate of the tick loop.
    pub tick_rate:      u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig { countdown_secs: 3, result_secs: 5, tick_rate: 30 }
    }
}

impl TimingConfig {
    pub fn countdown(&self) -> Duration { Duration::from_secs(self.countdown_secs) }
    pub fn result(&self)    -> Duration { Duration::from_secs(self.result_secs) }

    /// Wall-clock length of one tick.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate.max(1) as f64)
    }
}

/// Paw reveal animation, in window pixels.  The offset starts at `start`
/// and moves `step` per tick until it reaches `target`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub start:  f32,
    pub target: f32,
    pub step:   f32,
}

impl Default for RevealConfig {
    fn default() -> Self {
        RevealConfig { start: -50.0, target: 40.0, step: 5.0 }
    }
}

impl RevealConfig {
    /// Ticks needed to go from `start` to `target`.
    pub fn ticks(&self) -> usize {
        if self.target <= self.start { return 1; }
        ((self.target - self.start) / self.step).ceil() as usize
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GameConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub classifier: ClassifierConfig,
    pub smoothing:  SmoothingConfig,
    pub timing:     TimingConfig,
    pub reveal:     RevealConfig,
    /// Seed for the opponent's RNG.  `None` seeds from the OS.
    pub seed:       Option<u64>,
}

impl GameConfig {
    /// Layer an optional TOML file under `PAW_*` environment variables,
    /// then validate.
    pub fn load(path: Option<&Path>) -> Result<Self, GameError> {
        let mut builder = Config::builder();
        if let Some(p) = path {
            builder = builder.add_source(File::from(p));
        }
        let cfg: GameConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        tracing::debug!(?cfg, "configuration loaded");
        Ok(cfg)
    }

    /// Parse configuration from a TOML string (no environment layering).
    pub fn from_toml(text: &str) -> Result<Self, GameError> {
        let cfg: GameConfig = Config::builder()
            .add_source(File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values that would leave a phase without an exit or a
    /// buffer that can never fill.
    pub fn validate(&self) -> Result<(), GameError> {
        let c = &self.classifier;
        if !c.finger_open_y.is_finite() || !c.thumb_open_x.is_finite() {
            return Err(GameError::invalid("classifier", "thresholds must be finite"));
        }
        if self.smoothing.trigger_window == 0 {
            return Err(GameError::invalid("smoothing.trigger_window", "must be at least 1"));
        }
        if self.smoothing.reveal_window == 0 {
            return Err(GameError::invalid("smoothing.reveal_window", "must be at least 1"));
        }
        if self.timing.tick_rate == 0 {
            return Err(GameError::invalid("timing.tick_rate", "must be at least 1"));
        }
        let r = &self.reveal;
        if !(r.step.is_finite() && r.step > 0.0) {
            return Err(GameError::invalid("reveal.step", "must be positive"));
        }
        if !r.start.is_finite() || !r.target.is_finite() {
            return Err(GameError::invalid("reveal", "offsets must be finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = GameConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.smoothing.trigger_window, 3);
        assert_eq!(cfg.smoothing.reveal_window, 5);
        assert_eq!(cfg.timing.countdown(), Duration::from_secs(3));
        assert_eq!(cfg.timing.result(), Duration::from_secs(5));
    }

    #[test]
    fn toml_overrides_single_key() {
        let cfg = GameConfig::from_toml("[timing]\ncountdown_secs = 5\n").unwrap();
        assert_eq!(cfg.timing.countdown_secs, 5);
        assert_eq!(cfg.timing.result_secs, 5);
        assert_eq!(cfg.classifier, ClassifierConfig::default());
    }

    #[test]
    fn toml_sets_seed() {
        let cfg = GameConfig::from_toml("seed = 42\n").unwrap();
        assert_eq!(cfg.seed, Some(42));
    }

    #[test]
    fn zero_step_rejected() {
        let err = GameConfig::from_toml("[reveal]\nstep = 0.0\n").unwrap_err();
        assert!(matches!(err, GameError::Invalid { field: "reveal.step", .. }));
    }

    #[test]
    fn zero_window_rejected() {
        let mut cfg = GameConfig::default();
        cfg.smoothing.trigger_window = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn reveal_tick_count() {
        assert_eq!(RevealConfig::default().ticks(), 18);
        let r = RevealConfig { start: 0.0, target: 11.0, step: 5.0 };
        assert_eq!(r.ticks(), 3);
    }

    #[test]
    fn env_overrides_nested_key() {
        // Only this test touches `PAW_TIMING__*`.
        std::env::set_var("PAW_TIMING__RESULT_SECS", "7");
        let loaded = GameConfig::load(None);
        std::env::remove_var("PAW_TIMING__RESULT_SECS");
        let cfg = loaded.unwrap();
        assert_eq!(cfg.timing.result_secs, 7);
        assert_eq!(cfg.timing.countdown_secs, 3);
    }

    #[test]
    fn tick_interval_30hz() {
        let t = TimingConfig::default().tick_interval();
        assert!(t > Duration::from_millis(33) && t < Duration::from_millis(34));
    }
}
