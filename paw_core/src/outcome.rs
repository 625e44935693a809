//! Who won the round.

use std::fmt;

use crate::gesture::Gesture;

/// Result of one round, from the player's side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win,
    Lose,
    Draw,
    /// One side had no move.
    NoMove,
}

impl Outcome {
    /// Banner text shown on the result screen.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Win    => "You Win!",
            Outcome::Lose   => "You Lose!",
            Outcome::Draw   => "Draw",
            Outcome::NoMove => "No Move",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Score `player` against `opponent`.  A missing move on either side is
/// `NoMove`, never a panic.
pub fn resolve(player: Option<Gesture>, opponent: Option<Gesture>) -> Outcome {
    match (player, opponent) {
        (Some(p), Some(o)) if p == o        => Outcome::Draw,
        (Some(p), Some(o)) if p.beats() == o => Outcome::Win,
        (Some(_), Some(_))                  => Outcome::Lose,
        _                                   => Outcome::NoMove,
    }
}

/// Score two free-text labels.  Labels are normalized (case, surrounding
/// whitespace) before comparison; anything unparseable counts as missing.
pub fn resolve_labels(player: &str, opponent: &str) -> Outcome {
    resolve(player.parse().ok(), opponent.parse().ok())
}
