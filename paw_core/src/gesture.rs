//! The three throwable hand shapes.
//!
//! A frame that could not be read confidently is represented as
//! `Option::<Gesture>::None` everywhere in the crate; it can be stored and
//! filtered but never reaches [`crate::outcome::resolve`] as a real move.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gesture {
    Rock,
    Paper,
    Scissors,
}

impl Gesture {
    /// Every throwable gesture, in declaration order.
    pub const ALL: [Gesture; 3] = [Gesture::Rock, Gesture::Paper, Gesture::Scissors];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gesture::Rock     => "rock",
            Gesture::Paper    => "paper",
            Gesture::Scissors => "scissors",
        }
    }

    /// The gesture this one defeats.
    pub fn beats(&self) -> Gesture {
        match self {
            Gesture::Rock     => Gesture::Scissors,
            Gesture::Scissors => Gesture::Paper,
            Gesture::Paper    => Gesture::Rock,
        }
    }

    /// Draw one gesture uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Gesture {
        // ALL is non-empty, so `choose` always yields.
        *Gesture::ALL.choose(rng).unwrap_or(&Gesture::Rock)
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label names no gesture.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown gesture label {0:?}")]
pub struct UnknownGesture(pub String);

impl FromStr for Gesture {
    type Err = UnknownGesture;

    /// Case- and whitespace-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rock"     => Ok(Gesture::Rock),
            "paper"    => Ok(Gesture::Paper),
            "scissors" => Ok(Gesture::Scissors),
            _          => Err(UnknownGesture(s.to_string())),
        }
    }
}

/// Render an optional reading for logs and the status line.
pub fn describe(reading: Option<Gesture>) -> &'static str {
    reading.map(|g| g.as_str()).unwrap_or("indeterminate")
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn parse_ignores_case_and_padding() {
        assert_eq!("ROCK".parse::<Gesture>(), Ok(Gesture::Rock));
        assert_eq!(" Paper ".parse::<Gesture>(), Ok(Gesture::Paper));
        assert_eq!("sCiSsOrS".parse::<Gesture>(), Ok(Gesture::Scissors));
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("lizard".parse::<Gesture>().is_err());
        assert!("".parse::<Gesture>().is_err());
    }

    #[test]
    fn beats_is_a_cycle() {
        for g in Gesture::ALL {
            assert_ne!(g.beats(), g);
            assert_eq!(g.beats().beats().beats(), g);
        }
    }

    #[test]
    fn random_covers_every_gesture() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = [false; 3];
        for _ in 0..200 {
            match Gesture::random(&mut rng) {
                Gesture::Rock     => seen[0] = true,
                Gesture::Paper    => seen[1] = true,
                Gesture::Scissors => seen[2] = true,
            }
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn describe_indeterminate() {
        assert_eq!(describe(None), "indeterminate");
        assert_eq!(describe(Some(Gesture::Paper)), "paper");
    }
}
