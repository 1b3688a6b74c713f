//! Session configuration: difficulty preference and playback timing.

use crate::error::{Error, Result};

const COOKIE_KEY: &str = "difficulty=";

/// Persisted difficulty preference. The stored value is the index (0, 1, 2).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Pattern length that wins the game.
    pub fn levels(self) -> usize {
        match self {
            Difficulty::Easy => 8,
            Difficulty::Medium => 16,
            Difficulty::Hard => 32,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }

    pub fn from_index(index: u8) -> Result<Self> {
        match index {
            0 => Ok(Difficulty::Easy),
            1 => Ok(Difficulty::Medium),
            2 => Ok(Difficulty::Hard),
            other => Err(Error::InvalidDifficulty(other.to_string())),
        }
    }

    /// Finds the first `difficulty=` followed by a 0, 1 or 2 anywhere in a `document.cookie`
    /// string; only that digit counts. Anything else falls back to `Easy`.
    pub fn from_cookie(cookie: &str) -> Self {
        cookie
            .match_indices(COOKIE_KEY)
            .find_map(|(at, key)| {
                let digit = cookie[at + key.len()..].chars().next()?.to_digit(10)?;
                Difficulty::from_index(u8::try_from(digit).ok()?).ok()
            })
            .unwrap_or_default()
    }

    /// Cookie assignment persisting this preference for roughly a year.
    pub fn to_cookie(self) -> String {
        format!("{COOKIE_KEY}{}; path=/; max-age=31536000; SameSite=Lax", self.index())
    }
}

/// Delays driving playback, all in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timing {
    /// Pause before the first note of each round and before the win tune.
    pub lead_in: u32,
    pub step: u32,
    pub hold: u32,
    pub win_step: u32,
    pub win_hold: u32,
    /// From the end of the win tune back to idle.
    pub win_outro: u32,
    /// From a wrong note back to idle.
    pub fail_reset: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            lead_in: 1000,
            step: 750,
            hold: 500,
            win_step: 250,
            win_hold: 200,
            win_outro: 500,
            fail_reset: 1000,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    pub difficulty: Difficulty,
    pub timing: Timing,
}

impl GameConfig {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            timing: Timing::default(),
        }
    }

    pub fn levels(&self) -> usize {
        self.difficulty.levels()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_selects_levels() {
        assert_eq!(Difficulty::from_cookie("").levels(), 8);
        assert_eq!(Difficulty::from_cookie("difficulty=1").levels(), 16);
        assert_eq!(Difficulty::from_cookie("theme=dark; difficulty=2").levels(), 32);
    }

    #[test]
    fn malformed_cookie_falls_back_to_easy() {
        assert_eq!(Difficulty::from_cookie("difficulty=7"), Difficulty::Easy);
        assert_eq!(Difficulty::from_cookie("difficulty=hard"), Difficulty::Easy);
        assert_eq!(Difficulty::from_cookie("difficulty="), Difficulty::Easy);
    }

    #[test]
    fn cookie_round_trip() {
        for d in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let cookie = d.to_cookie();
            let assignment = cookie.split(';').next().unwrap();
            assert_eq!(Difficulty::from_cookie(assignment), d);
        }
    }

    #[test]
    fn cookie_value_is_its_first_digit() {
        assert_eq!(Difficulty::from_cookie("difficulty=12"), Difficulty::Medium);
        assert_eq!(Difficulty::from_cookie("difficulty=2x"), Difficulty::Hard);
        assert_eq!(
            Difficulty::from_cookie("difficulty=9; difficulty=1"),
            Difficulty::Medium
        );
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        assert!(matches!(
            Difficulty::from_index(3),
            Err(Error::InvalidDifficulty(_))
        ));
    }
}
