use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::GameError;

/// Card identifier, unique within a deck.
pub type CardId = u16;

/// Grid edge length.
pub type Edge = u8;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// The difficulty with the most pairs, anything a catalog supports must cover this one.
    pub const HARDEST: Self = Self::Hard;

    pub const fn grid_size(self) -> Edge {
        use Difficulty::*;
        match self {
            Easy => 4,
            Medium => 6,
            Hard => 8,
        }
    }

    pub const fn card_count(self) -> usize {
        let edge = self.grid_size() as usize;
        edge * edge
    }

    pub const fn pair_count(self) -> usize {
        self.card_count() / 2
    }

    pub const fn name(self) -> &'static str {
        use Difficulty::*;
        match self {
            Easy => "easy",
            Medium => "medium",
            Hard => "hard",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Easy
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(GameError::UnknownDifficulty)
    }
}

/// Formats whole seconds as `MM:SS`, minutes keep growing past 99.
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
