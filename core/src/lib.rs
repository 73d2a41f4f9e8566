use serde::{Deserialize, Serialize};

pub use card::*;
pub use deck::*;
pub use error::*;
pub use game::*;
pub use highscore::*;
pub use scoring::*;
pub use timer::*;
pub use types::*;

mod card;
mod deck;
mod error;
mod game;
mod highscore;
mod scoring;
mod timer;
mod types;

/// Timing and retention knobs for a [`Game`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Value the countdown starts from before a round begins.
    pub countdown_from: u8,
    pub countdown_tick_ms: u32,
    pub elapsed_tick_ms: u32,
    /// How long both faces of a turn stay visible before they are compared.
    pub resolution_delay_ms: u32,
    /// How many entries survive in the persisted high-score list overall.
    pub high_score_retention: usize,
    /// How many entries a leaderboard shows, also the rank a score must beat.
    pub leaderboard_size: usize,
}

impl GameConfig {
    pub const fn new_unchecked(
        countdown_from: u8,
        countdown_tick_ms: u32,
        elapsed_tick_ms: u32,
        resolution_delay_ms: u32,
        high_score_retention: usize,
        leaderboard_size: usize,
    ) -> Self {
        Self {
            countdown_from,
            countdown_tick_ms,
            elapsed_tick_ms,
            resolution_delay_ms,
            high_score_retention,
            leaderboard_size,
        }
    }

    /// Clamps every interval and limit to something a scheduler can honor.
    pub fn sanitized(self) -> Self {
        let leaderboard_size = self.leaderboard_size.max(1);
        Self::new_unchecked(
            self.countdown_from,
            self.countdown_tick_ms.max(1),
            self.elapsed_tick_ms.max(1),
            self.resolution_delay_ms,
            self.high_score_retention.max(leaderboard_size),
            leaderboard_size,
        )
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new_unchecked(3, 1000, 100, 1000, 25, 5)
    }
}
