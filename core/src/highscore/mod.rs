use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::*;
pub use storage::*;

mod storage;

/// Storage key holding the JSON array of [`HighScoreEntry`].
pub const HIGH_SCORES_KEY: &str = "memoryGameHighScores";

pub const MAX_NAME_CHARS: usize = 15;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u32,
    /// Whole seconds the round took.
    #[serde(rename = "time")]
    pub time_secs: u32,
    pub difficulty: Difficulty,
    pub date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultyFilter {
    All,
    Only(Difficulty),
}

impl DifficultyFilter {
    pub fn accepts(self, difficulty: Difficulty) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => only == difficulty,
        }
    }
}

impl From<Difficulty> for DifficultyFilter {
    fn from(difficulty: Difficulty) -> Self {
        Self::Only(difficulty)
    }
}

/// Current wall clock time, works on wasm too.
pub fn utc_now() -> DateTime<Utc> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |since| i64::try_from(since.as_millis()).unwrap_or(i64::MAX));
    DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_default()
}

/// Ranked high scores persisted in a [`KeyValueStore`].
#[derive(Clone, Debug)]
pub struct HighScoreStore<S> {
    storage: S,
    retention: usize,
    leaderboard_size: usize,
    clock: fn() -> DateTime<Utc>,
}

impl<S: KeyValueStore> HighScoreStore<S> {
    pub fn new(storage: S) -> Self {
        let config = GameConfig::default();
        Self::with_limits(storage, config.high_score_retention, config.leaderboard_size)
    }

    pub fn with_limits(storage: S, retention: usize, leaderboard_size: usize) -> Self {
        Self {
            storage,
            retention,
            leaderboard_size,
            clock: utc_now,
        }
    }

    pub fn with_clock(self, clock: fn() -> DateTime<Utc>) -> Self {
        Self { clock, ..self }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn leaderboard_size(&self) -> usize {
        self.leaderboard_size
    }

    /// Every persisted entry in stored order. Missing or unreadable data counts as no entries.
    pub fn list_all(&self) -> Vec<HighScoreEntry> {
        let Some(payload) = self.storage.get(HIGH_SCORES_KEY) else {
            return Vec::new();
        };

        serde_json::from_str(&payload).unwrap_or_else(|err| {
            log::warn!("Ignoring unreadable high scores: {}", err);
            Vec::new()
        })
    }

    /// Adds an entry stamped with the current time, keeps the best `retention` entries overall and persists them. On
    /// failure nothing is persisted and the previous list stays intact.
    pub fn record(
        &mut self,
        name: &str,
        score: u32,
        time_secs: u32,
        difficulty: Difficulty,
    ) -> core::result::Result<HighScoreEntry, StoreError> {
        let name = name.trim();
        let name_chars = name.chars().count();
        if name_chars == 0 || name_chars > MAX_NAME_CHARS {
            return Err(StoreError::InvalidName {
                max: MAX_NAME_CHARS,
            });
        }

        let entry = HighScoreEntry {
            name: name.to_string(),
            score,
            time_secs,
            difficulty,
            date: (self.clock)(),
        };

        let mut entries = self.list_all();
        entries.push(entry.clone());
        // stable, so earlier entries win ties
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(self.retention);

        let payload =
            serde_json::to_string(&entries).map_err(|err| StoreError::Serialize(err.to_string()))?;
        self.storage.set(HIGH_SCORES_KEY, &payload)?;

        log::debug!(
            "recorded {} points for {:?} on {}, {} entries kept",
            score,
            entry.name,
            difficulty,
            entries.len()
        );
        Ok(entry)
    }

    /// At most `limit` entries passing `filter`, best first.
    pub fn top_for(&self, filter: impl Into<DifficultyFilter>, limit: usize) -> Vec<HighScoreEntry> {
        let filter = filter.into();
        let mut entries: Vec<_> = self
            .list_all()
            .into_iter()
            .filter(|entry| filter.accepts(entry.difficulty))
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(limit);
        entries
    }

    pub fn leaderboard(&self, filter: impl Into<DifficultyFilter>) -> Vec<HighScoreEntry> {
        self.top_for(filter, self.leaderboard_size)
    }

    pub fn best_for(&self, difficulty: Difficulty) -> Option<u32> {
        self.top_for(difficulty, 1).first().map(|entry| entry.score)
    }

    /// Whether `score` would enter the leaderboard for `difficulty`.
    pub fn is_new_high_score(&self, score: u32, difficulty: Difficulty) -> bool {
        let ranked = self.leaderboard(difficulty);
        match ranked.get(self.leaderboard_size.saturating_sub(1)) {
            Some(last) if ranked.len() >= self.leaderboard_size => score > last.score,
            _ => true,
        }
    }
}
