use crate::utils::*;
use quiet_recall_core::Difficulty;
use serde::{Deserialize, Serialize};

/// Preferences remembered between visits.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Settings {
    pub difficulty: Difficulty,
}

impl StorageKey for Settings {
    const KEY: &'static str = "quiet-recall:settings";
}
