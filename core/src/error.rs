use thiserror::Error;

/// Configuration defects detected while setting up a game. These indicate a packaging problem and are expected to be
/// fatal at startup.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Symbol catalog has {available} symbols but {required} are required")]
    CatalogTooSmall { required: usize, available: usize },
    #[error("Symbol catalog repeats a symbol at index {index}")]
    DuplicateSymbol { index: usize },
    #[error("Unknown difficulty")]
    UnknownDifficulty,
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Failure reported by a persistence backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage quota exceeded")]
    QuotaExceeded,
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Non-fatal failure while recording a high score, the game carries on without it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Player name must be 1 to {max} characters")]
    InvalidName { max: usize },
    #[error("Could not serialize high scores: {0}")]
    Serialize(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
