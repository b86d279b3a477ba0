//! Error types
//!
//! Storage and migration errors are recovered inside the tracker; only
//! `TrackerError` reaches the presentation layer, and its `Display` text is
//! the message shown to the user.

/// Failure reported by a key-value storage backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Failure while upgrading a persisted document to the current schema
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("document schema version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u64, supported: u64 },

    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejected user operation; nothing was mutated
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    #[error("You can register up to {max} accounts.")]
    AccountLimit { max: usize },

    #[error("No account is selected.")]
    NoActiveAccount,

    #[error("No challenge is selected.")]
    NoActiveChallenge,

    #[error("There is no {kind} at position {index}.")]
    IndexOutOfRange { kind: &'static str, index: usize },

    #[error("Please enter a whole number (got {0:?}).")]
    InvalidInput(String),

    #[error("The number of coins to exchange is not valid ({requested} requested, {available} available).")]
    InvalidExchangeAmount { requested: i64, available: u64 },
}

pub type Result<T, E = TrackerError> = std::result::Result<T, E>;
