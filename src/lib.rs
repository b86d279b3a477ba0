//! Challenge Coin - a household reward coin tracker
//!
//! Core modules:
//! - `model`: Accounts, challenges, history and the coin ledger
//! - `persistence`: Versioned document storage and schema migration
//! - `view`: Selection state and presentation snapshots
//! - `tracker`: Coordinator that applies operations and persists them
//! - `platform`: Browser/native abstraction (clock, JS bindings)

pub mod error;
pub mod history;
pub mod model;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod tracker;
pub mod view;

pub use error::{MigrationError, StorageError, TrackerError};
pub use settings::Settings;
pub use tracker::Tracker;
pub use view::{Snapshot, ViewState};

/// Tracker constants
pub mod consts {
    /// Maximum number of accounts
    pub const MAX_ACCOUNTS: usize = 3;

    /// Storage key for the account document
    pub const STORAGE_KEY: &str = "challengeCoinData";
    /// Storage key for settings
    pub const SETTINGS_KEY: &str = "challengeCoinSettings";

    /// Schema version written by this build
    pub const CURRENT_SCHEMA_VERSION: u64 = 2;

    /// Per-coin reward used when a value is missing or invalid
    pub const DEFAULT_CHALLENGE_VALUE: u32 = 10;
    /// Challenge created to hold a pre-challenge account balance
    pub const LEGACY_CHALLENGE_NAME: &str = "Chores";

    /// Largest coin or reward count kept from a stored document
    /// (the largest integer a JS number holds exactly)
    pub const MAX_COUNT: i64 = 9_007_199_254_740_991;

    /// Colour tag for accounts without one
    pub const DEFAULT_COLOR: &str = "pink";
}
