//! Domain model
//!
//! Accounts own challenges and history. This module is free of storage,
//! rendering and clock dependencies:
//! - Timestamps are passed in by the caller
//! - Selection lives in `view`, not here

pub mod ledger;
pub mod state;

pub use ledger::{ExchangeReceipt, parse_exchange_amount};
pub use state::{
    Account, AppData, Challenge, HistoryEntry, HistoryKind, default_account_name,
    default_challenge_name, sanitize_name, validate_challenge_value,
};
