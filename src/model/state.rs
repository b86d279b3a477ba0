//! Persisted domain types
//!
//! Everything stored under the tracker's storage key lives here. Field names
//! are serialized in camelCase so documents written by earlier versions of the
//! app deserialize unchanged once migrated.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Kind of a history record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    /// Coins converted into a reward
    Exchange,
    /// Balances wiped (only present in documents from older versions)
    Reset,
}

impl HistoryKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "exchange" => Some(HistoryKind::Exchange),
            "reset" => Some(HistoryKind::Reset),
            _ => None,
        }
    }
}

/// A single immutable history record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    /// Coins involved
    pub coins: u64,
    /// Reward paid out (currency units)
    pub reward: u64,
    /// Name of the challenge at the time of the exchange
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_name: Option<String>,
    /// Unix timestamp (ms)
    pub timestamp: i64,
}

/// A task type with its own coin balance and per-coin reward
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub name: String,
    /// Reward per coin, always >= 1
    pub value: u32,
    /// Unexchanged balance
    pub coins: u64,
    /// Lifetime counter. Exchanges leave it alone; `remove_coin` decrements it,
    /// so it can drop below `coins` and even below zero.
    pub total_coins: i64,
}

impl Challenge {
    /// Fresh challenge named after its 1-based position
    pub fn new(position: usize, value: u32) -> Self {
        Self::named(default_challenge_name(position), value)
    }

    pub fn named(name: impl Into<String>, value: u32) -> Self {
        Self {
            name: name.into(),
            value: value.max(1),
            coins: 0,
            total_coins: 0,
        }
    }
}

/// A tracked person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    /// Display tag chosen in the colour picker
    pub color: String,
    pub challenges: Vec<Challenge>,
    /// Append-only log, oldest first
    pub history: Vec<HistoryEntry>,
}

impl Account {
    /// Empty account named after its 1-based position
    pub fn new(position: usize) -> Self {
        Self {
            name: default_account_name(position),
            color: DEFAULT_COLOR.to_string(),
            challenges: Vec::new(),
            history: Vec::new(),
        }
    }
}

/// Root of the persisted document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub schema_version: u64,
    pub accounts: Vec<Account>,
}

impl Default for AppData {
    fn default() -> Self {
        Self::new()
    }
}

impl AppData {
    /// Empty document at the current schema version
    pub fn new() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            accounts: Vec::new(),
        }
    }
}

pub fn default_account_name(position: usize) -> String {
    format!("Account {}", position)
}

pub fn default_challenge_name(position: usize) -> String {
    format!("Challenge {}", position)
}

/// Trimmed name, or `fallback` when the input is blank
pub fn sanitize_name(input: &str, fallback: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Per-coin reward from user input; anything missing or below 1 becomes the default
pub fn validate_challenge_value(value: Option<i64>) -> u32 {
    match value {
        Some(v) if v >= 1 => u32::try_from(v).unwrap_or(u32::MAX),
        _ => DEFAULT_CHALLENGE_VALUE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name_falls_back_on_blank() {
        assert_eq!(sanitize_name("  Mika ", "Account 1"), "Mika");
        assert_eq!(sanitize_name("   ", "Account 2"), "Account 2");
        assert_eq!(sanitize_name("", "Challenge 3"), "Challenge 3");
    }

    #[test]
    fn test_validate_challenge_value() {
        assert_eq!(validate_challenge_value(Some(25)), 25);
        assert_eq!(validate_challenge_value(Some(1)), 1);
        assert_eq!(validate_challenge_value(Some(0)), DEFAULT_CHALLENGE_VALUE);
        assert_eq!(validate_challenge_value(Some(-4)), DEFAULT_CHALLENGE_VALUE);
        assert_eq!(validate_challenge_value(None), DEFAULT_CHALLENGE_VALUE);
    }

    #[test]
    fn test_document_uses_camel_case_keys() {
        let mut data = AppData::new();
        let mut account = Account::new(1);
        account.challenges.push(Challenge::new(1, 10));
        account.history.push(HistoryEntry {
            kind: HistoryKind::Exchange,
            coins: 2,
            reward: 20,
            challenge_name: Some("Challenge 1".into()),
            timestamp: 1_700_000_000_000,
        });
        data.accounts.push(account);

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["schemaVersion"], CURRENT_SCHEMA_VERSION);
        let account = &json["accounts"][0];
        assert_eq!(account["color"], DEFAULT_COLOR);
        assert_eq!(account["challenges"][0]["totalCoins"], 0);
        assert_eq!(account["history"][0]["type"], "exchange");
        assert_eq!(account["history"][0]["challengeName"], "Challenge 1");
    }

    #[test]
    fn test_history_kind_names() {
        assert_eq!(HistoryKind::from_str("reset"), Some(HistoryKind::Reset));
        assert_eq!(HistoryKind::from_str("bonus"), None);
    }
}
