//! Tracker settings
//!
//! Persisted separately from the account document.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::KeyValueStore;

/// Tracker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Maximum number of accounts
    pub max_accounts: usize,
    /// Key the account document is stored under
    pub storage_key: String,
    /// Per-coin reward for newly added challenges
    pub default_challenge_value: u32,
    /// Appended to reward amounts in messages
    pub currency_suffix: String,
    /// How long the celebration overlay stays up (ms)
    pub celebration_ms: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_accounts: MAX_ACCOUNTS,
            storage_key: STORAGE_KEY.to_string(),
            default_challenge_value: DEFAULT_CHALLENGE_VALUE,
            currency_suffix: "¥".to_string(),
            celebration_ms: 3000,
        }
    }
}

impl Settings {
    /// Clamp values that would break the tracker
    pub fn sanitized(mut self) -> Self {
        self.max_accounts = self.max_accounts.max(1);
        self.default_challenge_value = self.default_challenge_value.max(1);
        if self.storage_key.trim().is_empty() {
            self.storage_key = STORAGE_KEY.to_string();
        }
        self
    }

    /// Format a reward amount with the currency suffix
    pub fn format_reward(&self, reward: u64) -> String {
        format!("{}{}", reward, self.currency_suffix)
    }

    /// Load settings, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(SETTINGS_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings.sanitized();
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::error!("Failed to read settings: {}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings; failures are logged only
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => match store.set(SETTINGS_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::error!("Failed to save settings: {}", e),
            },
            Err(e) => log::error!("Failed to serialize settings: {}", e),
        }
    }
}
