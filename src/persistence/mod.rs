//! Document persistence
//!
//! Features:
//! - Versioned JSON document under a single storage key
//! - Step-wise schema migration on load
//! - Corruption recovery (unreadable data loads as an empty document)
//!
//! Write failures are logged and swallowed; the in-memory document stays
//! authoritative until the next successful save.

pub mod migration;
pub mod storage;

pub use migration::{decode, migrate, schema_version};
pub use storage::{KeyValueStore, MemoryStore};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;

use crate::error::MigrationError;
use crate::model::AppData;

/// Where a loaded document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Stored document already at the current schema
    Stored,
    /// Stored document upgraded from an older schema
    Migrated { from: u64 },
    /// Nothing usable was stored
    Fresh,
    /// Stored document was written by a newer build; left as is
    Unsupported { found: u64 },
}

impl LoadSource {
    /// Whether the loaded document differs from what is stored
    pub fn needs_save(&self) -> bool {
        matches!(self, LoadSource::Migrated { .. } | LoadSource::Fresh)
    }
}

/// Load the document, falling back to an empty one on any failure
pub fn load_document(store: &dyn KeyValueStore, key: &str) -> (AppData, LoadSource) {
    let text = match store.get(key) {
        Ok(Some(text)) => text,
        Ok(None) => {
            log::info!("No saved data found, starting fresh");
            return (AppData::new(), LoadSource::Fresh);
        }
        Err(e) => {
            log::error!("Failed to read saved data: {}", e);
            return (AppData::new(), LoadSource::Fresh);
        }
    };

    let doc: serde_json::Value = match serde_json::from_str(&text) {
        Ok(doc) => doc,
        Err(e) => {
            log::warn!("Saved data is not valid JSON ({}), starting fresh", e);
            return (AppData::new(), LoadSource::Fresh);
        }
    };

    let from = schema_version(&doc);
    match decode(doc) {
        Ok(data) => {
            log::info!("Loaded {} accounts", data.accounts.len());
            let source = if from < data.schema_version {
                log::info!("Migrated saved data from schema v{}", from);
                LoadSource::Migrated { from }
            } else {
                LoadSource::Stored
            };
            (data, source)
        }
        Err(MigrationError::UnsupportedVersion { found, supported }) => {
            log::warn!(
                "Saved data uses schema v{} (this build reads up to v{}), starting empty without overwriting it",
                found,
                supported
            );
            (AppData::new(), LoadSource::Unsupported { found })
        }
        Err(e) => {
            log::warn!("Saved data is unusable ({}), starting fresh", e);
            (AppData::new(), LoadSource::Fresh)
        }
    }
}

/// Serialize and store the document; failures are logged only
pub fn save_document(store: &mut dyn KeyValueStore, key: &str, data: &AppData) {
    let json = match serde_json::to_string(data) {
        Ok(json) => json,
        Err(e) => {
            log::error!("Failed to serialize data: {}", e);
            return;
        }
    };

    match store.set(key, &json) {
        Ok(()) => log::debug!("Data saved ({} accounts)", data.accounts.len()),
        Err(e) => log::error!("Failed to save data: {}", e),
    }
}

/// Delete the stored document; failures are logged only
pub fn clear_document(store: &mut dyn KeyValueStore, key: &str) {
    match store.remove(key) {
        Ok(()) => log::info!("Saved data cleared"),
        Err(e) => log::error!("Failed to clear saved data: {}", e),
    }
}
