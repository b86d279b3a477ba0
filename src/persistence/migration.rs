//! Schema migration
//!
//! Documents are upgraded as raw JSON, one version step at a time, then
//! normalized. Every step is a pure function of the document so older shapes
//! can be tested in isolation.
//!
//! Versions:
//! - 0: unversioned. Accounts may carry a single legacy `coins` balance and
//!   may lack `challenges`/`history`.
//! - 1: balances live on challenges only.
//! - 2: accounts carry a `color` tag.

use serde_json::{Map, Value, json};

use crate::consts::*;
use crate::error::MigrationError;
use crate::model::{AppData, HistoryKind, default_account_name, default_challenge_name};

type Upgrade = fn(&mut Value) -> Result<(), MigrationError>;

/// Upgrade steps, indexed by the version they upgrade from
const UPGRADES: [Upgrade; CURRENT_SCHEMA_VERSION as usize] = [upgrade_v0_to_v1, upgrade_v1_to_v2];

/// Version stamped on a document (0 when absent)
pub fn schema_version(doc: &Value) -> u64 {
    doc.get("schemaVersion").and_then(Value::as_u64).unwrap_or(0)
}

/// Bring a document of any supported version up to the current schema.
///
/// Idempotent: migrating an already-migrated document returns it unchanged.
pub fn migrate(mut doc: Value) -> Result<Value, MigrationError> {
    let version = schema_version(&doc);
    if version > CURRENT_SCHEMA_VERSION {
        return Err(MigrationError::UnsupportedVersion {
            found: version,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }

    // Validates the outer shape before any step touches it
    accounts_mut(&mut doc)?;

    for step in &UPGRADES[version as usize..] {
        step(&mut doc)?;
    }
    normalize(&mut doc)?;

    if let Some(root) = doc.as_object_mut() {
        root.insert("schemaVersion".into(), json!(CURRENT_SCHEMA_VERSION));
    }
    Ok(doc)
}

/// Migrate and deserialize into the typed model
pub fn decode(doc: Value) -> Result<AppData, MigrationError> {
    let migrated = migrate(doc)?;
    Ok(serde_json::from_value(migrated)?)
}

fn accounts_mut(doc: &mut Value) -> Result<&mut Vec<Value>, MigrationError> {
    let root = doc
        .as_object_mut()
        .ok_or_else(|| MigrationError::Malformed("document is not an object".into()))?;
    root.get_mut("accounts")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| MigrationError::Malformed("`accounts` is missing or not an array".into()))
}

fn account_objects(doc: &mut Value) -> Result<Vec<&mut Map<String, Value>>, MigrationError> {
    accounts_mut(doc)?
        .iter_mut()
        .enumerate()
        .map(|(i, account)| {
            account
                .as_object_mut()
                .ok_or_else(|| MigrationError::Malformed(format!("account {} is not an object", i)))
        })
        .collect()
}

fn ensure_array(object: &mut Map<String, Value>, key: &str) {
    if !object.get(key).is_some_and(Value::is_array) {
        object.insert(key.into(), Value::Array(Vec::new()));
    }
}

/// v0 -> v1: move the per-account legacy balance onto a challenge
fn upgrade_v0_to_v1(doc: &mut Value) -> Result<(), MigrationError> {
    for account in account_objects(doc)? {
        ensure_array(account, "challenges");
        ensure_array(account, "history");

        let Some(legacy) = account.remove("coins") else {
            continue;
        };
        if !legacy.is_number() {
            continue;
        }

        if let Some(challenges) = account.get_mut("challenges").and_then(Value::as_array_mut) {
            if challenges.is_empty() {
                challenges.push(json!({
                    "name": LEGACY_CHALLENGE_NAME,
                    "value": DEFAULT_CHALLENGE_VALUE,
                    "coins": 0,
                    "totalCoins": 0,
                }));
            }
            match challenges.first_mut().and_then(Value::as_object_mut) {
                Some(first) => {
                    first.insert("coins".into(), legacy);
                }
                None => log::warn!("Discarding legacy balance {}: first challenge is unreadable", legacy),
            }
        }
    }
    Ok(())
}

/// v1 -> v2: accounts gain a colour tag
fn upgrade_v1_to_v2(doc: &mut Value) -> Result<(), MigrationError> {
    for account in account_objects(doc)? {
        if !account.get("color").is_some_and(Value::is_string) {
            account.insert("color".into(), json!(DEFAULT_COLOR));
        }
    }
    Ok(())
}

fn is_blank_or_missing(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .is_none_or(|s| s.trim().is_empty())
}

/// Finite number truncated toward zero
fn whole_number(value: Option<&Value>) -> Option<f64> {
    value
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
        .map(f64::trunc)
}

/// Counter clamped to `[-MAX_COUNT, MAX_COUNT]`
fn counter(value: Option<&Value>) -> i64 {
    let max = MAX_COUNT as f64;
    whole_number(value).map(|n| n.clamp(-max, max) as i64).unwrap_or(0)
}

fn non_negative(value: Option<&Value>) -> u64 {
    counter(value).max(0) as u64
}

/// Field-level repair applied at every version
fn normalize(doc: &mut Value) -> Result<(), MigrationError> {
    for (i, account) in account_objects(doc)?.into_iter().enumerate() {
        if is_blank_or_missing(account.get("name")) {
            account.insert("name".into(), json!(default_account_name(i + 1)));
        }
        if !account.get("color").is_some_and(Value::is_string) {
            account.insert("color".into(), json!(DEFAULT_COLOR));
        }
        ensure_array(account, "challenges");
        ensure_array(account, "history");

        if let Some(challenges) = account.get_mut("challenges").and_then(Value::as_array_mut) {
            let before = challenges.len();
            challenges.retain(Value::is_object);
            if challenges.len() != before {
                log::warn!("Dropped {} unreadable challenges from account {}", before - challenges.len(), i + 1);
            }
            for (j, challenge) in challenges.iter_mut().enumerate() {
                if let Some(challenge) = challenge.as_object_mut() {
                    normalize_challenge(challenge, j + 1);
                }
            }
        }

        if let Some(history) = account.get_mut("history").and_then(Value::as_array_mut) {
            let before = history.len();
            history.retain(|entry| {
                entry
                    .get("type")
                    .and_then(Value::as_str)
                    .and_then(HistoryKind::from_str)
                    .is_some()
            });
            if history.len() != before {
                log::warn!("Dropped {} unreadable history entries from account {}", before - history.len(), i + 1);
            }
            for entry in history.iter_mut() {
                if let Some(entry) = entry.as_object_mut() {
                    normalize_history_entry(entry);
                }
            }
        }
    }
    Ok(())
}

fn normalize_challenge(challenge: &mut Map<String, Value>, position: usize) {
    if is_blank_or_missing(challenge.get("name")) {
        challenge.insert("name".into(), json!(default_challenge_name(position)));
    }

    let value = whole_number(challenge.get("value"))
        .filter(|v| *v >= 1.0)
        .map(|v| v.min(f64::from(u32::MAX)) as u32)
        .unwrap_or(DEFAULT_CHALLENGE_VALUE);
    challenge.insert("value".into(), json!(value));

    let coins = non_negative(challenge.get("coins"));
    challenge.insert("coins".into(), json!(coins));

    let total = counter(challenge.get("totalCoins"));
    challenge.insert("totalCoins".into(), json!(total));
}

fn normalize_history_entry(entry: &mut Map<String, Value>) {
    let coins = non_negative(entry.get("coins"));
    entry.insert("coins".into(), json!(coins));

    let reward = non_negative(entry.get("reward"));
    entry.insert("reward".into(), json!(reward));

    let timestamp = whole_number(entry.get("timestamp"))
        .map(|n| n as i64)
        .unwrap_or(0);
    entry.insert("timestamp".into(), json!(timestamp));

    if !entry.get("challengeName").is_none_or(Value::is_string) {
        entry.remove("challengeName");
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{Map, Value, json};

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            (-50i64..500).prop_map(Value::from),
            (-50.0f64..500.0).prop_map(Value::from),
            "[a-z ]{0,6}".prop_map(Value::from),
        ]
    }

    fn put(object: &mut Map<String, Value>, key: &str, value: Option<Value>) {
        if let Some(value) = value {
            object.insert(key.into(), value);
        }
    }

    fn challenge() -> impl Strategy<Value = Value> {
        (
            prop::option::of(leaf()),
            prop::option::of(leaf()),
            prop::option::of(leaf()),
            prop::option::of(leaf()),
        )
            .prop_map(|(name, value, coins, total)| {
                let mut object = Map::new();
                put(&mut object, "name", name);
                put(&mut object, "value", value);
                put(&mut object, "coins", coins);
                put(&mut object, "totalCoins", total);
                Value::Object(object)
            })
    }

    fn history_entry() -> impl Strategy<Value = Value> {
        (
            prop_oneof![Just("exchange"), Just("reset"), Just("other")],
            prop::option::of(leaf()),
            prop::option::of(leaf()),
            prop::option::of(leaf()),
        )
            .prop_map(|(kind, coins, reward, name)| {
                let mut object = Map::new();
                object.insert("type".into(), json!(kind));
                put(&mut object, "coins", coins);
                put(&mut object, "reward", reward);
                put(&mut object, "challengeName", name);
                put(&mut object, "timestamp", Some(json!(1_700_000_000_000i64)));
                Value::Object(object)
            })
    }

    fn account() -> impl Strategy<Value = Value> {
        (
            prop::option::of(leaf()),
            prop::option::of(leaf()),
            prop::option::of(leaf()),
            prop::option::of(prop::collection::vec(challenge(), 0..4)),
            prop::option::of(prop::collection::vec(history_entry(), 0..4)),
        )
            .prop_map(|(name, color, coins, challenges, history)| {
                let mut object = Map::new();
                put(&mut object, "name", name);
                put(&mut object, "color", color);
                put(&mut object, "coins", coins);
                put(&mut object, "challenges", challenges.map(Value::Array));
                put(&mut object, "history", history.map(Value::Array));
                Value::Object(object)
            })
    }

    fn document() -> impl Strategy<Value = Value> {
        (
            prop::option::of(0u64..=CURRENT_SCHEMA_VERSION),
            prop::collection::vec(account(), 0..4),
        )
            .prop_map(|(version, accounts)| {
                let mut object = Map::new();
                put(&mut object, "schemaVersion", version.map(Value::from));
                object.insert("accounts".into(), Value::Array(accounts));
                Value::Object(object)
            })
    }

    proptest! {
        #[test]
        fn migration_is_idempotent(doc in document()) {
            let once = migrate(doc).unwrap();
            let twice = migrate(once.clone()).unwrap();
            prop_assert_eq!(&twice, &once);
        }

        #[test]
        fn migrated_documents_always_decode(doc in document()) {
            let data = decode(doc).unwrap();
            for account in &data.accounts {
                prop_assert!(!account.name.trim().is_empty());
                for challenge in &account.challenges {
                    prop_assert!(challenge.value >= 1);
                    prop_assert!(!challenge.name.trim().is_empty());
                }
            }
        }

        #[test]
        fn legacy_balance_lands_on_single_challenge(coins in 0u64..10_000) {
            let doc = json!({ "accounts": [ { "name": "Kid", "coins": coins } ] });
            let migrated = migrate(doc).unwrap();
            prop_assert!(migrated["accounts"][0].get("coins").is_none());
            let data = decode(migrated).unwrap();
            prop_assert_eq!(data.accounts[0].challenges.len(), 1);
            prop_assert_eq!(data.accounts[0].challenges[0].coins, coins);
        }
    }
}
