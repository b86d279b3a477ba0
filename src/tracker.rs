//! Tracker: owns the document, the selection and the store
//!
//! Every mutating operation validates first, mutates in place, then flushes
//! the whole document to storage before returning. Rejected operations leave
//! both the document and the store untouched.

use crate::consts::DEFAULT_COLOR;
use crate::error::{Result, TrackerError};
use crate::history::YearMonth;
use crate::model::{
    Account, AppData, Challenge, ExchangeReceipt, default_account_name, default_challenge_name,
    parse_exchange_amount, sanitize_name, validate_challenge_value,
};
use crate::persistence::{self, KeyValueStore};
use crate::platform::time;
use crate::settings::Settings;
use crate::view::{Snapshot, ViewState};

/// Coin tracker session
pub struct Tracker {
    data: AppData,
    view: ViewState,
    settings: Settings,
    store: Box<dyn KeyValueStore>,
    /// Local zone offset used for history dates (minutes east of UTC)
    offset_minutes: i32,
    clock: fn() -> i64,
}

impl Tracker {
    /// Load settings and the document from `store`
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let settings = Settings::load(store.as_ref());
        Self::with_settings(store, settings)
    }

    /// Load the document using explicit settings
    pub fn with_settings(store: Box<dyn KeyValueStore>, settings: Settings) -> Self {
        let mut tracker = Self {
            data: AppData::new(),
            view: ViewState::default(),
            settings: settings.sanitized(),
            store,
            offset_minutes: time::local_offset_minutes(),
            clock: time::now_ms,
        };
        tracker.reload();
        tracker
    }

    /// Replace the wall clock (history timestamps)
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Set the zone used to date history entries
    pub fn with_offset_minutes(mut self, offset_minutes: i32) -> Self {
        self.offset_minutes = offset_minutes;
        self
    }

    fn reload(&mut self) {
        let (data, source) =
            persistence::load_document(self.store.as_ref(), &self.settings.storage_key);
        self.data = data;
        self.view = ViewState::initial(&self.data);
        if source.needs_save() {
            self.persist();
        }
    }

    fn persist(&mut self) {
        persistence::save_document(self.store.as_mut(), &self.settings.storage_key, &self.data);
    }

    pub fn data(&self) -> &AppData {
        &self.data
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Replace and persist the settings. A new storage key reloads the
    /// document from that key.
    pub fn update_settings(&mut self, settings: Settings) {
        let settings = settings.sanitized();
        settings.save(self.store.as_mut());
        let key_changed = settings.storage_key != self.settings.storage_key;
        self.settings = settings;
        if key_changed {
            self.reload();
        }
    }

    /// View model for the presentation layer
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::build(&self.data, &self.view, &self.settings, self.offset_minutes)
    }

    fn account_mut(&mut self, index: usize) -> Result<&mut Account> {
        self.data
            .accounts
            .get_mut(index)
            .ok_or(TrackerError::IndexOutOfRange {
                kind: "account",
                index,
            })
    }

    fn current_index(&self) -> Result<usize> {
        self.view
            .account
            .filter(|&i| i < self.data.accounts.len())
            .ok_or(TrackerError::NoActiveAccount)
    }

    // === Accounts ===

    /// Append an account; rejected once the limit is reached
    pub fn add_account(&mut self) -> Result<usize> {
        let max = self.settings.max_accounts;
        if self.data.accounts.len() >= max {
            return Err(TrackerError::AccountLimit { max });
        }
        let index = self.data.accounts.len();
        self.data.accounts.push(Account::new(index + 1));
        self.view.revalidate(&self.data);
        self.persist();
        log::info!("Account {} added", index + 1);
        Ok(index)
    }

    /// Remove an account with its challenges and history
    pub fn delete_account(&mut self, index: usize) -> Result<Account> {
        self.account_mut(index)?;
        let removed = self.data.accounts.remove(index);
        self.view.account_deleted(index);
        self.view.revalidate(&self.data);
        self.persist();
        log::info!("Account {:?} deleted", removed.name);
        Ok(removed)
    }

    /// Rename an account; blank names fall back to "Account N"
    pub fn rename_account(&mut self, index: usize, name: &str) -> Result<()> {
        let fallback = default_account_name(index + 1);
        self.account_mut(index)?.name = sanitize_name(name, &fallback);
        self.persist();
        Ok(())
    }

    pub fn set_account_color(&mut self, index: usize, color: &str) -> Result<()> {
        self.account_mut(index)?.color = sanitize_name(color, DEFAULT_COLOR);
        self.persist();
        Ok(())
    }

    /// Zero the account's balances and erase its history
    pub fn reset_account(&mut self, index: usize) -> Result<()> {
        self.account_mut(index)?.reset();
        self.persist();
        log::info!("Account {} reset", index + 1);
        Ok(())
    }

    /// Erase the stored document and start over
    pub fn reset_all(&mut self) {
        persistence::clear_document(self.store.as_mut(), &self.settings.storage_key);
        self.reload();
        log::info!("All data reset");
    }

    // === Challenges (current account) ===

    /// Append a challenge to the current account
    pub fn add_challenge(&mut self) -> Result<usize> {
        let account_index = self.current_index()?;
        let value = self.settings.default_challenge_value;
        let challenges = &mut self.data.accounts[account_index].challenges;
        let index = challenges.len();
        challenges.push(Challenge::new(index + 1, value));
        self.view.revalidate(&self.data);
        self.persist();
        Ok(index)
    }

    pub fn delete_challenge(&mut self, index: usize) -> Result<Challenge> {
        let account_index = self.current_index()?;
        let challenges = &mut self.data.accounts[account_index].challenges;
        if index >= challenges.len() {
            return Err(TrackerError::IndexOutOfRange {
                kind: "challenge",
                index,
            });
        }
        let removed = challenges.remove(index);
        let remaining = challenges.len();
        self.view.challenge_deleted(remaining);
        self.view.revalidate(&self.data);
        self.persist();
        log::info!("Challenge {:?} deleted", removed.name);
        Ok(removed)
    }

    /// Rename and re-price a challenge. Blank names fall back to "Challenge N";
    /// missing or sub-1 values become the default rate.
    pub fn update_challenge(&mut self, index: usize, name: &str, value: Option<i64>) -> Result<()> {
        let account_index = self.current_index()?;
        let challenge = self.data.accounts[account_index]
            .challenges
            .get_mut(index)
            .ok_or(TrackerError::IndexOutOfRange {
                kind: "challenge",
                index,
            })?;
        challenge.name = sanitize_name(name, &default_challenge_name(index + 1));
        challenge.value = validate_challenge_value(value);
        self.persist();
        Ok(())
    }

    // === Navigation ===

    pub fn open_account(&mut self, index: usize) -> Result<()> {
        self.view.open_account(&self.data, index)
    }

    pub fn select_challenge(&mut self, index: usize) -> Result<()> {
        self.view.select_challenge(&self.data, index)
    }

    pub fn back_to_list(&mut self) {
        self.view.back_to_list();
    }

    pub fn set_month_filter(&mut self, month: Option<YearMonth>) {
        self.view.month = month;
    }

    // === Coins (current challenge) ===

    fn current_challenge_mut(&mut self) -> Option<&mut Challenge> {
        let account = self.view.account?;
        let challenge = self.view.challenge?;
        self.data.accounts.get_mut(account)?.challenges.get_mut(challenge)
    }

    /// Earn a coin on the active challenge. Returns the new balance, or None
    /// when no challenge is active.
    pub fn add_coin(&mut self) -> Option<u64> {
        let challenge = self.current_challenge_mut()?;
        challenge.add_coin();
        let coins = challenge.coins;
        self.persist();
        Some(coins)
    }

    /// Take back a coin. None when nothing is active or the balance is zero.
    pub fn remove_coin(&mut self) -> Option<u64> {
        let challenge = self.current_challenge_mut()?;
        if !challenge.remove_coin() {
            return None;
        }
        let coins = challenge.coins;
        self.persist();
        Some(coins)
    }

    /// Reward the active challenge would pay for `amount` coins
    pub fn preview_exchange(&self, amount: i64) -> Result<u64> {
        self.view
            .current_challenge(&self.data)
            .ok_or(TrackerError::NoActiveChallenge)?
            .quote_exchange(amount)
    }

    /// Exchange coins of the active challenge and log the reward
    pub fn exchange(&mut self, amount: i64) -> Result<ExchangeReceipt> {
        let account_index = self.current_index()?;
        let challenge_index = self.view.challenge.ok_or(TrackerError::NoActiveChallenge)?;
        let timestamp = (self.clock)();
        let receipt =
            self.data.accounts[account_index].exchange(challenge_index, amount, timestamp)?;
        self.persist();
        log::info!(
            "Exchanged {} coins of {:?} for {}",
            receipt.coins,
            receipt.challenge_name,
            self.settings.format_reward(receipt.reward)
        );
        Ok(receipt)
    }

    /// Exchange using the raw text of the amount field
    pub fn exchange_input(&mut self, input: &str) -> Result<ExchangeReceipt> {
        let amount = parse_exchange_amount(input)?;
        self.exchange(amount)
    }
}
