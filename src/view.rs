//! Selection state and presentation snapshots
//!
//! `ViewState` is the only navigation state in the app. It is never persisted;
//! the tracker rebuilds it on load and re-clamps it after every deletion.
//! `Snapshot` is the read-only view model handed to the presentation layer.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::history::{self, YearMonth};
use crate::model::{Account, AppData, Challenge, HistoryEntry, HistoryKind};
use crate::settings::Settings;

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    /// Account cards
    #[default]
    AccountList,
    /// One account's challenges, balance and history
    AccountDetail,
}

/// Navigation pointers into the document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub screen: Screen,
    pub account: Option<usize>,
    pub challenge: Option<usize>,
    /// History month filter (None = all months)
    pub month: Option<YearMonth>,
}

impl ViewState {
    /// Selection right after loading: first account and its first challenge, on the list screen
    pub fn initial(data: &AppData) -> Self {
        let account = if data.accounts.is_empty() { None } else { Some(0) };
        let challenge = account
            .and_then(|i| data.accounts.get(i))
            .filter(|a| !a.challenges.is_empty())
            .map(|_| 0);
        Self {
            screen: Screen::AccountList,
            account,
            challenge,
            month: None,
        }
    }

    /// Show an account's detail screen
    pub fn open_account(&mut self, data: &AppData, index: usize) -> Result<()> {
        let account = data.accounts.get(index).ok_or(TrackerError::IndexOutOfRange {
            kind: "account",
            index,
        })?;
        self.screen = Screen::AccountDetail;
        self.account = Some(index);
        self.challenge = if account.challenges.is_empty() { None } else { Some(0) };
        self.month = None;
        Ok(())
    }

    /// Make a challenge of the current account active
    pub fn select_challenge(&mut self, data: &AppData, index: usize) -> Result<()> {
        let account = self.current_account(data).ok_or(TrackerError::NoActiveAccount)?;
        if index >= account.challenges.len() {
            return Err(TrackerError::IndexOutOfRange {
                kind: "challenge",
                index,
            });
        }
        self.challenge = Some(index);
        Ok(())
    }

    pub fn back_to_list(&mut self) {
        self.screen = Screen::AccountList;
        self.month = None;
    }

    /// Fix the account pointer after the account at `index` was removed
    pub fn account_deleted(&mut self, index: usize) {
        match self.account {
            Some(current) if current == index => {
                self.account = None;
                self.challenge = None;
                self.screen = Screen::AccountList;
                self.month = None;
            }
            Some(current) if current > index => self.account = Some(current - 1),
            _ => {}
        }
    }

    /// Fix the challenge pointer after a challenge was removed, `remaining` left
    pub fn challenge_deleted(&mut self, remaining: usize) {
        if remaining == 0 {
            self.challenge = None;
        } else if let Some(current) = self.challenge {
            if current >= remaining {
                self.challenge = Some(remaining - 1);
            }
        }
    }

    /// Clamp every pointer into the current document
    pub fn revalidate(&mut self, data: &AppData) {
        let Some(account) = self.account.and_then(|i| data.accounts.get(i)) else {
            self.account = None;
            self.challenge = None;
            self.screen = Screen::AccountList;
            return;
        };
        self.challenge = match account.challenges.len() {
            0 => None,
            len => Some(self.challenge.filter(|&c| c < len).unwrap_or(0)),
        };
    }

    pub fn current_account<'a>(&self, data: &'a AppData) -> Option<&'a Account> {
        self.account.and_then(|i| data.accounts.get(i))
    }

    pub fn current_challenge<'a>(&self, data: &'a AppData) -> Option<&'a Challenge> {
        let account = self.current_account(data)?;
        self.challenge.and_then(|i| account.challenges.get(i))
    }
}

/// Entry on the account list screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCard {
    pub index: usize,
    pub name: String,
    pub color: String,
    /// Unexchanged coins across all challenges
    pub coins: u64,
}

/// Challenge selector button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeTab {
    pub index: usize,
    pub name: String,
    pub active: bool,
}

/// Balance panel of the active challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveChallenge {
    pub name: String,
    pub value: u32,
    pub coins: u64,
    /// coins x value
    pub coin_value: u64,
    pub can_remove: bool,
    pub can_exchange: bool,
}

/// One rendered history line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRow {
    pub kind: HistoryKind,
    pub description: String,
    pub coins: u64,
    pub reward: u64,
    pub challenge_name: Option<String>,
    pub date: String,
    pub timestamp: i64,
}

impl HistoryRow {
    fn new(entry: &HistoryEntry, settings: &Settings, offset_minutes: i32) -> Self {
        Self {
            kind: entry.kind,
            description: history::describe(entry, &settings.currency_suffix),
            coins: entry.coins,
            reward: entry.reward,
            challenge_name: entry.challenge_name.clone(),
            date: history::format_date(entry.timestamp, offset_minutes),
            timestamp: entry.timestamp,
        }
    }
}

/// Detail screen contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetail {
    pub index: usize,
    pub name: String,
    pub color: String,
    pub challenges: Vec<ChallengeTab>,
    pub active: Option<ActiveChallenge>,
    /// Lifetime coins across all challenges
    pub lifetime_coins: i64,
    /// All rewards ever paid out
    pub total_reward: u64,
    /// Newest first, narrowed by the month filter
    pub history: Vec<HistoryRow>,
    /// Most recent entry regardless of filter
    pub latest: Option<HistoryRow>,
    /// Months with history, newest first
    pub months: Vec<YearMonth>,
}

/// Everything the presentation layer needs to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub view: ViewState,
    pub accounts: Vec<AccountCard>,
    pub can_add_account: bool,
    pub detail: Option<AccountDetail>,
}

impl Snapshot {
    pub fn build(data: &AppData, view: &ViewState, settings: &Settings, offset_minutes: i32) -> Self {
        let accounts = data
            .accounts
            .iter()
            .enumerate()
            .map(|(index, account)| AccountCard {
                index,
                name: account.name.clone(),
                color: account.color.clone(),
                coins: account.current_coins(),
            })
            .collect();

        let detail = view
            .account
            .zip(view.current_account(data))
            .map(|(index, account)| AccountDetail {
                index,
                name: account.name.clone(),
                color: account.color.clone(),
                challenges: account
                    .challenges
                    .iter()
                    .enumerate()
                    .map(|(i, c)| ChallengeTab {
                        index: i,
                        name: c.name.clone(),
                        active: view.challenge == Some(i),
                    })
                    .collect(),
                active: view.current_challenge(data).map(|c| ActiveChallenge {
                    name: c.name.clone(),
                    value: c.value,
                    coins: c.coins,
                    coin_value: c.coin_value(),
                    can_remove: c.coins > 0,
                    can_exchange: c.coins > 0,
                }),
                lifetime_coins: account.lifetime_coins(),
                total_reward: account.total_reward(),
                history: history::filtered(&account.history, view.month, offset_minutes)
                    .into_iter()
                    .map(|e| HistoryRow::new(e, settings, offset_minutes))
                    .collect(),
                latest: history::latest(&account.history)
                    .map(|e| HistoryRow::new(e, settings, offset_minutes)),
                months: history::months(&account.history, offset_minutes),
            });

        Self {
            view: view.clone(),
            accounts,
            can_add_account: data.accounts.len() < settings.max_accounts,
            detail,
        }
    }
}
