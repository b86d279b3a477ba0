//! Coin ledger operations
//!
//! Pure mutations on accounts and challenges. Selection, persistence and
//! timestamps are supplied by the caller.

use serde::{Deserialize, Serialize};

use super::state::{Account, Challenge, HistoryEntry, HistoryKind};
use crate::error::{Result, TrackerError};

/// Outcome of an accepted exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeReceipt {
    pub coins: u64,
    pub reward: u64,
    pub challenge_name: String,
    /// Balance left on the challenge
    pub remaining: u64,
}

impl Challenge {
    /// Earn one coin
    pub fn add_coin(&mut self) {
        self.coins = self.coins.saturating_add(1);
        self.total_coins = self.total_coins.saturating_add(1);
    }

    /// Take back one coin. Returns false (and changes nothing) at zero balance.
    pub fn remove_coin(&mut self) -> bool {
        if self.coins == 0 {
            return false;
        }
        self.coins -= 1;
        self.total_coins = self.total_coins.saturating_sub(1);
        true
    }

    /// Current balance expressed as reward
    pub fn coin_value(&self) -> u64 {
        self.coins.saturating_mul(u64::from(self.value))
    }

    /// Reward for exchanging `amount` coins, if the amount is acceptable
    pub fn quote_exchange(&self, amount: i64) -> Result<u64> {
        let invalid = TrackerError::InvalidExchangeAmount {
            requested: amount,
            available: self.coins,
        };
        let coins = u64::try_from(amount).map_err(|_| invalid.clone())?;
        if coins == 0 || coins > self.coins {
            return Err(invalid);
        }
        Ok(coins.saturating_mul(u64::from(self.value)))
    }
}

impl Account {
    /// Exchange coins from one challenge and log it
    pub fn exchange(
        &mut self,
        challenge_index: usize,
        amount: i64,
        timestamp: i64,
    ) -> Result<ExchangeReceipt> {
        let challenge = self
            .challenges
            .get_mut(challenge_index)
            .ok_or(TrackerError::NoActiveChallenge)?;

        let reward = challenge.quote_exchange(amount)?;
        let coins = amount as u64;
        challenge.coins -= coins;

        let receipt = ExchangeReceipt {
            coins,
            reward,
            challenge_name: challenge.name.clone(),
            remaining: challenge.coins,
        };

        self.history.push(HistoryEntry {
            kind: HistoryKind::Exchange,
            coins,
            reward,
            challenge_name: Some(receipt.challenge_name.clone()),
            timestamp,
        });

        Ok(receipt)
    }

    /// Zero every balance and drop the whole history
    pub fn reset(&mut self) {
        for challenge in &mut self.challenges {
            challenge.coins = 0;
            challenge.total_coins = 0;
        }
        self.history.clear();
    }

    /// Sum of unexchanged coins across challenges
    pub fn current_coins(&self) -> u64 {
        self.challenges.iter().fold(0u64, |sum, c| sum.saturating_add(c.coins))
    }

    /// Sum of lifetime counters across challenges
    pub fn lifetime_coins(&self) -> i64 {
        self.challenges
            .iter()
            .fold(0i64, |sum, c| sum.saturating_add(c.total_coins))
    }

    /// Sum of every reward in the history
    pub fn total_reward(&self) -> u64 {
        self.history.iter().fold(0u64, |sum, h| sum.saturating_add(h.reward))
    }
}

/// Parse the exchange amount typed by the user.
///
/// Leading whitespace and a sign are accepted and parsing stops at the first
/// non-digit, so "3 coins" reads as 3. Text without leading digits is rejected.
pub fn parse_exchange_amount(input: &str) -> Result<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];
    if digits.is_empty() {
        return Err(TrackerError::InvalidInput(input.to_string()));
    }

    let value: i64 = digits
        .parse()
        .map_err(|_| TrackerError::InvalidInput(input.to_string()))?;
    Ok(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account_with(value: u32, coins: u64) -> Account {
        let mut account = Account::new(1);
        let mut challenge = Challenge::named("Chores", value);
        challenge.coins = coins;
        challenge.total_coins = coins as i64;
        account.challenges.push(challenge);
        account
    }

    #[test]
    fn test_add_and_remove_coin() {
        let mut challenge = Challenge::new(1, 10);
        challenge.add_coin();
        challenge.add_coin();
        assert_eq!(challenge.coins, 2);
        assert_eq!(challenge.total_coins, 2);

        assert!(challenge.remove_coin());
        assert_eq!(challenge.coins, 1);
        assert_eq!(challenge.total_coins, 1);
    }

    #[test]
    fn test_remove_coin_at_zero_is_noop() {
        let mut challenge = Challenge::new(1, 10);
        challenge.total_coins = 4;
        assert!(!challenge.remove_coin());
        assert_eq!(challenge.coins, 0);
        assert_eq!(challenge.total_coins, 4);
    }

    #[test]
    fn test_remove_coin_can_push_lifetime_negative() {
        // Balance migrated from a legacy document has no lifetime count behind it
        let mut challenge = Challenge::new(1, 10);
        challenge.coins = 1;
        assert!(challenge.remove_coin());
        assert_eq!(challenge.total_coins, -1);
    }

    #[test]
    fn test_counters_saturate_at_the_top() {
        let mut challenge = Challenge::new(1, 10);
        challenge.coins = u64::MAX;
        challenge.total_coins = i64::MAX;
        challenge.add_coin();
        assert_eq!(challenge.coins, u64::MAX);
        assert_eq!(challenge.total_coins, i64::MAX);

        let mut account = Account::new(1);
        account.challenges.push(challenge.clone());
        account.challenges.push(challenge);
        assert_eq!(account.current_coins(), u64::MAX);
        assert_eq!(account.lifetime_coins(), i64::MAX);
    }

    #[test]
    fn test_exchange_then_overdraw() {
        let mut account = account_with(10, 5);

        let receipt = account.exchange(0, 3, 1_000).unwrap();
        assert_eq!(receipt.reward, 30);
        assert_eq!(receipt.remaining, 2);
        assert_eq!(account.challenges[0].coins, 2);
        assert_eq!(account.challenges[0].total_coins, 5);
        assert_eq!(account.history.len(), 1);
        assert_eq!(account.history[0].reward, 30);
        assert_eq!(account.history[0].challenge_name.as_deref(), Some("Chores"));

        let before = account.clone();
        let err = account.exchange(0, 10, 2_000).unwrap_err();
        assert_eq!(
            err,
            TrackerError::InvalidExchangeAmount {
                requested: 10,
                available: 2
            }
        );
        assert_eq!(account, before);
    }

    #[test]
    fn test_exchange_rejects_zero_and_negative() {
        let mut account = account_with(10, 5);
        assert!(account.exchange(0, 0, 0).is_err());
        assert!(account.exchange(0, -2, 0).is_err());
        assert_eq!(account.challenges[0].coins, 5);
        assert!(account.history.is_empty());
    }

    #[test]
    fn test_exchange_entire_balance() {
        let mut account = account_with(7, 4);
        let receipt = account.exchange(0, 4, 0).unwrap();
        assert_eq!(receipt.reward, 28);
        assert_eq!(account.challenges[0].coins, 0);
    }

    #[test]
    fn test_exchange_missing_challenge() {
        let mut account = Account::new(1);
        assert_eq!(
            account.exchange(0, 1, 0).unwrap_err(),
            TrackerError::NoActiveChallenge
        );
    }

    #[test]
    fn test_reset_clears_balances_and_history() {
        let mut account = account_with(10, 5);
        account.challenges.push(Challenge::new(2, 3));
        account.challenges[1].add_coin();
        account.exchange(0, 2, 0).unwrap();

        account.reset();
        assert!(account.challenges.iter().all(|c| c.coins == 0 && c.total_coins == 0));
        assert!(account.history.is_empty());
        assert_eq!(account.challenges.len(), 2);
    }

    #[test]
    fn test_aggregates() {
        let mut account = account_with(10, 5);
        account.challenges.push(Challenge::new(2, 3));
        account.challenges[1].add_coin();
        account.exchange(0, 2, 0).unwrap();
        account.exchange(1, 1, 0).unwrap();

        assert_eq!(account.current_coins(), 3);
        assert_eq!(account.lifetime_coins(), 6);
        assert_eq!(account.total_reward(), 23);
    }

    #[test]
    fn test_parse_exchange_amount() {
        assert_eq!(parse_exchange_amount("3").unwrap(), 3);
        assert_eq!(parse_exchange_amount("  12 coins").unwrap(), 12);
        assert_eq!(parse_exchange_amount("-4").unwrap(), -4);
        assert_eq!(parse_exchange_amount("7.9").unwrap(), 7);
        assert!(matches!(
            parse_exchange_amount("abc"),
            Err(TrackerError::InvalidInput(_))
        ));
        assert!(parse_exchange_amount("").is_err());
        assert!(parse_exchange_amount("99999999999999999999999").is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Accepted exchanges move exactly `amount` coins and log exactly one entry
        #[test]
        fn exchange_accepts_only_valid_amounts(
            value in 1u32..=500,
            coins in 0u64..=200,
            amount in -50i64..=250,
        ) {
            let mut account = Account::new(1);
            let mut challenge = Challenge::new(1, value);
            challenge.coins = coins;
            challenge.total_coins = coins as i64;
            account.challenges.push(challenge);
            let before = account.clone();

            match account.exchange(0, amount, 42) {
                Ok(receipt) => {
                    prop_assert!(amount >= 1 && amount as u64 <= coins);
                    prop_assert_eq!(receipt.reward, amount as u64 * u64::from(value));
                    prop_assert_eq!(account.challenges[0].coins, coins - amount as u64);
                    prop_assert_eq!(account.challenges[0].total_coins, coins as i64);
                    prop_assert_eq!(account.history.len(), 1);
                }
                Err(_) => {
                    prop_assert!(amount < 1 || amount as u64 > coins);
                    prop_assert_eq!(&account, &before);
                }
            }
        }

        /// The add/remove path never produces a negative balance
        #[test]
        fn coin_balance_never_underflows(ops in prop::collection::vec(any::<bool>(), 0..100)) {
            let mut challenge = Challenge::new(1, 10);
            let mut expected: u64 = 0;
            for add in ops {
                if add {
                    challenge.add_coin();
                    expected += 1;
                } else if challenge.remove_coin() {
                    expected -= 1;
                }
            }
            prop_assert_eq!(challenge.coins, expected);
            prop_assert_eq!(challenge.total_coins, expected as i64);
        }
    }
}
