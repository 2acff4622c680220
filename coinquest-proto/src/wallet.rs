//! The user's coin balance.

use serde::{Deserialize, Serialize};

/// A user's coin balance.
///
/// The balance is unsigned, so it can never go negative; [`Wallet::debit`]
/// refuses to spend more than is held instead of wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Coins currently held.
    pub total_coins: u64,
}

impl Wallet {
    /// Creates a wallet holding `total_coins`.
    #[must_use]
    pub const fn new(total_coins: u64) -> Self {
        Self { total_coins }
    }

    /// Returns `true` if the wallet holds at least `amount` coins.
    #[must_use]
    pub const fn can_afford(&self, amount: u64) -> bool {
        self.total_coins >= amount
    }

    /// Adds `amount` coins, saturating at `u64::MAX`.
    pub const fn credit(&mut self, amount: u64) {
        self.total_coins = self.total_coins.saturating_add(amount);
    }

    /// Removes `amount` coins if the balance covers it.
    ///
    /// Returns the new balance, or `None` (leaving the wallet untouched) if
    /// the balance is insufficient.
    pub const fn debit(&mut self, amount: u64) -> Option<u64> {
        match self.total_coins.checked_sub(amount) {
            Some(rest) => {
                self.total_coins = rest;
                Some(rest)
            }
            None => None,
        }
    }
}
