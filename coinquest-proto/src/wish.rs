//! Wishes: user-defined rewards bought with coins.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned identifier of a wish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WishId(u64);

impl WishId {
    /// Wraps a raw server id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw server id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WishId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A coin-redeemable reward item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wish {
    /// Server-assigned identifier.
    pub id: WishId,
    /// Short title; never empty.
    pub title: String,
    /// What the wish is.
    pub description: String,
    /// Coins debited when the wish is fulfilled.
    pub coin_cost: u64,
    /// Whether the wish has been fulfilled.
    pub is_fulfilled: bool,
    /// When the wish was created.
    pub created_at: DateTime<Utc>,
    /// When the wish was fulfilled; `None` while pending.
    pub fulfilled_at: Option<DateTime<Utc>>,
}

/// Validated fields for creating a wish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWish {
    /// Trimmed, non-empty title.
    pub title: String,
    /// Trimmed, non-empty description.
    pub description: String,
    /// Price in coins.
    pub coin_cost: u64,
}

/// Raw, unvalidated wish form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishDraft {
    /// Title text.
    pub title: String,
    /// Description text.
    pub description: String,
    /// Coin cost text.
    pub coin_cost: String,
}
