//! Categories ("rooms") and their difficulty multipliers.
//!
//! A category groups tasks under a theme and scales the coins each task is
//! worth. Categories are read-only from the engine's point of view: they are
//! fetched from the server and never mutated locally.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::record::RecordError;

/// Server-assigned identifier of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(u64);

impl CategoryId {
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

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A strictly positive reward scaling factor.
///
/// Stored as an exact decimal so that values such as `1.9` multiply without
/// binary floating point drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Multiplier(Decimal);

impl Multiplier {
    /// The neutral multiplier (`x1`).
    pub const ONE: Self = Self(Decimal::ONE);

    /// Creates a multiplier, rejecting zero and negative values.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NonPositiveMultiplier`] if `value <= 0`.
    pub fn new(value: Decimal) -> Result<Self, RecordError> {
        if value <= Decimal::ZERO {
            return Err(RecordError::NonPositiveMultiplier(value.to_string()));
        }
        Ok(Self(value.normalize()))
    }

    /// Returns the multiplier as a decimal.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Multiplier {
    type Error = RecordError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Multiplier> for Decimal {
    fn from(m: Multiplier) -> Self {
        m.0
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// A task category, shown to the user as a themed room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Server-assigned identifier.
    pub id: CategoryId,
    /// Display name (also selects the room theme in the UI).
    pub name: String,
    /// Reward scaling factor applied to every task in this category.
    pub difficulty_multiplier: Multiplier,
}

impl Category {
    /// Creates a category record.
    #[must_use]
    pub fn new(id: CategoryId, name: impl Into<String>, difficulty_multiplier: Multiplier) -> Self {
        Self {
            id,
            name: name.into(),
            difficulty_multiplier,
        }
    }
}
