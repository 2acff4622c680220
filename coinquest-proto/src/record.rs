//! Boundary records as the server sends them, and their validation.
//!
//! Server payloads are loosely shaped: ids are named `todo_id` or
//! `category_id`, integers sometimes arrive as strings, timestamps carry a
//! time of day and an offset, and a task nests a copy of its category. The
//! record types here mirror that shape exactly, and the `TryFrom`
//! conversions turn them into the typed domain records, rejecting anything
//! malformed before it reaches the engine.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::category::{Category, CategoryId, Multiplier};
use crate::task::{Task, TaskId};
use crate::wallet::Wallet;
use crate::wish::{Wish, WishId};

/// Errors produced while validating a boundary record.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// A difficulty multiplier was zero or negative.
    #[error("difficulty multiplier must be positive, got {0}")]
    NonPositiveMultiplier(String),

    /// A coin amount was negative.
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount {
        /// Offending field name.
        field: &'static str,
        /// Value as received.
        value: i64,
    },

    /// A numeric field could not be parsed.
    #[error("{field} is not a whole number: {value:?}")]
    InvalidNumber {
        /// Offending field name.
        field: &'static str,
        /// Value as received.
        value: String,
    },

    /// A date or timestamp could not be parsed.
    #[error("{field} is not a valid date: {value:?}")]
    InvalidDate {
        /// Offending field name.
        field: &'static str,
        /// Value as received.
        value: String,
    },

    /// A required field was absent.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A required text field was blank.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// The payload was not valid JSON for the expected record.
    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),
}

/// An integer that may arrive as a JSON number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseInt {
    /// Sent as a JSON number.
    Number(i64),
    /// Sent as text.
    Text(String),
}

impl LooseInt {
    /// Coerces the value into a non-negative coin amount.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidNumber`] for unparseable text and
    /// [`RecordError::NegativeAmount`] for values below zero.
    pub fn to_amount(&self, field: &'static str) -> Result<u64, RecordError> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<i64>().map_err(|_| RecordError::InvalidNumber {
                field,
                value: s.clone(),
            })?,
        };
        u64::try_from(value).map_err(|_| RecordError::NegativeAmount { field, value })
    }
}

impl From<u64> for LooseInt {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or_else(|_| Self::Text(n.to_string()), Self::Number)
    }
}

/// Parses a due date, keeping the calendar day as written.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (the offset is ignored, the
/// written date wins) and offset-less `YYYY-MM-DDTHH:MM:SS[.f]` timestamps.
///
/// # Errors
///
/// Returns [`RecordError::InvalidDate`] if no format matches.
pub fn parse_due_date(field: &'static str, raw: &str) -> Result<NaiveDate, RecordError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }
    Err(RecordError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}

/// Parses a creation or fulfillment timestamp.
///
/// Offset-less timestamps are taken to be UTC.
///
/// # Errors
///
/// Returns [`RecordError::InvalidDate`] if the text is not a timestamp.
pub fn parse_timestamp(field: &'static str, raw: &str) -> Result<DateTime<Utc>, RecordError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.and_utc());
    }
    Err(RecordError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}

fn required_text(field: &'static str, value: String) -> Result<String, RecordError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RecordError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// A category as sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    /// Server id.
    pub category_id: u64,
    /// Display name.
    pub category_name: String,
    /// Multiplier; may be a JSON number or a decimal string.
    pub difficulty_multiplier: Decimal,
}

impl TryFrom<CategoryRecord> for Category {
    type Error = RecordError;

    fn try_from(r: CategoryRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CategoryId::new(r.category_id),
            name: r.category_name,
            difficulty_multiplier: Multiplier::new(r.difficulty_multiplier)?,
        })
    }
}

impl From<&Category> for CategoryRecord {
    fn from(c: &Category) -> Self {
        Self {
            category_id: c.id.get(),
            category_name: c.name.clone(),
            difficulty_multiplier: c.difficulty_multiplier.value(),
        }
    }
}

// ---------------------------------------------------------------------------
// Todo
// ---------------------------------------------------------------------------

/// A task as sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoRecord {
    /// Server id.
    pub todo_id: u64,
    /// Title.
    pub title: String,
    /// Optional description; blank is treated as absent.
    #[serde(default)]
    pub description: Option<String>,
    /// Category id; falls back to the embedded category when absent.
    #[serde(default)]
    pub category_id: Option<u64>,
    /// Coins before the multiplier.
    pub base_coin_value: LooseInt,
    /// Due date or timestamp.
    pub due_date: String,
    /// Completion flag.
    #[serde(default)]
    pub completed: bool,
    /// Embedded copy of the task's category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRecord>,
}

impl TryFrom<TodoRecord> for Task {
    type Error = RecordError;

    fn try_from(r: TodoRecord) -> Result<Self, Self::Error> {
        let category = r.category.map(Category::try_from).transpose()?;
        let category_id = r
            .category_id
            .map(CategoryId::new)
            .or_else(|| category.as_ref().map(|c| c.id))
            .ok_or(RecordError::MissingField("category_id"))?;

        Ok(Self {
            id: TaskId::new(r.todo_id),
            title: required_text("title", r.title)?,
            description: r
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            category_id,
            base_coin_value: r.base_coin_value.to_amount("base_coin_value")?,
            due_date: parse_due_date("due_date", &r.due_date)?,
            completed: r.completed,
            category,
        })
    }
}

impl From<&Task> for TodoRecord {
    fn from(t: &Task) -> Self {
        Self {
            todo_id: t.id.get(),
            title: t.title.clone(),
            description: t.description.clone(),
            category_id: Some(t.category_id.get()),
            base_coin_value: LooseInt::from(t.base_coin_value),
            due_date: t.due_date.format("%Y-%m-%d").to_string(),
            completed: t.completed,
            category: t.category.as_ref().map(CategoryRecord::from),
        }
    }
}

// ---------------------------------------------------------------------------
// Wish
// ---------------------------------------------------------------------------

/// A wish as sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishRecord {
    /// Server id.
    pub wish_id: u64,
    /// Title.
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Price in coins.
    pub coin_cost: LooseInt,
    /// Fulfillment flag.
    #[serde(default)]
    pub is_fulfilled: bool,
    /// Creation timestamp.
    pub created_at: String,
    /// Fulfillment timestamp.
    #[serde(default)]
    pub fulfilled_at: Option<String>,
}

impl TryFrom<WishRecord> for Wish {
    type Error = RecordError;

    fn try_from(r: WishRecord) -> Result<Self, Self::Error> {
        let fulfilled_at = r
            .fulfilled_at
            .as_deref()
            .map(|raw| parse_timestamp("fulfilled_at", raw))
            .transpose()?;

        Ok(Self {
            id: WishId::new(r.wish_id),
            title: required_text("title", r.title)?,
            description: r.description.trim().to_string(),
            coin_cost: r.coin_cost.to_amount("coin_cost")?,
            is_fulfilled: r.is_fulfilled,
            created_at: parse_timestamp("created_at", &r.created_at)?,
            // A pending wish never carries a fulfillment time.
            fulfilled_at: fulfilled_at.filter(|_| r.is_fulfilled),
        })
    }
}

impl From<&Wish> for WishRecord {
    fn from(w: &Wish) -> Self {
        Self {
            wish_id: w.id.get(),
            title: w.title.clone(),
            description: w.description.clone(),
            coin_cost: LooseInt::from(w.coin_cost),
            is_fulfilled: w.is_fulfilled,
            created_at: w.created_at.to_rfc3339(),
            fulfilled_at: w.fulfilled_at.map(|t| t.to_rfc3339()),
        }
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// The `/users/me` payload: profile, balance and wishes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Contact address.
    #[serde(default)]
    pub email: String,
    /// Balance; `null` or absent means zero.
    #[serde(default)]
    pub total_coins: Option<LooseInt>,
    /// The user's wishes.
    #[serde(default)]
    pub wishes: Vec<WishRecord>,
}

/// A decoded user payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Who the user is.
    pub account: Account,
    /// Coin balance.
    pub wallet: Wallet,
    /// The user's wishes.
    pub wishes: Vec<Wish>,
}

impl TryFrom<UserRecord> for Profile {
    type Error = RecordError;

    fn try_from(r: UserRecord) -> Result<Self, Self::Error> {
        let total_coins = r
            .total_coins
            .map(|c| c.to_amount("total_coins"))
            .transpose()?
            .unwrap_or(0);
        Ok(Self {
            account: Account::new(r.username, r.email),
            wallet: Wallet::new(total_coins),
            wishes: decode_all(r.wishes)?,
        })
    }
}

/// Response to a task completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionReceipt {
    /// Coins the server credited for the completion.
    pub coins_earned: u64,
}

/// Everything the server knows about one user, in wire shape.
///
/// Used to seed an in-memory server and as the CLI's fixture format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSnapshot {
    /// The user's tasks.
    #[serde(default)]
    pub todos: Vec<TodoRecord>,
    /// All categories.
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
    /// Profile, balance and wishes.
    #[serde(default)]
    pub user: UserRecord,
}

/// Converts every record, failing on the first malformed one.
///
/// # Errors
///
/// Returns the first [`RecordError`] encountered.
pub fn decode_all<R, T>(records: Vec<R>) -> Result<Vec<T>, RecordError>
where
    T: TryFrom<R, Error = RecordError>,
{
    records.into_iter().map(T::try_from).collect()
}

/// Parses a JSON array of records and converts each one.
///
/// # Errors
///
/// Returns [`RecordError::Json`] for malformed JSON, or the conversion error
/// of the first invalid record.
pub fn decode_json_list<R, T>(json: &str) -> Result<Vec<T>, RecordError>
where
    R: serde::de::DeserializeOwned,
    T: TryFrom<R, Error = RecordError>,
{
    let records: Vec<R> = serde_json::from_str(json)?;
    decode_all(records)
}
