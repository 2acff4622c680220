//! Create-form validation.
//!
//! Turns the raw text of a task or wish form into a validated [`NewTask`] or
//! [`NewWish`]. This is the single place form input is checked; nothing
//! downstream re-validates it.

use coinquest_proto::record::parse_due_date;
use coinquest_proto::{Category, CategoryId, NewTask, NewWish, TaskDraft, WishDraft};
use thiserror::Error;

/// Why a create form was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    /// Title is empty or whitespace.
    #[error("title cannot be empty")]
    TitleEmpty,

    /// Title exceeds the configured maximum.
    #[error("title too long (max {max} characters)")]
    TitleTooLong {
        /// Maximum allowed length in characters.
        max: usize,
    },

    /// Wish description is empty or whitespace.
    #[error("description cannot be empty")]
    DescriptionEmpty,

    /// A coin field is blank or not a whole number.
    #[error("{field} is not a whole number: {value:?}")]
    NotANumber {
        /// Offending field name.
        field: &'static str,
        /// Text as typed.
        value: String,
    },

    /// A coin field is below zero.
    #[error("{field} must not be negative")]
    Negative {
        /// Offending field name.
        field: &'static str,
    },

    /// No category was selected.
    #[error("no category selected")]
    CategoryMissing,

    /// The selected category is not known.
    #[error("unknown category: {0}")]
    UnknownCategory(CategoryId),

    /// The due date is not a date.
    #[error("invalid due date: {0:?}")]
    InvalidDueDate(String),
}

/// Limits applied to create forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormLimits {
    /// Maximum title length in characters.
    pub max_title_len: usize,
}

impl Default for FormLimits {
    fn default() -> Self {
        Self { max_title_len: 256 }
    }
}

fn title(raw: &str, limits: FormLimits) -> Result<String, InvalidInput> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InvalidInput::TitleEmpty);
    }
    if trimmed.chars().count() > limits.max_title_len {
        return Err(InvalidInput::TitleTooLong {
            max: limits.max_title_len,
        });
    }
    Ok(trimmed.to_string())
}

/// Parses a non-negative whole number of coins.
///
/// # Errors
///
/// Returns [`InvalidInput::Negative`] for values below zero and
/// [`InvalidInput::NotANumber`] for anything else that is not a `u64`.
pub fn parse_coins(field: &'static str, raw: &str) -> Result<u64, InvalidInput> {
    let text = raw.trim();
    if let Ok(n) = text.parse::<u64>() {
        return Ok(n);
    }
    match text.parse::<i128>() {
        Ok(n) if n < 0 => Err(InvalidInput::Negative { field }),
        _ => Err(InvalidInput::NotANumber {
            field,
            value: raw.to_string(),
        }),
    }
}

/// Validates a task form against the known categories.
///
/// # Errors
///
/// Returns the first [`InvalidInput`] found, checking title, category, coin
/// value and due date in that order.
pub fn validate_task(
    draft: &TaskDraft,
    categories: &[Category],
    limits: FormLimits,
) -> Result<NewTask, InvalidInput> {
    let title = title(&draft.title, limits)?;
    let category_id = draft.category_id.ok_or(InvalidInput::CategoryMissing)?;
    if !categories.iter().any(|c| c.id == category_id) {
        return Err(InvalidInput::UnknownCategory(category_id));
    }
    let base_coin_value = parse_coins("base_coin_value", &draft.base_coin_value)?;
    let due_date = parse_due_date("due_date", &draft.due_date)
        .map_err(|_| InvalidInput::InvalidDueDate(draft.due_date.clone()))?;

    let description = draft.description.trim();
    Ok(NewTask {
        title,
        description: (!description.is_empty()).then(|| description.to_string()),
        category_id,
        base_coin_value,
        due_date,
    })
}

/// Validates a wish form.
///
/// # Errors
///
/// Returns the first [`InvalidInput`] found, checking title, description and
/// coin cost in that order.
pub fn validate_wish(draft: &WishDraft, limits: FormLimits) -> Result<NewWish, InvalidInput> {
    let title = title(&draft.title, limits)?;
    let description = draft.description.trim();
    if description.is_empty() {
        return Err(InvalidInput::DescriptionEmpty);
    }
    let coin_cost = parse_coins("coin_cost", &draft.coin_cost)?;
    Ok(NewWish {
        title,
        description: description.to_string(),
        coin_cost,
    })
}
