//! Reward calculation: how many coins a task is worth.
//!
//! `coins = floor(base_coin_value * difficulty_multiplier)`. The product is
//! computed in exact decimal arithmetic and always rounded down, so a
//! reward never exceeds the nominal product.

use coinquest_proto::{Category, CategoryId, Task};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// The task's category could be resolved neither from the category list
/// nor from the copy embedded in the task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no category {0} for task reward")]
pub struct MissingCategory(pub CategoryId);

/// Floors `base * multiplier` to whole coins.
///
/// Saturates at `u64::MAX` instead of overflowing.
#[must_use]
pub fn scaled_coins(base: u64, multiplier: Decimal) -> u64 {
    let product = Decimal::from(base).saturating_mul(multiplier).floor();
    if product.is_sign_negative() {
        return 0;
    }
    product.to_u64().unwrap_or(u64::MAX)
}

/// Returns the coins earned by completing `task` under `category`.
///
/// # Errors
///
/// Returns [`MissingCategory`] if `category` is not the task's category.
pub fn reward(task: &Task, category: &Category) -> Result<u64, MissingCategory> {
    if task.category_id != category.id {
        return Err(MissingCategory(task.category_id));
    }
    Ok(scaled_coins(
        task.base_coin_value,
        category.difficulty_multiplier.value(),
    ))
}

/// Resolves the category of `task`.
///
/// Looks the id up in `categories` first and falls back to the category
/// embedded in the task record.
///
/// # Errors
///
/// Returns [`MissingCategory`] if neither source has a matching category.
pub fn resolve_category<'a>(
    task: &'a Task,
    categories: &'a [Category],
) -> Result<&'a Category, MissingCategory> {
    if let Some(category) = categories.iter().find(|c| c.id == task.category_id) {
        return Ok(category);
    }
    match task.category.as_ref() {
        Some(embedded) if embedded.id == task.category_id => {
            tracing::debug!(
                task_id = %task.id,
                category_id = %task.category_id,
                "category missing from list, using embedded copy"
            );
            Ok(embedded)
        }
        _ => Err(MissingCategory(task.category_id)),
    }
}

/// Resolves the task's category and computes its reward.
///
/// # Errors
///
/// Returns [`MissingCategory`] if the category cannot be resolved.
pub fn reward_for(task: &Task, categories: &[Category]) -> Result<u64, MissingCategory> {
    let category = resolve_category(task, categories)?;
    reward(task, category)
}
