//! Room progress: the share of a category's tasks that are completed.

use coinquest_proto::{Category, CategoryId, Multiplier, Task};
use serde::Serialize;

/// Returns `round_half_up(100 * completed / total)` for the given counts.
///
/// An empty room is 0% complete. A room reads 100% only when every task in
/// it is completed, so a near-complete room is capped at 99.
#[must_use]
pub fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let done = completed.min(total) as u128;
    let all = total as u128;
    // (100c / t) + 1/2, floored, without leaving integer arithmetic.
    let rounded = u8::try_from((200 * done + all) / (2 * all)).unwrap_or(100);
    if done < all { rounded.min(99) } else { rounded }
}

/// Returns the tasks filed under `category_id`.
pub fn room_tasks<'a, I>(tasks: I, category_id: CategoryId) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .filter(|t| t.category_id == category_id)
        .collect()
}

/// Returns the completion percentage of the room `category_id`.
pub fn room_progress<'a, I>(tasks: I, category_id: CategoryId) -> u8
where
    I: IntoIterator<Item = &'a Task>,
{
    let (completed, total) = count(tasks, category_id);
    percent(completed, total)
}

fn count<'a, I>(tasks: I, category_id: CategoryId) -> (usize, usize)
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .filter(|t| t.category_id == category_id)
        .fold((0, 0), |(completed, total), t| {
            (completed + usize::from(t.completed), total + 1)
        })
}

/// Progress of one room, as shown on the room list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomSummary {
    /// Category id.
    pub category_id: CategoryId,
    /// Category display name.
    pub name: String,
    /// Reward multiplier of the room.
    pub multiplier: Multiplier,
    /// Tasks filed in the room.
    pub total: usize,
    /// Completed tasks in the room.
    pub completed: usize,
    /// Rounded completion percentage.
    pub percent: u8,
}

/// Summarizes every category, in the order given.
pub fn room_summaries<'a, I>(tasks: I, categories: &[Category]) -> Vec<RoomSummary>
where
    I: IntoIterator<Item = &'a Task> + Clone,
{
    categories
        .iter()
        .map(|category| {
            let (completed, total) = count(tasks.clone(), category.id);
            RoomSummary {
                category_id: category.id,
                name: category.name.clone(),
                multiplier: category.difficulty_multiplier,
                total,
                completed,
                percent: percent(completed, total),
            }
        })
        .collect()
}
