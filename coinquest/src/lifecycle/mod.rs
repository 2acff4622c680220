//! Task and wish state transitions.
//!
//! Tasks move `Pending -> Completed` once; wishes move `Pending -> Fulfilled`
//! once or are removed while pending. Every transition is checked against the
//! [`Session`](crate::session::Session) before the collaborator is called,
//! and the session is only written after the collaborator confirms.

pub mod manager;
pub mod validate;

pub use manager::{Completion, Lifecycle};
pub use validate::{FormLimits, InvalidInput, validate_task, validate_wish};

use coinquest_proto::{CategoryId, TaskId, WishId};
use thiserror::Error;

use crate::remote::RemoteError;
use crate::reward::MissingCategory;

/// Errors that can occur during a lifecycle operation.
///
/// Every error leaves the session exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The task's category could not be resolved for the reward.
    #[error("task {task_id} has no resolvable category {category_id}")]
    MissingCategory {
        /// Task being completed.
        task_id: TaskId,
        /// Category it claims to belong to.
        category_id: CategoryId,
    },

    /// A create request carried malformed fields.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    /// The wallet does not cover the wish's cost.
    #[error("insufficient funds: need {needed} coins, have {available}")]
    InsufficientFunds {
        /// Cost of the wish.
        needed: u64,
        /// Current balance.
        available: u64,
    },

    /// The collaborator call failed.
    #[error("remote call failed: {0}")]
    Remote(#[from] RemoteError),

    /// No task with the given id is in the session.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// No wish with the given id is in the session.
    #[error("wish not found: {0}")]
    WishNotFound(WishId),

    /// The task was already completed.
    #[error("task {0} is already completed")]
    AlreadyCompleted(TaskId),

    /// The wish was already fulfilled.
    #[error("wish {0} is already fulfilled")]
    AlreadyFulfilled(WishId),
}

impl EngineError {
    /// Returns `true` if retrying the same operation may succeed.
    ///
    /// Only collaborator failures qualify; every other error is a logic or
    /// input fault that will fail again unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    pub(crate) const fn missing_category(task_id: TaskId, missing: MissingCategory) -> Self {
        Self::MissingCategory {
            task_id,
            category_id: missing.0,
        }
    }
}
