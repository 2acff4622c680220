//! The external collaborator: where records come from and where mutations go.
//!
//! The engine never talks HTTP itself. It calls a [`Remote`], which a host
//! application implements over whatever transport it uses. Implementations
//! in this crate:
//! - [`memory::MemoryRemote`]: in-process server state, used by tests and
//!   the CLI

pub mod memory;

use std::future::Future;

use coinquest_proto::{Account, Category, NewTask, NewWish, Task, TaskId, Wallet, Wish, WishId};

pub use coinquest_proto::record::CompletionReceipt;

/// Errors a collaborator call can fail with.
///
/// None of these are retried by the engine. The caller may retry the whole
/// operation after refetching the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The server answered with a non-success status.
    #[error("server rejected request ({status}): {message}")]
    Rejected {
        /// Status code reported by the server.
        status: u16,
        /// Server-provided reason.
        message: String,
    },

    /// The server could not be reached.
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// The server answered with a payload that failed validation.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl RemoteError {
    /// Shorthand for a rejection with the given status.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }
}

impl From<coinquest_proto::RecordError> for RemoteError {
    fn from(e: coinquest_proto::RecordError) -> Self {
        Self::Malformed(e.to_string())
    }
}

/// Result of a confirmed wish fulfillment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fulfillment {
    /// The wallet after the server applied the debit.
    pub wallet: Wallet,
    /// The fulfilled wish, when the server echoes it back.
    pub wish: Option<Wish>,
}

/// Async collaborator that owns the authoritative records.
///
/// Every call is a single round trip that either succeeds or fails; there is
/// no partial or cancelable variant. Implementations must not retry.
pub trait Remote: Send + Sync {
    /// Fetches every task of the user.
    fn fetch_tasks(&self) -> impl Future<Output = Result<Vec<Task>, RemoteError>> + Send;

    /// Fetches every category.
    fn fetch_categories(&self) -> impl Future<Output = Result<Vec<Category>, RemoteError>> + Send;

    /// Fetches the user's wallet.
    fn fetch_wallet(&self) -> impl Future<Output = Result<Wallet, RemoteError>> + Send;

    /// Fetches the user's wishes.
    fn fetch_wishes(&self) -> impl Future<Output = Result<Vec<Wish>, RemoteError>> + Send;

    /// Fetches who the user is.
    fn fetch_account(&self) -> impl Future<Output = Result<Account, RemoteError>> + Send;

    /// Marks a task completed server-side.
    ///
    /// The server is the source of truth for the coins actually credited.
    fn submit_task_completion(
        &self,
        task_id: TaskId,
    ) -> impl Future<Output = Result<CompletionReceipt, RemoteError>> + Send;

    /// Fulfills a wish server-side, debiting its cost.
    fn submit_wish_fulfillment(
        &self,
        wish_id: WishId,
    ) -> impl Future<Output = Result<Fulfillment, RemoteError>> + Send;

    /// Creates a task and returns the stored record.
    fn submit_task_create(
        &self,
        task: NewTask,
    ) -> impl Future<Output = Result<Task, RemoteError>> + Send;

    /// Creates a wish and returns the stored record.
    fn submit_wish_create(
        &self,
        wish: NewWish,
    ) -> impl Future<Output = Result<Wish, RemoteError>> + Send;

    /// Deletes a task.
    fn submit_task_delete(
        &self,
        task_id: TaskId,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Deletes a wish.
    fn submit_wish_delete(
        &self,
        wish_id: WishId,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}
