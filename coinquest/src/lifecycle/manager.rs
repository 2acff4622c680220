//! Lifecycle manager: the only code that mutates a [`Session`].
//!
//! Each operation checks its preconditions against the session, calls the
//! collaborator once, and applies the local change only after the
//! collaborator confirms. A failed call returns before anything is written,
//! so an error never leaves a half-applied transition behind.

use chrono::Utc;
use coinquest_proto::{Task, TaskDraft, TaskId, Wish, WishDraft, WishId};
use serde::Serialize;

use super::EngineError;
use super::validate::{FormLimits, validate_task, validate_wish};
use crate::remote::Remote;
use crate::reward::reward_for;
use crate::session::Session;

/// Outcome of a confirmed task completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Completion {
    /// The completed task.
    pub task_id: TaskId,
    /// Coins credited to the local wallet (computed by the engine).
    pub reward: u64,
    /// Coins the server reports having credited.
    ///
    /// When this differs from `reward`, the next wallet refresh brings the
    /// local balance in line with the server.
    pub coins_earned: u64,
}

impl Completion {
    /// Returns `true` if the server credited a different amount.
    #[must_use]
    pub const fn needs_reconcile(&self) -> bool {
        self.reward != self.coins_earned
    }
}

/// Applies task and wish transitions through a [`Remote`].
pub struct Lifecycle<R> {
    remote: R,
    limits: FormLimits,
}

impl<R: Remote> Lifecycle<R> {
    /// Creates a manager over `remote` with default form limits.
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            limits: FormLimits::default(),
        }
    }

    /// Builder: sets the form limits applied by `add_task` and `add_wish`.
    #[must_use]
    pub const fn with_limits(mut self, limits: FormLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns the collaborator.
    pub const fn remote(&self) -> &R {
        &self.remote
    }

    /// Completes a pending task and credits its reward.
    ///
    /// The reward is resolved before the collaborator is called, so a task
    /// whose category cannot be resolved is never submitted.
    ///
    /// # Errors
    ///
    /// - [`EngineError::TaskNotFound`] if the task is not in the session
    /// - [`EngineError::AlreadyCompleted`] if it was completed before
    /// - [`EngineError::MissingCategory`] if its reward cannot be computed
    /// - [`EngineError::Remote`] if the collaborator rejects the completion
    pub async fn complete_task(
        &self,
        session: &mut Session,
        task_id: TaskId,
    ) -> Result<Completion, EngineError> {
        let task = session
            .task(task_id)
            .ok_or(EngineError::TaskNotFound(task_id))?;
        if task.completed {
            tracing::warn!(%task_id, "rejected completion of completed task");
            return Err(EngineError::AlreadyCompleted(task_id));
        }
        let reward = reward_for(task, session.categories())
            .map_err(|e| EngineError::missing_category(task_id, e))?;

        let receipt = self.remote.submit_task_completion(task_id).await?;

        session.wallet_mut().credit(reward);
        if let Some(task) = session.task_mut(task_id) {
            task.completed = true;
        }

        let completion = Completion {
            task_id,
            reward,
            coins_earned: receipt.coins_earned,
        };
        if completion.needs_reconcile() {
            tracing::warn!(
                %task_id,
                local = reward,
                server = receipt.coins_earned,
                "server credited a different reward; refresh the wallet to reconcile"
            );
        }
        tracing::info!(
            %task_id,
            reward,
            balance = session.wallet().total_coins,
            "task completed"
        );
        Ok(completion)
    }

    /// Fulfills a pending wish and debits its cost.
    ///
    /// The balance is checked locally first; the collaborator is not called
    /// when the wallet cannot cover the cost.
    ///
    /// # Errors
    ///
    /// - [`EngineError::WishNotFound`] if the wish is not in the session
    /// - [`EngineError::AlreadyFulfilled`] if it was fulfilled before
    /// - [`EngineError::InsufficientFunds`] if the wallet cannot cover it
    /// - [`EngineError::Remote`] if the collaborator rejects the fulfillment
    pub async fn fulfill_wish(
        &self,
        session: &mut Session,
        wish_id: WishId,
    ) -> Result<Wish, EngineError> {
        let wish = session
            .wish(wish_id)
            .ok_or(EngineError::WishNotFound(wish_id))?;
        if wish.is_fulfilled {
            return Err(EngineError::AlreadyFulfilled(wish_id));
        }
        let cost = wish.coin_cost;
        let available = session.wallet().total_coins;
        if !session.wallet().can_afford(cost) {
            tracing::warn!(%wish_id, cost, available, "insufficient funds for wish");
            return Err(EngineError::InsufficientFunds {
                needed: cost,
                available,
            });
        }

        let fulfillment = self.remote.submit_wish_fulfillment(wish_id).await?;

        let balance = session
            .wallet_mut()
            .debit(cost)
            .ok_or(EngineError::InsufficientFunds {
                needed: cost,
                available,
            })?;
        if fulfillment.wallet.total_coins != balance {
            tracing::warn!(
                %wish_id,
                local = balance,
                server = fulfillment.wallet.total_coins,
                "server balance differs after fulfillment; refresh the wallet to reconcile"
            );
        }

        let fulfilled_at = fulfillment
            .wish
            .and_then(|w| w.fulfilled_at)
            .unwrap_or_else(Utc::now);
        let wish = session
            .wish_mut(wish_id)
            .ok_or(EngineError::WishNotFound(wish_id))?;
        wish.is_fulfilled = true;
        wish.fulfilled_at = Some(fulfilled_at);

        tracing::info!(%wish_id, cost, balance, "wish fulfilled");
        Ok(wish.clone())
    }

    /// Validates a task form and creates the task.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] for a malformed form (the
    /// collaborator is not called), or [`EngineError::Remote`].
    pub async fn add_task(
        &self,
        session: &mut Session,
        draft: &TaskDraft,
    ) -> Result<Task, EngineError> {
        let new_task = validate_task(draft, session.categories(), self.limits).inspect_err(|e| {
            tracing::debug!(error = %e, "task form rejected");
        })?;
        let task = self.remote.submit_task_create(new_task).await?;
        tracing::info!(task_id = %task.id, category_id = %task.category_id, "task added");
        session.insert_task(task.clone());
        Ok(task)
    }

    /// Validates a wish form and creates the wish.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] for a malformed form (the
    /// collaborator is not called), or [`EngineError::Remote`].
    pub async fn add_wish(
        &self,
        session: &mut Session,
        draft: &WishDraft,
    ) -> Result<Wish, EngineError> {
        let new_wish = validate_wish(draft, self.limits).inspect_err(|e| {
            tracing::debug!(error = %e, "wish form rejected");
        })?;
        let wish = self.remote.submit_wish_create(new_wish).await?;
        tracing::info!(wish_id = %wish.id, cost = wish.coin_cost, "wish added");
        session.insert_wish(wish.clone());
        Ok(wish)
    }

    /// Deletes a task from either state.
    ///
    /// Deleting an id that is not in the session is a no-op and does not
    /// call the collaborator. Returns the removed task, if any.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Remote`] if the collaborator rejects the
    /// deletion; the task then stays in the session.
    pub async fn delete_task(
        &self,
        session: &mut Session,
        task_id: TaskId,
    ) -> Result<Option<Task>, EngineError> {
        if session.task(task_id).is_none() {
            tracing::debug!(%task_id, "delete of absent task ignored");
            return Ok(None);
        }
        self.remote.submit_task_delete(task_id).await?;
        tracing::info!(%task_id, "task deleted");
        Ok(session.remove_task(task_id))
    }

    /// Deletes a pending wish.
    ///
    /// Deleting an id that is not in the session is a no-op and does not
    /// call the collaborator. Returns the removed wish, if any.
    ///
    /// # Errors
    ///
    /// - [`EngineError::AlreadyFulfilled`] if the wish was fulfilled
    /// - [`EngineError::Remote`] if the collaborator rejects the deletion
    pub async fn delete_wish(
        &self,
        session: &mut Session,
        wish_id: WishId,
    ) -> Result<Option<Wish>, EngineError> {
        let Some(wish) = session.wish(wish_id) else {
            tracing::debug!(%wish_id, "delete of absent wish ignored");
            return Ok(None);
        };
        if wish.is_fulfilled {
            tracing::warn!(%wish_id, "rejected deletion of fulfilled wish");
            return Err(EngineError::AlreadyFulfilled(wish_id));
        }
        self.remote.submit_wish_delete(wish_id).await?;
        tracing::info!(%wish_id, "wish deleted");
        Ok(session.remove_wish(wish_id))
    }
}
