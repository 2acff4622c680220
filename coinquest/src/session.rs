//! The owned per-user snapshot every engine operation works on.
//!
//! A [`Session`] holds the wallet, tasks, categories and wishes of one user.
//! It is built by a full fetch from the [`Remote`] and is the only place the
//! lifecycle manager reads or writes state. After a failed mutation the
//! caller should rebuild it with [`Session::fetch`] rather than trust a
//! local merge.

use std::collections::BTreeMap;

use coinquest_proto::{Account, Category, CategoryId, Task, TaskId, Wallet, Wish, WishId};
use serde::Serialize;

use crate::calendar::{DayTasks, WeekWindow, partition_week};
use crate::progress::{RoomSummary, room_progress, room_summaries, room_tasks};
use crate::remote::{Remote, RemoteError};
use crate::reward::{MissingCategory, reward_for};

/// Counts of wishes by state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WishTally {
    /// Wishes already bought.
    pub fulfilled: usize,
    /// Wishes still waiting.
    pub pending: usize,
}

/// Snapshot of one user's records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    account: Account,
    wallet: Wallet,
    tasks: BTreeMap<TaskId, Task>,
    categories: Vec<Category>,
    wishes: BTreeMap<WishId, Wish>,
}

impl Session {
    /// Builds a session from already-decoded records.
    #[must_use]
    pub fn new(
        wallet: Wallet,
        tasks: Vec<Task>,
        categories: Vec<Category>,
        wishes: Vec<Wish>,
    ) -> Self {
        Self {
            account: Account::default(),
            wallet,
            tasks: tasks.into_iter().map(|t| (t.id, t)).collect(),
            categories,
            wishes: wishes.into_iter().map(|w| (w.id, w)).collect(),
        }
    }

    /// Fetches a fresh session from the collaborator.
    ///
    /// # Errors
    ///
    /// Returns the first [`RemoteError`] raised by any of the fetches.
    pub async fn fetch<R: Remote>(remote: &R) -> Result<Self, RemoteError> {
        let tasks = remote.fetch_tasks().await?;
        let categories = remote.fetch_categories().await?;
        let wallet = remote.fetch_wallet().await?;
        let wishes = remote.fetch_wishes().await?;
        let account = remote.fetch_account().await?;
        tracing::debug!(
            username = %account.username,
            tasks = tasks.len(),
            categories = categories.len(),
            wishes = wishes.len(),
            coins = wallet.total_coins,
            "session fetched"
        );
        Ok(Self::new(wallet, tasks, categories, wishes).with_account(account))
    }

    /// Builder: sets who the records belong to.
    #[must_use]
    pub fn with_account(mut self, account: Account) -> Self {
        self.account = account;
        self
    }

    /// Replaces the local wallet with the server's.
    ///
    /// This is where locally computed rewards are reconciled with what the
    /// server actually credited.
    ///
    /// # Errors
    ///
    /// Returns the [`RemoteError`] of the fetch; the local wallet is kept.
    pub async fn refresh_wallet<R: Remote>(&mut self, remote: &R) -> Result<Wallet, RemoteError> {
        let server = remote.fetch_wallet().await?;
        if server != self.wallet {
            tracing::info!(
                local = self.wallet.total_coins,
                server = server.total_coins,
                "wallet reconciled with server"
            );
        }
        self.wallet = server;
        Ok(server)
    }

    /// Returns the signed-in user.
    #[must_use]
    pub const fn account(&self) -> &Account {
        &self.account
    }

    /// Returns the wallet.
    #[must_use]
    pub const fn wallet(&self) -> Wallet {
        self.wallet
    }

    /// Returns all tasks, ordered by id.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> + Clone {
        self.tasks.values()
    }

    /// Returns a task by id.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Returns all categories, in server order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Returns a category by id.
    #[must_use]
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Returns all wishes, ordered by id.
    pub fn wishes(&self) -> impl Iterator<Item = &Wish> + Clone {
        self.wishes.values()
    }

    /// Returns a wish by id.
    #[must_use]
    pub fn wish(&self, id: WishId) -> Option<&Wish> {
        self.wishes.get(&id)
    }

    /// Returns the coins `task` would earn if completed now.
    ///
    /// # Errors
    ///
    /// Returns [`MissingCategory`] if the task's category cannot be resolved.
    pub fn reward_of(&self, task: &Task) -> Result<u64, MissingCategory> {
        reward_for(task, &self.categories)
    }

    /// Groups the session's tasks by day across `window`.
    #[must_use]
    pub fn week(&self, window: &WeekWindow) -> Vec<DayTasks<'_>> {
        partition_week(self.tasks.values(), window)
    }

    /// Returns the tasks filed in the room `category_id`.
    #[must_use]
    pub fn room(&self, category_id: CategoryId) -> Vec<&Task> {
        room_tasks(self.tasks.values(), category_id)
    }

    /// Returns the completion percentage of the room `category_id`.
    #[must_use]
    pub fn room_progress(&self, category_id: CategoryId) -> u8 {
        room_progress(self.tasks.values(), category_id)
    }

    /// Summarizes every room.
    #[must_use]
    pub fn rooms(&self) -> Vec<RoomSummary> {
        room_summaries(self.tasks.values(), &self.categories)
    }

    /// Counts wishes by state.
    #[must_use]
    pub fn wish_tally(&self) -> WishTally {
        self.wishes
            .values()
            .fold(WishTally::default(), |mut tally, wish| {
                if wish.is_fulfilled {
                    tally.fulfilled += 1;
                } else {
                    tally.pending += 1;
                }
                tally
            })
    }

    pub(crate) const fn wallet_mut(&mut self) -> &mut Wallet {
        &mut self.wallet
    }

    pub(crate) fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(&id)
    }

    pub(crate) fn wish_mut(&mut self, id: WishId) -> Option<&mut Wish> {
        self.wishes.get_mut(&id)
    }

    pub(crate) fn insert_task(&mut self, task: Task) {
        self.tasks.insert(task.id, task);
    }

    pub(crate) fn insert_wish(&mut self, wish: Wish) {
        self.wishes.insert(wish.id, wish);
    }

    pub(crate) fn remove_task(&mut self, id: TaskId) -> Option<Task> {
        self.tasks.remove(&id)
    }

    pub(crate) fn remove_wish(&mut self, id: WishId) -> Option<Wish> {
        self.wishes.remove(&id)
    }
}
