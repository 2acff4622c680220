//! In-memory collaborator for tests and offline use.
//!
//! [`MemoryRemote`] keeps the authoritative server state in process, behind
//! a [`parking_lot::Mutex`] that is never held across an await point. It
//! assigns ids, applies rewards and debits the way the server does, and can
//! be told to fail its next call to exercise error paths.

use std::collections::BTreeMap;

use chrono::Utc;
use coinquest_proto::record::{
    CategoryRecord, CompletionReceipt, LooseInt, Profile, ServerSnapshot, TodoRecord, UserRecord,
    WishRecord, decode_all,
};
use coinquest_proto::{
    Account, Category, NewTask, NewWish, RecordError, Task, TaskId, Wallet, Wish, WishId,
};
use parking_lot::Mutex;

use super::{Fulfillment, Remote, RemoteError};
use crate::reward::reward_for;

/// Server-side state.
#[derive(Debug, Default)]
struct ServerState {
    account: Account,
    wallet: Wallet,
    tasks: BTreeMap<TaskId, Task>,
    categories: Vec<Category>,
    wishes: BTreeMap<WishId, Wish>,
    /// Highest task id in use; new ids are assigned above it.
    last_task_id: u64,
    /// Highest wish id in use.
    last_wish_id: u64,
    /// Extra coins granted on every completion on top of the computed reward.
    completion_bonus: u64,
    /// Error returned by the next call instead of running it.
    fail_next: Option<RemoteError>,
    /// Names of the operations invoked, in order.
    calls: Vec<&'static str>,
}

impl ServerState {
    fn begin(&mut self, op: &'static str) -> Result<(), RemoteError> {
        self.calls.push(op);
        match self.fail_next.take() {
            Some(err) => {
                tracing::debug!(op, %err, "injected failure");
                Err(err)
            }
            None => Ok(()),
        }
    }
}

/// In-process [`Remote`] backed by a mutex-guarded [`ServerState`].
#[derive(Debug, Default)]
pub struct MemoryRemote {
    state: Mutex<ServerState>,
}

impl MemoryRemote {
    /// Creates an empty server with no categories, tasks or wishes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a server from wire-shaped records.
    ///
    /// # Errors
    ///
    /// Returns the first [`RecordError`] found while validating the snapshot.
    pub fn from_snapshot(snapshot: ServerSnapshot) -> Result<Self, RecordError> {
        let categories: Vec<Category> = decode_all(snapshot.categories)?;
        let tasks: Vec<Task> = decode_all(snapshot.todos)?;
        let profile = Profile::try_from(snapshot.user)?;

        let last_task_id = tasks.iter().map(|t| t.id.get()).max().unwrap_or(0);
        let last_wish_id = profile.wishes.iter().map(|w| w.id.get()).max().unwrap_or(0);

        let state = ServerState {
            account: profile.account,
            wallet: profile.wallet,
            tasks: tasks.into_iter().map(|t| (t.id, t)).collect(),
            categories,
            wishes: profile.wishes.into_iter().map(|w| (w.id, w)).collect(),
            last_task_id,
            last_wish_id,
            ..ServerState::default()
        };
        Ok(Self {
            state: Mutex::new(state),
        })
    }

    /// Builder: adds a category.
    #[must_use]
    pub fn with_category(self, category: Category) -> Self {
        self.state.lock().categories.push(category);
        self
    }

    /// Builder: sets the signed-in user.
    #[must_use]
    pub fn with_account(self, account: Account) -> Self {
        self.state.lock().account = account;
        self
    }

    /// Builder: sets the starting balance.
    #[must_use]
    pub fn with_wallet(self, wallet: Wallet) -> Self {
        self.state.lock().wallet = wallet;
        self
    }

    /// Builder: stores an existing task as-is.
    #[must_use]
    pub fn with_task(self, task: Task) -> Self {
        {
            let mut state = self.state.lock();
            state.last_task_id = state.last_task_id.max(task.id.get());
            state.tasks.insert(task.id, task);
        }
        self
    }

    /// Builder: stores an existing wish as-is.
    #[must_use]
    pub fn with_wish(self, wish: Wish) -> Self {
        {
            let mut state = self.state.lock();
            state.last_wish_id = state.last_wish_id.max(wish.id.get());
            state.wishes.insert(wish.id, wish);
        }
        self
    }

    /// Makes the server credit `bonus` extra coins on every completion.
    pub fn set_completion_bonus(&self, bonus: u64) {
        self.state.lock().completion_bonus = bonus;
    }

    /// Makes the next call fail with `err` without touching any state.
    pub fn fail_next(&self, err: RemoteError) {
        self.state.lock().fail_next = Some(err);
    }

    /// Returns the names of the operations invoked so far.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().calls.clone()
    }

    /// Returns the server-side wallet.
    #[must_use]
    pub fn wallet(&self) -> Wallet {
        self.state.lock().wallet
    }

    /// Exports the server state in wire shape.
    #[must_use]
    pub fn snapshot(&self) -> ServerSnapshot {
        let state = self.state.lock();
        ServerSnapshot {
            todos: state.tasks.values().map(TodoRecord::from).collect(),
            categories: state.categories.iter().map(CategoryRecord::from).collect(),
            user: UserRecord {
                username: state.account.username.clone(),
                email: state.account.email.clone(),
                total_coins: Some(LooseInt::from(state.wallet.total_coins)),
                wishes: state.wishes.values().map(WishRecord::from).collect(),
            },
        }
    }

    fn with_state<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut ServerState) -> Result<T, RemoteError>,
    ) -> Result<T, RemoteError> {
        let mut state = self.state.lock();
        state.begin(op)?;
        f(&mut state)
    }
}

impl Remote for MemoryRemote {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, RemoteError> {
        self.with_state("fetch_tasks", |s| Ok(s.tasks.values().cloned().collect()))
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, RemoteError> {
        self.with_state("fetch_categories", |s| Ok(s.categories.clone()))
    }

    async fn fetch_wallet(&self) -> Result<Wallet, RemoteError> {
        self.with_state("fetch_wallet", |s| Ok(s.wallet))
    }

    async fn fetch_wishes(&self) -> Result<Vec<Wish>, RemoteError> {
        self.with_state("fetch_wishes", |s| Ok(s.wishes.values().cloned().collect()))
    }

    async fn fetch_account(&self) -> Result<Account, RemoteError> {
        self.with_state("fetch_account", |s| Ok(s.account.clone()))
    }

    async fn submit_task_completion(
        &self,
        task_id: TaskId,
    ) -> Result<CompletionReceipt, RemoteError> {
        self.with_state("submit_task_completion", |s| {
            let task = s
                .tasks
                .get(&task_id)
                .ok_or_else(|| RemoteError::rejected(404, format!("todo {task_id} not found")))?;
            if task.completed {
                return Err(RemoteError::rejected(400, "todo already completed"));
            }
            let reward = reward_for(task, &s.categories)
                .map_err(|e| RemoteError::rejected(422, e.to_string()))?;
            let coins_earned = reward.saturating_add(s.completion_bonus);

            s.wallet.credit(coins_earned);
            if let Some(task) = s.tasks.get_mut(&task_id) {
                task.completed = true;
            }
            Ok(CompletionReceipt { coins_earned })
        })
    }

    async fn submit_wish_fulfillment(&self, wish_id: WishId) -> Result<Fulfillment, RemoteError> {
        self.with_state("submit_wish_fulfillment", |s| {
            let wish = s
                .wishes
                .get_mut(&wish_id)
                .ok_or_else(|| RemoteError::rejected(404, format!("wish {wish_id} not found")))?;
            if wish.is_fulfilled {
                return Err(RemoteError::rejected(400, "wish already fulfilled"));
            }
            if s.wallet.debit(wish.coin_cost).is_none() {
                return Err(RemoteError::rejected(400, "insufficient coins"));
            }
            wish.is_fulfilled = true;
            wish.fulfilled_at = Some(Utc::now());
            Ok(Fulfillment {
                wallet: s.wallet,
                wish: Some(wish.clone()),
            })
        })
    }

    async fn submit_task_create(&self, task: NewTask) -> Result<Task, RemoteError> {
        self.with_state("submit_task_create", |s| {
            let category = s
                .categories
                .iter()
                .find(|c| c.id == task.category_id)
                .cloned()
                .ok_or_else(|| {
                    RemoteError::rejected(422, format!("category {} not found", task.category_id))
                })?;
            let id = s
                .last_task_id
                .checked_add(1)
                .map(TaskId::new)
                .ok_or_else(|| RemoteError::rejected(507, "no task ids left"))?;
            s.last_task_id = id.get();

            let stored = Task {
                id,
                title: task.title,
                description: task.description,
                category_id: task.category_id,
                base_coin_value: task.base_coin_value,
                due_date: task.due_date,
                completed: false,
                category: Some(category),
            };
            s.tasks.insert(id, stored.clone());
            Ok(stored)
        })
    }

    async fn submit_wish_create(&self, wish: NewWish) -> Result<Wish, RemoteError> {
        self.with_state("submit_wish_create", |s| {
            let id = s
                .last_wish_id
                .checked_add(1)
                .map(WishId::new)
                .ok_or_else(|| RemoteError::rejected(507, "no wish ids left"))?;
            s.last_wish_id = id.get();

            let stored = Wish {
                id,
                title: wish.title,
                description: wish.description,
                coin_cost: wish.coin_cost,
                is_fulfilled: false,
                created_at: Utc::now(),
                fulfilled_at: None,
            };
            s.wishes.insert(id, stored.clone());
            Ok(stored)
        })
    }

    async fn submit_task_delete(&self, task_id: TaskId) -> Result<(), RemoteError> {
        self.with_state("submit_task_delete", |s| {
            s.tasks
                .remove(&task_id)
                .map(|_| ())
                .ok_or_else(|| RemoteError::rejected(404, format!("todo {task_id} not found")))
        })
    }

    async fn submit_wish_delete(&self, wish_id: WishId) -> Result<(), RemoteError> {
        self.with_state("submit_wish_delete", |s| {
            s.wishes
                .remove(&wish_id)
                .map(|_| ())
                .ok_or_else(|| RemoteError::rejected(404, format!("wish {wish_id} not found")))
        })
    }
}
