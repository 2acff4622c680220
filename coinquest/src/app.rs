//! Command runner behind the `coinquest` binary.
//!
//! An [`App`] owns the lifecycle manager, the fetched session and the
//! resolved configuration, and turns one [`Command`] into a JSON document.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use coinquest_proto::record::ServerSnapshot;
use coinquest_proto::{CategoryId, RecordError, TaskDraft, TaskId, WishDraft, WishId};
use serde_json::{Value, json};

use crate::calendar::WeekCursor;
use crate::config::{AppConfig, Command};
use crate::lifecycle::{EngineError, Lifecycle};
use crate::remote::memory::MemoryRemote;
use crate::remote::{Remote, RemoteError};
use crate::session::Session;

/// Errors surfaced by the command runner.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A lifecycle operation failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Fetching records from the collaborator failed.
    #[error("failed to load records: {0}")]
    Fetch(#[from] RemoteError),

    /// The fixture holds a record that does not validate.
    #[error("invalid fixture: {0}")]
    Record(#[from] RecordError),

    /// The fixture could not be read or written.
    #[error("fixture {path}: {source}")]
    Fixture {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The fixture could not be serialized.
    #[error("failed to encode fixture: {0}")]
    Encode(#[from] serde_json::Error),

    /// The requested week lies outside the representable calendar.
    #[error("week offset {0} is out of range")]
    WeekOutOfRange(i64),

    /// The requested room has no category.
    #[error("room not found: {0}")]
    RoomNotFound(CategoryId),
}

/// Reads a JSON fixture and seeds an in-memory server with it.
///
/// # Errors
///
/// Returns [`AppError::Fixture`] if the file cannot be read and
/// [`AppError::Record`] if it does not parse or validate.
pub fn load_fixture(path: &Path) -> Result<MemoryRemote, AppError> {
    let contents = std::fs::read_to_string(path).map_err(|source| AppError::Fixture {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot: ServerSnapshot = serde_json::from_str(&contents).map_err(RecordError::from)?;
    let remote = MemoryRemote::from_snapshot(snapshot)?;
    tracing::debug!(path = %path.display(), "fixture loaded");
    Ok(remote)
}

/// Writes the server state of `remote` back to `path`.
///
/// # Errors
///
/// Returns [`AppError::Encode`] or [`AppError::Fixture`].
pub fn save_fixture(path: &Path, remote: &MemoryRemote) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(&remote.snapshot())?;
    std::fs::write(path, json).map_err(|source| AppError::Fixture {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "fixture saved");
    Ok(())
}

/// One user's engine plus the settings the CLI resolved.
pub struct App<R> {
    engine: Lifecycle<R>,
    session: Session,
    config: AppConfig,
    today: NaiveDate,
}

impl<R: Remote> App<R> {
    /// Fetches the session from `remote` and prepares to run commands.
    ///
    /// `today` is used for week views unless the configuration pins a
    /// reference date.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Fetch`] if the session cannot be fetched.
    pub async fn open(remote: R, config: AppConfig, today: NaiveDate) -> Result<Self, AppError> {
        let session = Session::fetch(&remote).await?;
        let engine = Lifecycle::new(remote).with_limits(config.form_limits());
        Ok(Self {
            engine,
            session,
            config,
            today,
        })
    }

    /// Returns the current session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the collaborator.
    pub const fn remote(&self) -> &R {
        self.engine.remote()
    }

    /// Runs `command`, or prints an overview when there is none.
    ///
    /// # Errors
    ///
    /// Returns the [`AppError`] of the failing step. The session is left as
    /// it was before the command.
    pub async fn run(&mut self, command: Option<&Command>) -> Result<Value, AppError> {
        let Some(command) = command else {
            return Ok(self.overview());
        };
        tracing::debug!(?command, "running command");

        match command {
            Command::Week { offset } => self.week(*offset),
            Command::Rooms => Ok(json!({ "rooms": self.session.rooms() })),
            Command::Room { category_id } => self.room(CategoryId::new(*category_id)),
            Command::Wishes => Ok(self.wishes()),
            Command::Reward { task_id } => self.reward(TaskId::new(*task_id)),
            Command::Complete { task_id } => self.complete(TaskId::new(*task_id)).await,
            Command::Fulfill { wish_id } => {
                let wish = self
                    .engine
                    .fulfill_wish(&mut self.session, WishId::new(*wish_id))
                    .await?;
                Ok(json!({ "wish": wish, "wallet": self.session.wallet() }))
            }
            Command::AddTask {
                title,
                description,
                category,
                coins,
                due,
            } => {
                let draft = TaskDraft {
                    title: title.clone(),
                    description: description.clone(),
                    category_id: category.map(CategoryId::new),
                    base_coin_value: coins.clone(),
                    due_date: due.clone(),
                };
                let task = self.engine.add_task(&mut self.session, &draft).await?;
                Ok(json!({ "task": task }))
            }
            Command::AddWish {
                title,
                description,
                cost,
            } => {
                let draft = WishDraft {
                    title: title.clone(),
                    description: description.clone(),
                    coin_cost: cost
                        .clone()
                        .unwrap_or_else(|| self.config.default_wish_cost.to_string()),
                };
                let wish = self.engine.add_wish(&mut self.session, &draft).await?;
                Ok(json!({ "wish": wish }))
            }
            Command::DeleteTask { task_id } => {
                let removed = self
                    .engine
                    .delete_task(&mut self.session, TaskId::new(*task_id))
                    .await?;
                Ok(json!({ "deleted": removed }))
            }
            Command::DeleteWish { wish_id } => {
                let removed = self
                    .engine
                    .delete_wish(&mut self.session, WishId::new(*wish_id))
                    .await?;
                Ok(json!({ "deleted": removed }))
            }
        }
    }

    fn overview(&self) -> Value {
        json!({
            "account": self.session.account(),
            "wallet": self.session.wallet(),
            "rooms": self.session.rooms(),
            "wishes": self.session.wish_tally(),
        })
    }

    fn week(&self, offset: i64) -> Result<Value, AppError> {
        let reference = self.config.reference_date_or(self.today);
        let window = WeekCursor::with_offset(reference, offset)
            .window()
            .ok_or(AppError::WeekOutOfRange(offset))?;
        let days = self.session.week(&window);
        Ok(json!({
            "start": window.start(),
            "end": window.end(),
            "days": days,
        }))
    }

    fn room(&self, category_id: CategoryId) -> Result<Value, AppError> {
        let category = self
            .session
            .category(category_id)
            .ok_or(AppError::RoomNotFound(category_id))?;
        Ok(json!({
            "category": category,
            "progress": self.session.room_progress(category_id),
            "tasks": self.session.room(category_id),
        }))
    }

    fn wishes(&self) -> Value {
        let wishes: Vec<_> = self.session.wishes().collect();
        json!({
            "wallet": self.session.wallet(),
            "tally": self.session.wish_tally(),
            "wishes": wishes,
        })
    }

    fn reward(&self, task_id: TaskId) -> Result<Value, AppError> {
        let task = self
            .session
            .task(task_id)
            .ok_or(EngineError::TaskNotFound(task_id))?;
        let reward = self
            .session
            .reward_of(task)
            .map_err(|e| EngineError::missing_category(task_id, e))?;
        Ok(json!({ "task_id": task_id, "reward": reward }))
    }

    async fn complete(&mut self, task_id: TaskId) -> Result<Value, AppError> {
        let completion = self.engine.complete_task(&mut self.session, task_id).await?;
        if completion.needs_reconcile() {
            // The completion itself is confirmed; a failed refresh only
            // leaves the local balance stale.
            if let Err(e) = self.session.refresh_wallet(self.engine.remote()).await {
                tracing::warn!(error = %e, "wallet refresh after completion failed");
            }
        }
        Ok(json!({ "completion": completion, "wallet": self.session.wallet() }))
    }
}
