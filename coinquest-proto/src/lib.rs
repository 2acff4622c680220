//! Domain records shared by the `coinquest` engine and its collaborators.
//!
//! The typed records ([`account::Account`], [`task::Task`], [`category::Category`], [`wish::Wish`],
//! [`wallet::Wallet`]) carry the invariants the engine relies on. Server
//! payloads enter through [`record`], which validates them into those types.

pub mod account;
pub mod category;
pub mod record;
pub mod task;
pub mod wallet;
pub mod wish;

pub use account::Account;
pub use category::{Category, CategoryId, Multiplier};
pub use record::RecordError;
pub use task::{NewTask, Task, TaskDraft, TaskId};
pub use wallet::Wallet;
pub use wish::{NewWish, Wish, WishDraft, WishId};
