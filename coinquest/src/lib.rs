//! `Coinquest` reward and progression engine for a gamified to-do list.

pub mod app;
pub mod calendar;
pub mod config;
pub mod lifecycle;
pub mod progress;
pub mod remote;
pub mod reward;
pub mod session;
