//! # queuedesk-store
//!
//! SQLite persistence for QueueDesk.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for tickets and
//! counters, plus an [`Allocation`] transaction for queue-number
//! read-modify-write.

pub mod allocation;
pub mod counters;
pub mod database;
pub mod migrations;
pub mod models;
pub mod tickets;

mod error;

pub use allocation::Allocation;
pub use database::Database;
pub use error::StoreError;
pub use models::*;
