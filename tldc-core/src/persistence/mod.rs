//! Durable records shared by every session: config values, the model
//! registry, per-directory conversation state and per-path sync status.
//!
//! The rest of the crate only talks to the [`Store`] trait; [`SqliteStore`]
//! is the single on-disk implementation.

pub mod sqlite;
pub mod store;

pub use sqlite::SqliteStore;
pub use store::{ModelEntry, Store, SyncRecord};
