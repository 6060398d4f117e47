//! The file module provides the sandboxed view of the working directory that
//! the model operates on.
//!
//! ## Architecture
//!
//! ### exclude.rs
//! Exclusion rules: relative paths hidden from tracking (`.git`, `.venv`, ...)
//! and basenames hidden anywhere in the tree (`__pycache__`).
//!
//! ### tree.rs
//! `WorkingDirectory`: the canonical root plus enumeration of everything
//! visible beneath it.
//!
//! ### resolver.rs
//! Maps paths supplied by the model onto real paths, refusing anything that
//! escapes the root or reaches into `.git`.
//!
//! ### modify.rs
//! Whole file and single match search/replace edits.
//!
//! ### access.rs
//! `FileAccessGateway`: read, write and list. Every operation goes through the
//! resolver first and keeps the staleness cache current: reads and listings
//! mark paths synced, writes invalidate every ancestor directory.

pub mod access;
pub mod error;
pub mod exclude;
pub mod modify;
pub mod resolver;
pub mod tree;

pub use access::{FileAccessGateway, ListEntry, WriteOutcome};
pub use error::{AccessError, FileError};
pub use tree::WorkingDirectory;
