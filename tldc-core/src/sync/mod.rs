//! Tracks which paths of the working directory changed since the assistant
//! last looked at them.
//!
//! Every visible path has a [`crate::persistence::SyncRecord`]: its last
//! known checksum and a synced flag. Reads and listings set the flag, any
//! checksum change clears it, and writes clear it on every ancestor
//! directory.

pub mod cache;
pub mod checksum;

pub use cache::StalenessCache;
pub use checksum::MISSING_CHECKSUM;
