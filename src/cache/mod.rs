//! Local persistence for offline reading.
//!
//! This module provides:
//! - A key-value storage trait with atomic multi-key writes, backed by SQLite
//! - An article store that keeps one snapshot of the latest collection and
//!   only serves it while it is younger than the configured TTL

mod storage;
mod store;

pub use storage::{KeyValueStore, SqliteStorage};
pub use store::{ArticleStore, CacheEntry};
