//! Per-origin persistent storage on SQLite.
//!
//! One database holds everything an origin can persist:
//!
//! - Named cache stores with request-keyed response snapshots
//! - A string key/value store for page-side settings
//!
//! Access is async via tokio-rusqlite; statements are serialised on a
//! background thread, so writes to the same key are last-writer-wins.

pub mod caches;
pub mod connection;
pub mod hash;
pub mod local;
pub mod migrations;

pub use crate::Error;

pub use connection::OriginDb;
pub use local::{KeyValueStore, MemoryStore};
