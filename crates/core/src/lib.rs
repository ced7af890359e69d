//! Core types and shared functionality for the Cendres offline shell.
//!
//! This crate provides:
//! - Per-origin SQLite storage (cache stores and key/value items)
//! - Notification preferences and notification options
//! - Messages passed between the page and the service worker
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod http;
pub mod keys;
pub mod message;
pub mod notification;
pub mod prefs;
pub mod storage;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use http::{Destination, Request, RequestMode, ResponseSnapshot, ResponseType};
pub use message::{ClientMessage, WorkerMessage};
pub use notification::{
    DisplayedNotification, NotificationAction, NotificationCenter, NotificationData, NotificationOptions,
};
pub use prefs::{Frequency, PreferenceStore, Preferences};
pub use storage::{KeyValueStore, MemoryStore, OriginDb};
