//! Service worker for the Cendres offline shell.
//!
//! This crate provides:
//! - The registration state machine (install, wait, activate, redundant)
//! - The static asset manifest and versioned cache strategies
//! - The network port and its reqwest implementation
//! - The push channel and notification click routing
//! - The window-client port

pub mod cache_manager;
pub mod clients;
pub mod fetch;
pub mod lifecycle;
pub mod manifest;
pub mod push;
pub mod registration;

pub use cache_manager::{CacheManager, FetchOutcome};
pub use clients::{Clients, WindowClient};
pub use fetch::{HttpNetwork, Network, NetworkConfig};
pub use lifecycle::{Worker, WorkerScript, WorkerState};
pub use manifest::StaticAssetManifest;
pub use push::{ClickOutcome, PushChannel, PushDefaults, PushPayload};
pub use registration::{Registration, WorkerEvent, WorkerOutcome, WorkerPlatform};
