//! Worker versions and their lifecycle states.

use std::fmt;

use cendres_core::AppConfig;

use crate::cache_manager::CacheManager;
use crate::manifest::StaticAssetManifest;

/// Lifecycle of one worker version.
///
/// `Parsed → Installing → Installed → Activating → Activated`. A failed
/// install or a superseded worker ends in `Redundant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installing,
    /// Installed and waiting for the previous version to step aside.
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deployable worker: its cache version and static manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerScript {
    pub version: String,
    pub manifest: StaticAssetManifest,
}

impl WorkerScript {
    pub fn new(version: impl Into<String>, manifest: StaticAssetManifest) -> Self {
        Self { version: version.into(), manifest }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.cache_version.clone(), StaticAssetManifest::new(config.static_assets.iter().cloned()))
    }
}

/// One worker version bound to its cache.
pub struct Worker {
    state: WorkerState,
    cache: CacheManager,
}

impl Worker {
    pub(crate) fn new(cache: CacheManager) -> Self {
        Self { state: WorkerState::Parsed, cache }
    }

    pub fn version(&self) -> &str {
        self.cache.version()
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub(crate) fn transition(&mut self, next: WorkerState) {
        tracing::debug!(version = %self.version(), from = %self.state, to = %next, "worker state");
        self.state = next;
    }
}
