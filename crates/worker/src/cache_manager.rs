//! Versioned offline cache: precache on install, evict on activate, and
//! answer intercepted requests.
//!
//! ### Fetch strategies
//! - Non-http(s) requests are not intercepted.
//! - Manifest assets are cache-first. A network answer that is a same-origin
//!   200 is copied into the current store. A navigation that fails on the
//!   network falls back to the cached root document.
//! - Everything else is network-first, falling back to any cached entry for
//!   the exact request key. Without one the network error is returned.

use std::sync::Arc;

use cendres_core::{Error, OriginDb, Request, ResponseSnapshot};
use futures::future::try_join_all;
use url::Url;

use crate::fetch::Network;
use crate::manifest::StaticAssetManifest;

/// Which source answered an intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not intercepted; the platform handles the request itself.
    Passthrough,
    /// Served from cache without touching the network.
    Cache(ResponseSnapshot),
    Network(ResponseSnapshot),
    /// Network failed; served a cached substitute.
    Fallback(ResponseSnapshot),
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&ResponseSnapshot> {
        match self {
            FetchOutcome::Passthrough => None,
            FetchOutcome::Cache(r) | FetchOutcome::Network(r) | FetchOutcome::Fallback(r) => Some(r),
        }
    }

    fn source(&self) -> &'static str {
        match self {
            FetchOutcome::Passthrough => "passthrough",
            FetchOutcome::Cache(_) => "cache",
            FetchOutcome::Network(_) => "network",
            FetchOutcome::Fallback(_) => "fallback",
        }
    }
}

/// Owns one cache version and the strategies that read and fill it.
pub struct CacheManager {
    db: Arc<OriginDb>,
    network: Arc<dyn Network>,
    version: String,
    manifest: StaticAssetManifest,
    origin: Url,
}

impl CacheManager {
    pub fn new(
        db: Arc<OriginDb>, network: Arc<dyn Network>, version: impl Into<String>, manifest: StaticAssetManifest,
        origin: Url,
    ) -> Self {
        Self { db, network, version: version.into(), manifest, origin }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn manifest(&self) -> &StaticAssetManifest {
        &self.manifest
    }

    /// Precache every manifest asset into the current store.
    ///
    /// All assets are fetched before anything is written. If any fetch fails
    /// or answers with a non-2xx or opaque response, nothing is stored.
    pub async fn install(&self) -> Result<usize, Error> {
        tracing::info!(version = %self.version, assets = self.manifest.len(), "precaching");

        let requests = self.manifest.requests(&self.origin)?;
        let fetches = requests.into_iter().map(|request| async move {
            let response = self
                .network
                .fetch(&request)
                .await
                .map_err(|e| Error::CacheTransaction(format!("{}: {e}", request.url)))?;
            if !response.is_success() || response.response_type == cendres_core::ResponseType::Opaque {
                return Err(Error::CacheTransaction(format!("{}: status {}", request.url, response.status)));
            }
            Ok((request, response))
        });

        let entries = match try_join_all(fetches).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(version = %self.version, error = %e, "precache failed");
                return Err(e);
            }
        };

        let stored = self
            .db
            .put_all(&self.version, entries)
            .await
            .map_err(|e| Error::CacheTransaction(e.to_string()))?;

        tracing::info!(version = %self.version, stored, "precache complete");
        Ok(stored)
    }

    /// Delete every store not named after the current version.
    ///
    /// Returns the names that were deleted.
    pub async fn activate(&self) -> Result<Vec<String>, Error> {
        let mut deleted = Vec::new();
        for name in self.db.cache_names().await? {
            if name == self.version {
                continue;
            }
            if self.db.delete_cache(&name).await? {
                tracing::info!(cache = %name, "deleted stale cache");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Answer an intercepted request.
    pub async fn handle_fetch(&self, request: &Request) -> Result<FetchOutcome, Error> {
        if !request.is_http() {
            return Ok(FetchOutcome::Passthrough);
        }

        let outcome = if self.manifest.matches(request, &self.origin) {
            self.cache_first(request).await
        } else {
            self.network_first(request).await
        };

        match &outcome {
            Ok(o) => tracing::debug!(url = %request.url, source = o.source(), "fetch answered"),
            Err(e) => tracing::debug!(url = %request.url, error = %e, "fetch failed"),
        }
        outcome
    }

    async fn cache_first(&self, request: &Request) -> Result<FetchOutcome, Error> {
        if let Some(hit) = self.lookup(request).await {
            return Ok(FetchOutcome::Cache(hit));
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable()
                    && request.is_same_origin(&self.origin)
                    && let Err(e) = self.db.put_entry(&self.version, request, response.clone()).await
                {
                    tracing::warn!(url = %request.url, error = %e, "failed to cache response");
                }
                Ok(FetchOutcome::Network(response))
            }
            Err(e) if e.is_network() && request.is_navigation() => match self.cached_root().await {
                Some(root) => Ok(FetchOutcome::Fallback(root)),
                None => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    async fn network_first(&self, request: &Request) -> Result<FetchOutcome, Error> {
        match self.network.fetch(request).await {
            Ok(response) => Ok(FetchOutcome::Network(response)),
            Err(e) if e.is_network() => match self.lookup(request).await {
                Some(hit) => Ok(FetchOutcome::Fallback(hit)),
                None => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    /// Search every store; a storage failure reads as a miss.
    async fn lookup(&self, request: &Request) -> Option<ResponseSnapshot> {
        match self.db.match_any(request).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "cache read failed");
                None
            }
        }
    }

    async fn cached_root(&self) -> Option<ResponseSnapshot> {
        match self.origin.join("/") {
            Ok(root) => self.lookup(&Request::get(root)).await,
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct StubNetwork {
        responses: HashMap<String, ResponseSnapshot>,
        offline: AtomicBool,
        calls: AtomicUsize,
    }

    impl StubNetwork {
        fn serving(paths: &[&str]) -> Self {
            let responses = paths
                .iter()
                .map(|p| {
                    let url = format!("http://localhost:3000{p}");
                    (url.clone(), ResponseSnapshot::ok(url, "text/plain", format!("body of {p}")))
                })
                .collect();
            Self { responses, ..Default::default() }
        }
    }

    #[async_trait]
    impl Network for StubNetwork {
        async fn fetch(&self, request: &Request) -> Result<ResponseSnapshot, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                return Err(Error::Fetch("offline".into()));
            }
            match self.responses.get(request.url.as_str()) {
                Some(r) => Ok(r.clone()),
                None => {
                    let mut missing = ResponseSnapshot::ok(request.url.as_str(), "text/plain", "");
                    missing.status = 404;
                    Ok(missing)
                }
            }
        }
    }

    async fn manager(network: Arc<StubNetwork>, version: &str) -> (CacheManager, Arc<OriginDb>) {
        let db = Arc::new(OriginDb::open_in_memory().await.unwrap());
        let manifest = StaticAssetManifest::new(["/", "/manifest.json"]);
        let origin = Url::parse("http://localhost:3000").unwrap();
        (CacheManager::new(db.clone(), network, version, manifest, origin), db)
    }

    #[tokio::test]
    async fn test_install_stores_every_asset() {
        let network = Arc::new(StubNetwork::serving(&["/", "/manifest.json"]));
        let (cm, db) = manager(network, "v1").await;

        assert_eq!(cm.install().await.unwrap(), 2);
        assert_eq!(db.entry_count("v1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_install_rejects_error_status() {
        let network = Arc::new(StubNetwork::serving(&["/"]));
        let (cm, db) = manager(network, "v1").await;

        let err = cm.install().await.unwrap_err();
        assert!(matches!(err, Error::CacheTransaction(_)));
        assert!(!db.has_cache("v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_activate_keeps_current() {
        let network = Arc::new(StubNetwork::serving(&["/", "/manifest.json"]));
        let (cm, db) = manager(network, "v2").await;
        db.open_cache("v1").await.unwrap();
        db.open_cache("other").await.unwrap();
        cm.install().await.unwrap();

        let deleted = cm.activate().await.unwrap();
        assert_eq!(deleted, vec!["v1".to_string(), "other".to_string()]);
        assert_eq!(db.cache_names().await.unwrap(), vec!["v2".to_string()]);
    }

    #[tokio::test]
    async fn test_non_http_passes_through() {
        let network = Arc::new(StubNetwork::default());
        let (cm, _db) = manager(network.clone(), "v1").await;
        let request = Request::parse("chrome-extension://abc/script.js").unwrap();

        assert_eq!(cm.handle_fetch(&request).await.unwrap(), FetchOutcome::Passthrough);
        assert_eq!(network.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cache_first_stores_network_copy() {
        let network = Arc::new(StubNetwork::serving(&["/manifest.json"]));
        let (cm, db) = manager(network.clone(), "v1").await;
        let request = Request::parse("http://localhost:3000/manifest.json").unwrap();

        assert!(matches!(cm.handle_fetch(&request).await.unwrap(), FetchOutcome::Network(_)));
        assert_eq!(db.entry_count("v1").await.unwrap(), 1);

        assert!(matches!(cm.handle_fetch(&request).await.unwrap(), FetchOutcome::Cache(_)));
        assert_eq!(network.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_first_does_not_store_errors() {
        let network = Arc::new(StubNetwork::default());
        let (cm, db) = manager(network, "v1").await;
        let request = Request::parse("http://localhost:3000/manifest.json").unwrap();

        let outcome = cm.handle_fetch(&request).await.unwrap();
        assert_eq!(outcome.response().unwrap().status, 404);
        assert_eq!(db.entry_count("v1").await.unwrap(), 0);
    }
}
