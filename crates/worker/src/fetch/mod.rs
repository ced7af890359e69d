//! Network access for the worker.
//!
//! The fetch handler talks to the network through the [`Network`] port so
//! strategies can be exercised without sockets. [`HttpNetwork`] is the
//! reqwest-backed implementation.
//!
//! ### Failure semantics
//! - Transport failures (DNS, refused, reset, timeout) are `Error::Fetch`
//!   and are the only errors that trigger a cache fallback.
//! - HTTP error statuses are responses, returned as `Ok`.
//! - No timeout is applied unless one is configured.

pub mod url;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use cendres_core::{AppConfig, Error, Request, ResponseSnapshot, ResponseType};
use reqwest::{Client, Method, header};

pub use url::{UrlError, canonicalize, resolve};

/// Outbound network port.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request, buffering the whole response.
    async fn fetch(&self, request: &Request) -> Result<ResponseSnapshot, Error>;
}

/// Configuration for the HTTP network.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// User agent string (default: "cendres/0.1")
    pub user_agent: String,

    /// Request timeout (default: none)
    pub timeout: Option<Duration>,

    /// Origin used to classify responses as same-origin
    pub origin: ::url::Url,
}

impl NetworkConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self { user_agent: config.user_agent.clone(), timeout: config.fetch_timeout(), origin })
    }
}

/// reqwest-backed network.
pub struct HttpNetwork {
    http: Client,
    config: NetworkConfig,
}

impl HttpNetwork {
    /// Create a new network client with the given configuration.
    pub fn new(config: NetworkConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Classify by where the response came from after redirects.
    fn response_type(&self, request: &Request, final_url: &::url::Url) -> ResponseType {
        if final_url.origin() == self.config.origin.origin() {
            ResponseType::Basic
        } else if request.mode == cendres_core::RequestMode::NoCors {
            ResponseType::Opaque
        } else {
            ResponseType::Cors
        }
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<ResponseSnapshot, Error> {
        let start = Instant::now();
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| Error::InvalidUrl(format!("invalid method {}: {e}", request.method)))?;

        let mut builder = self.http.request(method, request.url.as_str());
        if let Some(accept) = &request.accept {
            builder = builder.header(header::ACCEPT, accept);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("network error: {e}")))?;

        let status = response.status();
        let final_url = response.url().clone();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Fetch(format!("failed to read response: {e}")))?;

        tracing::debug!(
            url = %request.url,
            status = status.as_u16(),
            bytes = body.len(),
            fetch_ms = start.elapsed().as_millis() as u64,
            "network fetch"
        );

        Ok(ResponseSnapshot {
            url: final_url.to_string(),
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            response_type: self.response_type(request, &final_url),
            content_type,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> NetworkConfig {
        NetworkConfig::from_app_config(&AppConfig::default()).unwrap()
    }

    #[test]
    fn test_network_config_from_app_config() {
        let config = config();
        assert_eq!(config.user_agent, "cendres/0.1");
        assert!(config.timeout.is_none());
        assert_eq!(config.origin.as_str(), "http://localhost:3000/");
    }

    #[tokio::test]
    async fn test_http_network_new() {
        assert!(HttpNetwork::new(config()).is_ok());
        let with_timeout = NetworkConfig { timeout: Some(Duration::from_secs(5)), ..config() };
        assert!(HttpNetwork::new(with_timeout).is_ok());
    }

    #[test]
    fn test_response_type_classification() {
        let network = HttpNetwork::new(config()).unwrap();
        let same = Request::parse("http://localhost:3000/manifest.json").unwrap();
        let cross = Request::parse("https://fonts.gstatic.com/font.woff2").unwrap();
        let opaque = cross.clone().with_mode(cendres_core::RequestMode::NoCors);

        assert_eq!(network.response_type(&same, &same.url), ResponseType::Basic);
        assert_eq!(network.response_type(&cross, &cross.url), ResponseType::Cors);
        assert_eq!(network.response_type(&opaque, &opaque.url), ResponseType::Opaque);
    }

    #[test]
    fn test_redirect_off_origin_is_not_basic() {
        let network = HttpNetwork::new(config()).unwrap();
        let request = Request::parse("http://localhost:3000/zplace/logo.png").unwrap();
        let landed = ::url::Url::parse("https://cdn.example.net/logo.png").unwrap();

        assert_eq!(network.response_type(&request, &landed), ResponseType::Cors);
        let no_cors = request.with_mode(cendres_core::RequestMode::NoCors);
        assert_eq!(network.response_type(&no_cors, &landed), ResponseType::Opaque);
    }

    #[tokio::test]
    async fn test_unreachable_is_network_error() {
        let network = HttpNetwork::new(config()).unwrap();
        let request = Request::parse("http://127.0.0.1:9/unreachable").unwrap();
        let err = network.fetch(&request).await.unwrap_err();
        assert!(err.is_network());
    }
}
