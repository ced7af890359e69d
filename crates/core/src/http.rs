//! Request and response snapshots exchanged between the worker, the network
//! and cache storage.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;

/// How the request was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    Navigate,
    SameOrigin,
    Cors,
    NoCors,
}

/// What the requested resource will be used as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Document,
    Script,
    Style,
    Image,
    Font,
    Manifest,
    Fetch,
    Other,
}

/// An outgoing request as seen by the fetch handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: Url,
    pub mode: RequestMode,
    pub destination: Destination,
    /// Value of the `Accept` header, if any.
    pub accept: Option<String>,
}

impl Request {
    /// A plain same-origin `GET` for a subresource.
    pub fn get(url: Url) -> Self {
        Self { method: "GET".into(), url, mode: RequestMode::SameOrigin, destination: Destination::Fetch, accept: None }
    }

    /// A top-level navigation to `url`.
    pub fn navigate(url: Url) -> Self {
        Self {
            method: "GET".into(),
            url,
            mode: RequestMode::Navigate,
            destination: Destination::Document,
            accept: Some("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".into()),
        }
    }

    /// Parse `url` and build a `GET` for it.
    pub fn parse(url: &str) -> Result<Self, Error> {
        let url = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
        Ok(Self::get(url))
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Only `http` and `https` requests are intercepted.
    pub fn is_http(&self) -> bool {
        matches!(self.url.scheme(), "http" | "https")
    }

    /// Navigations and anything asking for an HTML document.
    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
            || self.destination == Destination::Document
            || self.accept.as_deref().is_some_and(|a| a.contains("text/html"))
    }

    /// Whether the request targets the same origin as `origin`.
    pub fn is_same_origin(&self, origin: &Url) -> bool {
        self.url.origin() == origin.origin()
    }
}

/// Response tainting, as exposed to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Same-origin response.
    Basic,
    Cors,
    Opaque,
    Error,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Basic => "basic",
            ResponseType::Cors => "cors",
            ResponseType::Opaque => "opaque",
            ResponseType::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "basic" => ResponseType::Basic,
            "cors" => ResponseType::Cors,
            "opaque" => ResponseType::Opaque,
            _ => ResponseType::Error,
        }
    }
}

/// A fully buffered response.
///
/// Cloning is how a response is both stored and returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub response_type: ResponseType,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl ResponseSnapshot {
    /// A `200 OK` same-origin response.
    pub fn ok(url: impl Into<String>, content_type: &str, body: impl Into<Bytes>) -> Self {
        Self {
            url: url.into(),
            status: 200,
            status_text: "OK".into(),
            response_type: ResponseType::Basic,
            content_type: Some(content_type.to_string()),
            headers: vec![("content-type".into(), content_type.to_string())],
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Worth writing back into the cache from the fetch handler:
    /// a same-origin `200`.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.response_type == ResponseType::Basic
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
