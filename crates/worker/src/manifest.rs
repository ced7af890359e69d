//! Static asset manifest: the paths precached on install and served cache-first.

use cendres_core::{Error, Request};
use url::Url;

use crate::fetch::resolve;

/// Ordered, de-duplicated set of root-relative path patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAssetManifest {
    patterns: Vec<String>,
}

impl StaticAssetManifest {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut deduped: Vec<String> = Vec::new();
        for pattern in patterns {
            let pattern = pattern.into();
            if !deduped.contains(&pattern) {
                deduped.push(pattern);
            }
        }
        Self { patterns: deduped }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether a request is a first-class static asset.
    ///
    /// Only same-origin requests match. `/` matches the root document only;
    /// any other pattern matches an exact path or a path ending with it.
    pub fn matches(&self, request: &Request, origin: &Url) -> bool {
        if !request.is_same_origin(origin) {
            return false;
        }
        let path = request.url.path();
        self.patterns
            .iter()
            .any(|pattern| path == pattern || (pattern != "/" && path.ends_with(pattern.as_str())))
    }

    /// Precache requests for every pattern, resolved against `origin`.
    pub fn requests(&self, origin: &Url) -> Result<Vec<Request>, Error> {
        self.patterns
            .iter()
            .map(|pattern| Ok(Request::get(resolve(origin, pattern)?)))
            .collect()
    }
}
