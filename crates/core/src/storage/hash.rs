//! Request key generation for cache entries.

use sha2::{Digest, Sha256};
use url::Url;

/// Compute the cache key for a request.
///
/// Fragments never reach the network, so they never distinguish entries.
pub fn compute_request_key(method: &str, url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);

    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_str().as_bytes());
    hex::encode(hasher.finalize())
}
