//! Response cache module
//!
//! Raw HTML bodies are stored on disk keyed by the URL that produced them, so
//! repeated runs only hit the network for pages never seen before.
//!
//! # Keys
//!
//! A key is the URL-safe, unpadded base64 encoding of the full URL. It is
//! deterministic, reversible and contains only `[A-Za-z0-9_-]`, which makes it
//! safe as a file name on every platform.

mod disk;

pub use disk::ResponseCache;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Derives the cache key for a URL
pub fn cache_key(url: &str) -> String {
    URL_SAFE_NO_PAD.encode(url.as_bytes())
}
