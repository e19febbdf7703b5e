//! HTTP cache control module
//!
//! Provides `ETag` generation, conditional request handling and the
//! `Cache-Control` policies used for the frontend bundle.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Generate `ETag` using fast hashing
///
/// # Returns
/// Quoted `ETag` string, e.g., `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", "def456"`
/// - Weak validators: `W/"abc123"`
/// - Wildcard: `*`
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').map(str::trim).any(|e| {
            e == "*" || e.strip_prefix("W/").unwrap_or(e) == etag
        })
    })
}

/// Cache control policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Public cache for one hour (stable file names at the bundle root)
    #[default]
    Public,
    /// Content-hashed build output that never changes under the same URL
    Immutable,
    /// Always revalidate (the index document changes on every deploy)
    NoCache,
}

impl CachePolicy {
    /// Policy for a file served from the frontend bundle
    ///
    /// Everything under the mount prefix is fingerprinted by the frontend
    /// build; files at the bundle root keep stable names.
    pub const fn for_asset(under_mount: bool) -> Self {
        if under_mount {
            Self::Immutable
        } else {
            Self::Public
        }
    }

    /// Convert to Cache-Control header value
    pub const fn header_value(self) -> &'static str {
        match self {
            Self::Public => "public, max-age=3600",
            Self::Immutable => "public, max-age=31536000, immutable",
            Self::NoCache => "no-cache",
        }
    }
}
