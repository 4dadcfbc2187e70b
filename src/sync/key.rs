//! Logical key derivation for request URLs
//!
//! The manifest addresses resources by origin-relative path; requests
//! arrive as absolute URLs. Two derivations exist and they are not the
//! same: fetch interception strips the `?v=` cache-bust suffix and
//! collapses fragment-only navigations to the root, while the
//! activation/download walk over stored entries only normalizes the
//! empty path. The asymmetry is inherited wire behavior and kept.

use crate::manifest::ROOT_ALIAS;

/// Cache-busting query convention stripped before manifest lookup
const CACHE_BUST: &str = "?v=";

/// Key used by fetch interception for manifest lookup.
///
/// Returns `None` for URLs outside the origin; those are never
/// intercepted. The bare origin, `origin/#fragment` navigations and the
/// empty path all collapse to the root alias.
pub fn logical_key(url: &str, origin: &str) -> Option<String> {
    let tail = url.strip_prefix(origin)?;
    if tail.is_empty() || tail.starts_with("/#") {
        return Some(ROOT_ALIAS.to_string());
    }

    let tail = tail.strip_prefix('/').unwrap_or(tail);
    let key = match tail.find(CACHE_BUST) {
        Some(idx) => &tail[..idx],
        None => tail,
    };

    if key.is_empty() {
        Some(ROOT_ALIAS.to_string())
    } else {
        Some(key.to_string())
    }
}

/// Key used when walking entries already stored in a partition.
///
/// Stored entries are same-origin by construction, so this never
/// declines; it strips the origin and maps the empty path to the root
/// alias, nothing more.
pub fn stored_key(url: &str, origin: &str) -> String {
    let tail = url.strip_prefix(origin).unwrap_or(url);
    let tail = tail.strip_prefix('/').unwrap_or(tail);
    if tail.is_empty() {
        ROOT_ALIAS.to_string()
    } else {
        tail.to_string()
    }
}
