//! SHA-256 pseudonymization of identifying values

use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

static DIGEST_SHAPE: OnceLock<Regex> = OnceLock::new();

/// Returns true if the value already looks like a SHA-256 hex digest
pub fn is_digest(value: &str) -> bool {
    DIGEST_SHAPE
        .get_or_init(|| Regex::new(r"^[A-Fa-f0-9]{64}$").expect("digest pattern is valid"))
        .is_match(value)
}

/// Digests a value into lowercase SHA-256 hex
///
/// Values that are already digest-shaped are returned unchanged, which makes
/// digesting idempotent.
///
/// # Examples
///
/// ```
/// use dmp_sync::core::normalize::digest;
///
/// let once = digest("a@x.com");
/// assert_eq!(once.len(), 64);
/// assert_eq!(digest(&once), once);
/// ```
pub fn digest(value: &str) -> String {
    if is_digest(value) {
        return value.to_string();
    }

    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();

    format!("{result:x}")
}
