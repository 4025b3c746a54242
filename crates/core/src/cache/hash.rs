//! URL fingerprints for dedup membership.

use std::fmt;

use sha2::{Digest, Sha256};

/// SHA-256 digest of a URL, hex encoded.
///
/// Distinct URLs never share a fingerprint in practice, unlike a 32-bit
/// hash code where collisions would mark unseen content as served.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the fingerprint of a URL. Pure function of the input string.
pub fn fingerprint(url: &str) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    Fingerprint(hex::encode(hasher.finalize()))
}
