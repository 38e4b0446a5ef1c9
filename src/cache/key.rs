//! Resource key derivation

use sha2::{Digest, Sha256};
use std::fmt;

/// Fingerprint of a resource identity, used as the cache file name
///
/// The key is the lowercase hex encoding of the SHA-256 digest of the identity
/// string, so it is always 64 characters long and safe to use as a path
/// component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Derives the key for an identity string
    ///
    /// # Example
    ///
    /// ```
    /// use excavator::ResourceKey;
    ///
    /// let a = ResourceKey::from_identity("http://site/x");
    /// let b = ResourceKey::from_identity("http://site/x");
    /// assert_eq!(a, b);
    /// assert_eq!(a.as_str().len(), 64);
    /// ```
    pub fn from_identity(identity: &str) -> Self {
        let digest = Sha256::digest(identity.as_bytes());
        Self(hex::encode(digest))
    }

    /// Returns the hex fingerprint
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
