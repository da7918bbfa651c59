//! Script hashing for artifact provenance.
//!
//! Every render artifact records a SHA-256 hash of the exact script text it
//! was produced from, so a result can always be traced back to the compiled
//! scene that generated it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A script hash digest (SHA-256, 32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptHash {
    bytes: [u8; 32],
}

impl ScriptHash {
    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

impl std::fmt::Display for ScriptHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Compute the hash of a script's source text.
pub fn hash_script(source: &str) -> ScriptHash {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    let result = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&result);
    ScriptHash::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let a = hash_script("from manim import *");
        let b = hash_script("from manim import *");
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_different_content() {
        assert_ne!(hash_script("circle"), hash_script("square"));
    }

    #[test]
    fn test_hash_hex_format() {
        let hex = hash_script("x").to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_display() {
        let hash = hash_script("x");
        assert_eq!(format!("{}", hash), hash.to_hex());
    }
}
