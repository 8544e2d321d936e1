use esg_types::ContentId;
use serde::Serialize;
use sha3::{Digest, Keccak256};

use crate::canonical::{canonical_json, Canonicalization};

/// Keccak-256 content hasher.
///
/// Strings are hashed as their UTF-8 bytes; structured records are first
/// encoded with the hasher's [`Canonicalization`] rule. No salt and no
/// domain tag are mixed in: the digest must equal the one the dashboards and
/// the contract compute for the same bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContentHasher {
    canonicalization: Canonicalization,
}

impl ContentHasher {
    /// Hasher matching the identifiers already registered on chain.
    pub const DEPLOYED: Self = Self {
        canonicalization: Canonicalization::InsertionOrder,
    };
    /// Hasher that sorts object keys before hashing records.
    pub const SORTED: Self = Self {
        canonicalization: Canonicalization::SortedKeys,
    };

    pub const fn new(canonicalization: Canonicalization) -> Self {
        Self { canonicalization }
    }

    pub fn canonicalization(&self) -> Canonicalization {
        self.canonicalization
    }

    /// Fingerprint raw bytes.
    pub fn fingerprint_bytes(&self, data: &[u8]) -> ContentId {
        ContentId::from_hash(keccak256(data))
    }

    /// Fingerprint a string, such as a file name.
    pub fn fingerprint_str(&self, s: &str) -> ContentId {
        self.fingerprint_bytes(s.as_bytes())
    }

    /// Fingerprint a structured record through its canonical JSON form.
    pub fn fingerprint_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<ContentId, HasherError> {
        let encoded = canonical_json(value, self.canonicalization)?;
        Ok(self.fingerprint_str(&encoded))
    }

    /// Check that `data` fingerprints to `expected`.
    pub fn verify(&self, data: &[u8], expected: &ContentId) -> bool {
        self.fingerprint_bytes(data) == *expected
    }
}

/// Plain Keccak-256.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Four-byte ABI function selector for a signature like `balanceOf(address)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = keccak256(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}
