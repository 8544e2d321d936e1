use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::hexfmt::{decode_fixed, encode_prefixed, hex_serde};

/// Hash of a submitted transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        encode_prefixed(&self.0)
    }

    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        decode_fixed::<32>(s).map(Self)
    }
}

hex_serde!(TxHash);

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self.short_hex())
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A confirmed state-changing call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRef {
    /// The transaction hash.
    pub hash: TxHash,
    /// Block the transaction was included in, when the collaborator reports it.
    pub block_number: Option<u64>,
}

impl TxRef {
    pub fn new(hash: TxHash, block_number: Option<u64>) -> Self {
        Self { hash, block_number }
    }

    /// Explorer link for this transaction, given a base like
    /// `https://sepolia.etherscan.io/tx/`.
    pub fn explorer_link(&self, base: &str) -> String {
        if base.ends_with('/') {
            format!("{base}{}", self.hash)
        } else {
            format!("{base}/{}", self.hash)
        }
    }
}

impl fmt::Display for TxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.block_number {
            Some(block) => write!(f, "{} (block {block})", self.hash),
            None => write!(f, "{}", self.hash),
        }
    }
}
