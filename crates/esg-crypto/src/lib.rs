//! Content identity for the ESG registry.
//!
//! Every identifier handed to the governance contract is a Keccak-256 digest
//! computed here, so the same input always yields the same on-chain key.
//! Structured records pass through [`canonical_json`] first; that function is
//! the only place where field ordering is decided.

pub mod canonical;
pub mod hasher;

pub use canonical::{canonical_json, Canonicalization};
pub use hasher::{keccak256, selector, ContentHasher, HasherError};
