//! Chain collaborators for the ESG registry.
//!
//! The governance and token contracts live on chain; this crate only knows
//! their ABI. [`Wallet`], [`Governance`] and [`Token`] are the seams the
//! workflow talks to. [`RpcWallet`] reaches a real node over JSON-RPC and
//! [`InMemoryChain`] stands in for one in tests and simulations.

pub mod abi;
pub mod error;
pub mod memory;
pub mod rpc;
pub mod traits;

pub use error::{ChainError, ChainResult};
pub use memory::{CallCounts, InMemoryChain};
pub use rpc::{RpcConfig, RpcWallet};
pub use traits::{Governance, Token, Wallet};
