//! Foundation types for the ESG registry.
//!
//! Every other `esg-*` crate depends on `esg-types`. The types here mirror
//! the values exchanged with the governance and token contracts.
//!
//! # Key Types
//!
//! - [`ContentId`]: 32-byte on-chain key for a registered report or sample
//! - [`Address`]: 20-byte account or contract address
//! - [`TxRef`]: reference to a confirmed transaction
//! - [`ReportStatus`]: the status tuple returned by the governance contract
//! - [`TelemetrySample`]: one simulated IoT reading, hashed for registration
//! - [`TokenAmount`]: token balance in base units

pub mod address;
pub mod amount;
pub mod error;
mod hexfmt;
pub mod identifier;
pub mod status;
pub mod telemetry;
pub mod tx;

pub use address::Address;
pub use amount::{TokenAmount, TOKEN_DECIMALS};
pub use error::TypeError;
pub use identifier::ContentId;
pub use status::ReportStatus;
pub use telemetry::TelemetrySample;
pub use tx::{TxHash, TxRef};
