use std::sync::Arc;

use async_trait::async_trait;
use esg_types::{Address, ContentId, ReportStatus, TokenAmount, TxRef};

use crate::error::ChainResult;

/// An account provider able to sign and send transactions, in the manner of
/// an injected browser wallet.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Ask the wallet for the active account.
    async fn request_accounts(&self) -> ChainResult<Address>;

    /// Bind the governance contract at `contract`, sending as `signer`.
    fn governance(&self, contract: Address, signer: Address) -> Arc<dyn Governance>;

    /// Bind the token contract at `contract`, reading on behalf of `signer`.
    fn token(&self, contract: Address, signer: Address) -> Arc<dyn Token>;
}

/// The governance contract: content registration and attestation.
#[async_trait]
pub trait Governance: Send + Sync {
    /// `registerContent(bytes32)`. Resolves once the transaction is confirmed.
    async fn register_content(&self, id: &ContentId) -> ChainResult<TxRef>;

    /// `attestReport(bytes32,bool,string)`. Resolves once confirmed.
    async fn attest_report(&self, id: &ContentId, passed: bool, reason: &str) -> ChainResult<TxRef>;

    /// `getReportStatus(bytes32)`. Read-only.
    async fn report_status(&self, id: &ContentId) -> ChainResult<ReportStatus>;
}

/// The token contract.
#[async_trait]
pub trait Token: Send + Sync {
    /// `balanceOf(address)` in base units.
    async fn balance_of(&self, owner: &Address) -> ChainResult<TokenAmount>;
}
