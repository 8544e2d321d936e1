//! In-memory stand-in for the wallet and both contracts.
//!
//! [`InMemoryChain`] keeps reports and balances in a `HashMap` behind a
//! `RwLock` and reproduces the contract's observable rules: unknown
//! identifiers report the zero status, duplicate registration and
//! attestation revert, and attesting unregistered content reverts. Failures
//! can be injected to exercise error paths. Used by tests and by the CLI's
//! simulation mode.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use esg_crypto::keccak256;
use esg_types::{Address, ContentId, ReportStatus, TokenAmount, TxHash, TxRef};
use tracing::debug;

use crate::error::{ChainError, ChainResult};
use crate::traits::{Governance, Token, Wallet};

#[derive(Debug, Default)]
struct ChainState {
    accounts: Vec<Address>,
    reports: HashMap<ContentId, ReportStatus>,
    balances: HashMap<Address, TokenAmount>,
    pending_failure: Option<ChainError>,
    block: u64,
    calls: CallCounts,
}

/// How many times each contract function was invoked, failed calls included.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub register: u64,
    pub attest: u64,
    pub status: u64,
    pub balance: u64,
}

/// Shared handle to a simulated chain; clones see the same state.
#[derive(Clone, Debug, Default)]
pub struct InMemoryChain {
    state: Arc<RwLock<ChainState>>,
}

impl InMemoryChain {
    /// A chain with one funded-at-zero account.
    pub fn new() -> Self {
        Self::with_accounts(vec![Self::default_account()])
    }

    pub fn with_accounts(accounts: Vec<Address>) -> Self {
        let chain = Self::default();
        if let Ok(mut state) = chain.state.write() {
            state.accounts = accounts;
        }
        chain
    }

    /// The account [`InMemoryChain::new`] exposes.
    pub fn default_account() -> Address {
        let digest = keccak256(b"esg-simulated-account");
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[12..]);
        Address::new(bytes)
    }

    fn read(&self) -> ChainResult<std::sync::RwLockReadGuard<'_, ChainState>> {
        self.state
            .read()
            .map_err(|e| ChainError::Internal(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> ChainResult<std::sync::RwLockWriteGuard<'_, ChainState>> {
        self.state
            .write()
            .map_err(|e| ChainError::Internal(format!("lock poisoned: {e}")))
    }

    pub fn set_balance(&self, owner: Address, amount: TokenAmount) -> ChainResult<()> {
        self.write()?.balances.insert(owner, amount);
        Ok(())
    }

    /// Make the next call of any kind fail as if the user declined it.
    pub fn reject_next(&self) -> ChainResult<()> {
        self.fail_next_with(ChainError::UserRejected("User denied transaction signature".into()))
    }

    /// Make the next call of any kind fail with a transport error.
    pub fn fail_next(&self, message: impl Into<String>) -> ChainResult<()> {
        self.fail_next_with(ChainError::Transport(message.into()))
    }

    fn fail_next_with(&self, error: ChainError) -> ChainResult<()> {
        self.write()?.pending_failure = Some(error);
        Ok(())
    }

    pub fn calls(&self) -> ChainResult<CallCounts> {
        Ok(self.read()?.calls)
    }

    /// Status straight from the simulated contract storage.
    pub fn stored_status(&self, id: &ContentId) -> ChainResult<ReportStatus> {
        Ok(self.read()?.reports.get(id).cloned().unwrap_or_default())
    }

    pub fn registered_count(&self) -> ChainResult<usize> {
        Ok(self.read()?.reports.len())
    }

    fn binding(&self, signer: Address) -> Arc<MemoryBinding> {
        Arc::new(MemoryBinding {
            chain: self.clone(),
            signer,
        })
    }
}

impl ChainState {
    fn take_failure(&mut self) -> ChainResult<()> {
        match self.pending_failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn mine(&mut self, payload: &[u8]) -> TxRef {
        self.block += 1;
        let mut seed = self.block.to_be_bytes().to_vec();
        seed.extend_from_slice(payload);
        TxRef::new(TxHash::new(keccak256(&seed)), Some(self.block))
    }
}

#[async_trait]
impl Wallet for InMemoryChain {
    async fn request_accounts(&self) -> ChainResult<Address> {
        let mut state = self.write()?;
        state.take_failure()?;
        state
            .accounts
            .first()
            .copied()
            .ok_or_else(|| ChainError::MissingCapability("wallet exposes no accounts".into()))
    }

    fn governance(&self, _contract: Address, signer: Address) -> Arc<dyn Governance> {
        self.binding(signer)
    }

    fn token(&self, _contract: Address, signer: Address) -> Arc<dyn Token> {
        self.binding(signer)
    }
}

struct MemoryBinding {
    chain: InMemoryChain,
    signer: Address,
}

#[async_trait]
impl Governance for MemoryBinding {
    async fn register_content(&self, id: &ContentId) -> ChainResult<TxRef> {
        let mut state = self.chain.write()?;
        state.calls.register += 1;
        state.take_failure()?;
        if state.reports.contains_key(id) {
            return Err(ChainError::Reverted("content already registered".into()));
        }
        state.reports.insert(*id, ReportStatus::registered());
        let tx = state.mine(id.as_bytes());
        debug!(id = %id.short_hex(), tx = %tx.hash.short_hex(), "simulated registration");
        Ok(tx)
    }

    async fn attest_report(&self, id: &ContentId, passed: bool, reason: &str) -> ChainResult<TxRef> {
        let mut state = self.chain.write()?;
        state.calls.attest += 1;
        state.take_failure()?;
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        let signer = self.signer;
        let report = state
            .reports
            .get_mut(id)
            .ok_or_else(|| ChainError::Reverted("content not registered".into()))?;
        if report.attested {
            return Err(ChainError::Reverted("report already attested".into()));
        }
        report.attested = true;
        report.passed = passed;
        report.attestor = signer;
        report.timestamp = now;
        report.reason = reason.to_string();
        let tx = state.mine(id.as_bytes());
        debug!(id = %id.short_hex(), passed, "simulated attestation");
        Ok(tx)
    }

    async fn report_status(&self, id: &ContentId) -> ChainResult<ReportStatus> {
        let mut state = self.chain.write()?;
        state.calls.status += 1;
        state.take_failure()?;
        Ok(state.reports.get(id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl Token for MemoryBinding {
    async fn balance_of(&self, owner: &Address) -> ChainResult<TokenAmount> {
        let mut state = self.chain.write()?;
        state.calls.balance += 1;
        state.take_failure()?;
        Ok(state.balances.get(owner).copied().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> ContentId {
        ContentId::from_hash([n; 32])
    }

    fn governance(chain: &InMemoryChain) -> Arc<dyn Governance> {
        chain.governance(Address::zero(), InMemoryChain::default_account())
    }

    #[tokio::test]
    async fn unknown_id_reports_zero_status() {
        let chain = InMemoryChain::new();
        let status = governance(&chain).report_status(&id(1)).await.unwrap();
        assert_eq!(status, ReportStatus::unregistered());
    }

    #[tokio::test]
    async fn register_then_attest() {
        let chain = InMemoryChain::new();
        let gov = governance(&chain);
        let reg = gov.register_content(&id(1)).await.unwrap();
        let att = gov.attest_report(&id(1), true, "complete").await.unwrap();
        assert_ne!(reg.hash, att.hash);
        assert_eq!(att.block_number, Some(2));

        let status = gov.report_status(&id(1)).await.unwrap();
        assert!(status.registered && status.attested && status.passed);
        assert_eq!(status.attestor, InMemoryChain::default_account());
        assert_eq!(status.reason, "complete");
        assert!(status.timestamp > 0);
    }

    #[tokio::test]
    async fn duplicate_registration_reverts() {
        let chain = InMemoryChain::new();
        let gov = governance(&chain);
        gov.register_content(&id(1)).await.unwrap();
        let err = gov.register_content(&id(1)).await.unwrap_err();
        assert!(matches!(err, ChainError::Reverted(_)));
    }

    #[tokio::test]
    async fn attesting_unregistered_or_twice_reverts() {
        let chain = InMemoryChain::new();
        let gov = governance(&chain);
        assert!(matches!(
            gov.attest_report(&id(1), true, "x").await,
            Err(ChainError::Reverted(_))
        ));
        gov.register_content(&id(1)).await.unwrap();
        gov.attest_report(&id(1), false, "gaps").await.unwrap();
        assert!(matches!(
            gov.attest_report(&id(1), true, "retry").await,
            Err(ChainError::Reverted(_))
        ));
    }

    #[tokio::test]
    async fn injected_failure_applies_once_and_leaves_state() {
        let chain = InMemoryChain::new();
        let gov = governance(&chain);
        chain.reject_next().unwrap();
        let err = gov.register_content(&id(3)).await.unwrap_err();
        assert!(matches!(err, ChainError::UserRejected(_)));
        assert_eq!(chain.stored_status(&id(3)).unwrap(), ReportStatus::unregistered());
        assert_eq!(chain.calls().unwrap().register, 1);

        gov.register_content(&id(3)).await.unwrap();
        assert!(chain.stored_status(&id(3)).unwrap().registered);
    }

    #[tokio::test]
    async fn balances_default_to_zero() {
        let chain = InMemoryChain::new();
        let owner = InMemoryChain::default_account();
        let token = chain.token(Address::zero(), owner);
        assert_eq!(token.balance_of(&owner).await.unwrap(), TokenAmount::default());
        chain.set_balance(owner, TokenAmount::from_tokens(75)).unwrap();
        assert_eq!(token.balance_of(&owner).await.unwrap(), TokenAmount::from_tokens(75));
    }

    #[tokio::test]
    async fn empty_wallet_is_missing_capability() {
        let chain = InMemoryChain::with_accounts(Vec::new());
        assert!(matches!(
            chain.request_accounts().await,
            Err(ChainError::MissingCapability(_))
        ));
    }
}
