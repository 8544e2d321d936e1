use esg_crypto::ContentHasher;
use esg_finance::BalanceReport;
use esg_types::{ContentId, ReportStatus, TelemetrySample, TxRef};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{WorkflowError, WorkflowResult};
use crate::role::{Action, Role};
use crate::session::SessionHandle;

/// Local view of an identifier's lifecycle, updated only on confirmation
/// and scoped to the current connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentState {
    #[default]
    Unregistered,
    Registered,
    Attested { passed: bool },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: ContentId,
    pub tx: TxRef,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub id: ContentId,
    pub tx: TxRef,
    pub passed: bool,
    pub reason: String,
}

/// One registered telemetry sample.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub sample: TelemetrySample,
    pub id: ContentId,
    pub tx: TxRef,
}

/// Parse a user-supplied hash. Empty input is a validation error; anything
/// else that is not a `bytes32` fails the operation.
pub fn parse_identifier(input: &str) -> WorkflowResult<ContentId> {
    let input = input.trim();
    if input.is_empty() {
        return Err(WorkflowError::Validation("enter a content hash".into()));
    }
    ContentId::from_hex(input)
        .map_err(|e| WorkflowError::OperationFailed(format!("invalid content hash {input:?}: {e}")))
}

/// The register → attest → query workflow for one role.
///
/// Cheap to clone; clones share the session, and with it the local state
/// view of the current connection.
#[derive(Clone, Debug)]
pub struct Workflow {
    role: Role,
    session: SessionHandle,
    hasher: ContentHasher,
}

impl Workflow {
    pub fn new(role: Role, session: SessionHandle) -> Self {
        Self {
            role,
            session,
            hasher: ContentHasher::DEPLOYED,
        }
    }

    pub fn with_hasher(mut self, hasher: ContentHasher) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn hasher(&self) -> ContentHasher {
        self.hasher
    }

    /// Local lifecycle state of `id` under the current connection.
    pub async fn state(&self, id: &ContentId) -> ContentState {
        match self.session.connection().await {
            Ok(conn) => conn.local.get(id),
            Err(_) => ContentState::Unregistered,
        }
    }

    fn authorize(&self, action: Action) -> WorkflowResult<()> {
        if self.role.permits(action) {
            Ok(())
        } else {
            Err(WorkflowError::Forbidden {
                role: self.role,
                action,
            })
        }
    }

    /// Register `id` with the governance contract.
    ///
    /// Refused locally while this connection has `id` registered or a
    /// registration of it in flight.
    pub async fn register(&self, id: ContentId) -> WorkflowResult<Registration> {
        self.authorize(Action::Register)?;
        let conn = self.session.connection().await?;
        let reservation = conn.local.reserve(id)?;
        let tx = conn.governance.register_content(&id).await?;
        reservation.confirm(ContentState::Registered)?;
        info!(id = %id.short_hex(), tx = %tx.hash.short_hex(), "content registered");
        Ok(Registration { id, tx })
    }

    /// Register a report by its file name.
    pub async fn register_file_name(&self, name: &str) -> WorkflowResult<Registration> {
        if name.is_empty() {
            return Err(WorkflowError::Validation("select a file first".into()));
        }
        let id = self.hasher.fingerprint_str(name);
        debug!(name, id = %id.short_hex(), "fingerprinted file name");
        self.register(id).await
    }

    /// Register one freshly drawn telemetry sample.
    pub async fn push_telemetry(&self) -> WorkflowResult<FeedEntry> {
        self.push_sample(TelemetrySample::generate()).await
    }

    /// Samples are not tracked locally: each carries its own timestamp, and
    /// a long-running feed would otherwise grow the state view forever.
    pub async fn push_sample(&self, sample: TelemetrySample) -> WorkflowResult<FeedEntry> {
        self.authorize(Action::Register)?;
        let id = self.hasher.fingerprint_json(&sample)?;
        let conn = self.session.connection().await?;
        let tx = conn.governance.register_content(&id).await?;
        info!(id = %id.short_hex(), tx = %tx.hash.short_hex(), "telemetry registered");
        Ok(FeedEntry { sample, id, tx })
    }

    /// Record an auditor's decision on `hash`.
    ///
    /// Whether the content was registered is left to the contract.
    pub async fn attest(&self, hash: &str, passed: bool, reason: &str) -> WorkflowResult<Attestation> {
        self.authorize(Action::Attest)?;
        let id = parse_identifier(hash)?;
        if reason.trim().is_empty() {
            return Err(WorkflowError::Validation("enter a reason".into()));
        }
        let conn = self.session.connection().await?;
        let tx = conn.governance.attest_report(&id, passed, reason).await?;
        conn.local.set(id, ContentState::Attested { passed })?;
        info!(id = %id.short_hex(), passed, tx = %tx.hash.short_hex(), "report attested");
        Ok(Attestation {
            id,
            tx,
            passed,
            reason: reason.to_string(),
        })
    }

    /// Read the contract's status tuple for `hash`.
    pub async fn query_status(&self, hash: &str) -> WorkflowResult<ReportStatus> {
        self.authorize(Action::Query)?;
        let id = parse_identifier(hash)?;
        let conn = self.session.connection().await?;
        Ok(conn.governance.report_status(&id).await?)
    }

    /// Balance of the connected account with its finance tiers.
    pub async fn check_balance(&self) -> WorkflowResult<BalanceReport> {
        let conn = self.session.connection().await?;
        let raw = conn.token.balance_of(&conn.account).await?;
        Ok(BalanceReport::new(conn.account, raw))
    }

    pub fn reset_balance(&self) -> BalanceReport {
        BalanceReport::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::connected;
    use esg_chain::InMemoryChain;
    use esg_finance::Eligibility;
    use esg_types::TokenAmount;

    #[tokio::test]
    async fn register_moves_to_registered() {
        let (wf, chain) = connected(Role::Submitter).await;
        let id = ContentId::from_hash([5; 32]);
        let reg = wf.register(id).await.unwrap();
        assert_eq!(reg.id, id);
        assert_eq!(wf.state(&id).await, ContentState::Registered);
        assert!(chain.stored_status(&id).unwrap().registered);
    }

    #[tokio::test]
    async fn failed_register_stays_unregistered_without_retry() {
        let (wf, chain) = connected(Role::Submitter).await;
        let id = ContentId::from_hash([6; 32]);
        chain.fail_next("connection reset").unwrap();
        let err = wf.register(id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::OperationFailed(msg) if msg.contains("connection reset")));
        assert_eq!(wf.state(&id).await, ContentState::Unregistered);
        assert_eq!(chain.calls().unwrap().register, 1);
    }

    #[tokio::test]
    async fn failed_register_releases_the_id() {
        let (wf, chain) = connected(Role::Submitter).await;
        let id = ContentId::from_hash([0x16; 32]);
        chain.fail_next("nonce too low").unwrap();
        assert!(wf.register(id).await.is_err());
        wf.register(id).await.unwrap();
        assert_eq!(chain.calls().unwrap().register, 2);
    }

    #[tokio::test]
    async fn concurrent_registers_of_one_id_reach_the_chain_once() {
        let (wf, chain) = connected(Role::Submitter).await;
        let id = ContentId::from_hash([0x17; 32]);
        let (a, b) = tokio::join!(wf.register(id), wf.register(id));
        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert!(matches!(a.err().or(b.err()), Some(WorkflowError::Validation(_))));
        assert_eq!(chain.calls().unwrap().register, 1);
    }

    #[tokio::test]
    async fn reconnect_starts_with_fresh_local_state() {
        let (wf, _) = connected(Role::Submitter).await;
        let id = ContentId::from_hash([0x2a; 32]);
        wf.register(id).await.unwrap();
        wf.session().disconnect().await;
        assert_eq!(wf.state(&id).await, ContentState::Unregistered);

        let fresh = InMemoryChain::new();
        wf.session()
            .connect(Some(&fresh), &crate::testing::deployment())
            .await
            .unwrap();
        assert_eq!(wf.state(&id).await, ContentState::Unregistered);
        wf.register(id).await.unwrap();
        assert_eq!(fresh.calls().unwrap().register, 1);
    }

    #[tokio::test]
    async fn telemetry_is_not_tracked_locally() {
        let (wf, chain) = connected(Role::Submitter).await;
        for _ in 0..3 {
            wf.push_telemetry().await.unwrap();
        }
        let conn = wf.session().connection().await.unwrap();
        assert_eq!(conn.local.len(), 0);
        assert_eq!(chain.calls().unwrap().register, 3);
    }

    #[tokio::test]
    async fn user_rejection_surfaces_as_rejected() {
        let (wf, chain) = connected(Role::Submitter).await;
        chain.reject_next().unwrap();
        let err = wf.register(ContentId::from_hash([1; 32])).await.unwrap_err();
        assert!(matches!(err, WorkflowError::UserRejected(_)));
    }

    #[tokio::test]
    async fn second_register_is_refused_locally() {
        let (wf, chain) = connected(Role::Submitter).await;
        let id = ContentId::from_hash([7; 32]);
        wf.register(id).await.unwrap();
        let err = wf.register(id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert_eq!(chain.calls().unwrap().register, 1);
    }

    #[tokio::test]
    async fn file_name_is_the_fingerprinted_payload() {
        let (wf, _) = connected(Role::Submitter).await;
        let reg = wf.register_file_name("esg-report-2025.pdf").await.unwrap();
        assert_eq!(reg.id, ContentHasher::DEPLOYED.fingerprint_str("esg-report-2025.pdf"));
        assert!(matches!(
            wf.register_file_name("").await,
            Err(WorkflowError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn telemetry_id_hashes_the_sample_json() {
        let (wf, _) = connected(Role::Submitter).await;
        let entry = wf.push_telemetry().await.unwrap();
        let json = serde_json::to_string(&entry.sample).unwrap();
        assert_eq!(entry.id, ContentHasher::DEPLOYED.fingerprint_str(&json));
    }

    #[tokio::test]
    async fn auditor_attests_submitted_content() {
        let chain = InMemoryChain::new();
        let session = SessionHandle::new();
        session
            .connect(Some(&chain), &crate::testing::deployment())
            .await
            .unwrap();
        let submitter = Workflow::new(Role::Submitter, session.clone());
        let auditor = Workflow::new(Role::Auditor, session);

        let reg = submitter.register_file_name("q3.pdf").await.unwrap();
        let hash = reg.id.to_hex();
        let att = auditor.attest(&hash, false, "scope 3 missing").await.unwrap();
        assert!(!att.passed);
        assert_eq!(att.reason, "scope 3 missing");
        assert_eq!(auditor.state(&reg.id).await, ContentState::Attested { passed: false });

        let status = auditor.query_status(&hash).await.unwrap();
        assert!(status.attested && !status.passed);
        assert_eq!(status.reason, "scope 3 missing");
    }

    #[tokio::test]
    async fn attesting_unregistered_content_is_left_to_the_contract() {
        let (wf, chain) = connected(Role::Auditor).await;
        let hash = ContentId::from_hash([9; 32]).to_hex();
        let err = wf.attest(&hash, true, "fine").await.unwrap_err();
        assert!(matches!(err, WorkflowError::OperationFailed(msg) if msg.contains("not registered")));
        assert_eq!(chain.calls().unwrap().attest, 1);
    }

    #[tokio::test]
    async fn attest_validates_inputs_before_calling() {
        let (wf, chain) = connected(Role::Auditor).await;
        assert!(matches!(wf.attest("", true, "r").await, Err(WorkflowError::Validation(_))));
        let hash = ContentId::zero().to_hex();
        assert!(matches!(wf.attest(&hash, true, "  ").await, Err(WorkflowError::Validation(_))));
        assert_eq!(chain.calls().unwrap().attest, 0);
    }

    #[tokio::test]
    async fn roles_are_enforced_before_any_call() {
        let (viewer, chain) = connected(Role::Viewer).await;
        let err = viewer.register(ContentId::zero()).await.unwrap_err();
        assert_eq!(
            err,
            WorkflowError::Forbidden {
                role: Role::Viewer,
                action: Action::Register
            }
        );
        let (submitter, _) = connected(Role::Submitter).await;
        assert!(matches!(
            submitter.attest(&ContentId::zero().to_hex(), true, "x").await,
            Err(WorkflowError::Forbidden { .. })
        ));
        assert_eq!(chain.calls().unwrap().register, 0);
    }

    #[tokio::test]
    async fn query_of_unknown_id_is_not_an_error() {
        let (wf, _) = connected(Role::Viewer).await;
        let status = wf.query_status(&ContentId::from_hash([3; 32]).to_hex()).await.unwrap();
        assert_eq!(status, ReportStatus::unregistered());
    }

    #[tokio::test]
    async fn malformed_hash_fails_the_query() {
        let (wf, chain) = connected(Role::Viewer).await;
        assert!(matches!(
            wf.query_status("0x1234").await,
            Err(WorkflowError::OperationFailed(_))
        ));
        assert!(matches!(wf.query_status("").await, Err(WorkflowError::Validation(_))));
        assert_eq!(chain.calls().unwrap().status, 0);
    }

    #[tokio::test]
    async fn disconnect_makes_every_call_fail_fast() {
        let (wf, chain) = connected(Role::Submitter).await;
        wf.session().disconnect().await;
        let id = ContentId::from_hash([4; 32]);
        assert!(matches!(wf.register(id).await, Err(WorkflowError::MissingCapability(_))));
        assert!(matches!(
            wf.query_status(&id.to_hex()).await,
            Err(WorkflowError::MissingCapability(_))
        ));
        assert!(matches!(wf.check_balance().await, Err(WorkflowError::MissingCapability(_))));
        assert_eq!(chain.calls().unwrap(), Default::default());
    }

    #[tokio::test]
    async fn balance_check_and_reset() {
        let (wf, chain) = connected(Role::Viewer).await;
        chain
            .set_balance(InMemoryChain::default_account(), TokenAmount::from_tokens(200))
            .unwrap();
        let report = wf.check_balance().await.unwrap();
        assert_eq!(report.balance, 200.0);
        assert_eq!(report.co2_reduction_tons, 40.0);
        assert_eq!(report.tiers.insurance.level, Eligibility::Eligible);
        assert_eq!(wf.reset_balance(), BalanceReport::zero());
    }

    #[test]
    fn parse_identifier_kinds() {
        assert!(matches!(parse_identifier(" "), Err(WorkflowError::Validation(_))));
        assert!(matches!(parse_identifier("zz"), Err(WorkflowError::OperationFailed(_))));
        let id = ContentId::from_hash([8; 32]);
        assert_eq!(parse_identifier(&id.to_hex()).unwrap(), id);
    }
}
