use std::fmt;
use std::sync::Arc;

use esg_chain::{Governance, Token, Wallet};
use esg_types::Address;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{WorkflowError, WorkflowResult};
use crate::local::LocalStates;

/// Where the registry contracts are deployed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deployment {
    pub governance: Address,
    pub token: Address,
}

/// A live wallet connection with its contract bindings.
#[derive(Clone)]
pub struct Connection {
    pub account: Address,
    pub governance: Arc<dyn Governance>,
    pub token: Arc<dyn Token>,
    /// What this connection has seen confirmed.
    pub(crate) local: Arc<LocalStates>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").field("account", &self.account).finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, Default)]
pub enum Session {
    #[default]
    Disconnected,
    Connected(Connection),
}

/// The application's single shared session.
///
/// Connecting builds the complete [`Connection`] before publishing it, and
/// disconnecting swaps in [`Session::Disconnected`] in one write, so readers
/// see either a whole connection or none.
#[derive(Clone, Debug, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request an account from `wallet` and bind both contracts.
    ///
    /// `None` means no wallet is installed.
    pub async fn connect(
        &self,
        wallet: Option<&dyn Wallet>,
        deployment: &Deployment,
    ) -> WorkflowResult<Address> {
        let wallet = wallet.ok_or_else(|| {
            WorkflowError::MissingCapability("no wallet found; install a wallet extension".into())
        })?;
        let account = wallet.request_accounts().await?;
        let connection = Connection {
            account,
            governance: wallet.governance(deployment.governance, account),
            token: wallet.token(deployment.token, account),
            local: Arc::default(),
        };
        *self.inner.write().await = Session::Connected(connection);
        info!(account = %account, "wallet connected");
        Ok(account)
    }

    pub async fn disconnect(&self) {
        let previous = std::mem::take(&mut *self.inner.write().await);
        if let Session::Connected(conn) = previous {
            info!(account = %conn.account, "wallet disconnected");
        }
    }

    /// Snapshot of the current connection.
    pub async fn connection(&self) -> WorkflowResult<Connection> {
        match &*self.inner.read().await {
            Session::Connected(conn) => Ok(conn.clone()),
            Session::Disconnected => Err(WorkflowError::MissingCapability("not connected".into())),
        }
    }

    pub async fn account(&self) -> Option<Address> {
        match &*self.inner.read().await {
            Session::Connected(conn) => Some(conn.account),
            Session::Disconnected => None,
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.account().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::deployment;
    use esg_chain::InMemoryChain;

    #[tokio::test]
    async fn connect_publishes_account() {
        let chain = InMemoryChain::new();
        let session = SessionHandle::new();
        let account = session.connect(Some(&chain), &deployment()).await.unwrap();
        assert_eq!(account, InMemoryChain::default_account());
        assert_eq!(session.account().await, Some(account));
        assert!(session.connection().await.is_ok());
    }

    #[tokio::test]
    async fn missing_wallet_is_fatal_to_connect() {
        let session = SessionHandle::new();
        let err = session.connect(None, &deployment()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::MissingCapability(msg) if msg.contains("install")));
        assert!(!session.is_connected().await);
    }

    #[tokio::test]
    async fn failed_connect_leaves_session_untouched() {
        let chain = InMemoryChain::new();
        chain.reject_next().unwrap();
        let session = SessionHandle::new();
        let err = session.connect(Some(&chain), &deployment()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::UserRejected(_)));
        assert!(matches!(
            session.connection().await,
            Err(WorkflowError::MissingCapability(_))
        ));
    }

    #[tokio::test]
    async fn disconnect_clears_bindings_for_every_clone() {
        let chain = InMemoryChain::new();
        let session = SessionHandle::new();
        let other = session.clone();
        session.connect(Some(&chain), &deployment()).await.unwrap();
        assert!(other.is_connected().await);
        session.disconnect().await;
        assert!(matches!(
            other.connection().await,
            Err(WorkflowError::MissingCapability(_))
        ));
    }
}
