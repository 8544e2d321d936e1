use esg_chain::ChainError;
use esg_crypto::HasherError;
use thiserror::Error;

use crate::role::{Action, Role};

/// Errors surfaced by workflow actions. None of them ends the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// No wallet, or the session is disconnected.
    #[error("{0}")]
    MissingCapability(String),

    #[error("request rejected: {0}")]
    UserRejected(String),

    #[error("operation failed: {0}")]
    OperationFailed(String),

    /// A required input was empty; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// The payload could not be serialized for hashing.
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("role {role} may not {action}")]
    Forbidden { role: Role, action: Action },
}

impl From<ChainError> for WorkflowError {
    fn from(e: ChainError) -> Self {
        match e {
            ChainError::MissingCapability(msg) => Self::MissingCapability(msg),
            ChainError::UserRejected(msg) => Self::UserRejected(msg),
            other => Self::OperationFailed(other.to_string()),
        }
    }
}

impl From<HasherError> for WorkflowError {
    fn from(e: HasherError) -> Self {
        match e {
            HasherError::Serialization(msg) => Self::Encoding(msg),
        }
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
