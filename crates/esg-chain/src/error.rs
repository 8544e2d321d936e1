use thiserror::Error;

/// JSON-RPC error code a wallet returns when the user declines a request.
pub const USER_REJECTED_CODE: i64 = 4001;
/// JSON-RPC "method not found".
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("no wallet available: {0}")]
    MissingCapability(String),

    #[error("request rejected: {0}")]
    UserRejected(String),

    #[error("transaction reverted: {0}")]
    Reverted(String),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("abi error: {0}")]
    Abi(String),

    #[error("timed out waiting for transaction {0}")]
    Timeout(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ChainError {
    /// Classify a JSON-RPC error object.
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        if code == USER_REJECTED_CODE {
            Self::UserRejected(message)
        } else {
            Self::Rpc { code, message }
        }
    }
}

pub type ChainResult<T> = Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_rejection_code_is_classified() {
        let e = ChainError::from_rpc(4001, "User denied transaction signature");
        assert_eq!(e, ChainError::UserRejected("User denied transaction signature".into()));
    }

    #[test]
    fn other_codes_stay_rpc() {
        let e = ChainError::from_rpc(-32000, "execution reverted");
        assert!(matches!(e, ChainError::Rpc { code: -32000, .. }));
        assert_eq!(e.to_string(), "rpc error -32000: execution reverted");
    }
}
