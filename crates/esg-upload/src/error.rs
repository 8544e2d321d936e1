use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    /// Nothing to upload; no request was made.
    #[error("{0}")]
    Validation(String),

    /// The backend answered `success: false`.
    #[error("registration failed: {0}")]
    Rejected(String),

    #[error("server connection failed, please check the backend: {0}")]
    Connection(String),

    #[error("invalid QR code data: {0}")]
    InvalidQr(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type UploadResult<T> = Result<T, UploadError>;
