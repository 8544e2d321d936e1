//! Client for the HTTP upload backend.
//!
//! The backend accepts a report file, registers it on chain itself, and
//! answers with the file hash, an explorer link, and a QR code image.

pub mod client;
pub mod error;
pub mod response;

pub use client::UploadClient;
pub use error::{UploadError, UploadResult};
pub use response::{QrImage, UploadOutcome, UploadResponse};
