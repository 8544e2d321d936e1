use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{UploadError, UploadResult};

/// Body returned by `POST /upload`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default)]
    pub file_hash: Option<String>,
    #[serde(default)]
    pub transaction_link: Option<String>,
    /// `data:` URI of a QR code pointing at the transaction.
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A decoded QR code image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl QrImage {
    /// Decode a `data:<mime>;base64,<payload>` URI.
    pub fn from_data_uri(uri: &str) -> UploadResult<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| UploadError::InvalidQr("not a data URI".into()))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| UploadError::InvalidQr("missing payload".into()))?;
        let mime = meta
            .strip_suffix(";base64")
            .ok_or_else(|| UploadError::InvalidQr("payload is not base64".into()))?;
        let bytes = B64
            .decode(payload.trim())
            .map_err(|e| UploadError::InvalidQr(e.to_string()))?;
        Ok(Self {
            mime: if mime.is_empty() { "text/plain".into() } else { mime.to_string() },
            bytes,
        })
    }

    /// File extension matching the MIME type.
    pub fn extension(&self) -> &str {
        match self.mime.as_str() {
            "image/png" => "png",
            "image/svg+xml" => "svg",
            "image/jpeg" => "jpg",
            "image/gif" => "gif",
            _ => "bin",
        }
    }
}

/// A successful upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadOutcome {
    pub file_hash: String,
    pub transaction_link: Option<String>,
    pub qr: Option<QrImage>,
}

impl TryFrom<UploadResponse> for UploadOutcome {
    type Error = UploadError;

    fn try_from(resp: UploadResponse) -> UploadResult<Self> {
        if !resp.success {
            return Err(UploadError::Rejected(
                resp.error.unwrap_or_else(|| "unknown error".into()),
            ));
        }
        let file_hash = resp
            .file_hash
            .ok_or_else(|| UploadError::Rejected("backend reported success without a file hash".into()))?;
        let qr = resp.qr_code.as_deref().map(QrImage::from_data_uri).transpose()?;
        Ok(Self {
            file_hash,
            transaction_link: resp.transaction_link,
            qr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_png_data_uri() {
        let qr = QrImage::from_data_uri("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(qr.mime, "image/png");
        assert_eq!(qr.extension(), "png");
        assert_eq!(&qr.bytes[1..4], b"PNG");
    }

    #[test]
    fn rejects_non_base64_uri() {
        assert!(matches!(
            QrImage::from_data_uri("data:image/svg+xml,<svg/>"),
            Err(UploadError::InvalidQr(_))
        ));
        assert!(matches!(
            QrImage::from_data_uri("https://example.com/qr.png"),
            Err(UploadError::InvalidQr(_))
        ));
    }

    #[test]
    fn parses_camel_case_body() {
        let body = r#"{"success":true,"fileHash":"0xabc","transactionLink":"https://scan/tx/1"}"#;
        let resp: UploadResponse = serde_json::from_str(body).unwrap();
        let outcome = UploadOutcome::try_from(resp).unwrap();
        assert_eq!(outcome.file_hash, "0xabc");
        assert_eq!(outcome.transaction_link.as_deref(), Some("https://scan/tx/1"));
        assert!(outcome.qr.is_none());
    }

    #[test]
    fn failure_carries_backend_error() {
        let resp: UploadResponse =
            serde_json::from_str(r#"{"success":false,"error":"already registered"}"#).unwrap();
        let err = UploadOutcome::try_from(resp).unwrap_err();
        assert_eq!(err.to_string(), "registration failed: already registered");
    }

    #[test]
    fn success_without_hash_is_rejected() {
        let resp = UploadResponse {
            success: true,
            ..Default::default()
        };
        assert!(matches!(UploadOutcome::try_from(resp), Err(UploadError::Rejected(_))));
    }
}
