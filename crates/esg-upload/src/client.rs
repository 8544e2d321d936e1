use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

use crate::error::{UploadError, UploadResult};
use crate::response::{UploadOutcome, UploadResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for `POST {base_url}/upload`.
#[derive(Clone, Debug)]
pub struct UploadClient {
    http: reqwest::Client,
    base_url: String,
}

impl UploadClient {
    pub fn new(base_url: impl Into<String>) -> UploadResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| UploadError::Connection(format!("HTTP client build failed: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/upload", self.base_url)
    }

    /// Upload the file at `path` under its own file name.
    pub async fn upload_file(&self, path: &Path) -> UploadResult<UploadOutcome> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| UploadError::Validation("select a file first".into()))?;
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => UploadError::Validation(format!("no such file: {}", path.display())),
            _ => UploadError::Io(e),
        })?;
        self.upload_bytes(name, bytes).await
    }

    pub async fn upload_bytes(&self, file_name: &str, bytes: Vec<u8>) -> UploadResult<UploadOutcome> {
        if file_name.is_empty() {
            return Err(UploadError::Validation("select a file first".into()));
        }
        debug!(file = file_name, size = bytes.len(), "uploading report");
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));
        let response: UploadResponse = self
            .http
            .post(self.endpoint())
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Connection(e.to_string()))?
            .json()
            .await
            .map_err(|e| UploadError::Connection(format!("unreadable response: {e}")))?;
        let outcome = UploadOutcome::try_from(response)?;
        info!(file = file_name, hash = %outcome.file_hash, "report uploaded");
        Ok(outcome)
    }
}
