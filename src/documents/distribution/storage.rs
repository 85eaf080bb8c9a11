//! Object-storage upload of rendered documents.

use async_trait::async_trait;
use serde::Deserialize;

use super::DistributionError;
use crate::config::StorageConfig;
use crate::documents::render::PDF_MIME_TYPE;

/// One file to store.
#[derive(Debug, Clone, Copy)]
pub struct UploadRequest<'a> {
    pub filename: &'a str,
    pub bytes: &'a [u8],
    /// Document-type tag, see `DocumentKind::storage_tag`.
    pub document_type: &'a str,
    /// Order or customer the file belongs to.
    pub owner_id: &'a str,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store the file and return its public URL.
    async fn upload(&self, request: UploadRequest<'_>) -> Result<String, DistributionError>;
}

#[derive(Deserialize)]
struct UploadReply {
    url: String,
}

/// Upload endpoint accepting a multipart body.
pub struct HttpObjectStorage {
    client: reqwest::Client,
    config: StorageConfig,
}

impl HttpObjectStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn upload(&self, request: UploadRequest<'_>) -> Result<String, DistributionError> {
        let part = reqwest::multipart::Part::bytes(request.bytes.to_vec())
            .file_name(request.filename.to_string())
            .mime_str(PDF_MIME_TYPE)
            .map_err(|e| DistributionError::Upload(format!("failed to build multipart: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("filename", request.filename.to_string())
            .text("documentType", request.document_type.to_string())
            .text("ownerId", request.owner_id.to_string());

        let mut builder = self.client.post(&self.config.upload_url).multipart(form);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| DistributionError::Upload(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(DistributionError::Upload(format!("upload rejected ({status}): {text}")));
        }

        let reply: UploadReply = resp
            .json()
            .await
            .map_err(|e| DistributionError::Upload(format!("invalid upload reply: {e}")))?;

        if reply.url.trim().is_empty() {
            return Err(DistributionError::Upload("upload reply carried an empty url".to_string()));
        }
        Ok(reply.url)
    }
}
