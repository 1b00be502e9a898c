//! Resume file storage on top of a pluggable object store.

pub mod resume;
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{error, info, warn};

use crate::errors::AppError;
pub use resume::{ResumeKind, ResumeUpload, MAX_RESUME_BYTES};

/// Minimal blob store interface. Keys are bucket-relative paths.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    /// `Ok(None)` when no object exists under `key`.
    async fn get(&self, key: &str) -> anyhow::Result<Option<Bytes>>;
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct ResumeStorage {
    store: Arc<dyn ObjectStore>,
    public_url: String,
}

impl ResumeStorage {
    pub fn new(store: Arc<dyn ObjectStore>, public_url: impl Into<String>) -> Self {
        Self {
            store,
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Validates and stores a resume, returning its public URL.
    /// Nothing is sent to the store unless validation passes.
    pub async fn upload(&self, upload: ResumeUpload) -> Result<String, AppError> {
        let kind = upload.validate()?;
        let key = resume::object_key(kind);

        self.store
            .put(&key, upload.data, kind.content_type())
            .await
            .map_err(|e| {
                error!("Failed to store resume {key}: {e:#}");
                AppError::Validation("Failed to upload resume. Please try again.".to_string())
            })?;

        let url = self.url_for(&key);
        info!("Resume stored at {url}");
        Ok(url)
    }

    pub async fn download(&self, url: &str) -> Result<Bytes, AppError> {
        let not_found = || AppError::NotFound("Resume not found".to_string());
        let key = resume::key_from_url(url).ok_or_else(not_found)?;
        self.store
            .get(key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read {key}: {e:#}")))?
            .ok_or_else(not_found)
    }

    /// Best-effort removal. Failures are logged and never returned.
    pub async fn delete(&self, url: &str) {
        let Some(key) = resume::key_from_url(url) else {
            warn!("Cannot derive a storage key from {url}; skipping delete");
            return;
        };
        match self.store.delete(key).await {
            Ok(()) => info!("Deleted resume {key}"),
            Err(e) => error!("Failed to delete resume {key}: {e:#}"),
        }
    }

    /// Deletes every URL on a detached task.
    pub fn delete_detached(&self, urls: Vec<String>) {
        if urls.is_empty() {
            return;
        }
        let storage = self.clone();
        tokio::spawn(async move {
            for url in urls {
                storage.delete(&url).await;
            }
        });
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }
}
