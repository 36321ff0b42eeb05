// src/services/upload_service.rs

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

/// Where uploaded bytes end up. Returns the public URL of the stored object.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(&self, key: &str, content_type: &str, bytes: &[u8]) -> Result<String, AppError>;
}

// Files under a local directory, served back from `public_base`
pub struct LocalDiskStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }
}

#[async_trait]
impl ObjectStorage for LocalDiskStorage {
    async fn put(&self, key: &str, _content_type: &str, bytes: &[u8]) -> Result<String, AppError> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| anyhow::anyhow!("creating {}: {e}", parent.display()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| anyhow::anyhow!("writing {}: {e}", path.display()))?;

        Ok(format!("{}/{key}", self.public_base.trim_end_matches('/')))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadedFile {
    #[schema(example = "/uploads/5f0c.../9b1e....jpg")]
    pub url: String,
}

/// Raster formats accepted for listing photos, with the extension they are stored under.
/// Uploads are served from this origin, so nothing scriptable (SVG) is allowed.
const ALLOWED_IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

// `image/PNG; charset=binary` -> `png`
fn raster_extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    ALLOWED_IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn ObjectStorage>,
    max_bytes: usize,
}

impl UploadService {
    pub fn new(storage: Arc<dyn ObjectStorage>, max_bytes: usize) -> Self {
        Self { storage, max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Stores one listing photo under the uploader's prefix.
    pub async fn upload_image(
        &self,
        owner: Uuid,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<UploadedFile, AppError> {
        let content_type = content_type.unwrap_or_default();
        let Some(extension) = raster_extension(content_type) else {
            return Err(AppError::UnsupportedMediaType(content_type.to_string()));
        };
        if bytes.is_empty() {
            return Err(AppError::InvalidInput("file is empty".to_string()));
        }
        if bytes.len() > self.max_bytes {
            return Err(AppError::PayloadTooLarge(self.max_bytes));
        }

        let key = format!("{owner}/{}.{extension}", Uuid::new_v4());
        let url = self.storage.put(&key, content_type, bytes).await?;

        tracing::info!(%owner, size = bytes.len(), content_type, %url, "image uploaded");
        Ok(UploadedFile { url })
    }
}
