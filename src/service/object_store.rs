//! External image host. Uploads return a permanent URL plus a deletion
//! handle (`public_id`); deletes are best-effort from the caller's view.
//!
//! The production implementation speaks the Cloudinary REST API with
//! SHA-256 request signatures. No retries: a failed call surfaces as
//! `StorageError` and the operator retries from the dashboard.

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::CloudConfig;
use crate::error::FountainError;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub url: String,
    pub public_id: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Push one file's bytes, returning its permanent URL and deletion handle.
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        folder: &str,
    ) -> Result<StoredObject, FountainError>;

    /// Destroy a stored object by its deletion handle.
    async fn delete(&self, public_id: &str) -> Result<(), FountainError>;
}

/// Cloudinary-style signed REST client.
pub struct CloudinaryStore {
    client: reqwest::Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryStore {
    pub fn new(
        client: reqwest::Client,
        api_base: String,
        cloud_name: String,
        api_key: String,
        api_secret: String,
    ) -> Self {
        Self {
            client,
            api_base,
            cloud_name,
            api_key,
            api_secret,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}/image/{}",
            self.api_base.trim_end_matches('/'),
            self.cloud_name,
            action
        )
    }

    /// Sign `&`-joined `key=value` pairs (sorted by key) plus the API secret.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<(&str, &str)> = params.to_vec();
        sorted.sort_by_key(|(k, _)| *k);
        let joined = sorted
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let mut hasher = Sha256::new();
        hasher.update(joined.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[async_trait]
impl ObjectStore for CloudinaryStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        folder: &str,
    ) -> Result<StoredObject, FountainError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("folder", folder),
            ("timestamp", &timestamp),
            ("signature_algorithm", "sha256"),
        ]);

        let file_part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| FountainError::Storage(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("folder", folder.to_string())
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256")
            .text("api_key", self.api_key.clone())
            .text("signature", signature);

        let resp = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| FountainError::Storage(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(FountainError::Storage(format!(
                "image host returned {} on upload",
                resp.status()
            )));
        }
        let parsed: UploadResponse = resp
            .json()
            .await
            .map_err(|e| FountainError::Storage(e.to_string()))?;
        info!(public_id = %parsed.public_id, folder = %folder, "uploaded image to host");
        Ok(StoredObject {
            url: parsed.secure_url,
            public_id: parsed.public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), FountainError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("public_id", public_id),
            ("timestamp", &timestamp),
            ("signature_algorithm", "sha256"),
        ]);

        let form = reqwest::multipart::Form::new()
            .text("public_id", public_id.to_string())
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256")
            .text("api_key", self.api_key.clone())
            .text("signature", signature);

        let resp = self
            .client
            .post(self.endpoint("destroy"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| FountainError::Storage(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(FountainError::Storage(format!(
                "image host returned {} on destroy",
                resp.status()
            )));
        }
        let parsed: DestroyResponse = resp
            .json()
            .await
            .map_err(|e| FountainError::Storage(e.to_string()))?;
        // "not found" counts as deleted.
        if parsed.result != "ok" && parsed.result != "not found" {
            return Err(FountainError::Storage(format!(
                "image host destroy result: {}",
                parsed.result
            )));
        }
        Ok(())
    }
}

/// Placeholder used when the image host is not configured. Uploads fail
/// with `StorageError`; deletes succeed so metadata cleanup still works.
pub struct UnconfiguredStore;

#[async_trait]
impl ObjectStore for UnconfiguredStore {
    async fn upload(
        &self,
        _bytes: Vec<u8>,
        _filename: &str,
        _folder: &str,
    ) -> Result<StoredObject, FountainError> {
        Err(FountainError::Storage(
            "image host is not configured".to_string(),
        ))
    }

    async fn delete(&self, public_id: &str) -> Result<(), FountainError> {
        warn!(public_id = %public_id, "image host not configured; skipping remote delete");
        Ok(())
    }
}

/// Build the store the configuration describes.
pub fn from_config(cfg: &CloudConfig, client: reqwest::Client) -> Arc<dyn ObjectStore> {
    match (
        cfg.cloud_name.clone(),
        cfg.api_key.clone(),
        cfg.api_secret.clone(),
    ) {
        (Some(cloud_name), Some(api_key), Some(api_secret)) => Arc::new(CloudinaryStore::new(
            client,
            cfg.api_base.clone(),
            cloud_name,
            api_key,
            api_secret,
        )),
        _ => {
            warn!("image host credentials not set; uploads will be rejected");
            Arc::new(UnconfiguredStore)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_order_independent() {
        let store = CloudinaryStore::new(
            reqwest::Client::new(),
            "https://api.cloudinary.com/v1_1".to_string(),
            "demo".to_string(),
            "key".to_string(),
            "secret".to_string(),
        );
        let a = store.sign(&[("folder", "fountainofpeace/hero"), ("timestamp", "1700000000")]);
        let b = store.sign(&[("timestamp", "1700000000"), ("folder", "fountainofpeace/hero")]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn endpoint_joins_cleanly() {
        let store = CloudinaryStore::new(
            reqwest::Client::new(),
            "https://api.cloudinary.com/v1_1/".to_string(),
            "demo".to_string(),
            "key".to_string(),
            "secret".to_string(),
        );
        assert_eq!(
            store.endpoint("upload"),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
    }
}
