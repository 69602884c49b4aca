//! Object storage abstraction for listing media.
//!
//! Supports local filesystem and S3-compatible object storage. Upload bytes
//! never transit the application server: clients receive a presigned PUT
//! target and upload directly. The local backend emulates this with a
//! direct-upload endpoint served by the API.

use std::path::PathBuf;
#[cfg(feature = "s3")]
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::{AppError, AppResult};

/// A presigned direct-upload target.
#[derive(Debug, Clone)]
pub struct PresignedUpload {
    /// Storage key the object will live under.
    pub key: String,
    /// URL the client PUTs the bytes to.
    pub upload_url: String,
    /// Headers the client must send with the PUT.
    pub headers: Vec<(String, String)>,
    /// Public URL the object will be served from once uploaded.
    pub public_url: String,
    /// When the upload URL stops being valid.
    pub expires_at: DateTime<Utc>,
}

/// Stored object metadata.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Storage key (path or object key).
    pub key: String,
    /// Public URL to access the object.
    pub url: String,
    /// Object size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Issue a presigned PUT target for a key.
    async fn presign_put(&self, key: &str, content_type: &str) -> AppResult<PresignedUpload>;

    /// Store bytes directly (local direct-upload endpoint only).
    async fn store(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<StoredObject>;

    /// Delete an object.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;

    /// Check if an object exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    upload_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String, upload_url: String) -> Self {
        Self {
            base_path,
            base_url,
            upload_url,
        }
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn presign_put(&self, key: &str, content_type: &str) -> AppResult<PresignedUpload> {
        // Local uploads go through the API's direct-upload endpoint. The
        // expiry is advisory; the endpoint accepts any known key.
        Ok(PresignedUpload {
            key: key.to_string(),
            upload_url: format!("{}/{}", self.upload_url.trim_end_matches('/'), key),
            headers: vec![("content-type".to_string(), content_type.to_string())],
            public_url: self.public_url(key),
            expires_at: Utc::now() + chrono::Duration::minutes(15),
        })
    }

    async fn store(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<StoredObject> {
        let path = self.base_path.join(key);

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write file: {e}")))?;

        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.base_path.join(key);
        if path.exists() {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.base_path.join(key);
        Ok(path.exists())
    }
}

/// S3-compatible object storage backend.
#[cfg(feature = "s3")]
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_url: Option<String>,
    presign_expiry: Duration,
}

#[cfg(feature = "s3")]
impl S3Storage {
    /// Create a new S3 storage backend.
    pub async fn new(
        endpoint: &str,
        bucket: String,
        region: &str,
        access_key_id: &str,
        secret_access_key: &str,
        public_url: Option<String>,
        presign_expiry: Duration,
    ) -> AppResult<Self> {
        use aws_config::Region;
        use aws_sdk_s3::config::Credentials;

        let credentials =
            Credentials::new(access_key_id, secret_access_key, None, None, "hestia-rs");

        let config = aws_sdk_s3::Config::builder()
            .endpoint_url(endpoint)
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let client = aws_sdk_s3::Client::from_conf(config);

        Ok(Self {
            client,
            bucket,
            public_url,
            presign_expiry,
        })
    }
}

#[cfg(feature = "s3")]
#[async_trait::async_trait]
impl StorageBackend for S3Storage {
    async fn presign_put(&self, key: &str, content_type: &str) -> AppResult<PresignedUpload> {
        use aws_sdk_s3::presigning::PresigningConfig;

        let presigning = PresigningConfig::expires_in(self.presign_expiry)
            .map_err(|e| AppError::Internal(format!("Invalid presign expiry: {e}")))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| AppError::ExternalService(format!("S3 presign failed: {e}")))?;

        let headers = request
            .headers()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        Ok(PresignedUpload {
            key: key.to_string(),
            upload_url: request.uri().to_string(),
            headers,
            public_url: self.public_url(key),
            expires_at: Utc::now()
                + chrono::Duration::from_std(self.presign_expiry)
                    .unwrap_or_else(|_| chrono::Duration::minutes(15)),
        })
    }

    async fn store(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<StoredObject> {
        use aws_sdk_s3::primitives::ByteStream;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data.to_vec()))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("S3 upload failed: {e}")))?;

        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("S3 delete failed: {e}")))?;

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        match &self.public_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => format!("https://{}.s3.amazonaws.com/{}", self.bucket, key),
        }
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.to_string().contains("NotFound") || e.to_string().contains("404") {
                    Ok(false)
                } else {
                    Err(AppError::ExternalService(format!(
                        "S3 head_object failed: {e}"
                    )))
                }
            }
        }
    }
}

/// Generate a unique storage key for an uploaded media file.
#[must_use]
pub fn generate_storage_key(listing_id: &str, original_name: &str) -> String {
    let now = Utc::now();
    let date_path = now.format("%Y/%m/%d").to_string();
    let timestamp = now.timestamp_millis();

    // Extract extension from original name
    let extension = original_name
        .rfind('.')
        .filter(|&pos| pos > 0 && pos < original_name.len() - 1)
        .map(|pos| &original_name[pos + 1..])
        .filter(|ext| ext.len() <= 10 && !ext.is_empty())
        .unwrap_or("bin");

    format!(
        "{}/{}/{}_{}.{}",
        date_path,
        listing_id,
        timestamp,
        uuid::Uuid::new_v4(),
        extension
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_storage_key() {
        let key = generate_storage_key("listing123", "photo.jpg");
        assert!(key.contains("listing123"));
        assert!(key.ends_with(".jpg"));
        assert!(key.contains('/'));
    }

    #[test]
    fn test_generate_storage_key_no_extension() {
        let key = generate_storage_key("listing123", "file");
        assert!(key.ends_with(".bin"));
    }

    #[tokio::test]
    async fn test_local_presign_points_at_upload_endpoint() {
        let storage = LocalStorage::new(
            PathBuf::from("/tmp/hestia-test"),
            "https://example.com/media".to_string(),
            "https://example.com/api/uploads".to_string(),
        );

        let presigned = storage
            .presign_put("2026/01/01/abc.jpg", "image/jpeg")
            .await
            .unwrap();

        assert_eq!(
            presigned.upload_url,
            "https://example.com/api/uploads/2026/01/01/abc.jpg"
        );
        assert_eq!(
            presigned.public_url,
            "https://example.com/media/2026/01/01/abc.jpg"
        );
        assert!(presigned.expires_at > Utc::now());
    }
}
