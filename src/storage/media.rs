//! Media storage on an S3-compatible object store
//!
//! Handles upload, delete, and public URL generation for media files.
//! The host is treated as unreliable: every call carries an explicit
//! timeout, and deletes are best-effort cleanup.

use std::time::Duration;

use aws_sdk_s3::Client as S3Client;

use crate::error::AppError;

/// Media storage service
///
/// Uploads media to the configured bucket and returns public URLs.
pub struct MediaStorage {
    /// S3-compatible client
    client: S3Client,
    /// Media bucket name
    bucket: String,
    /// Public URL base (CDN / custom domain)
    /// e.g., "https://media.example.com"
    public_url: String,
    /// Per-call timeout
    request_timeout: Duration,
}

impl MediaStorage {
    /// Create new media storage client
    ///
    /// # Errors
    /// Returns error if S3 client initialization fails
    pub fn new(config: &crate::config::StorageConfig) -> Result<Self, AppError> {
        use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "cliptide-storage",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("auto"))
            .endpoint_url(&config.endpoint)
            .credentials_provider(credentials)
            .build();

        let client = S3Client::from_conf(s3_config);

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            public_url: config.public_url.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_seconds),
        })
    }

    /// Upload a media file
    ///
    /// # Arguments
    /// * `key` - Object key (path) for the file
    /// * `data` - File contents
    /// * `content_type` - MIME type
    ///
    /// # Returns
    /// Public URL for the uploaded file
    pub async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError> {
        use aws_sdk_s3::primitives::ByteStream;

        let bytes = data.len() as f64;
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .cache_control("public, max-age=31536000") // 1 year
            .send();

        tokio::time::timeout(self.request_timeout, request)
            .await
            .map_err(|_| AppError::Timeout(format!("media upload timed out: {}", key)))?
            .map_err(|e| AppError::Storage(format!("media upload failed: {}", e)))?;

        crate::metrics::MEDIA_UPLOADS_TOTAL.inc();
        crate::metrics::MEDIA_BYTES_UPLOADED.inc_by(bytes);

        Ok(self.get_public_url(key))
    }

    /// Upload an avatar image
    ///
    /// Stores in avatars/ prefix.
    ///
    /// # Returns
    /// (object key, public URL)
    pub async fn upload_avatar(
        &self,
        id: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(String, String), AppError> {
        let key = format!("avatars/{}.{}", id, extension_for(content_type));
        let url = self.upload(&key, data, content_type).await?;
        Ok((key, url))
    }

    /// Upload a cover image
    ///
    /// Stores in covers/ prefix.
    pub async fn upload_cover(
        &self,
        id: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(String, String), AppError> {
        let key = format!("covers/{}.{}", id, extension_for(content_type));
        let url = self.upload(&key, data, content_type).await?;
        Ok((key, url))
    }

    /// Upload a video file
    ///
    /// Stores in videos/ prefix.
    pub async fn upload_video(
        &self,
        id: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(String, String), AppError> {
        let key = format!("videos/{}.{}", id, extension_for(content_type));
        let url = self.upload(&key, data, content_type).await?;
        Ok((key, url))
    }

    /// Upload a thumbnail
    ///
    /// Stores in thumbnails/ prefix.
    pub async fn upload_thumbnail(
        &self,
        id: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(String, String), AppError> {
        let key = format!("thumbnails/{}.{}", id, extension_for(content_type));
        let url = self.upload(&key, data, content_type).await?;
        Ok((key, url))
    }

    /// Delete a media file
    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        let request = self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send();

        tokio::time::timeout(self.request_timeout, request)
            .await
            .map_err(|_| AppError::Timeout(format!("media delete timed out: {}", key)))?
            .map_err(|e| AppError::Storage(format!("media delete failed: {}", e)))?;

        Ok(())
    }

    /// Delete that never fails the surrounding operation.
    ///
    /// Media cleanup after a successful database mutation must not
    /// block the user-visible success response; failures are logged
    /// and counted.
    pub async fn delete_best_effort(&self, key: &str) {
        if let Err(error) = self.delete(key).await {
            crate::metrics::MEDIA_DELETE_FAILURES_TOTAL.inc();
            tracing::warn!(key = %key, error = %error, "Best-effort media delete failed");
        }
    }

    /// Get the public URL for an object key
    pub fn get_public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }
}

/// File extension for a MIME type; unknown types fall back to "bin".
fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        _ => "bin",
    }
}
