//! S3-based image object storage operations
mod error;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::{presigning::PresigningConfig, Client as S3Client};
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

pub use error::{BucketError, BucketResult};

/// Bytes escaped in an object key path segment, matching the `SigV4` URI
/// encoding the presigner applies
const OBJECT_KEY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Presigned URL with expiration information
#[derive(Debug, Clone)]
pub struct PresignedUrl {
    /// The presigned URL for PUT operations
    pub url: String,
    /// ISO-8601 UTC timestamp when the URL expires
    pub expires_at: DateTime<Utc>,
}

/// Object store collaborator used by the upload workflow
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Mints a time-limited URL that allows a single PUT of `key` with exactly
    /// `content_type`
    ///
    /// # Errors
    ///
    /// Returns `BucketError` if the URL cannot be signed
    async fn presign_put(&self, key: &str, content_type: &str) -> BucketResult<PresignedUrl>;

    /// Public, unsigned URL the object is readable at once written
    fn public_url(&self, key: &str) -> String;
}

/// Image storage client for S3 operations
pub struct MediaStorage {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    public_bucket_url: Url,
    presigned_url_expiry_secs: u64,
}

impl MediaStorage {
    /// Creates a new media storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket name for image storage
    /// * `public_bucket_url` - Base URL objects are publicly readable under
    /// * `presigned_url_expiry_secs` - Lifetime of presigned upload URLs in seconds
    #[must_use]
    pub const fn new(
        s3_client: Arc<S3Client>,
        bucket_name: String,
        public_bucket_url: Url,
        presigned_url_expiry_secs: u64,
    ) -> Self {
        Self {
            s3_client,
            bucket_name,
            public_bucket_url,
            presigned_url_expiry_secs,
        }
    }
}

#[async_trait]
impl MediaStore for MediaStorage {
    /// Generates a presigned URL for PUT operations
    ///
    /// The content type is part of the signature, so the upload must send the
    /// same `Content-Type` header or S3 rejects it.
    ///
    /// # Errors
    ///
    /// Returns `BucketError::ConfigError` if the expiry is out of range for presigning
    /// Returns `BucketError::PresignError` if presigned URL generation fails
    async fn presign_put(&self, key: &str, content_type: &str) -> BucketResult<PresignedUrl> {
        let expires_in = Duration::from_secs(self.presigned_url_expiry_secs);
        let presigned_config = PresigningConfig::expires_in(expires_in).map_err(|e| {
            BucketError::ConfigError(format!("Failed to create presigning config: {e}"))
        })?;

        let presigned_request = self
            .s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type)
            .presigned(presigned_config)
            .await?;

        let expires_at: DateTime<Utc> = Utc::now() + expires_in;

        Ok(PresignedUrl {
            url: presigned_request.uri().to_string(),
            expires_at,
        })
    }

    fn public_url(&self, key: &str) -> String {
        let mut url = self.public_bucket_url.clone();
        let path = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            utf8_percent_encode(key, OBJECT_KEY)
        );
        url.set_path(&path);
        url.to_string()
    }
}
