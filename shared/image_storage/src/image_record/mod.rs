//! Image record storage module for `DynamoDB` operations

mod error;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use chrono::{DateTime, Utc};
pub use error::{ImageStorageError, ImageStorageResult};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_dynamo::{from_items, to_item};
use strum::Display;

/// Metadata of a single uploaded image, one item in the images table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Primary key - unique image ID (UUID v4)
    pub image_id: String,
    /// File name as supplied by the uploader
    pub file_name: String,
    /// Public URL of the stored object
    pub file_url: String,
    /// MIME type declared at upload time
    pub file_type: String,
    /// Declared size in bytes, never checked against the stored object
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_file_size"
    )]
    pub file_size: Option<u64>,
    /// Time the upload URL was issued
    pub uploaded_at: DateTime<Utc>,
    /// Object key in the bucket, always `{image_id}-{file_name}`
    #[serde(alias = "s3Key")]
    pub storage_key: String,
}

impl ImageRecord {
    /// Object key for an image id and file name
    #[must_use]
    pub fn storage_key_for(image_id: &str, file_name: &str) -> String {
        format!("{image_id}-{file_name}")
    }
}

/// `DynamoDB` attribute names for the images table
#[derive(Debug, Display)]
#[strum(serialize_all = "camelCase")]
pub enum ImageRecordAttribute {
    /// Primary key - unique image ID
    ImageId,
    /// Uploader supplied file name
    FileName,
    /// Public object URL
    FileUrl,
    /// Declared MIME type
    FileType,
    /// Declared size in bytes
    FileSize,
    /// Issue timestamp
    UploadedAt,
    /// Object key in the bucket
    StorageKey,
}

/// Metadata store collaborator used by the upload and listing workflows
#[async_trait]
pub trait ImageRecordStore: Send + Sync {
    /// Inserts a new record keyed by its image id
    ///
    /// # Errors
    ///
    /// Returns `ImageStorageError::ImageRecordExists` if the id is taken, or the
    /// backend error if the write fails
    async fn insert(&self, record: &ImageRecord) -> ImageStorageResult<()>;

    /// Returns every stored record, in the order the backend yields them
    ///
    /// # Errors
    ///
    /// Returns `ImageStorageError` if the read fails or an item cannot be decoded
    async fn scan_all(&self) -> ImageStorageResult<Vec<ImageRecord>>;
}

/// Storage client for the images table
pub struct ImageRecordStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
    page_size: Option<i32>,
}

impl ImageRecordStorage {
    /// Creates a new storage instance
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured `DynamoDB` client
    /// * `table_name` - `DynamoDB` table name for image records
    #[must_use]
    pub const fn new(dynamodb_client: Arc<DynamoDbClient>, table_name: String) -> Self {
        Self {
            dynamodb_client,
            table_name,
            page_size: None,
        }
    }

    /// Caps the number of items read per scan page
    ///
    /// Without a cap each page is bounded only by `DynamoDB`'s 1 MB limit.
    #[must_use]
    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

#[async_trait]
impl ImageRecordStore for ImageRecordStorage {
    async fn insert(&self, record: &ImageRecord) -> ImageStorageResult<()> {
        let item = to_item(record)?;

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#pk)")
            .expression_attribute_names("#pk", ImageRecordAttribute::ImageId.to_string())
            .send()
            .await
            .map_err(|err| {
                if matches!(
                    err,
                    SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception()
                ) {
                    ImageStorageError::ImageRecordExists(record.image_id.clone())
                } else {
                    err.into()
                }
            })?;

        Ok(())
    }

    async fn scan_all(&self) -> ImageStorageResult<Vec<ImageRecord>> {
        let mut records = Vec::new();
        let mut exclusive_start_key = None;
        let mut pages = 0_usize;

        loop {
            let response = self
                .dynamodb_client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(exclusive_start_key)
                .set_limit(self.page_size)
                .send()
                .await?;

            pages += 1;
            let items = response.items.unwrap_or_default();
            records.extend(from_items::<_, ImageRecord>(items)?);

            exclusive_start_key = response.last_evaluated_key;
            if exclusive_start_key.is_none() {
                break;
            }
        }

        tracing::debug!(pages, count = records.len(), "Scanned images table");

        Ok(records)
    }
}

/// Accepts the size as a number or a numeric string, since older items were
/// written by clients that did not agree on the type
fn deserialize_file_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSize {
        Integer(u64),
        Float(f64),
        Text(String),
    }

    let Some(raw) = Option::<RawSize>::deserialize(deserializer)? else {
        return Ok(None);
    };

    match raw {
        RawSize::Integer(size) => Ok(Some(size)),
        RawSize::Float(size) => float_to_size(size).map(Some).map_err(de::Error::custom),
        RawSize::Text(text) => {
            let text = text.trim();
            if let Ok(size) = text.parse::<u64>() {
                return Ok(Some(size));
            }
            text.parse::<f64>()
                .map_err(|_| format!("invalid file size: {text:?}"))
                .and_then(float_to_size)
                .map(Some)
                .map_err(de::Error::custom)
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn float_to_size(size: f64) -> Result<u64, String> {
    if size.is_finite() && size >= 0.0 && size <= u64::MAX as f64 {
        Ok(size as u64)
    } else {
        Err(format!("invalid file size: {size}"))
    }
}
