//! Gallery listing: full scan → normalized records → newest first

use std::sync::Arc;

use chrono::SecondsFormat;
use image_storage::image_record::{ImageRecord, ImageRecordStore};
use schemars::JsonSchema;
use serde::Serialize;

use super::error::{GalleryError, GalleryResult};

/// One image as shown in the gallery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    /// Unique image ID
    pub image_id: String,
    /// File name as uploaded
    pub file_name: String,
    /// Public URL of the image
    pub file_url: String,
    /// MIME type declared at upload time
    pub file_type: String,
    /// Declared size in bytes, 0 when none was declared
    pub file_size: u64,
    /// ISO-8601 UTC timestamp the upload URL was issued at
    pub uploaded_at: String,
    /// Object key in the bucket
    pub storage_key: String,
}

impl From<ImageRecord> for GalleryImage {
    fn from(record: ImageRecord) -> Self {
        Self {
            image_id: record.image_id,
            file_name: record.file_name,
            file_url: record.file_url,
            file_type: record.file_type,
            file_size: record.file_size.unwrap_or(0),
            uploaded_at: record
                .uploaded_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            storage_key: record.storage_key,
        }
    }
}

/// Every stored image, newest first
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ImageList {
    /// Images ordered by `uploadedAt`, descending
    pub images: Vec<GalleryImage>,
    /// Number of entries in `images`
    pub count: usize,
}

/// Reads the whole gallery from the metadata store
pub struct ImageListing {
    image_records: Arc<dyn ImageRecordStore>,
}

impl ImageListing {
    /// Creates a listing service over the given metadata store
    #[must_use]
    pub fn new(image_records: Arc<dyn ImageRecordStore>) -> Self {
        Self { image_records }
    }

    /// Lists every image record, newest first
    ///
    /// Records with equal timestamps keep the order the store returned them in.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::ListFailed` if the store cannot be read in full
    pub async fn list(&self) -> GalleryResult<ImageList> {
        let mut records = self
            .image_records
            .scan_all()
            .await
            .map_err(GalleryError::ListFailed)?;

        // Stable, so ties keep retrieval order
        records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));

        let images: Vec<GalleryImage> = records.into_iter().map(GalleryImage::from).collect();

        tracing::info!(count = images.len(), "Successfully fetched images");

        Ok(ImageList {
            count: images.len(),
            images,
        })
    }
}
