//! Upload authorization: validated request → presigned PUT URL + metadata record

use std::sync::Arc;

use chrono::{DateTime, Utc};
use image_storage::image_record::{ImageRecord, ImageRecordStore, ImageStorageError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::error::{
    GalleryError, GalleryResult, INVALID_FILE_NAME, INVALID_REQUEST, UNSUPPORTED_MEDIA_TYPE,
};
use crate::media_storage::MediaStore;

/// Largest declared size accepted for an upload, inclusive (5 MiB)
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// MIME types an upload may declare, compared case-insensitively
pub const ALLOWED_FILE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Request body of `POST /upload`
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    /// Name of the file being uploaded, becomes part of the object key
    #[validate(
        required,
        length(min = 1, code = "invalid_request"),
        custom(function = "validate_file_name")
    )]
    pub file_name: Option<String>,
    /// MIME type the upload will be sent with
    #[validate(
        required,
        length(min = 1, code = "invalid_request"),
        custom(function = "validate_file_type")
    )]
    pub file_type: Option<String>,
    /// Declared size in bytes - max 5 MiB
    #[validate(range(max = MAX_FILE_SIZE, code = "payload_too_large"))]
    pub file_size: Option<u64>,
}

fn validate_file_name(file_name: &str) -> Result<(), ValidationError> {
    if file_name
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_control())
    {
        return Err(ValidationError::new(INVALID_REQUEST).with_message(INVALID_FILE_NAME.into()));
    }
    Ok(())
}

fn validate_file_type(file_type: &str) -> Result<(), ValidationError> {
    if is_allowed_file_type(file_type) {
        Ok(())
    } else {
        Err(ValidationError::new(UNSUPPORTED_MEDIA_TYPE))
    }
}

/// Whether `file_type` is on the image allow-list
#[must_use]
pub fn is_allowed_file_type(file_type: &str) -> bool {
    ALLOWED_FILE_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(file_type))
}

/// An upload request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// File name, non-empty and free of separators
    pub file_name: String,
    /// Allowed MIME type, as declared by the client
    pub file_type: String,
    /// Declared size, at most [`MAX_FILE_SIZE`]
    pub file_size: Option<u64>,
}

impl TryFrom<UploadRequest> for ImageUpload {
    type Error = GalleryError;

    fn try_from(request: UploadRequest) -> Result<Self, Self::Error> {
        request.validate()?;

        let (Some(file_name), Some(file_type)) = (request.file_name, request.file_type) else {
            return Err(GalleryError::InvalidRequest(GalleryError::MISSING_FIELDS));
        };

        Ok(Self {
            file_name,
            file_type,
            file_size: request.file_size,
        })
    }
}

/// Result of a successful authorization
#[derive(Debug, Clone)]
pub struct UploadGrant {
    /// Presigned PUT URL for the object
    pub upload_url: String,
    /// When `upload_url` stops being accepted
    pub expires_at: DateTime<Utc>,
    /// The record persisted for this upload
    pub record: ImageRecord,
}

/// Issues upload URLs and records the metadata of each upload
pub struct UploadAuthorizer {
    media_store: Arc<dyn MediaStore>,
    image_records: Arc<dyn ImageRecordStore>,
}

impl UploadAuthorizer {
    /// Creates an authorizer over the given collaborators
    #[must_use]
    pub fn new(media_store: Arc<dyn MediaStore>, image_records: Arc<dyn ImageRecordStore>) -> Self {
        Self {
            media_store,
            image_records,
        }
    }

    /// Mints a presigned upload URL for a fresh object key and records the upload
    ///
    /// The record is written before any bytes reach the bucket, with
    /// `uploaded_at` set to the time of this call.
    ///
    /// # Errors
    ///
    /// - `GalleryError::CredentialIssuanceFailed` - the URL could not be signed
    /// - `GalleryError::PersistFailed` - the record could not be written; the URL
    ///   already issued is left unused
    /// - `GalleryError::InternalError` - a collaborator is misconfigured or the
    ///   generated id collided
    pub async fn authorize(&self, upload: ImageUpload) -> GalleryResult<UploadGrant> {
        let image_id = Uuid::new_v4().to_string();
        let storage_key = ImageRecord::storage_key_for(&image_id, &upload.file_name);

        tracing::debug!(%image_id, %storage_key, "Generating presigned upload URL");

        let presigned = self
            .media_store
            .presign_put(&storage_key, &upload.file_type)
            .await?;

        let record = ImageRecord {
            image_id,
            file_name: upload.file_name,
            file_url: self.media_store.public_url(&storage_key),
            file_type: upload.file_type,
            file_size: upload.file_size,
            uploaded_at: Utc::now(),
            storage_key,
        };

        self.image_records
            .insert(&record)
            .await
            .map_err(|err| match err {
                ImageStorageError::ImageRecordExists(_) => {
                    GalleryError::InternalError(Box::new(err))
                }
                err => GalleryError::PersistFailed(err),
            })?;

        tracing::info!(
            image_id = %record.image_id,
            "Successfully created presigned URL and stored metadata"
        );

        Ok(UploadGrant {
            upload_url: presigned.url,
            expires_at: presigned.expires_at,
            record,
        })
    }
}
