use std::sync::Arc;

use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::instrument;

use crate::{
    gallery::{ImageList, ImageListing, ImageUpload, UploadAuthorizer, UploadRequest},
    types::{AppError, JsonBody},
};

/// Response of `POST /upload`
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Presigned URL to PUT the image bytes to, with the declared `Content-Type`
    pub upload_url: String,
    /// Public URL the image will be readable at once uploaded
    pub file_url: String,
    /// ID of the image record created for this upload
    pub image_id: String,
    /// ISO-8601 UTC timestamp when the presigned URL expires
    pub expires_at: String,
    /// Human-readable confirmation
    pub message: String,
}

/// Creates a presigned URL for uploading an image to S3
///
/// 1. Validates the declared file name, type and size
/// 2. Generates a new image ID and derives the object key `{imageId}-{fileName}`
/// 3. Presigns a PUT for that key, bound to the declared content type
/// 4. Stores the image metadata record
///
/// # Errors
///
/// - `400 BAD_REQUEST` - missing fields, disallowed file type, or size over 5 MiB
/// - `500 INTERNAL_SERVER_ERROR` - presigning or metadata storage failed
#[instrument(skip(authorizer, payload))]
pub async fn create_upload_url(
    Extension(authorizer): Extension<Arc<UploadAuthorizer>>,
    JsonBody(payload): JsonBody<UploadRequest>,
) -> Result<Json<UploadResponse>, AppError> {
    let upload = ImageUpload::try_from(payload)?;

    tracing::info!(
        file_name = %upload.file_name,
        file_type = %upload.file_type,
        file_size = ?upload.file_size,
        "Received upload request"
    );

    let grant = authorizer.authorize(upload).await?;

    Ok(Json(UploadResponse {
        upload_url: grant.upload_url,
        file_url: grant.record.file_url,
        image_id: grant.record.image_id,
        expires_at: grant.expires_at.to_rfc3339(),
        message: "Upload URL generated successfully".to_string(),
    }))
}

/// Lists every uploaded image, newest first
///
/// # Errors
///
/// - `500 INTERNAL_SERVER_ERROR` - the metadata store could not be read
#[instrument(skip(listing))]
pub async fn list_images(
    Extension(listing): Extension<Arc<ImageListing>>,
) -> Result<Json<ImageList>, AppError> {
    tracing::debug!("Fetching all images");

    Ok(Json(listing.list().await?))
}
