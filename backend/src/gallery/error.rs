//! Error kinds of the upload and listing workflows

use image_storage::image_record::ImageStorageError;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

use crate::media_storage::BucketError;

/// Result type for gallery workflows
pub type GalleryResult<T> = Result<T, GalleryError>;

/// Validation code for a missing or malformed required field
pub(crate) const INVALID_REQUEST: &str = "invalid_request";
/// Validation code for a file type outside the allow-list
pub(crate) const UNSUPPORTED_MEDIA_TYPE: &str = "unsupported_media_type";
/// Validation code for a declared size above the ceiling
pub(crate) const PAYLOAD_TOO_LARGE: &str = "payload_too_large";

/// Validation message marking a file name rejected for its characters
pub(crate) const INVALID_FILE_NAME: &str = "invalid_file_name";

/// Errors produced by the upload authorizer and the listing service
#[derive(Debug, Error)]
pub enum GalleryError {
    /// A required field is missing or malformed
    #[error("{0}")]
    InvalidRequest(&'static str),

    /// The declared file type is not an allowed image type
    #[error("Invalid file type. Only image files are allowed (jpeg, jpg, png, gif, webp)")]
    UnsupportedMediaType,

    /// The declared file size is over the limit
    #[error("File size exceeds the limit (5MB)")]
    PayloadTooLarge,

    /// The object store could not mint an upload URL
    #[error("Failed to issue upload URL")]
    CredentialIssuanceFailed(#[source] BucketError),

    /// The metadata store rejected the new record
    #[error("Failed to store image metadata")]
    PersistFailed(#[source] ImageStorageError),

    /// The metadata store could not be read in full
    #[error("Failed to fetch images")]
    ListFailed(#[source] ImageStorageError),

    /// A collaborator failed in a way no other kind describes
    #[error("Unexpected collaborator failure")]
    InternalError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl GalleryError {
    /// Message used for a request missing `fileName` or `fileType`
    pub const MISSING_FIELDS: &'static str = "Missing required fields: fileName and fileType";
    /// Message used for a file name carrying separators or control characters
    pub const BAD_FILE_NAME: &'static str =
        "Invalid file name: path separators and control characters are not allowed";
    /// Message used for a body that is not valid JSON for the request
    pub const BAD_JSON: &'static str = "Invalid JSON payload";
    /// Message used for a body sent without a JSON content type
    pub const BAD_CONTENT_TYPE: &'static str = "Missing Content-Type: application/json header";

    /// Stable machine-readable code of the error kind
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => INVALID_REQUEST,
            Self::UnsupportedMediaType => UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge => PAYLOAD_TOO_LARGE,
            Self::CredentialIssuanceFailed(_) => "credential_issuance_failed",
            Self::PersistFailed(_) => "persist_failed",
            Self::ListFailed(_) => "list_failed",
            Self::InternalError(_) => "internal_error",
        }
    }

    /// Whether the error was caused by the request rather than a collaborator
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_) | Self::UnsupportedMediaType | Self::PayloadTooLarge
        )
    }
}

impl From<BucketError> for GalleryError {
    fn from(err: BucketError) -> Self {
        match err {
            BucketError::PresignError(_) => Self::CredentialIssuanceFailed(err),
            BucketError::ConfigError(_) => Self::InternalError(Box::new(err)),
        }
    }
}

/// Picks the highest priority violation so the outcome does not depend on the
/// order fields were checked in: presence, then media type, then size
impl From<ValidationErrors> for GalleryError {
    fn from(errors: ValidationErrors) -> Self {
        errors
            .field_errors()
            .into_values()
            .flat_map(|field_errors| field_errors.iter())
            .map(Self::from_violation)
            .min_by_key(Self::validation_rank)
            .unwrap_or(Self::InvalidRequest(Self::MISSING_FIELDS))
    }
}

impl GalleryError {
    fn from_violation(error: &ValidationError) -> Self {
        match error.code.as_ref() {
            UNSUPPORTED_MEDIA_TYPE => Self::UnsupportedMediaType,
            PAYLOAD_TOO_LARGE => Self::PayloadTooLarge,
            _ if error.message.as_deref() == Some(INVALID_FILE_NAME) => {
                Self::InvalidRequest(Self::BAD_FILE_NAME)
            }
            _ => Self::InvalidRequest(Self::MISSING_FIELDS),
        }
    }

    const fn validation_rank(&self) -> u8 {
        match self {
            Self::InvalidRequest(_) => 0,
            Self::UnsupportedMediaType => 1,
            Self::PayloadTooLarge => 2,
            _ => u8::MAX,
        }
    }
}
