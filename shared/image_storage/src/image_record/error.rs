//! Error types for image record storage operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{put_item::PutItemError, scan::ScanError};
use thiserror::Error;

/// Result type alias for image record storage operations
pub type ImageStorageResult<T> = Result<T, ImageStorageError>;

/// Errors that can occur during image record storage operations
#[derive(Debug, Error)]
pub enum ImageStorageError {
    /// Failed to insert image record into `DynamoDB`
    #[error("Failed to insert image record into DynamoDB: {0:?}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to scan image records from `DynamoDB`
    #[error("Failed to scan image records from DynamoDB: {0:?}")]
    DynamoDbScanError(#[from] SdkError<ScanError>),

    /// A record with this image id is already stored
    #[error("Image record already exists: {0}")]
    ImageRecordExists(String),

    /// Failed to convert between an image record and a `DynamoDB` item
    #[error("Failed to parse image record: {0}")]
    SerializationError(String),
}

impl From<serde_dynamo::Error> for ImageStorageError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
