//! Image Gallery Backend service
//!
//! Issues presigned S3 upload URLs, records image metadata in `DynamoDB`, and
//! lists the stored images.

#![deny(clippy::all)]
#![warn(clippy::pedantic, clippy::nursery, missing_docs)]

/// Upload authorization and listing workflows
pub mod gallery;

/// S3 object storage operations
pub mod media_storage;

/// HTTP routes
pub mod routes;

/// HTTP server setup
pub mod server;

/// Configuration, errors and extractors shared by the HTTP layer
pub mod types;
