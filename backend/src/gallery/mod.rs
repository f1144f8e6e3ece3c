//! Upload authorization and listing workflows
//!
//! Both services are stateless. They are built once per process around the
//! object store and metadata store collaborators and shared between requests.

mod error;
mod listing;
mod upload;

pub use error::{GalleryError, GalleryResult};
pub use listing::{GalleryImage, ImageList, ImageListing};
pub use upload::{
    is_allowed_file_type, ImageUpload, UploadAuthorizer, UploadGrant, UploadRequest,
    ALLOWED_FILE_TYPES, MAX_FILE_SIZE,
};
