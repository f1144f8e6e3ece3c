/// API reference served by Scalar, plus the raw `OpenAPI` document
mod docs;
/// Liveness and build information
mod health;
/// Upload URL issuance and gallery listing
pub mod images;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};

/// Creates the router with all handler routes
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .merge(docs::handler())
        .api_route("/health", get(health::handler))
        .api_route("/upload", post(images::create_upload_url))
        .api_route("/images", get(images::list_images))
}
