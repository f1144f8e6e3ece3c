use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use chrono::{DateTime, Utc};
use gallery_backend::{media_storage::MediaStore, server, types::Environment};
use image_storage::image_record::{ImageRecord, ImageRecordStore};
use tower::ServiceExt;

use super::fakes::{FakeMediaStore, MemoryImageStore, FAKE_BUCKET_URL};

pub const TEST_ORIGIN: &str = "http://localhost:5173";

/// Setup test environment variables with all the required configuration
pub fn setup_test_env() {
    dotenvy::from_path(".env.example").ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Router wired to in-memory collaborators
pub struct TestSetup<M = FakeMediaStore> {
    pub router: Router,
    pub media_store: Arc<M>,
    pub image_records: Arc<MemoryImageStore>,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::with(FakeMediaStore::default(), MemoryImageStore::default())
    }
}

impl<M: MediaStore + 'static> TestSetup<M> {
    pub fn with(media_store: M, image_records: MemoryImageStore) -> Self {
        setup_test_env();

        let media_store = Arc::new(media_store);
        let image_records = Arc::new(image_records);

        let router = server::router(
            Environment::Development {
                presign_expiry_override: None,
            },
            media_store.clone() as Arc<dyn MediaStore>,
            image_records.clone() as Arc<dyn ImageRecordStore>,
        );

        Self {
            router,
            media_store,
            image_records,
        }
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_raw_post_request(route, payload.to_string()).await
    }

    pub async fn send_raw_post_request(
        &self,
        route: &str,
        body: String,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json")
            .header("Origin", TEST_ORIGIN)
            .body(Body::from(body))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .header("Origin", TEST_ORIGIN)
            .body(Body::empty())?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }
}

pub async fn parse_response_body(response: Response) -> serde_json::Value {
    use http_body_util::BodyExt;

    let body = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&body).expect("Body is not JSON")
}

pub fn allow_origin(response: &Response) -> Option<&str> {
    response
        .headers()
        .get("access-control-allow-origin")
        .and_then(|value| value.to_str().ok())
}

/// A stored record as the upload workflow would have written it
pub fn image_record(image_id: &str, file_name: &str, uploaded_at: DateTime<Utc>) -> ImageRecord {
    let storage_key = ImageRecord::storage_key_for(image_id, file_name);
    ImageRecord {
        image_id: image_id.to_string(),
        file_name: file_name.to_string(),
        file_url: format!("{FAKE_BUCKET_URL}/{storage_key}"),
        file_type: "image/png".to_string(),
        file_size: Some(1024),
        uploaded_at,
        storage_key,
    }
}
