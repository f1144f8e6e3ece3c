use std::sync::Arc;
use std::time::Duration;

use aide::openapi::OpenApi;
use axum::{http::Method, Extension, Router};
use image_storage::image_record::ImageRecordStore;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::gallery::{ImageListing, UploadAuthorizer};
use crate::routes;
use crate::{media_storage::MediaStore, types::Environment};

/// Builds the application router around the given collaborators
///
/// Every response, errors included, carries `Access-Control-Allow-Origin: *`.
pub fn router(
    environment: Environment,
    media_store: Arc<dyn MediaStore>,
    image_records: Arc<dyn ImageRecordStore>,
) -> Router {
    let upload_authorizer = Arc::new(UploadAuthorizer::new(media_store, image_records.clone()));
    let image_listing = Arc::new(ImageListing::new(image_records));

    let mut openapi = OpenApi::default();

    routes::handler()
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(environment))
        .layer(Extension(upload_authorizer))
        .layer(Extension(image_listing))
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any),
        )
}

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(
    environment: Environment,
    media_store: Arc<dyn MediaStore>,
    image_records: Arc<dyn ImageRecordStore>,
) -> anyhow::Result<()> {
    let router = router(environment, media_store, image_records);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], Environment::port()?));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Image Gallery Backend started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
