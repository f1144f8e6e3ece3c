use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;
use image_storage::image_record::ImageRecordStorage;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

use gallery_backend::{media_storage::MediaStorage, server, types::Environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // Fall back to the environment's level when RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(environment.tracing_level().as_str()));

    // JSON logs for staging/production, human readable for development
    match environment {
        Environment::Production | Environment::Staging => {
            fmt().json().with_env_filter(env_filter).init();
        }
        Environment::Development { .. } => {
            fmt().with_env_filter(env_filter).init();
        }
    }

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let media_storage = Arc::new(MediaStorage::new(
        s3_client,
        environment.s3_bucket(),
        Url::parse(&environment.public_bucket_url())?,
        environment.presigned_url_expiry_secs(),
    ));

    let dynamodb_client = Arc::new(DynamoDbClient::new(&environment.aws_config().await));
    let image_records = Arc::new(ImageRecordStorage::new(
        dynamodb_client,
        environment.images_table_name(),
    ));

    server::start(environment, media_storage, image_records).await
}
