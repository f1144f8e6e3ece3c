//! Custom extractors for request parsing

use aide::operation::OperationInput;
use aide::OperationOutput;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use schemars::JsonSchema;

use crate::gallery::GalleryError;
use crate::types::error::AppError;

/// JSON extractor whose rejections use the API error envelope
///
/// Only the body shape is checked here; field rules are enforced when the
/// payload is converted into its validated type.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: serde::de::DeserializeOwned + JsonSchema,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err| {
                tracing::debug!("Rejected request body: {err}");
                let error = match err {
                    JsonRejection::MissingJsonContentType(_) => GalleryError::BAD_CONTENT_TYPE,
                    _ => GalleryError::BAD_JSON,
                };
                AppError::from(GalleryError::InvalidRequest(error))
            })?;

        Ok(Self(payload))
    }
}

impl<T> OperationInput for JsonBody<T>
where
    T: JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        // Same wire format as Json<T>
        Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        // Document malformed body responses
        AppError::inferred_responses(ctx, operation)
    }
}
