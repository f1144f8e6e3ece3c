//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::gallery::GalleryError;

/// API error response body
///
/// Client errors carry `error` and `code`; server errors also carry a generic
/// `message` describing which step failed.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ApiErrorResponse {
    /// Human-readable error description
    pub error: String,
    /// Short description of the failed step, server errors only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Machine-readable error code
    pub code: &'static str,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a client error (4xx)
    #[must_use]
    pub fn client(status: StatusCode, code: &'static str, error: impl Into<String>) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                error: error.into(),
                message: None,
                code,
            },
        }
    }

    /// Create a server error (5xx)
    #[must_use]
    pub fn server(
        status: StatusCode,
        code: &'static str,
        error: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                error: error.into(),
                message: Some(message.into()),
                code,
            },
        }
    }

    /// HTTP status of the response
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.inner.code
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.status.as_u16() {
            400..=499 => tracing::warn!("Client error: {} - {}", self.inner.code, self.inner.error),
            500..=599 => tracing::error!("Server error: {} - {}", self.inner.code, self.inner.error),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert workflow errors to application errors
///
/// Validation errors surface their own message. Collaborator errors are logged
/// with their full source chain and reach the client only as a generic message.
impl From<GalleryError> for AppError {
    fn from(err: GalleryError) -> Self {
        if err.is_validation() {
            return Self::client(StatusCode::BAD_REQUEST, err.code(), err.to_string());
        }

        tracing::error!(code = err.code(), "{}", error_chain(&err));

        let error = match err {
            GalleryError::ListFailed(_) => "Failed to fetch images",
            _ => "Internal server error",
        };

        Self::server(
            StatusCode::INTERNAL_SERVER_ERROR,
            err.code(),
            error,
            err.to_string(),
        )
    }
}

/// Renders an error and all of its sources as `outer: inner: ...`
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }

    fn inferred_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        Self::operation_response(ctx, operation).map_or_else(Vec::new, |response| {
            vec![(Some(400), response.clone()), (Some(500), response)]
        })
    }
}
