use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::errors::monitor_error::ProxyUpstreamError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    InvalidQuery(String),
    Upstream(ProxyUpstreamError),
}

#[derive(Serialize)]
struct ApiErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(path) => (
                StatusCode::NOT_FOUND,
                "Not Found",
                format!("No API endpoint matches {path}."),
            ),
            ApiError::InvalidQuery(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg),
            ApiError::Upstream(err) => {
                error!(error = %err, "upstream request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    err.to_string(),
                )
            }
        };

        let body = ApiErrorResponse { error, message };

        (status, Json(body)).into_response()
    }
}

impl From<ProxyUpstreamError> for ApiError {
    fn from(err: ProxyUpstreamError) -> Self {
        ApiError::Upstream(err)
    }
}
