//! Mapping from the core error taxonomy onto HTTP responses.
//!
//! Callers always get a JSON body. 4xx means the upstream answered but with
//! data the service refuses to store; 5xx means transport, configuration,
//! or persistence trouble.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use wonfx_core::errors::Error;
use wonfx_providers::SourceError;

pub type ApiResult<T> = Result<T, ApiError>;

pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Source(SourceError::MalformedResponse { .. })
        | Error::Source(SourceError::UpstreamLogical { .. })
        | Error::NoTrackedCurrencyData => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!("Ingestion failed: {}", self.0);
        } else {
            tracing::warn!("Ingestion rejected upstream data: {}", self.0);
        }
        let body = Json(json!({
            "success": false,
            "error": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
