//! HTTP request handlers for API endpoints

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, warn};

use crate::{types::ErrorResponse, upload::UploadError, ApiState};

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(crate::types::HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Accept a multipart ZIP upload and answer with its directory tree.
///
/// Application-level failures are answered with `200` and `{"error": ...}`.
/// The pipeline runs on a blocking worker under the configured timeout; a worker
/// that outlives the timeout still removes its relay file when it finishes.
pub async fn upload_archive(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    info!("Upload request: {} bytes", body.len());

    let handler = state.upload.clone();
    let work = tokio::task::spawn_blocking(move || handler.respond(&body, &headers));

    match tokio::time::timeout(state.listing_timeout, work).await {
        Ok(Ok(json)) => json_response(StatusCode::OK, json),
        Ok(Err(e)) => {
            error!("Upload worker failed: {}", e);
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("Internal server error").to_json(),
            )
        }
        Err(_) => {
            let e = UploadError::ListingTimeout(state.listing_timeout);
            warn!("Upload rejected: {}", e);
            json_response(StatusCode::OK, e.to_json())
        }
    }
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}
