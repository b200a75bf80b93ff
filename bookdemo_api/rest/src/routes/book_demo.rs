use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use bookdemo_core_book_demo_contracts::{BookDemoFeatureService, BookDemoSubmitError};

use super::{internal_server_error, server_error};
use crate::models::{book_demo::parse_submission, ApiInvalidInput, ApiOk};

/// Largest accepted request body in bytes
pub const MAX_BODY_SIZE: usize = 64 * 1024;

pub fn router(service: Arc<impl BookDemoFeatureService>) -> Router<()> {
    Router::new()
        .route("/api/book-demo", routing::post(submit))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(service)
}

/// The body is taken as raw bytes so that malformed input is reported as
/// validation issues instead of being rejected by an extractor. Unreadable
/// bodies (e.g. over [`MAX_BODY_SIZE`]) are treated like an empty one.
async fn submit(
    service: State<Arc<impl BookDemoFeatureService>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = body.unwrap_or_else(|rejection| {
        tracing::debug!("failed to read request body: {rejection}");
        Bytes::new()
    });

    let submission = match parse_submission(&body) {
        Ok(submission) => submission,
        Err(issues) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiInvalidInput {
                    error: "Invalid input",
                    issues,
                }),
            )
                .into_response()
        }
    };

    // Suppressed spam is reported as success as well.
    match service.submit(submission).await {
        Ok(_) => Json(ApiOk { ok: true }).into_response(),
        Err(BookDemoSubmitError::Send) => server_error(),
        Err(BookDemoSubmitError::Other(err)) => internal_server_error(err),
    }
}
