use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ApiError;

pub mod book_demo;
pub mod health;

pub fn internal_server_error(err: impl Into<anyhow::Error>) -> Response {
    let err = err.into();
    tracing::error!("internal server error: {err:#}");
    server_error()
}

/// The response for every failure the client cannot do anything about. No
/// details are leaked to the client.
fn server_error() -> Response {
    error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
}

fn error(code: StatusCode, error: &'static str) -> Response {
    (code, Json(ApiError { error })).into_response()
}
