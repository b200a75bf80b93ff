use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use bookdemo_core_health_contracts::{HealthService, HealthStatus};
use serde::Serialize;

pub fn router(service: Arc<impl HealthService>) -> Router<()> {
    Router::new()
        .route("/health", routing::get(health))
        .with_state(service)
}

#[derive(Serialize)]
struct HealthResponse {
    http: bool,
    email: bool,
}

async fn health(service: State<Arc<impl HealthService>>) -> Response {
    let HealthStatus { email } = service.get_status().await;

    let status = if email {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (status, Json(HealthResponse { http: true, email })).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use bookdemo_core_health_contracts::MockHealthService;
    use tower::ServiceExt;

    use super::*;

    async fn get_health(email: bool) -> (StatusCode, String) {
        let service = MockHealthService::new().with_get_status(HealthStatus { email });
        let request = Request::get("/health").body(Body::empty()).unwrap();

        let response = router(service.into()).oneshot(request).await.unwrap();

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn healthy() {
        let (status, body) = get_health(true).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"http":true,"email":true}"#);
    }

    #[tokio::test]
    async fn smtp_unreachable() {
        let (status, body) = get_health(false).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"http":true,"email":false}"#);
    }
}
