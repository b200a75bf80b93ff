use std::time::Duration;

use axum::{extract::Request, response::Response, Router};
use tower_http::trace::TraceLayer;
use tracing::{field, Span};

use super::{client_ip::ClientIp, request_id::RequestId};

/// Open an `http-request` span around every request. Must be added before
/// the client ip and request id middlewares, which fill in the span fields.
pub fn add<S: Clone + Send + Sync + 'static>(router: Router<S>) -> Router<S> {
    let layer = TraceLayer::new_for_http()
        .make_span_with(request_span)
        .on_request(|_: &Request, _: &Span| tracing::debug!("request received"))
        .on_response(log_response)
        .on_body_chunk(())
        .on_eos(())
        .on_failure(());

    router.layer(layer)
}

fn request_span(request: &Request) -> Span {
    let extensions = request.extensions();
    let client_ip = extensions.get::<ClientIp>().map(|ClientIp(ip)| field::display(*ip));
    let request_id = extensions.get::<RequestId>().map(|id| field::display(*id));

    tracing::debug_span!(
        "http-request",
        method = %request.method(),
        uri = %request.uri(),
        version = ?request.version(),
        client_ip,
        request_id,
    )
}

fn log_response(response: &Response, latency: Duration, _span: &Span) {
    tracing::debug!(status = %response.status(), ?latency, "response sent");
}
