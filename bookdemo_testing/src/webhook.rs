use std::{
    net::IpAddr,
    sync::{Arc, Mutex},
};

use anyhow::Context;
use axum::{extract::State, http::StatusCode, routing, Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::info;

pub const WEBHOOK_ROUTE: &str = "/webhook";

/// In-memory stand-in for a chat webhook. Records every message it receives.
#[derive(Debug, Clone, Default)]
pub struct FakeWebhook {
    fail: bool,
    messages: Arc<Mutex<Vec<String>>>,
}

impl FakeWebhook {
    /// If `fail` is set, every request is recorded but answered with a 500.
    pub fn new(fail: bool) -> Self {
        Self {
            fail,
            messages: Default::default(),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    pub fn router(self) -> Router<()> {
        Router::new()
            .route(WEBHOOK_ROUTE, routing::post(post_message))
            .with_state(self)
    }
}

pub async fn start_server(host: IpAddr, port: u16, fail: bool) -> anyhow::Result<()> {
    info!("Starting chat webhook testing server on {host}:{port}");
    info!("Webhook url: http://{host}:{port}{WEBHOOK_ROUTE}");
    if fail {
        info!("All requests will be answered with 500 Internal Server Error");
    }

    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind to {host}:{port}"))?;
    serve(listener, FakeWebhook::new(fail)).await
}

pub async fn serve(listener: TcpListener, webhook: FakeWebhook) -> anyhow::Result<()> {
    axum::serve(listener, webhook.router())
        .await
        .context("Failed to start HTTP server")
}

#[derive(Deserialize)]
struct WebhookRequest {
    text: String,
}

async fn post_message(
    webhook: State<FakeWebhook>,
    Json(WebhookRequest { text }): Json<WebhookRequest>,
) -> StatusCode {
    info!("Received message:\n{text}");

    if let Ok(mut messages) = webhook.messages.lock() {
        messages.push(text);
    }

    match webhook.fail {
        true => StatusCode::INTERNAL_SERVER_ERROR,
        false => StatusCode::OK,
    }
}
