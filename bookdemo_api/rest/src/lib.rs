use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::Router;
use bookdemo_core_book_demo_contracts::BookDemoFeatureService;
use bookdemo_core_health_contracts::HealthService;
use tokio::net::TcpListener;
use tracing::info;

mod middlewares;
mod models;
mod routes;

#[derive(Debug, Clone)]
pub struct RestServer<Health, BookDemo> {
    health: Health,
    book_demo: BookDemo,
    config: RestServerConfig,
}

#[derive(Debug, Clone)]
pub struct RestServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub real_ip_config: Option<Arc<RestServerRealIpConfig>>,
    /// Origins allowed to call the api from a browser
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RestServerRealIpConfig {
    /// Header containing the real ip of the client
    pub header: String,
    /// Only trust the header if the request comes from this address
    pub set_from: IpAddr,
}

impl<Health, BookDemo> RestServer<Health, BookDemo>
where
    Health: HealthService,
    BookDemo: BookDemoFeatureService,
{
    pub fn new(health: Health, book_demo: BookDemo, config: RestServerConfig) -> Self {
        Self {
            health,
            book_demo,
            config,
        }
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        let RestServerConfig { host, port, .. } = self.config;
        let router = self.router()?;

        let listener = TcpListener::bind((host, port))
            .await
            .with_context(|| format!("Failed to bind to {host}:{port}"))?;
        info!("listening on {}", listener.local_addr()?);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(Into::into)
    }

    fn router(self) -> anyhow::Result<Router<()>> {
        let router = Router::new()
            .merge(routes::health::router(self.health.into()))
            .merge(routes::book_demo::router(self.book_demo.into()));

        // Layers added last run first: the trace span needs the client ip
        // and the request id.
        let router = middlewares::cors::add(router, &self.config.allowed_origins)?;
        let router = middlewares::panic_handler::add(router);
        let router = middlewares::trace::add(router);
        let router = middlewares::request_id::add(router);
        let router = middlewares::client_ip::add(self.config.real_ip_config)(router);

        Ok(router)
    }
}
