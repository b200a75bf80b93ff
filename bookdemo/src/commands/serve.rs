use bookdemo_config::Config;
use tracing::info;

use crate::{email, environment::ServiceConfigs};

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let configs = ServiceConfigs::new(&config)?;

    info!("Connecting to smtp server");
    let email = email::connect(configs.email.clone()).await?;

    if configs.chat_webhook.is_none() {
        info!("No chat webhook configured, demo requests are only sent by email");
    }

    let server = configs.rest_server(email)?;
    info!(
        "Starting http server on {}:{}",
        config.http.host, config.http.port
    );
    server.serve().await
}
