use std::sync::Arc;

use bookdemo_extern_contracts::chat_webhook::ChatWebhookApiService;
use serde::Serialize;
use url::Url;

use crate::http::HttpClient;

#[derive(Debug, Clone)]
pub struct ChatWebhookApiServiceImpl {
    config: ChatWebhookApiServiceConfig,
    client: HttpClient,
}

#[derive(Debug, Clone)]
pub struct ChatWebhookApiServiceConfig {
    pub url: Arc<Url>,
}

impl ChatWebhookApiServiceImpl {
    pub fn new(config: ChatWebhookApiServiceConfig, client: HttpClient) -> Self {
        Self { config, client }
    }
}

impl ChatWebhookApiService for ChatWebhookApiServiceImpl {
    async fn post_message(&self, text: String) -> anyhow::Result<()> {
        self.client
            .post((*self.config.url).clone())
            .json(&WebhookRequest { text: &text })
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[derive(Serialize)]
struct WebhookRequest<'a> {
    text: &'a str,
}
