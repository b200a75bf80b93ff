use std::sync::Arc;

use anyhow::Context;
use bookdemo_api_rest::{RestServerConfig, RestServerRealIpConfig};
use bookdemo_config::{Config, SmtpTlsConfig};
use bookdemo_core_book_demo_impl::BookDemoFeatureConfig;
use bookdemo_core_health_impl::HealthFeatureConfig;
use bookdemo_email_impl::{EmailServiceConfig, SmtpCredentials, SmtpTls};
use bookdemo_extern_impl::{
    chat_webhook::{ChatWebhookApiServiceConfig, ChatWebhookApiServiceImpl},
    http::HttpClient,
};
use bookdemo_templates_impl::TemplateServiceImpl;
use types::{BookDemoFeature, Email, HealthFeature, RestServer};

pub mod types;

/// The configuration of every service, resolved from the loaded [`Config`].
///
/// Services never read the environment themselves, everything they need is
/// passed to their constructors from here.
#[derive(Debug, Clone)]
pub struct ServiceConfigs {
    // API
    pub rest_server: RestServerConfig,

    // Infrastructure
    pub email: EmailServiceConfig,

    // Extern
    pub chat_webhook: Option<ChatWebhookApiServiceConfig>,

    // Core
    pub book_demo: BookDemoFeatureConfig,
    pub health: HealthFeatureConfig,
}

impl ServiceConfigs {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        // API
        let rest_server = RestServerConfig {
            host: config.http.host,
            port: config.http.port,
            real_ip_config: config.http.real_ip.as_ref().map(|real_ip_config| {
                Arc::new(RestServerRealIpConfig {
                    header: real_ip_config.header.clone(),
                    set_from: real_ip_config.set_from,
                })
            }),
            allowed_origins: config.http.allowed_origins.clone(),
        };

        // Infrastructure
        let email = EmailServiceConfig {
            host: config.email.smtp_host.clone(),
            port: config.email.smtp_port,
            tls: match config.email.tls() {
                SmtpTlsConfig::Tls => SmtpTls::Implicit,
                SmtpTlsConfig::StartTls => SmtpTls::StartTls,
                SmtpTlsConfig::None => SmtpTls::None,
            },
            credentials: config
                .email
                .credentials()
                .map(|(username, password)| SmtpCredentials {
                    username: username.into(),
                    password: password.to_owned().into(),
                }),
            from: config.email.sender().context("Invalid email config")?,
        };

        // Extern
        let chat_webhook = config
            .book_demo
            .webhook_url
            .clone()
            .map(|url| ChatWebhookApiServiceConfig { url: url.into() });

        // Core
        let book_demo = BookDemoFeatureConfig {
            recipient: config
                .demo_request_recipient()
                .context("Invalid book_demo config")?
                .into(),
        };

        let health = HealthFeatureConfig {
            cache_ttl: config.health.cache_ttl.into(),
        };

        Ok(Self {
            rest_server,
            email,
            chat_webhook,
            book_demo,
            health,
        })
    }

    /// Wire up the REST server and all the services behind it.
    pub fn rest_server(self, email: Email) -> anyhow::Result<RestServer> {
        let template = TemplateServiceImpl::new()?;

        let chat_webhook = self
            .chat_webhook
            .map(|config| anyhow::Ok(ChatWebhookApiServiceImpl::new(config, HttpClient::new()?)))
            .transpose()?;

        let health = HealthFeature::new(email.clone(), self.health);
        let book_demo = BookDemoFeature::new(email, template, chat_webhook, self.book_demo);

        Ok(RestServer::new(health, book_demo, self.rest_server))
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, path::Path};

    use bookdemo_config::DEFAULT_CONFIG_PATH;

    use super::*;

    fn load(overrides: &[&str]) -> Config {
        bookdemo_config::load_with(
            &[Path::new(DEFAULT_CONFIG_PATH)],
            overrides,
            &HashMap::new(),
        )
        .unwrap()
    }

    #[test]
    fn resolve() {
        // Arrange
        let config = load(&[
            "email.smtp_username = \"mailer@example.com\"",
            "email.smtp_password = \"hunter2\"",
            "book_demo.webhook_url = \"http://127.0.0.1:8001/webhook\"",
        ]);

        // Act
        let configs = ServiceConfigs::new(&config).unwrap();

        // Assert
        assert_eq!(configs.email.tls, SmtpTls::StartTls);
        assert_eq!(configs.email.from.to_string(), "mailer@example.com");
        let credentials = configs.email.credentials.unwrap();
        assert_eq!(credentials.username, "mailer@example.com");
        assert_eq!(*credentials.password, "hunter2");
        assert_eq!(
            configs.book_demo.recipient.to_string(),
            "mailer@example.com"
        );
        assert_eq!(
            configs.chat_webhook.unwrap().url.as_str(),
            "http://127.0.0.1:8001/webhook"
        );
        assert_eq!(configs.health.cache_ttl.as_secs(), 10);
    }

    #[test]
    fn missing_sender() {
        let config = load(&[]);
        assert!(ServiceConfigs::new(&config).is_err());
    }

    #[tokio::test]
    async fn provide_rest_server() {
        let config = load(&[
            "email.from = \"demo@example.com\"",
            "book_demo.recipient = \"sales@example.com\"",
            "book_demo.webhook_url = \"http://127.0.0.1:8001/webhook\"",
        ]);
        let configs = ServiceConfigs::new(&config).unwrap();

        let _server: RestServer = configs.rest_server(Email::dummy()).unwrap();
    }
}
