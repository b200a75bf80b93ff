use std::{
    collections::HashMap,
    net::IpAddr,
    path::{Path, PathBuf},
};

use anyhow::Context;
use bookdemo_models::{email_address::EmailAddressWithName, Sensitive};
use config::{Environment, File, FileFormat};
use serde::Deserialize;
use url::Url;

pub use duration::Duration;

mod duration;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

/// Additional config files, separated like `PATH`
pub const CONFIG_PATHS_ENV: &str = "BOOKDEMO_CONFIG";

/// Prefix of generic overrides, e.g. `BOOKDEMO__HTTP__PORT=8080`
pub const ENV_PREFIX: &str = "BOOKDEMO";

/// Environment variables of the original deployment and the config keys they
/// map to. They take precedence over everything else.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("SMTP_HOST", "email.smtp_host"),
    ("SMTP_PORT", "email.smtp_port"),
    ("SMTP_USER", "email.smtp_username"),
    ("SMTP_PASS", "email.smtp_password"),
    ("BOOKDEMO_FROM", "email.from"),
    ("BOOKDEMO_TO", "book_demo.recipient"),
    ("SLACK_WEBHOOK_URL", "book_demo.webhook_url"),
];

/// Load the config from the default config file, the files listed in
/// `BOOKDEMO_CONFIG` and the environment of the current process.
pub fn load() -> anyhow::Result<Config> {
    let env = std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect::<HashMap<_, _>>();

    let mut paths = vec![PathBuf::from(DEFAULT_CONFIG_PATH)];
    if let Some(extra) = env.get(CONFIG_PATHS_ENV) {
        paths.extend(std::env::split_paths(extra));
    }

    load_with(&paths, &[], &env)
}

/// Load the config with increasing priority from the given files, the toml
/// `overrides`, the `BOOKDEMO__*` variables in `env` and finally the legacy
/// variables in `env`.
pub fn load_with(
    paths: &[impl AsRef<Path>],
    overrides: &[&str],
    env: &HashMap<String, String>,
) -> anyhow::Result<Config> {
    let builder = paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?;

    let builder = overrides
        .iter()
        .fold(builder, |builder, &source| {
            builder.add_source(File::from_str(source, FileFormat::Toml))
        })
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .source(Some(env.clone())),
        );

    // `set_override*` wins over every source, regardless of order
    LEGACY_ENV
        .iter()
        .try_fold(builder, |builder, &(var, key)| {
            let value = env.get(var).filter(|value| !value.is_empty());
            builder.set_override_option(key, value.cloned())
        })?
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub email: EmailConfig,
    #[serde(default)]
    pub book_demo: BookDemoConfig,
    pub health: HealthConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Origins allowed to submit forms from a browser
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    pub real_ip: Option<RealIpConfig>,
}

#[derive(Debug, Deserialize)]
pub struct RealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

#[derive(Debug, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_tls: Option<SmtpTlsConfig>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<Sensitive<String>>,
    /// Sender of all emails, defaults to `smtp_username`
    pub from: Option<EmailAddressWithName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTlsConfig {
    Tls,
    StartTls,
    None,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookDemoConfig {
    /// Recipient of demo request notifications, defaults to
    /// `email.smtp_username`
    pub recipient: Option<EmailAddressWithName>,
    pub webhook_url: Option<Url>,
}

#[derive(Debug, Deserialize)]
pub struct HealthConfig {
    pub cache_ttl: Duration,
}

impl Config {
    /// Resolve the recipient of demo request notifications.
    pub fn demo_request_recipient(&self) -> anyhow::Result<EmailAddressWithName> {
        match &self.book_demo.recipient {
            Some(recipient) => Ok(recipient.clone()),
            None => self.email.username_address("recipient"),
        }
    }
}

impl EmailConfig {
    /// Resolve the sender address of outgoing emails.
    pub fn sender(&self) -> anyhow::Result<EmailAddressWithName> {
        match &self.from {
            Some(from) => Ok(from.clone()),
            None => self.username_address("sender"),
        }
    }

    /// The configured TLS mode, falling back to implicit TLS on port 465 and
    /// `STARTTLS` on every other port.
    pub fn tls(&self) -> SmtpTlsConfig {
        self.smtp_tls.unwrap_or(match self.smtp_port {
            465 => SmtpTlsConfig::Tls,
            _ => SmtpTlsConfig::StartTls,
        })
    }

    /// Username and password, if both are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((
            self.smtp_username.as_deref()?,
            self.smtp_password.as_ref()?.as_str(),
        ))
    }

    fn username_address(&self, what: &str) -> anyhow::Result<EmailAddressWithName> {
        let username = self.smtp_username.as_deref().with_context(|| {
            format!("No {what} address configured and no smtp username to fall back to")
        })?;

        username.parse().with_context(|| {
            format!(
                "No {what} address configured and the smtp username {username:?} is not a valid \
                 email address"
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_default(overrides: &[&str], env: &[(&str, &str)]) -> anyhow::Result<Config> {
        let env = env
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        load_with(&[Path::new(DEFAULT_CONFIG_PATH)], overrides, &env)
    }

    #[test]
    fn load_default_config() {
        let config = load_default(&[], &[]).unwrap();

        assert_eq!(config.email.tls(), SmtpTlsConfig::StartTls);
        assert_eq!(config.email.credentials(), None);
        assert!(config.book_demo.webhook_url.is_none());
        assert!(config.email.sender().is_err());
        assert!(config.demo_request_recipient().is_err());
    }

    #[test]
    fn legacy_env() {
        let config = load_default(
            &[],
            &[
                ("SMTP_HOST", "smtp.example.com"),
                ("SMTP_PORT", "465"),
                ("SMTP_USER", "mailer@example.com"),
                ("SMTP_PASS", "hunter2"),
                ("BOOKDEMO_TO", "sales@example.com"),
                ("SLACK_WEBHOOK_URL", "https://hooks.slack.com/services/T0/B0/X"),
            ],
        )
        .unwrap();

        assert_eq!(config.email.smtp_host, "smtp.example.com");
        assert_eq!(config.email.smtp_port, 465);
        assert_eq!(config.email.tls(), SmtpTlsConfig::Tls);
        assert_eq!(
            config.email.credentials(),
            Some(("mailer@example.com", "hunter2"))
        );
        assert_eq!(config.email.sender().unwrap().to_string(), "mailer@example.com");
        assert_eq!(
            config.demo_request_recipient().unwrap().to_string(),
            "sales@example.com"
        );
        assert_eq!(
            config.book_demo.webhook_url.unwrap().as_str(),
            "https://hooks.slack.com/services/T0/B0/X"
        );
    }

    #[test]
    fn addresses_fall_back_to_smtp_username() {
        let config = load_default(&[], &[("SMTP_USER", "mailer@example.com")]).unwrap();

        assert_eq!(config.email.sender().unwrap().to_string(), "mailer@example.com");
        assert_eq!(
            config.demo_request_recipient().unwrap().to_string(),
            "mailer@example.com"
        );
    }

    #[test]
    fn username_is_not_an_address() {
        let config = load_default(&[], &[("SMTP_USER", "mailer")]).unwrap();

        assert!(config.email.sender().is_err());
        assert!(config.demo_request_recipient().is_err());
    }

    #[test]
    fn empty_legacy_env_is_ignored() {
        let config = load_default(
            &[],
            &[("SLACK_WEBHOOK_URL", ""), ("SMTP_HOST", "")],
        )
        .unwrap();

        assert!(config.book_demo.webhook_url.is_none());
        assert_eq!(config.email.smtp_host, "localhost");
    }

    #[test]
    fn prefixed_env() {
        let config = load_default(
            &[],
            &[
                ("BOOKDEMO__HTTP__PORT", "9000"),
                ("BOOKDEMO__EMAIL__SMTP_TLS", "none"),
            ],
        )
        .unwrap();

        assert_eq!(config.http.port, 9000);
        assert_eq!(config.email.tls(), SmtpTlsConfig::None);
    }

    #[test]
    fn legacy_env_wins_over_prefixed_env() {
        let config = load_default(
            &[],
            &[
                ("BOOKDEMO__EMAIL__SMTP_HOST", "smtp.internal"),
                ("SMTP_HOST", "smtp.example.com"),
            ],
        )
        .unwrap();

        assert_eq!(config.email.smtp_host, "smtp.example.com");
    }

    #[test]
    fn toml_overrides() {
        let config = load_default(
            &[
                "email.from = \"Book a Demo <demo@example.com>\"",
                "book_demo.recipient = \"sales@example.com\"",
                "http.allowed_origins = [\"https://example.com\"]",
            ],
            &[],
        )
        .unwrap();

        assert_eq!(
            config.email.sender().unwrap().into_email_address().as_str(),
            "demo@example.com"
        );
        assert_eq!(
            config.demo_request_recipient().unwrap().to_string(),
            "sales@example.com"
        );
        assert_eq!(config.http.allowed_origins, ["https://example.com"]);
    }

    #[test]
    fn env_wins_over_toml_overrides() {
        let config = load_default(
            &[
                "http.port = 7000",
                "email.smtp_host = \"smtp.override\"",
                "book_demo.recipient = \"override@example.com\"",
            ],
            &[
                ("BOOKDEMO__HTTP__PORT", "9000"),
                ("SMTP_HOST", "smtp.example.com"),
            ],
        )
        .unwrap();

        assert_eq!(config.http.port, 9000);
        assert_eq!(config.email.smtp_host, "smtp.example.com");
        assert_eq!(
            config.demo_request_recipient().unwrap().to_string(),
            "override@example.com"
        );
    }

    #[test]
    fn invalid_recipient() {
        let result = load_default(&[], &[("BOOKDEMO_TO", "not an address")]);

        assert!(result.is_err());
    }
}
