use anyhow::Context;
use bookdemo_email_contracts::EmailService;
use bookdemo_email_impl::{EmailServiceConfig, EmailServiceImpl};

/// Connect to the SMTP server
pub async fn connect(config: EmailServiceConfig) -> anyhow::Result<EmailServiceImpl> {
    let host = format!("{}:{}", config.host, config.port);

    let email = EmailServiceImpl::new(config).context("Failed to create SMTP transport")?;
    email
        .ping()
        .await
        .with_context(|| format!("Failed to connect to SMTP server at {host}"))?;

    Ok(email)
}
