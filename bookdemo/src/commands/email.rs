use anyhow::ensure;
use bookdemo_config::Config;
use bookdemo_email_contracts::{Email, EmailBody, EmailService};
use bookdemo_models::email_address::EmailAddressWithName;
use clap::Subcommand;
use tracing::info;

use crate::{email, environment::ServiceConfigs};

#[derive(Debug, Subcommand)]
pub enum EmailCommand {
    /// Test email deliverability
    Test {
        /// Defaults to the recipient of demo requests
        recipient: Option<EmailAddressWithName>,
    },
}

impl EmailCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        match self {
            EmailCommand::Test { recipient } => test(config, recipient).await,
        }
    }
}

async fn test(config: Config, recipient: Option<EmailAddressWithName>) -> anyhow::Result<()> {
    let configs = ServiceConfigs::new(&config)?;
    let recipient = recipient.unwrap_or_else(|| (*configs.book_demo.recipient).clone());

    let email_service = email::connect(configs.email).await?;

    info!(%recipient, "Sending test email");
    let ok = email_service
        .send(Email {
            recipient,
            subject: "Email Deliverability Test".into(),
            body: EmailBody::Text("Email deliverability seems to be working!".into()),
            reply_to: None,
        })
        .await?;

    ensure!(ok, "Failed to send email");

    Ok(())
}
