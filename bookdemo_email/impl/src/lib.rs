use anyhow::anyhow;
use bookdemo_email_contracts::{Email, EmailBody, EmailService};
use bookdemo_models::{email_address::EmailAddressWithName, Sensitive};
use bookdemo_utils::Apply;
use lettre::{
    message::{MessageBuilder, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct EmailServiceImpl {
    from: EmailAddressWithName,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

#[derive(Debug, Clone)]
pub struct EmailServiceConfig {
    pub host: String,
    pub port: u16,
    pub tls: SmtpTls,
    pub credentials: Option<SmtpCredentials>,
    /// Sender of all outgoing emails
    pub from: EmailAddressWithName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpTls {
    /// TLS from the first byte (SMTPS, usually port 465)
    Implicit,
    /// Plaintext connection upgraded via `STARTTLS`
    StartTls,
    /// No encryption at all, only for local development servers
    None,
}

#[derive(Debug, Clone)]
pub struct SmtpCredentials {
    pub username: String,
    pub password: Sensitive<String>,
}

impl EmailServiceImpl {
    pub fn new(config: EmailServiceConfig) -> anyhow::Result<Self> {
        let EmailServiceConfig {
            host,
            port,
            tls,
            credentials,
            from,
        } = config;

        debug!(%host, port, ?tls, "building smtp transport");

        let builder = match tls {
            SmtpTls::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&host)?,
            SmtpTls::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)?,
            SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&host),
        };

        let transport = builder
            .port(port)
            .apply_map(credentials, |builder, credentials| {
                builder.credentials(Credentials::new(
                    credentials.username,
                    credentials.password.0,
                ))
            })
            .build();

        Ok(Self { from, transport })
    }

    #[cfg(feature = "dummy")]
    pub fn dummy() -> Self {
        Self::new(EmailServiceConfig {
            host: "dummy".into(),
            port: 25,
            tls: SmtpTls::None,
            credentials: None,
            from: "dummy@example.com".parse().unwrap(),
        })
        .unwrap()
    }

    fn build_message(&self, email: Email) -> anyhow::Result<Message> {
        let builder = Message::builder()
            .from(self.from.0.clone())
            .to(email.recipient.0)
            .apply_map(email.reply_to.map(|x| x.0), MessageBuilder::reply_to)
            .subject(email.subject);

        let message = match email.body {
            EmailBody::Text(text) => builder.singlepart(SinglePart::plain(text))?,
            EmailBody::Alternative { text, html } => {
                builder.multipart(MultiPart::alternative_plain_html(text, html))?
            }
        };

        Ok(message)
    }
}

impl EmailService for EmailServiceImpl {
    async fn send(&self, email: Email) -> anyhow::Result<bool> {
        let message = self.build_message(email)?;

        self.transport
            .send(message)
            .await
            .map(|response| response.is_positive())
            .map_err(Into::into)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.transport
            .test_connection()
            .await?
            .then_some(())
            .ok_or_else(|| anyhow!("Failed to ping smtp server"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_sut() -> EmailServiceImpl {
        EmailServiceImpl::new(EmailServiceConfig {
            host: "localhost".into(),
            port: 2525,
            tls: SmtpTls::None,
            credentials: None,
            from: "Book a Demo <demo@example.com>".parse().unwrap(),
        })
        .unwrap()
    }

    fn formatted(message: Message) -> String {
        String::from_utf8(message.formatted()).unwrap()
    }

    #[test]
    fn credentials_are_redacted() {
        let credentials = SmtpCredentials {
            username: "mailer".into(),
            password: "hunter2".to_owned().into(),
        };
        let debug = format!("{credentials:?}");
        assert!(debug.contains("mailer"));
        assert!(!debug.contains("hunter2"));
    }

    #[tokio::test]
    async fn alternative_message() {
        // Arrange
        let sut = make_sut();

        // Act
        let message = sut
            .build_message(Email {
                recipient: "sales@example.com".parse().unwrap(),
                subject: "New demo request: Jane Doe @ Acme".into(),
                body: EmailBody::Alternative {
                    text: "plain body".into(),
                    html: "<p>html body</p>".into(),
                },
                reply_to: Some("jane@acme.com".parse().unwrap()),
            })
            .unwrap();

        // Assert
        assert_eq!(
            message.envelope().to(),
            ["sales@example.com".parse::<lettre::Address>().unwrap()]
        );
        let source = formatted(message);
        assert!(source.contains("To: sales@example.com"));
        assert!(source.contains("Reply-To: jane@acme.com"));
        assert!(source.contains("Subject: New demo request: Jane Doe @ Acme"));
        assert!(source.contains("multipart/alternative"));
        assert!(source.contains("plain body"));
        assert!(source.contains("<p>html body</p>"));
    }

    #[tokio::test]
    async fn text_message_without_reply_to() {
        // Arrange
        let sut = make_sut();

        // Act
        let message = sut
            .build_message(Email {
                recipient: "test@example.com".parse().unwrap(),
                subject: "Email Deliverability Test".into(),
                body: EmailBody::Text("It works!".into()),
                reply_to: None,
            })
            .unwrap();

        // Assert
        let source = formatted(message);
        assert!(!source.contains("Reply-To:"));
        assert!(source.contains("Content-Type: text/plain"));
        assert!(source.contains("It works!"));
    }
}
