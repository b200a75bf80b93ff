use std::ops::Deref;

use bookdemo_utils::bookdemo_version;

/// Shared reqwest client for all outgoing requests, identifying itself with
/// [`user_agent`].
#[derive(Debug, Clone)]
pub struct HttpClient(reqwest::Client);

impl HttpClient {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent())
            .build()?;

        Ok(Self(client))
    }
}

impl Deref for HttpClient {
    type Target = reqwest::Client;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Lets webhook operators find out who is posting to them.
pub fn user_agent() -> String {
    format!(
        "Book a Demo Backend/{} (+{}; {})",
        bookdemo_version(),
        env!("CARGO_PKG_HOMEPAGE"),
        env!("CARGO_PKG_REPOSITORY"),
    )
}
