use std::future::Future;

/// Incoming webhook of a chat workspace (e.g. Slack), used to notify a
/// channel about new demo requests.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ChatWebhookApiService: Send + Sync + 'static {
    /// Post a plain text message to the webhook.
    fn post_message(&self, text: String) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[cfg(feature = "mock")]
impl MockChatWebhookApiService {
    pub fn with_post_message(mut self, text: String, result: anyhow::Result<()>) -> Self {
        self.expect_post_message()
            .once()
            .with(mockall::predicate::eq(text))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }
}
