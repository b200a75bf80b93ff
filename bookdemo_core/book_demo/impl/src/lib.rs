use std::sync::Arc;

use bookdemo_core_book_demo_contracts::{
    BookDemoFeatureService, BookDemoSubmitError, DemoRequestOutcome,
};
use bookdemo_email_contracts::{Email, EmailBody, EmailService};
use bookdemo_extern_contracts::chat_webhook::ChatWebhookApiService;
use bookdemo_models::{
    book_demo::{DemoRequest, DemoRequestSubmission},
    email_address::{EmailAddress, EmailAddressWithName},
};
use bookdemo_templates_contracts::{
    DemoRequestTemplate, DemoRequestTextTemplate, TemplateService,
};
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct BookDemoFeatureServiceImpl<Email, Template, ChatWebhook> {
    email: Email,
    template: Template,
    chat_webhook: Option<Arc<ChatWebhook>>,
    config: BookDemoFeatureConfig,
}

#[derive(Debug, Clone)]
pub struct BookDemoFeatureConfig {
    /// Where demo request notifications are sent to
    pub recipient: Arc<EmailAddressWithName>,
}

impl<EmailS, Template, ChatWebhook> BookDemoFeatureServiceImpl<EmailS, Template, ChatWebhook> {
    pub fn new(
        email: EmailS,
        template: Template,
        chat_webhook: Option<ChatWebhook>,
        config: BookDemoFeatureConfig,
    ) -> Self {
        Self {
            email,
            template,
            chat_webhook: chat_webhook.map(Arc::new),
            config,
        }
    }
}

impl<EmailS, Template, ChatWebhook> BookDemoFeatureService
    for BookDemoFeatureServiceImpl<EmailS, Template, ChatWebhook>
where
    EmailS: EmailService,
    Template: TemplateService,
    ChatWebhook: ChatWebhookApiService,
{
    async fn submit(
        &self,
        submission: DemoRequestSubmission,
    ) -> Result<DemoRequestOutcome, BookDemoSubmitError> {
        if submission.is_spam() {
            info!("dropping demo request with filled honeypot field");
            return Ok(DemoRequestOutcome::Suppressed);
        }

        let DemoRequest {
            first_name,
            last_name,
            company,
            email,
            message,
        } = submission.request;

        let data = DemoRequestTemplate {
            first_name: first_name.into_inner(),
            last_name: last_name.into_inner(),
            company: company.into_inner(),
            email: email.to_string(),
            message: message.into_inner(),
        };

        let notification = Email {
            recipient: (*self.config.recipient).clone(),
            subject: format!(
                "New demo request: {} {} @ {}",
                data.first_name, data.last_name, data.company
            ),
            body: EmailBody::Alternative {
                text: self
                    .template
                    .render(&DemoRequestTextTemplate(data.clone()))?,
                html: self.template.render(&data)?,
            },
            reply_to: Some(EmailAddress::from(email).into()),
        };

        if !self.email.send(notification).await? {
            error!("smtp server rejected demo request notification");
            return Err(BookDemoSubmitError::Send);
        }

        info!(company = %data.company, "demo request notification sent");

        if let Some(chat_webhook) = &self.chat_webhook {
            notify_chat(Arc::clone(chat_webhook), chat_message(&data));
        }

        Ok(DemoRequestOutcome::Delivered)
    }
}

/// Posts to the chat webhook in the background. The outcome of the request
/// does not depend on it, so failures are only logged.
fn notify_chat<ChatWebhook>(chat_webhook: Arc<ChatWebhook>, text: String)
where
    ChatWebhook: ChatWebhookApiService,
{
    tokio::spawn(async move {
        if let Err(err) = chat_webhook.post_message(text).await {
            warn!("Failed to post demo request to chat webhook: {err}");
        }
    });
}

fn chat_message(data: &DemoRequestTemplate) -> String {
    format!(
        "New demo request from *{} {}* ({})\nEmail: {}\n\n{}",
        data.first_name, data.last_name, data.company, data.email, data.message
    )
}
