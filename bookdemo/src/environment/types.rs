use bookdemo_core_book_demo_impl::BookDemoFeatureServiceImpl;
use bookdemo_core_health_impl::HealthFeatureServiceImpl;
use bookdemo_email_impl::EmailServiceImpl;
use bookdemo_extern_impl::chat_webhook::ChatWebhookApiServiceImpl;
use bookdemo_templates_impl::TemplateServiceImpl;

// API
pub type RestServer = bookdemo_api_rest::RestServer<HealthFeature, BookDemoFeature>;

// Infrastructure
pub type Email = EmailServiceImpl;
pub type Template = TemplateServiceImpl;

// Extern
pub type ChatWebhookApi = ChatWebhookApiServiceImpl;

// Core
pub type BookDemoFeature = BookDemoFeatureServiceImpl<Email, Template, ChatWebhookApi>;
pub type HealthFeature = HealthFeatureServiceImpl<Email>;
