pub mod chat_webhook;
pub mod http;
