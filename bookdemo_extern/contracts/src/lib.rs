pub mod chat_webhook;
