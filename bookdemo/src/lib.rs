pub mod commands;
mod email;
pub mod environment;
