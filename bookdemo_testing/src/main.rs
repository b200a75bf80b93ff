use std::net::IpAddr;

use bookdemo_testing::webhook;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

/// Fake external services for local development
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a chat webhook that logs every message it receives
    Webhook {
        #[arg(long, env = "WEBHOOK_HOST", default_value = "127.0.0.1")]
        host: IpAddr,
        #[arg(long, env = "WEBHOOK_PORT", default_value_t = 8001)]
        port: u16,
        /// Respond with 500 to every message
        #[arg(long)]
        fail: bool,
    },
    /// Print a completion script for the given shell
    Completion {
        #[clap(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match Cli::parse().command {
        Command::Webhook { host, port, fail } => {
            tracing_subscriber::fmt::init();
            webhook::start_server(host, port, fail).await
        }
        Command::Completion { shell } => {
            let mut cli = Cli::command();
            let name = env!("CARGO_BIN_NAME");
            clap_complete::generate(shell, &mut cli, name, &mut std::io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli() {
        Cli::command().debug_assert();
    }
}
