use anyhow::Context;
use bookdemo::{
    commands::{email::EmailCommand, serve::serve},
    environment::ServiceConfigs,
};
use bookdemo_config::Config;
use bookdemo_utils::bookdemo_version;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Parser)]
#[command(version = bookdemo_version(), about = "Backend of the book a demo form")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Accept demo requests over HTTP
    #[command(aliases(["run", "start", "s"]))]
    Serve,
    /// Test email deliverability
    #[command(aliases(["e"]))]
    Email {
        #[command(subcommand)]
        command: EmailCommand,
    },
    /// Load the configuration and resolve all addresses, then exit
    CheckConfig {
        /// Print the resolved configuration
        #[arg(short, long)]
        verbose: bool,
    },
    /// Print a completion script for the given shell
    Completion {
        #[clap(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let command = match Cli::parse().command {
        Command::Completion { shell } => {
            let mut cli = Cli::command();
            let name = env!("CARGO_BIN_NAME");
            clap_complete::generate(shell, &mut cli, name, &mut std::io::stdout());
            return Ok(());
        }
        command => command,
    };

    init_tracing();

    let config = bookdemo_config::load().context("Failed to load config")?;
    run(command, config).await
}

async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    match command {
        Command::Serve => serve(config).await,
        Command::Email { command } => command.invoke(config).await,
        Command::CheckConfig { verbose } => check_config(&config, verbose),
        Command::Completion { .. } => Ok(()),
    }
}

fn check_config(config: &Config, verbose: bool) -> anyhow::Result<()> {
    let configs = ServiceConfigs::new(config)?;
    if verbose {
        println!("{config:#?}\n\n{configs:#?}");
    }
    println!("Config ok");
    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG`.
fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    #[cfg(tracing_pretty)]
    let fmt_layer = fmt_layer.pretty();

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(EnvFilter::from_default_env()))
        .init();
}
