mod cli;
mod commands;
mod observability;
mod output;

use anyhow::Result;
use authgate::config::loader;
use clap::Parser;

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            print_error(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    // Config validation warns, so tracing is up before loading.
    observability::init_tracing();
    let config = loader::load_config(cli.config.as_deref())?;
    observability::apply_logging_level(&config.logging.level);

    match &cli.command {
        Commands::Check(args) => {
            let directory = commands::load_directory(cli.registry.as_deref(), &config).await?;
            return commands::check::check(args, &config, directory, cli.format).await;
        }
        Commands::Services(args) => {
            let directory = commands::load_directory(cli.registry.as_deref(), &config).await?;
            commands::services::services(args, &directory, cli.format).await?;
        }
        Commands::Flows => {
            commands::flows::flows(&config, cli.format)?;
        }
        Commands::EncodeSecret(args) => {
            commands::encode::encode_secret(args, &config, cli.format)?;
        }
    }

    Ok(0)
}
