use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "authgate")]
#[command(about = "AuthGate CLI: check OAuth 2.0 authorization requests against a service registry")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./authgate.toml when present)
    #[arg(short, long, global = true, env = "AUTHGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Service registry JSON file (overrides registry.location)
    #[arg(short, long, global = true, env = "AUTHGATE_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate an authorization request (exit code 0 admitted, 2 denied)
    Check(CheckArgs),
    /// List registered services
    Services(ServicesArgs),
    /// Show the dispatch order of the validation chain
    Flows,
    /// Encode a client secret for the registry
    EncodeSecret(EncodeSecretArgs),
}

#[derive(clap::Args)]
pub struct CheckArgs {
    /// Request parameters as key=value pairs (e.g. response_type=code client_id=app)
    pub params: Vec<String>,
    /// Raw query string; key=value pairs override its values
    #[arg(long)]
    pub query: Option<String>,
    /// Source address of the request
    #[arg(long)]
    pub source_ip: Option<IpAddr>,
}

#[derive(clap::Args)]
pub struct ServicesArgs {
    /// Only show the service registered to this client
    #[arg(long)]
    pub client_id: Option<String>,
}

#[derive(clap::Args)]
pub struct EncodeSecretArgs {
    /// Secret to encode
    pub secret: String,
    /// Digest algorithm (overrides encoder.algorithm)
    #[arg(long)]
    pub algorithm: Option<String>,
}
