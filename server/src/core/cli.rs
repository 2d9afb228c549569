use clap::Parser;

use std::path::PathBuf;

use super::config::OrphanPolicy;
use super::constants::{
    ENV_CONFIG, ENV_HOST, ENV_ORPHAN_SPANS, ENV_OTEL_GRPC_ENABLED, ENV_OTEL_GRPC_PORT, ENV_PORT,
};

#[derive(Parser)]
#[command(name = "runlens")]
#[command(version, about = "Live trace intake for agent runs", long_about = None)]
pub struct Cli {
    /// Server host address
    #[arg(long, short = 'H', env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Enable OTEL gRPC endpoint
    #[arg(long, env = ENV_OTEL_GRPC_ENABLED)]
    pub otel_grpc: Option<bool>,

    /// OTEL gRPC port
    #[arg(long, env = ENV_OTEL_GRPC_PORT)]
    pub otel_grpc_port: Option<u16>,

    /// What to do with spans that carry no run id (store or drop)
    #[arg(long, env = ENV_ORPHAN_SPANS, value_parser = parse_orphan_policy)]
    pub orphan_spans: Option<OrphanPolicy>,
}

/// Parse orphan span policy from CLI/env string
fn parse_orphan_policy(s: &str) -> Result<OrphanPolicy, String> {
    match s.to_lowercase().as_str() {
        "store" => Ok(OrphanPolicy::Store),
        "drop" => Ok(OrphanPolicy::Drop),
        _ => Err(format!(
            "Invalid orphan span policy '{}'. Valid options: store, drop",
            s
        )),
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub otel_grpc: Option<bool>,
    pub otel_grpc_port: Option<u16>,
    pub orphan_spans: Option<OrphanPolicy>,
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            config: cli.config,
            otel_grpc: cli.otel_grpc,
            otel_grpc_port: cli.otel_grpc_port,
            orphan_spans: cli.orphan_spans,
        }
    }
}

/// Parse CLI arguments into config overrides
pub fn parse() -> CliConfig {
    Cli::parse().into()
}
