//! # Command Line Interface
//!
//! `vaultsync pull`, `vaultsync push` and `vaultsync auth`. Every command
//! loads the configuration, resolves one session per server, then runs.

pub mod commands;
pub mod output;

pub use output::OutputFormat;

use crate::auth::{AuthenticationResolver, VaultAuthenticationFactory};
use crate::config::{load_config, AuthenticationSystemProperties};
use crate::observability::{init_logging, log_config_info, LogFormat};
use crate::store::VaultStoreProvider;
use crate::sync::SyncEngine;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "vaultsync")]
#[command(about = "Pull and push build-time secrets between Vault and local property sets")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (yml, yaml, toml or json)
    #[arg(short, long, global = true, default_value = "vaultsync.yml")]
    pub config: PathBuf,

    /// Authentication override, `auth.<method>.<field>[N]=<value>` (repeatable)
    #[arg(long = "auth", global = true, value_name = "OVERRIDE")]
    pub auth: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read mapped secrets into a property set
    Pull {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Properties)]
        format: OutputFormat,

        /// Output file (stdout when omitted; `.env` for env-file)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Write mapped properties into Vault, merging with existing data
    Push {
        /// Properties file (dotenv-style, or `.json`)
        #[arg(short, long)]
        properties: Option<PathBuf>,

        /// Property given inline as key=value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Resolve sessions for every server and report the result
    Auth,
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);
    run(cli).await
}

/// Run a parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    log_config_info(&config);

    let overrides = AuthenticationSystemProperties::parse(&cli.auth)?;
    let factory = VaultAuthenticationFactory::new();
    let sessions = AuthenticationResolver::new(&factory)
        .with_resolution(&config.resolution)
        .resolve(&config.servers, &overrides)
        .await?;

    let engine = SyncEngine::new(Arc::new(VaultStoreProvider));

    match cli.command {
        Commands::Pull { format, out } => {
            commands::handle_pull(&engine, &config, &sessions, format, out).await?
        }
        Commands::Push { properties, set } => {
            commands::handle_push(&engine, &config, &sessions, properties, set).await?
        }
        Commands::Auth => commands::handle_auth(&config, &sessions)?,
    }

    Ok(())
}
