//! Handlers for the `pull`, `push` and `auth` commands.

use super::output::{load_properties, parse_property, render_properties, OutputFormat};
use crate::auth::SessionTokens;
use crate::config::SyncConfig;
use crate::sync::{EnvFileSink, Properties, PropertiesSink, SyncEngine};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default file written by `pull --format env-file`
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Pull every mapped secret and write the resulting property set.
pub async fn handle_pull(
    engine: &SyncEngine,
    config: &SyncConfig,
    sessions: &SessionTokens,
    format: OutputFormat,
    out: Option<PathBuf>,
) -> Result<()> {
    let mut properties = Properties::new();

    if format == OutputFormat::EnvFile {
        let path = out.unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_FILE));
        let mut sink = EnvFileSink::create(&path)?;
        engine.pull(&config.servers, sessions, &mut properties, &mut sink).await?;
        sink.commit()?;
        eprintln!("Wrote {} variable(s) to {}", properties.len(), path.display());
        return Ok(());
    }

    engine.pull(&config.servers, sessions, &mut properties, &mut PropertiesSink).await?;
    let rendered = render_properties(&properties, format)?;
    write_output(out.as_deref(), &rendered)
}

/// Push properties from a file and `--set` arguments; `--set` wins on conflicts.
pub async fn handle_push(
    engine: &SyncEngine,
    config: &SyncConfig,
    sessions: &SessionTokens,
    properties_file: Option<PathBuf>,
    set: Vec<String>,
) -> Result<()> {
    let mut properties = match &properties_file {
        Some(path) => load_properties(path)?,
        None => Properties::new(),
    };
    for raw in &set {
        let (key, value) = parse_property(raw)?;
        properties.insert(key, value);
    }

    let summary = engine.push(&config.servers, sessions, &properties).await?;
    eprintln!(
        "Pushed {} mapping(s) to {} path(s) on {} server(s)",
        summary.mappings, summary.paths, summary.servers
    );
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ServerStatus {
    pub ordinal: usize,
    pub url: String,
    pub status: &'static str,
}

/// Session status of every configured server.
pub fn session_report(config: &SyncConfig, sessions: &SessionTokens) -> Vec<ServerStatus> {
    config
        .servers
        .iter()
        .enumerate()
        .map(|(ordinal, server)| ServerStatus {
            ordinal,
            url: server.url.clone(),
            status: if server.skip_execution {
                "skipped"
            } else if sessions.is_authenticated(ordinal) {
                "authenticated"
            } else {
                "no session"
            },
        })
        .collect()
}

/// Print the session status of every configured server.
pub fn handle_auth(config: &SyncConfig, sessions: &SessionTokens) -> Result<()> {
    let report = session_report(config, sessions);
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

fn write_output(out: Option<&Path>, rendered: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write output file: {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes()).context("Failed to write to stdout")?;
            stdout.flush().context("Failed to flush stdout")
        }
    }
}
