//! Rendering and loading of property sets for CLI commands.

use crate::sync::Properties;
use anyhow::{Context, Result};
use std::path::Path;

/// Pull output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// `key=value` lines
    #[default]
    Properties,
    Json,
    Yaml,
    /// dotenv file with upper-cased variable names
    EnvFile,
}

/// Render a property set as text in the given format.
///
/// [`OutputFormat::EnvFile`] is written by its sink during the pull and has no
/// text rendering here.
pub fn render_properties(properties: &Properties, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Properties => Ok(properties
            .iter()
            .map(|(key, value)| format!("{}={}\n", key, escape_property(value)))
            .collect()),
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(properties).context("Failed to serialize to JSON")?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(properties).context("Failed to serialize to YAML")
        }
        OutputFormat::EnvFile => {
            anyhow::bail!("env-file output is written directly by the pull command")
        }
    }
}

fn escape_property(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Load a property set to push.
///
/// `.json` files hold a flat object of strings; anything else is read as a
/// dotenv-style `key=value` file.
pub fn load_properties(path: &Path) -> Result<Properties> {
    if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read properties file: {}", path.display()))?;
        return serde_json::from_str(&contents)
            .with_context(|| format!("Invalid JSON properties file: {}", path.display()));
    }

    let mut properties = Properties::new();
    let entries = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to open properties file: {}", path.display()))?;
    for entry in entries {
        let (key, value) = entry
            .with_context(|| format!("Invalid entry in properties file: {}", path.display()))?;
        properties.insert(key, value);
    }
    Ok(properties)
}

/// Parse a `key=value` property given on the command line.
pub fn parse_property(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("Invalid property '{}': expected key=value", raw))?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Invalid property '{}': key cannot be empty", raw);
    }
    Ok((key.to_string(), value.to_string()))
}
