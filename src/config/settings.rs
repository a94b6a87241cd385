//! # Configuration Settings
//!
//! Defines the server, path and mapping structure read from the vaultsync
//! configuration file.

use crate::auth::CredentialFields;
use crate::errors::{Result, SyncError};
use crate::types::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use validator::Validate;

/// Declared authentication block: method tag to credential fields.
pub type AuthenticationConfig = BTreeMap<String, CredentialFields>;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SyncConfig {
    /// Authentication resolution behaviour
    #[serde(default)]
    pub resolution: ResolutionConfig,

    /// Secret store servers, processed in order
    #[validate(length(min = 1, message = "At least one server must be configured"), nested)]
    pub servers: Vec<Server>,
}

/// Controls how the authentication pass treats servers that already hold a token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Skip only the already-authenticated server and keep scanning, instead of
    /// stopping the pass at the first server that carries a token.
    #[serde(default)]
    pub continue_after_token: bool,
}

/// One secret store endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Server {
    /// Base URL, e.g. `https://vault.example.com:8200`
    #[validate(url(message = "Server url must be a valid URL"))]
    pub url: String,

    /// Pre-supplied client token
    #[serde(default)]
    pub token: Option<SecretString>,

    /// Vault Enterprise namespace
    #[serde(default)]
    pub namespace: Option<String>,

    /// Verify the server's TLS certificate
    #[serde(default = "default_ssl_verify")]
    pub ssl_verify: bool,

    /// PEM file added as a trust root
    #[serde(default)]
    pub ssl_certificate: Option<PathBuf>,

    /// KV secrets engine version
    #[serde(default)]
    pub engine_version: EngineVersion,

    /// Declared authentication methods
    #[serde(default)]
    pub authentication: Option<AuthenticationConfig>,

    /// Bypass this server entirely during pull and push
    #[serde(default)]
    pub skip_execution: bool,

    #[serde(default)]
    #[validate(nested)]
    pub paths: Vec<SecretPath>,
}

fn default_ssl_verify() -> bool {
    true
}

impl Server {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: None,
            namespace: None,
            ssl_verify: true,
            ssl_certificate: None,
            engine_version: EngineVersion::default(),
            authentication: None,
            skip_execution: false,
            paths: Vec::new(),
        }
    }

    pub fn with_token(mut self, token: impl Into<SecretString>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_authentication(mut self, authentication: AuthenticationConfig) -> Self {
        self.authentication = Some(authentication);
        self
    }

    pub fn with_path(mut self, path: SecretPath) -> Self {
        self.paths.push(path);
        self
    }

    pub fn skipped(mut self) -> Self {
        self.skip_execution = true;
        self
    }

    /// The pre-supplied token, if present and non-empty.
    pub fn existing_token(&self) -> Option<&SecretString> {
        self.token.as_ref().filter(|token| !token.is_empty())
    }
}

/// KV secrets engine version of a server's mounts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum EngineVersion {
    V1,
    #[default]
    V2,
}

impl TryFrom<u8> for EngineVersion {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            other => Err(format!("Unsupported engine version {} (expected 1 or 2)", other)),
        }
    }
}

impl From<EngineVersion> for u8 {
    fn from(version: EngineVersion) -> Self {
        match version {
            EngineVersion::V1 => 1,
            EngineVersion::V2 => 2,
        }
    }
}

/// A secret location (`<mount>/<path>`) and the mappings applied to it
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SecretPath {
    #[validate(length(min = 1, message = "Path name cannot be empty"))]
    pub name: String,

    #[serde(default)]
    #[validate(nested)]
    pub mappings: Vec<Mapping>,
}

impl SecretPath {
    pub fn new(name: impl Into<String>, mappings: Vec<Mapping>) -> Self {
        Self { name: name.into(), mappings }
    }

    /// Split the name into the engine mount and the secret path inside it.
    pub fn split_mount(&self) -> Option<(&str, &str)> {
        split_mount(&self.name)
    }
}

/// Split `mount/secret/path` at the first separator, ignoring surrounding slashes.
pub fn split_mount(name: &str) -> Option<(&str, &str)> {
    let trimmed = name.trim_matches('/');
    match trimmed.split_once('/') {
        Some((mount, path)) if !mount.is_empty() && !path.is_empty() => Some((mount, path)),
        _ => None,
    }
}

/// Secret key <-> property key association
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Mapping {
    /// Name of the field inside the secret's data
    #[serde(alias = "key")]
    #[validate(length(min = 1, message = "Mapping secret key cannot be empty"))]
    pub secret_key: String,

    /// Name of the property in the caller's property set
    #[serde(alias = "property")]
    #[validate(length(min = 1, message = "Mapping property key cannot be empty"))]
    pub property_key: String,
}

impl Mapping {
    pub fn new(secret_key: impl Into<String>, property_key: impl Into<String>) -> Self {
        Self { secret_key: secret_key.into(), property_key: property_key.into() }
    }
}

impl SyncConfig {
    /// Load and validate configuration from a YAML, TOML or JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SyncError::io(e, format!("Failed to read config file: {}", path.display()))
        })?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        let config: SyncConfig = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)?,
            "toml" => toml::from_str(&contents)?,
            "json" => serde_json::from_str(&contents)?,
            other => {
                return Err(SyncError::config(format!(
                    "Unsupported config file extension '{}' for {} (expected yml, yaml, toml or json)",
                    other,
                    path.display()
                )))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(SyncError::from)?;
        self.validate_custom()
    }

    fn validate_custom(&self) -> Result<()> {
        for server in &self.servers {
            for path in &server.paths {
                if path.split_mount().is_none() {
                    return Err(SyncError::config(format!(
                        "Path '{}' on server {} must have the form <mount>/<secret path>",
                        path.name, server.url
                    )));
                }
            }
        }
        Ok(())
    }
}
