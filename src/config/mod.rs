//! # Configuration Management
//!
//! Server/path/mapping configuration loaded from a YAML, TOML or JSON file,
//! plus authentication credentials supplied as command-line overrides.

pub mod overrides;
pub mod settings;

pub use overrides::AuthenticationSystemProperties;
pub use settings::{
    split_mount, AuthenticationConfig, EngineVersion, Mapping, ResolutionConfig, SecretPath,
    Server, SyncConfig,
};

use crate::Result;
use std::path::Path;

/// Load the configuration file at `path`.
pub fn load_config(path: impl AsRef<Path>) -> Result<SyncConfig> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "Loading vaultsync configuration");
    SyncConfig::load(path)
}
