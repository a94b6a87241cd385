//! # vaultsync
//!
//! Synchronizes build-time secrets between one or more HashiCorp Vault servers
//! and a local property set.
//!
//! - **pull** reads configured secret paths and copies mapped secret keys into
//!   properties (or a dotenv file).
//! - **push** writes mapped properties back into their secret paths, merging
//!   with data already stored there.
//!
//! Before either operation, each server gets exactly one session, resolved from
//! a pre-supplied token, command-line credentials or the server's declared
//! authentication method.
//!
//! ```text
//! config file ─┐                      ┌─> SecretStore (Vault KV v1/v2)
//!              ├─> AuthenticationResolver ─> SyncEngine ─┤
//! --auth ... ──┘                      └─> OutputSink (properties, env file)
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vaultsync::auth::{authenticate_if_necessary, VaultAuthenticationFactory};
//! use vaultsync::config::{load_config, AuthenticationSystemProperties};
//! use vaultsync::store::VaultStoreProvider;
//! use vaultsync::sync::{Properties, PropertiesSink, SyncEngine};
//!
//! #[tokio::main]
//! async fn main() -> vaultsync::Result<()> {
//!     let config = load_config("vaultsync.yml")?;
//!     let overrides = AuthenticationSystemProperties::parse(["auth.github.pat=ghp_xxx"])?;
//!     let sessions = authenticate_if_necessary(
//!         &config.servers,
//!         &overrides,
//!         &VaultAuthenticationFactory::new(),
//!     )
//!     .await?;
//!
//!     let engine = SyncEngine::new(Arc::new(VaultStoreProvider));
//!     let mut properties = Properties::new();
//!     engine.pull(&config.servers, &sessions, &mut properties, &mut PropertiesSink).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod config;
pub mod errors;
pub mod observability;
pub mod store;
pub mod sync;
pub mod types;

// Re-export commonly used types and traits
pub use auth::{AuthMethod, AuthenticationResolver, SessionTokens};
pub use config::{load_config, SyncConfig};
pub use errors::{Result, SyncError};
pub use store::{SecretStore, SecretStoreProvider};
pub use sync::{OutputSink, Properties, SyncEngine};
pub use types::SecretString;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
