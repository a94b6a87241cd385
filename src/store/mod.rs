//! # Secret Stores
//!
//! Abstract path-addressed key/value storage used by the sync engine.
//!
//! A [`SecretStoreProvider`] opens one [`SecretStore`] session per server; the
//! session is used for every path of that server and dropped afterwards.
//!
//! ## Implementations
//!
//! - [`VaultSecretStore`]: Vault KV v1 / v2 through `vaultrs`
//! - [`MemorySecretStore`]: in-process map with call counters, for tests and
//!   dry runs

pub mod memory;
pub mod vault;

pub use memory::{MemorySecretStore, MemoryStoreProvider, StoreCalls};
pub use vault::{VaultSecretStore, VaultStoreProvider};

use crate::config::Server;
use crate::errors::Result;
use crate::types::SecretString;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Flat secret data stored at one path: field name to value.
pub type SecretData = BTreeMap<String, String>;

/// One authenticated session against a secret store.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Read the data stored at `path`.
    ///
    /// A path that holds no secret reads as an empty map.
    async fn read(&self, path: &str) -> Result<SecretData>;

    /// List the entries naming the secret at `path`.
    ///
    /// Used as an existence probe: the result is empty iff no secret is stored
    /// at `path`.
    async fn list(&self, path: &str) -> Result<SecretData>;

    /// Replace the data stored at `path` with `data`.
    async fn write(&self, path: &str, data: &SecretData) -> Result<()>;

    /// Whether a secret is stored at `path`.
    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(!self.list(path).await?.is_empty())
    }
}

/// Opens store sessions for configured servers.
pub trait SecretStoreProvider: Send + Sync {
    /// Open a session for `server`, authenticated with `token` when given.
    fn open(&self, server: &Server, token: Option<&SecretString>) -> Result<Box<dyn SecretStore>>;
}

/// Split a secret path into its parent folder and leaf name.
pub(crate) fn split_leaf(path: &str) -> (&str, &str) {
    path.trim_matches('/').rsplit_once('/').unwrap_or(("", path.trim_matches('/')))
}
