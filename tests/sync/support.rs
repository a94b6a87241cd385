//! Shared fixtures for sync tests

use std::sync::Arc;

use vaultsync::config::{Mapping, SecretPath, Server};
use vaultsync::store::MemoryStoreProvider;
use vaultsync::sync::{Properties, SyncEngine};
use vaultsync::SessionTokens;

/// Engine over a clone of `provider`; the clone shares data and counters.
pub fn engine(provider: &MemoryStoreProvider) -> SyncEngine {
    SyncEngine::new(Arc::new(provider.clone()))
}

pub fn server_with(paths: Vec<SecretPath>) -> Server {
    paths.into_iter().fold(Server::new("http://vault.test:8200").with_token("hvs.test"), Server::with_path)
}

pub fn path(name: &str, mappings: &[(&str, &str)]) -> SecretPath {
    SecretPath::new(name, mappings.iter().map(|(key, property)| Mapping::new(*key, *property)).collect())
}

pub fn properties(pairs: &[(&str, &str)]) -> Properties {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

pub fn sessions(servers: &[Server]) -> SessionTokens {
    SessionTokens::from_servers(servers)
}
