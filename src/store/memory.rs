//! In-memory secret store.
//!
//! All sessions opened by one [`MemoryStoreProvider`] (and its clones) share the
//! same data and call counters, so a test can hand a clone to the engine and
//! inspect the store afterwards.

use super::{split_leaf, SecretData, SecretStore, SecretStoreProvider};
use crate::config::Server;
use crate::errors::Result;
use crate::types::SecretString;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Number of store calls observed, across all sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCalls {
    pub sessions: usize,
    pub reads: usize,
    pub lists: usize,
    pub writes: usize,
}

impl StoreCalls {
    pub fn total(&self) -> usize {
        self.sessions + self.reads + self.lists + self.writes
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    secrets: BTreeMap<String, SecretData>,
    calls: StoreCalls,
    opened: Vec<String>,
}

type SharedState = Arc<Mutex<MemoryState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, MemoryState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn normalize(path: &str) -> String {
    path.trim_matches('/').to_string()
}

/// Provider of sessions over one shared in-memory map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStoreProvider {
    state: SharedState,
}

impl MemoryStoreProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a secret; does not count as a store call.
    pub fn with_secret<K, V>(self, path: &str, data: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.insert(path, data.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    pub fn insert(&self, path: &str, data: SecretData) {
        lock(&self.state).secrets.insert(normalize(path), data);
    }

    /// Current data at `path`, without counting a call.
    pub fn secret(&self, path: &str) -> Option<SecretData> {
        lock(&self.state).secrets.get(&normalize(path)).cloned()
    }

    pub fn calls(&self) -> StoreCalls {
        lock(&self.state).calls
    }

    /// Server urls sessions were opened for, in order.
    pub fn opened_servers(&self) -> Vec<String> {
        lock(&self.state).opened.clone()
    }
}

impl SecretStoreProvider for MemoryStoreProvider {
    fn open(&self, server: &Server, _token: Option<&SecretString>) -> Result<Box<dyn SecretStore>> {
        let mut state = lock(&self.state);
        state.calls.sessions += 1;
        state.opened.push(server.url.clone());
        Ok(Box::new(MemorySecretStore { state: Arc::clone(&self.state) }))
    }
}

/// One session over a [`MemoryStoreProvider`]'s data.
#[derive(Debug, Clone)]
pub struct MemorySecretStore {
    state: SharedState,
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn read(&self, path: &str) -> Result<SecretData> {
        let mut state = lock(&self.state);
        state.calls.reads += 1;
        Ok(state.secrets.get(&normalize(path)).cloned().unwrap_or_default())
    }

    async fn list(&self, path: &str) -> Result<SecretData> {
        let mut state = lock(&self.state);
        state.calls.lists += 1;
        let path = normalize(path);
        if !state.secrets.contains_key(&path) {
            return Ok(SecretData::new());
        }
        let (_, leaf) = split_leaf(&path);
        Ok(SecretData::from([(leaf.to_string(), leaf.to_string())]))
    }

    async fn write(&self, path: &str, data: &SecretData) -> Result<()> {
        let mut state = lock(&self.state);
        state.calls.writes += 1;
        state.secrets.insert(normalize(path), data.clone());
        Ok(())
    }
}
