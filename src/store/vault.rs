//! HashiCorp Vault KV store.
//!
//! Paths are written `<mount>/<secret path>`; the first segment selects the KV
//! engine mount. Non-string values read from Vault are rendered as JSON text.

use super::{split_leaf, SecretData, SecretStore, SecretStoreProvider};
use crate::config::{split_mount, EngineVersion, Server};
use crate::errors::{Result, SyncError};
use crate::types::SecretString;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use vaultrs::client::{VaultClient, VaultClientSettingsBuilder};
use vaultrs::error::ClientError;
use vaultrs::{kv1, kv2};

/// Session against one Vault server.
pub struct VaultSecretStore {
    client: VaultClient,
    engine: EngineVersion,
    address: String,
}

impl VaultSecretStore {
    /// Create a client for `server`, authenticated with `token` when given.
    ///
    /// No request is made here; connection problems surface on first use.
    pub fn connect(server: &Server, token: Option<&SecretString>) -> Result<Self> {
        let mut settings_builder = VaultClientSettingsBuilder::default();
        settings_builder.address(&server.url);

        if let Some(token) = token {
            settings_builder.token(token.expose_secret());
        }

        if let Some(namespace) = &server.namespace {
            settings_builder.namespace(Some(namespace.clone()));
        }

        settings_builder.verify(server.ssl_verify);
        if let Some(certificate) = &server.ssl_certificate {
            settings_builder.ca_certs(vec![certificate.display().to_string()]);
        }

        let settings = settings_builder.build().map_err(|e| {
            SyncError::config(format!("Invalid Vault configuration for {}: {}", server.url, e))
        })?;

        let client = VaultClient::new(settings).map_err(|e| {
            SyncError::transport(format!("Failed to create Vault client for {}: {}", server.url, e))
        })?;

        Ok(Self { client, engine: server.engine_version, address: server.url.clone() })
    }

    fn locate<'p>(&self, path: &'p str) -> Result<(&'p str, &'p str)> {
        split_mount(path).ok_or_else(|| {
            SyncError::config(format!("Path '{}' must have the form <mount>/<secret path>", path))
        })
    }

    fn store_error(&self, operation: &str, path: &str, error: ClientError) -> SyncError {
        tracing::error!(error = %error, address = %self.address, path = %path, "Vault {} failed", operation);
        SyncError::transport(format!(
            "Failed to {} {} on {}: {}",
            operation, path, self.address, error
        ))
    }
}

fn is_not_found(error: &ClientError) -> bool {
    matches!(error, ClientError::APIError { code: 404, .. })
}

fn render_value(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

#[async_trait]
impl SecretStore for VaultSecretStore {
    async fn read(&self, path: &str) -> Result<SecretData> {
        let (mount, secret) = self.locate(path)?;

        let response: std::result::Result<HashMap<String, Value>, ClientError> = match self.engine {
            EngineVersion::V1 => kv1::get(&self.client, mount, secret).await,
            EngineVersion::V2 => kv2::read(&self.client, mount, secret).await,
        };

        match response {
            Ok(data) => {
                tracing::debug!(path = %path, fields = data.len(), "Read secret from Vault");
                Ok(data.into_iter().map(|(key, value)| (key, render_value(value))).collect())
            }
            Err(e) if is_not_found(&e) => {
                tracing::debug!(path = %path, "No secret stored at path");
                Ok(SecretData::new())
            }
            Err(e) => Err(self.store_error("read", path, e)),
        }
    }

    async fn list(&self, path: &str) -> Result<SecretData> {
        let (mount, secret) = self.locate(path)?;
        let (folder, leaf) = split_leaf(secret);

        let response = match self.engine {
            EngineVersion::V1 => kv1::list(&self.client, mount, folder).await.map(|listing| listing.keys),
            EngineVersion::V2 => kv2::list(&self.client, mount, folder).await,
        };

        let keys = match response {
            Ok(keys) => keys,
            Err(e) if is_not_found(&e) => Vec::new(),
            Err(e) => return Err(self.store_error("list", path, e)),
        };

        Ok(keys.into_iter().filter(|key| key == leaf).map(|key| (key.clone(), key)).collect())
    }

    async fn write(&self, path: &str, data: &SecretData) -> Result<()> {
        let (mount, secret) = self.locate(path)?;

        let response = match self.engine {
            EngineVersion::V1 => {
                let fields: HashMap<&str, &str> =
                    data.iter().map(|(key, value)| (key.as_str(), value.as_str())).collect();
                kv1::set(&self.client, mount, secret, &fields).await
            }
            EngineVersion::V2 => kv2::set(&self.client, mount, secret, data).await.map(|_| ()),
        };

        response.map_err(|e| self.store_error("write", path, e))?;
        tracing::info!(path = %path, address = %self.address, fields = data.len(), "Wrote secret to Vault");
        Ok(())
    }
}

/// Opens [`VaultSecretStore`] sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct VaultStoreProvider;

impl SecretStoreProvider for VaultStoreProvider {
    fn open(&self, server: &Server, token: Option<&SecretString>) -> Result<Box<dyn SecretStore>> {
        if token.is_none() {
            tracing::warn!(server = %server.url, "Opening Vault session without a resolved token");
        }
        Ok(Box::new(VaultSecretStore::connect(server, token)?))
    }
}
