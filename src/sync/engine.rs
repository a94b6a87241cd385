//! Pull and push across every configured server.

use super::output::OutputSink;
use super::Properties;
use crate::auth::SessionTokens;
use crate::config::Server;
use crate::errors::{Result, SyncError};
use crate::store::{SecretData, SecretStoreProvider};
use std::sync::Arc;
use tracing::{debug, info, Instrument};

/// Counts of the work done by one pull or push.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Servers a session was opened for
    pub servers: usize,
    /// Servers bypassed through `skip_execution`
    pub skipped: usize,
    pub paths: usize,
    pub mappings: usize,
}

/// Moves values between configured secret paths and a property set.
///
/// Servers are processed in configuration order and all store calls are
/// awaited one at a time. The first error aborts the run; mutations already
/// applied (properties set, paths written) are not rolled back.
pub struct SyncEngine {
    provider: Arc<dyn SecretStoreProvider>,
}

impl SyncEngine {
    pub fn new(provider: Arc<dyn SecretStoreProvider>) -> Self {
        Self { provider }
    }

    /// Read every mapped secret key into `properties` through `sink`.
    ///
    /// Each path is read once per run regardless of how many mappings it has.
    /// Fails with [`SyncError::SecretKeyNotFound`] when a mapped key is absent.
    pub async fn pull(
        &self,
        servers: &[Server],
        sessions: &SessionTokens,
        properties: &mut Properties,
        sink: &mut dyn OutputSink,
    ) -> Result<SyncSummary> {
        let span = crate::sync_span!("pull", servers = servers.len());
        async {
            let mut summary = SyncSummary::default();

            for (ordinal, server) in servers.iter().enumerate() {
                if server.skip_execution {
                    debug!(server = %server.url, ordinal, "Skipping server");
                    summary.skipped += 1;
                    continue;
                }

                let store = self.provider.open(server, sessions.get(ordinal))?;
                summary.servers += 1;

                for path in &server.paths {
                    let secrets = store.read(&path.name).await?;

                    for mapping in &path.mappings {
                        if !secrets.contains_key(&mapping.secret_key) {
                            return Err(SyncError::secret_key_not_found(
                                &path.name,
                                &mapping.secret_key,
                            ));
                        }
                        sink.flush(properties, &secrets, mapping)?;
                        summary.mappings += 1;
                    }

                    summary.paths += 1;
                    debug!(
                        server = %server.url,
                        path = %path.name,
                        mappings = path.mappings.len(),
                        "Pulled secret path"
                    );
                }
            }

            info!(
                servers = summary.servers,
                skipped = summary.skipped,
                paths = summary.paths,
                mappings = summary.mappings,
                "Pull completed"
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }

    /// Write mapped properties into their secret paths, merging with data
    /// already stored there.
    ///
    /// Per path: one existence probe, one read only if the secret exists, then
    /// exactly one write. Keys present in the store but not mapped are kept.
    /// Fails with [`SyncError::PropertyNotFound`] when a mapped property is
    /// absent; that path is not written.
    pub async fn push(
        &self,
        servers: &[Server],
        sessions: &SessionTokens,
        properties: &Properties,
    ) -> Result<SyncSummary> {
        let span = crate::sync_span!("push", servers = servers.len());
        async {
            let mut summary = SyncSummary::default();

            for (ordinal, server) in servers.iter().enumerate() {
                if server.skip_execution {
                    debug!(server = %server.url, ordinal, "Skipping server");
                    summary.skipped += 1;
                    continue;
                }

                let store = self.provider.open(server, sessions.get(ordinal))?;
                summary.servers += 1;

                for path in &server.paths {
                    let mut secrets = if store.exists(&path.name).await? {
                        store.read(&path.name).await?
                    } else {
                        SecretData::new()
                    };

                    for mapping in &path.mappings {
                        let value = properties
                            .get(&mapping.property_key)
                            .ok_or_else(|| SyncError::property_not_found(&mapping.property_key))?;
                        secrets.insert(mapping.secret_key.clone(), value.clone());
                        summary.mappings += 1;
                    }

                    store.write(&path.name, &secrets).await?;
                    summary.paths += 1;
                    debug!(
                        server = %server.url,
                        path = %path.name,
                        mappings = path.mappings.len(),
                        "Pushed secret path"
                    );
                }
            }

            info!(
                servers = summary.servers,
                skipped = summary.skipped,
                paths = summary.paths,
                mappings = summary.mappings,
                "Push completed"
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }
}
