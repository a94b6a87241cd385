//! # Structured Logging
//!
//! Span macros and startup logging built on the tracing ecosystem.
//!
//! Secret values never appear in log fields; servers are identified by url and
//! ordinal, secrets by path and key.

/// Create a tracing span for a sync run (`pull`, `push`, `auth`).
///
/// ```rust,ignore
/// let span = sync_span!("pull", servers = config.servers.len());
/// ```
#[macro_export]
macro_rules! sync_span {
    ($operation:expr) => {
        tracing::info_span!(
            "vault_sync",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::info_span!(
            "vault_sync",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Log the loaded configuration at startup
pub fn log_config_info(config: &crate::config::SyncConfig) {
    let skipped = config.servers.iter().filter(|server| server.skip_execution).count();
    let paths: usize = config.servers.iter().map(|server| server.paths.len()).sum();

    tracing::info!(
        servers = config.servers.len(),
        skipped,
        paths,
        continue_after_token = config.resolution.continue_after_token,
        "vaultsync configuration"
    );

    for (ordinal, server) in config.servers.iter().enumerate() {
        tracing::debug!(
            ordinal,
            url = %server.url,
            namespace = ?server.namespace,
            engine_version = u8::from(server.engine_version),
            has_token = server.existing_token().is_some(),
            declared_auth = server.authentication.is_some(),
            paths = server.paths.len(),
            "Configured server"
        );
    }
}
