//! # Error Handling
//!
//! Error types for authentication and secret synchronization using `thiserror`.
//!
//! Every error aborts the run it was raised in. Messages carry enough context
//! (server, path, key, property) to diagnose a failure without re-running with
//! extra logging, and never include secret values.

use thiserror::Error;

/// Result type for vaultsync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors raised while resolving credentials or synchronizing secrets.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Invalid configuration or no usable credential source for a server.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The secret store rejected the supplied credentials.
    #[error("Authentication failed for method '{method}': {message}")]
    Authentication { method: String, message: String },

    /// A mapped secret key is absent from the data read at a path.
    #[error("No value found in path {path} for key {key}")]
    SecretKeyNotFound { path: String, key: String },

    /// A mapped property is absent from the property set being pushed.
    #[error("No value found for property {property}")]
    PropertyNotFound { property: String },

    /// Network or protocol failure while talking to the secret store.
    #[error("Secret store transport error: {message}")]
    Transport { message: String },

    /// I/O error with additional context.
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },
}

impl SyncError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create an authentication error for the given method tag.
    pub fn authentication(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Authentication { method: method.into(), message: message.into() }
    }

    /// Create a not-found error for a secret key missing at a path.
    pub fn secret_key_not_found(path: impl Into<String>, key: impl Into<String>) -> Self {
        Self::SecretKeyNotFound { path: path.into(), key: key.into() }
    }

    /// Create a not-found error for a property missing from the property set.
    pub fn property_not_found(property: impl Into<String>) -> Self {
        Self::PropertyNotFound { property: property.into() }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }

    /// Wrap an I/O error with context.
    pub fn io(source: std::io::Error, context: impl Into<String>) -> Self {
        Self::Io { source, context: context.into() }
    }

    /// True for both pull-side and push-side not-found errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SecretKeyNotFound { .. } | Self::PropertyNotFound { .. })
    }
}

impl From<std::io::Error> for SyncError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error, "I/O operation failed")
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(error: serde_json::Error) -> Self {
        Self::config(format!("Invalid JSON configuration: {}", error))
    }
}

impl From<serde_yaml::Error> for SyncError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::config(format!("Invalid YAML configuration: {}", error))
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(error: toml::de::Error) -> Self {
        Self::config(format!("Invalid TOML configuration: {}", error))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(error: reqwest::Error) -> Self {
        Self::transport(format!("HTTP request failed: {}", error))
    }
}

impl From<vaultrs::error::ClientError> for SyncError {
    fn from(error: vaultrs::error::ClientError) -> Self {
        Self::transport(error.to_string())
    }
}

impl From<validator::ValidationErrors> for SyncError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::config(format!("Validation failed: {}", errors))
    }
}
