//! Structured credentials for each authentication method.
//!
//! Credentials are built field by field from the raw `field -> value` mapping
//! found in a server's `authentication` block or in CLI overrides. Unknown
//! fields are ignored; a missing or empty required field fails here, before any
//! login request is made.

use super::AuthMethod;
use crate::errors::{Result, SyncError};
use crate::types::SecretString;
use std::collections::BTreeMap;

/// Raw credential fields for one method: field name to value.
pub type CredentialFields = BTreeMap<String, SecretString>;

/// GitHub personal access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubToken {
    pub pat: SecretString,
}

impl GithubToken {
    pub const PAT: &'static str = "pat";

    pub fn from_fields(fields: &CredentialFields) -> Result<Self> {
        Ok(Self { pat: required(fields, AuthMethod::Github, Self::PAT)? })
    }
}

/// AppRole login pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRoleCredentials {
    pub role_id: SecretString,
    pub secret_id: SecretString,
}

impl AppRoleCredentials {
    pub const ROLE_ID: &'static str = "role_id";
    pub const SECRET_ID: &'static str = "secret_id";

    pub fn from_fields(fields: &CredentialFields) -> Result<Self> {
        Ok(Self {
            role_id: required(fields, AuthMethod::AppRole, Self::ROLE_ID)?,
            secret_id: required(fields, AuthMethod::AppRole, Self::SECRET_ID)?,
        })
    }
}

fn required(fields: &CredentialFields, method: AuthMethod, name: &str) -> Result<SecretString> {
    fields.get(name).filter(|value| !value.is_empty()).cloned().ok_or_else(|| {
        SyncError::config(format!(
            "Missing required field '{}' for authentication method '{}'",
            name, method
        ))
    })
}
