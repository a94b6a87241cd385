//! Authentication credentials supplied on the command line.
//!
//! Each override has the form `auth.<method>.<field>=<value>` and applies to
//! the first configured server, or `auth.<method>.<field>[N]=<value>` to
//! address the server at zero-based ordinal `N`:
//!
//! ```text
//! vaultsync --auth auth.github.pat=ghp_xxx pull
//! vaultsync --auth 'auth.app_role.role_id[1]=abc' --auth 'auth.app_role.secret_id[1]=s3cr3t' push
//! ```

use crate::auth::{AuthMethod, CredentialFields};
use crate::errors::{Result, SyncError};
use crate::types::SecretString;
use std::collections::BTreeMap;
use std::str::FromStr;

const OVERRIDE_PREFIX: &str = "auth.";

/// Sparse, per-server-ordinal collection of CLI credential fragments.
///
/// Built once at startup and never modified afterwards.
#[derive(Debug, Clone, Default)]
pub struct AuthenticationSystemProperties {
    by_ordinal: BTreeMap<usize, BTreeMap<AuthMethod, CredentialFields>>,
}

impl AuthenticationSystemProperties {
    /// Parse a list of `auth.<method>.<field>[N]=<value>` overrides.
    pub fn parse<I, S>(overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut properties = Self::default();
        for raw in overrides {
            let raw = raw.as_ref();
            let (key, value) = raw.split_once('=').ok_or_else(|| {
                SyncError::config(format!(
                    "Invalid authentication override '{}': expected auth.<method>.<field>=<value>",
                    redact_override(raw)
                ))
            })?;
            let (method, field, ordinal) = parse_override_key(key.trim())?;
            properties.insert(ordinal, method, field, SecretString::new(value));
        }
        Ok(properties)
    }

    /// Add a single credential field for a server ordinal.
    pub fn insert(
        &mut self,
        ordinal: usize,
        method: AuthMethod,
        field: impl Into<String>,
        value: SecretString,
    ) {
        self.by_ordinal
            .entry(ordinal)
            .or_default()
            .entry(method)
            .or_default()
            .insert(field.into(), value);
    }

    /// Credentials for the server at `ordinal`, choosing the first recognized
    /// method in [`AuthMethod::ALL`] order when several were supplied.
    pub fn for_ordinal(&self, ordinal: usize) -> Option<(AuthMethod, &CredentialFields)> {
        self.by_ordinal
            .get(&ordinal)
            .and_then(|methods| methods.iter().next())
            .map(|(method, fields)| (*method, fields))
    }

    pub fn is_empty(&self) -> bool {
        self.by_ordinal.values().all(BTreeMap::is_empty)
    }
}

fn parse_override_key(key: &str) -> Result<(AuthMethod, String, usize)> {
    let rest = key.strip_prefix(OVERRIDE_PREFIX).ok_or_else(|| {
        SyncError::config(format!(
            "Invalid authentication override key '{}': must start with '{}'",
            key, OVERRIDE_PREFIX
        ))
    })?;

    let (rest, ordinal) = match rest.strip_suffix(']').and_then(|r| r.rsplit_once('[')) {
        Some((name, index)) => {
            let ordinal = index.parse::<usize>().map_err(|_| {
                SyncError::config(format!(
                    "Invalid server ordinal '{}' in authentication override '{}'",
                    index, key
                ))
            })?;
            (name, ordinal)
        }
        None => (rest, 0),
    };

    let (method, field) = rest
        .split_once('.')
        .filter(|(method, field)| !method.is_empty() && !field.is_empty())
        .ok_or_else(|| {
            SyncError::config(format!(
                "Invalid authentication override key '{}': expected auth.<method>.<field>",
                key
            ))
        })?;

    let method = AuthMethod::from_str(method)?;
    Ok((method, field.to_string(), ordinal))
}

fn redact_override(raw: &str) -> &str {
    raw.split_once('=').map(|(key, _)| key).unwrap_or(raw)
}
