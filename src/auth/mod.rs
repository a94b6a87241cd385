//! # Authentication
//!
//! Resolves exactly one Vault session per configured server.
//!
//! Credentials can come from three places, in strict precedence order:
//!
//! 1. a token already present in the server configuration,
//! 2. command-line overrides addressed to the server's ordinal
//!    ([`AuthenticationSystemProperties`](crate::config::AuthenticationSystemProperties)),
//! 3. the server's declared `authentication` block.
//!
//! Each authentication method is a tagged [`AuthMethod`] variant with its own
//! [`AuthenticationStrategy`]; an [`AuthenticationMethodFactory`] builds the
//! strategy for a given credential source.

pub mod credentials;
pub mod login;
pub mod resolver;
pub mod strategy;

pub use credentials::{AppRoleCredentials, CredentialFields, GithubToken};
pub use login::{LoginApi, VaultLoginClient};
pub use resolver::{authenticate_if_necessary, AuthenticationResolver, SessionTokens};
pub use strategy::{
    build_strategy, declared_method, AppRoleStrategy, AuthenticationMethodFactory,
    AuthenticationStrategy, GithubTokenStrategy, VaultAuthenticationFactory,
};

use crate::errors::SyncError;
use std::fmt;
use std::str::FromStr;

/// Supported Vault authentication methods, keyed by their configuration tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AuthMethod {
    /// GitHub personal access token exchanged at `auth/github/login`
    Github,
    /// AppRole role id / secret id pair exchanged at `auth/approle/login`
    AppRole,
}

impl AuthMethod {
    /// All methods, in the order they are preferred when several are supplied.
    pub const ALL: [AuthMethod; 2] = [AuthMethod::Github, AuthMethod::AppRole];

    /// Tag used in configuration files and CLI overrides.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::AppRole => "app_role",
        }
    }

    /// Default mount path of the auth backend in Vault.
    pub fn login_mount(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::AppRole => "approle",
        }
    }
}

impl FromStr for AuthMethod {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|method| method.as_str() == s).ok_or_else(|| {
            SyncError::config(format!(
                "Unknown authentication method '{}'. Available authentication methods are: {}",
                s,
                available_methods()
            ))
        })
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recognized method tags, formatted for diagnostics: `[github, app_role]`.
pub fn available_methods() -> String {
    let tags: Vec<&str> = AuthMethod::ALL.iter().map(AuthMethod::as_str).collect();
    format!("[{}]", tags.join(", "))
}

/// Diagnostic raised when a server has no token and no credential source.
pub fn missing_credentials_message(server_url: &str, ordinal: usize) -> String {
    format!(
        "Either a token or an authentication method must be provided for server {} (#{})!\n\
         Put in your server configuration:\n\
         \n  token: YOUR_VAULT_TOKEN\n\
         \nor\n\
         \n  authentication:\n    <AUTH_METHOD>:\n      <FIELD>: <VALUE>\n\
         \nYou can also give the credentials as command line arguments:\n\
         \n  --auth \"auth.github.pat=<yourPat>\" or --auth \"auth.app_role.role_id[{}]=<yourRoleId>\"\n\
         \nAvailable authentication methods are: {}\n",
        server_url,
        ordinal,
        ordinal,
        available_methods()
    )
}
