//! Session resolution across all configured servers.

use super::missing_credentials_message;
use super::strategy::AuthenticationMethodFactory;
use crate::config::{AuthenticationSystemProperties, ResolutionConfig, Server};
use crate::errors::{Result, SyncError};
use crate::types::SecretString;
use tracing::{debug, info, warn};

/// Session token per server, indexed by the server's configuration ordinal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTokens {
    tokens: Vec<Option<SecretString>>,
}

impl SessionTokens {
    /// Tokens pre-supplied in the configuration, without any login.
    pub fn from_servers(servers: &[Server]) -> Self {
        Self { tokens: servers.iter().map(|server| server.existing_token().cloned()).collect() }
    }

    pub fn get(&self, ordinal: usize) -> Option<&SecretString> {
        self.tokens.get(ordinal).and_then(Option::as_ref)
    }

    pub fn is_authenticated(&self, ordinal: usize) -> bool {
        self.get(ordinal).is_some()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Walks the server list and obtains a session token for each server.
///
/// Precedence per server: a pre-supplied token, then CLI credentials for the
/// server's ordinal, then the declared `authentication` block. A server with
/// none of these fails the pass with a configuration error.
///
/// A pre-supplied token ends the pass unless
/// [`continue_after_token`](Self::continue_after_token) is set; the servers
/// after it keep only their own pre-supplied tokens. This holds for servers
/// flagged skip-execution too. Skipped servers never log in.
pub struct AuthenticationResolver<'a> {
    factory: &'a dyn AuthenticationMethodFactory,
    continue_after_token: bool,
}

impl<'a> AuthenticationResolver<'a> {
    pub fn new(factory: &'a dyn AuthenticationMethodFactory) -> Self {
        Self { factory, continue_after_token: false }
    }

    pub fn continue_after_token(mut self, enabled: bool) -> Self {
        self.continue_after_token = enabled;
        self
    }

    pub fn with_resolution(self, resolution: &ResolutionConfig) -> Self {
        self.continue_after_token(resolution.continue_after_token)
    }

    pub async fn resolve(
        &self,
        servers: &[Server],
        properties: &AuthenticationSystemProperties,
    ) -> Result<SessionTokens> {
        let mut sessions = SessionTokens::from_servers(servers);

        for (ordinal, server) in servers.iter().enumerate() {
            if server.existing_token().is_some() {
                if self.continue_after_token {
                    debug!(server = %server.url, ordinal, "Server already holds a token");
                    continue;
                }
                let remaining = servers.len() - ordinal - 1;
                if remaining > 0 {
                    warn!(
                        server = %server.url,
                        ordinal,
                        remaining,
                        "Server already holds a token; authentication of the remaining servers is skipped"
                    );
                }
                break;
            }

            if server.skip_execution {
                debug!(server = %server.url, ordinal, "Server skipped; not authenticating");
                continue;
            }

            let strategy = if properties.for_ordinal(ordinal).is_some() {
                self.factory.from_system_properties(server, properties, ordinal)?
            } else if server.authentication.is_some() {
                self.factory.from_server(server)?
            } else {
                return Err(SyncError::config(missing_credentials_message(&server.url, ordinal)));
            };

            let token = strategy.login().await?;
            info!(server = %server.url, ordinal, method = %strategy.method(), "Authenticated");
            sessions.tokens[ordinal] = Some(token);
        }

        Ok(sessions)
    }
}

/// Resolve sessions with the default policy: stop at the first pre-supplied token.
pub async fn authenticate_if_necessary(
    servers: &[Server],
    properties: &AuthenticationSystemProperties,
    factory: &dyn AuthenticationMethodFactory,
) -> Result<SessionTokens> {
    AuthenticationResolver::new(factory).resolve(servers, properties).await
}
