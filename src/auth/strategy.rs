//! Authentication strategies and the factory that selects them.

use super::credentials::{AppRoleCredentials, CredentialFields, GithubToken};
use super::login::{LoginApi, VaultLoginClient};
use super::{available_methods, AuthMethod};
use crate::config::{AuthenticationSystemProperties, Server};
use crate::errors::{Result, SyncError};
use crate::types::SecretString;
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;

/// One way of exchanging credentials for a session token.
///
/// Implementations are immutable after construction; credential fields are
/// checked when the strategy is built, so [`login`](Self::login) only fails on
/// transport errors or when the store rejects the credentials.
#[async_trait]
pub trait AuthenticationStrategy: Send + Sync {
    /// Method this strategy authenticates with.
    fn method(&self) -> AuthMethod;

    /// Perform the login and return the session token.
    async fn login(&self) -> Result<SecretString>;
}

/// GitHub personal access token login
pub struct GithubTokenStrategy {
    api: Arc<dyn LoginApi>,
    credentials: GithubToken,
}

impl GithubTokenStrategy {
    pub fn new(api: Arc<dyn LoginApi>, credentials: GithubToken) -> Self {
        Self { api, credentials }
    }
}

#[async_trait]
impl AuthenticationStrategy for GithubTokenStrategy {
    fn method(&self) -> AuthMethod {
        AuthMethod::Github
    }

    async fn login(&self) -> Result<SecretString> {
        self.api.login_by_github(&self.credentials.pat).await
    }
}

/// AppRole login
pub struct AppRoleStrategy {
    api: Arc<dyn LoginApi>,
    credentials: AppRoleCredentials,
}

impl AppRoleStrategy {
    pub fn new(api: Arc<dyn LoginApi>, credentials: AppRoleCredentials) -> Self {
        Self { api, credentials }
    }
}

#[async_trait]
impl AuthenticationStrategy for AppRoleStrategy {
    fn method(&self) -> AuthMethod {
        AuthMethod::AppRole
    }

    async fn login(&self) -> Result<SecretString> {
        self.api.login_by_app_role(&self.credentials.role_id, &self.credentials.secret_id).await
    }
}

/// Build the strategy for `method` from raw credential fields.
pub fn build_strategy(
    method: AuthMethod,
    api: Arc<dyn LoginApi>,
    fields: &CredentialFields,
) -> Result<Box<dyn AuthenticationStrategy>> {
    let strategy: Box<dyn AuthenticationStrategy> = match method {
        AuthMethod::Github => Box::new(GithubTokenStrategy::new(api, GithubToken::from_fields(fields)?)),
        AuthMethod::AppRole => {
            Box::new(AppRoleStrategy::new(api, AppRoleCredentials::from_fields(fields)?))
        }
    };
    Ok(strategy)
}

/// First recognized method in a server's declared `authentication` block.
///
/// Methods are tried in [`AuthMethod::ALL`] order. A block that only names
/// unknown tags is a configuration error.
pub fn declared_method(server: &Server) -> Result<(AuthMethod, &CredentialFields)> {
    let declared = server.authentication.as_ref().ok_or_else(|| {
        SyncError::config(format!("Server {} declares no authentication block", server.url))
    })?;

    AuthMethod::ALL
        .into_iter()
        .find_map(|method| declared.get(method.as_str()).map(|fields| (method, fields)))
        .ok_or_else(|| {
            let unknown: Vec<&str> = declared
                .keys()
                .map(String::as_str)
                .filter(|tag| AuthMethod::from_str(tag).is_err())
                .collect();
            SyncError::config(format!(
                "No supported authentication method declared for server {} (found [{}]). \
                 Available authentication methods are: {}",
                server.url,
                unknown.join(", "),
                available_methods()
            ))
        })
}

/// Builds strategies from the two credential sources.
pub trait AuthenticationMethodFactory: Send + Sync {
    /// Strategy for the CLI credentials addressed to `ordinal`.
    fn from_system_properties(
        &self,
        server: &Server,
        properties: &AuthenticationSystemProperties,
        ordinal: usize,
    ) -> Result<Box<dyn AuthenticationStrategy>>;

    /// Strategy for the server's declared `authentication` block.
    fn from_server(&self, server: &Server) -> Result<Box<dyn AuthenticationStrategy>>;
}

enum LoginApiSource {
    PerServer,
    Fixed(Arc<dyn LoginApi>),
}

/// Factory producing strategies that log in against Vault.
///
/// By default a [`VaultLoginClient`] is created for each server so that the
/// server's namespace and TLS settings apply to its login request.
pub struct VaultAuthenticationFactory {
    source: LoginApiSource,
}

impl Default for VaultAuthenticationFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl VaultAuthenticationFactory {
    pub fn new() -> Self {
        Self { source: LoginApiSource::PerServer }
    }

    /// Use one login API for every server.
    pub fn with_login_api(api: Arc<dyn LoginApi>) -> Self {
        Self { source: LoginApiSource::Fixed(api) }
    }

    fn login_api(&self, server: &Server) -> Result<Arc<dyn LoginApi>> {
        match &self.source {
            LoginApiSource::PerServer => Ok(Arc::new(VaultLoginClient::for_server(server)?)),
            LoginApiSource::Fixed(api) => Ok(Arc::clone(api)),
        }
    }
}

impl AuthenticationMethodFactory for VaultAuthenticationFactory {
    fn from_system_properties(
        &self,
        server: &Server,
        properties: &AuthenticationSystemProperties,
        ordinal: usize,
    ) -> Result<Box<dyn AuthenticationStrategy>> {
        let (method, fields) = properties.for_ordinal(ordinal).ok_or_else(|| {
            SyncError::config(format!(
                "No command-line authentication supplied for server #{} ({})",
                ordinal, server.url
            ))
        })?;
        build_strategy(method, self.login_api(server)?, fields)
    }

    fn from_server(&self, server: &Server) -> Result<Box<dyn AuthenticationStrategy>> {
        let (method, fields) = declared_method(server)?;
        build_strategy(method, self.login_api(server)?, fields)
    }
}
