//! HTTP login against Vault auth backends.
//!
//! [`LoginApi`] is the seam strategies call; [`VaultLoginClient`] implements it
//! with `reqwest`, honoring the server's namespace and TLS settings.

use super::AuthMethod;
use crate::config::Server;
use crate::errors::{Result, SyncError};
use crate::types::SecretString;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Credential exchange endpoints of a secret store.
#[async_trait]
pub trait LoginApi: Send + Sync {
    /// Exchange a GitHub personal access token for a client token.
    async fn login_by_github(&self, pat: &SecretString) -> Result<SecretString>;

    /// Exchange an AppRole role id / secret id pair for a client token.
    async fn login_by_app_role(
        &self,
        role_id: &SecretString,
        secret_id: &SecretString,
    ) -> Result<SecretString>;
}

/// Vault login client bound to one server.
#[derive(Debug, Clone)]
pub struct VaultLoginClient {
    http: reqwest::Client,
    base_url: String,
    namespace: Option<String>,
}

#[derive(Deserialize)]
struct LoginResponse {
    auth: LoginAuth,
}

#[derive(Deserialize)]
struct LoginAuth {
    client_token: String,
}

#[derive(Deserialize, Default)]
struct VaultErrorResponse {
    #[serde(default)]
    errors: Vec<String>,
}

impl VaultLoginClient {
    /// Build a client using the server's url, namespace and TLS settings.
    pub fn for_server(server: &Server) -> Result<Self> {
        let mut builder = reqwest::Client::builder();

        if let Some(path) = &server.ssl_certificate {
            let pem = std::fs::read(path).map_err(|e| {
                SyncError::io(e, format!("Failed to read trust certificate {}", path.display()))
            })?;
            let certificate = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                SyncError::config(format!("Invalid trust certificate {}: {}", path.display(), e))
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        if !server.ssl_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder.build().map_err(|e| {
            SyncError::transport(format!("Failed to build HTTP client for {}: {}", server.url, e))
        })?;

        Ok(Self {
            http,
            base_url: server.url.trim_end_matches('/').to_string(),
            namespace: server.namespace.clone(),
        })
    }

    async fn login(&self, method: AuthMethod, body: serde_json::Value) -> Result<SecretString> {
        let url = format!("{}/v1/auth/{}/login", self.base_url, method.login_mount());

        let mut request = self.http.post(&url).json(&body);
        if let Some(namespace) = &self.namespace {
            request = request.header("X-Vault-Namespace", namespace);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, url = %url, "Vault login request failed");
            SyncError::transport(format!("Login request to {} failed: {}", url, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<VaultErrorResponse>()
                .await
                .unwrap_or_default()
                .errors
                .join("; ");
            let detail = if detail.is_empty() { status.to_string() } else { detail };

            tracing::warn!(status = status.as_u16(), method = %method, url = %url, "Vault rejected login");
            if status.is_server_error() {
                return Err(SyncError::transport(format!(
                    "Login to {} failed with status {}: {}",
                    url,
                    status.as_u16(),
                    detail
                )));
            }
            return Err(SyncError::authentication(
                method.as_str(),
                format!("Vault rejected login ({}): {}", status.as_u16(), detail),
            ));
        }

        let payload: LoginResponse = response.json().await.map_err(|e| {
            SyncError::transport(format!("Invalid login response from {}: {}", url, e))
        })?;

        Ok(SecretString::new(payload.auth.client_token))
    }
}

#[async_trait]
impl LoginApi for VaultLoginClient {
    async fn login_by_github(&self, pat: &SecretString) -> Result<SecretString> {
        self.login(AuthMethod::Github, json!({ "token": pat.expose_secret() })).await
    }

    async fn login_by_app_role(
        &self,
        role_id: &SecretString,
        secret_id: &SecretString,
    ) -> Result<SecretString> {
        self.login(
            AuthMethod::AppRole,
            json!({
                "role_id": role_id.expose_secret(),
                "secret_id": secret_id.expose_secret(),
            }),
        )
        .await
    }
}
