use std::sync::Arc;

use vaultsync::auth::{authenticate_if_necessary, AuthenticationResolver, VaultAuthenticationFactory};
use vaultsync::config::{AuthenticationSystemProperties, Server};
use vaultsync::SyncError;

use super::support::{app_role_server, github_server, RecordingLogin};

fn no_overrides() -> AuthenticationSystemProperties {
    AuthenticationSystemProperties::default()
}

#[tokio::test]
async fn declared_blocks_authenticate_each_server() {
    let api = Arc::new(RecordingLogin::default());
    let factory = VaultAuthenticationFactory::with_login_api(api.clone());
    let servers = vec![
        github_server("http://a:8200", "ghp_a"),
        app_role_server("http://b:8200", "role-b", "secret-b"),
    ];

    let sessions = authenticate_if_necessary(&servers, &no_overrides(), &factory).await.unwrap();

    assert_eq!(api.calls(), vec!["github:ghp_a", "app_role:role-b:secret-b"]);
    assert_eq!(sessions.get(0).unwrap().expose_secret(), "hvs.session-1");
    assert_eq!(sessions.get(1).unwrap().expose_secret(), "hvs.session-2");
    // Server records are left untouched.
    assert!(servers.iter().all(|server| server.token.is_none()));
}

#[tokio::test]
async fn cli_credentials_win_over_declared_block() {
    let api = Arc::new(RecordingLogin::default());
    let factory = VaultAuthenticationFactory::with_login_api(api.clone());
    let servers = vec![
        github_server("http://a:8200", "ghp_declared"),
        github_server("http://b:8200", "ghp_declared_b"),
    ];
    let overrides = AuthenticationSystemProperties::parse([
        "auth.app_role.role_id[1]=cli-role",
        "auth.app_role.secret_id[1]=cli-secret",
    ])
    .unwrap();

    authenticate_if_necessary(&servers, &overrides, &factory).await.unwrap();

    assert_eq!(api.calls(), vec!["github:ghp_declared", "app_role:cli-role:cli-secret"]);
}

#[tokio::test]
async fn cli_credentials_cover_servers_without_declared_block() {
    let api = Arc::new(RecordingLogin::default());
    let factory = VaultAuthenticationFactory::with_login_api(api.clone());
    let servers = vec![Server::new("http://a:8200")];
    let overrides = AuthenticationSystemProperties::parse(["auth.github.pat=ghp_cli"]).unwrap();

    let sessions = authenticate_if_necessary(&servers, &overrides, &factory).await.unwrap();

    assert_eq!(api.calls(), vec!["github:ghp_cli"]);
    assert!(sessions.is_authenticated(0));
}

#[tokio::test]
async fn existing_token_stops_the_pass() {
    let api = Arc::new(RecordingLogin::default());
    let factory = VaultAuthenticationFactory::with_login_api(api.clone());
    let servers = vec![
        github_server("http://a:8200", "ghp_a"),
        Server::new("http://b:8200").with_token("hvs.preset"),
        github_server("http://c:8200", "ghp_c"),
        Server::new("http://d:8200"),
    ];

    let sessions = authenticate_if_necessary(&servers, &no_overrides(), &factory).await.unwrap();

    assert_eq!(api.calls(), vec!["github:ghp_a"]);
    assert!(sessions.is_authenticated(0));
    assert_eq!(sessions.get(1).unwrap().expose_secret(), "hvs.preset");
    assert!(!sessions.is_authenticated(2));
    assert!(!sessions.is_authenticated(3));
}

#[tokio::test]
async fn continue_after_token_skips_only_that_server() {
    let api = Arc::new(RecordingLogin::default());
    let factory = VaultAuthenticationFactory::with_login_api(api.clone());
    let servers = vec![
        Server::new("http://a:8200").with_token("hvs.preset"),
        github_server("http://b:8200", "ghp_b"),
    ];

    let sessions = AuthenticationResolver::new(&factory)
        .continue_after_token(true)
        .resolve(&servers, &no_overrides())
        .await
        .unwrap();

    assert_eq!(api.calls(), vec!["github:ghp_b"]);
    assert_eq!(sessions.get(0).unwrap().expose_secret(), "hvs.preset");
    assert!(sessions.is_authenticated(1));
}

#[tokio::test]
async fn ordinal_counts_every_server() {
    let api = Arc::new(RecordingLogin::default());
    let factory = VaultAuthenticationFactory::with_login_api(api.clone());
    let servers = vec![
        github_server("http://a:8200", "ghp_a").skipped(),
        Server::new("http://b:8200"),
    ];
    let overrides = AuthenticationSystemProperties::parse(["auth.github.pat[1]=ghp_for_b"]).unwrap();

    authenticate_if_necessary(&servers, &overrides, &factory).await.unwrap();

    assert_eq!(api.calls(), vec!["github:ghp_for_b"]);
}

#[tokio::test]
async fn skipped_servers_are_not_authenticated() {
    let api = Arc::new(RecordingLogin::default());
    let factory = VaultAuthenticationFactory::with_login_api(api.clone());
    let servers = vec![Server::new("http://a:8200").skipped(), Server::new("http://b:8200").skipped()];

    let sessions = authenticate_if_necessary(&servers, &no_overrides(), &factory).await.unwrap();

    assert!(api.calls().is_empty());
    assert!(!sessions.is_authenticated(0));
}

#[tokio::test]
async fn missing_credentials_is_configuration_error() {
    let api = Arc::new(RecordingLogin::default());
    let factory = VaultAuthenticationFactory::with_login_api(api.clone());
    let servers = vec![github_server("http://a:8200", "ghp_a"), Server::new("http://b:8200")];

    let err = authenticate_if_necessary(&servers, &no_overrides(), &factory).await.unwrap_err();

    assert!(matches!(err, SyncError::Config { .. }));
    let message = err.to_string();
    assert!(message.contains("http://b:8200"));
    assert!(message.contains("[github, app_role]"));
    assert!(message.contains("authentication:"));
    assert!(message.contains("--auth"));
}

#[tokio::test]
async fn login_failure_aborts_the_pass() {
    let api = Arc::new(RecordingLogin::rejecting());
    let factory = VaultAuthenticationFactory::with_login_api(api.clone());
    let servers = vec![
        github_server("http://a:8200", "ghp_a"),
        github_server("http://b:8200", "ghp_b"),
    ];

    let err = authenticate_if_necessary(&servers, &no_overrides(), &factory).await.unwrap_err();

    assert!(matches!(err, SyncError::Authentication { .. }));
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn incomplete_credentials_fail_before_login() {
    let api = Arc::new(RecordingLogin::default());
    let factory = VaultAuthenticationFactory::with_login_api(api.clone());
    let servers = vec![Server::new("http://a:8200")];
    let overrides = AuthenticationSystemProperties::parse(["auth.app_role.role_id=only-role"]).unwrap();

    let err = authenticate_if_necessary(&servers, &overrides, &factory).await.unwrap_err();

    assert!(matches!(err, SyncError::Config { .. }));
    assert!(err.to_string().contains("secret_id"));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn skipped_server_with_token_still_stops_the_pass() {
    let api = Arc::new(RecordingLogin::default());
    let factory = VaultAuthenticationFactory::with_login_api(api.clone());
    let servers = vec![
        Server::new("http://a:8200").with_token("hvs.preset").skipped(),
        github_server("http://b:8200", "ghp_b"),
    ];

    let sessions = authenticate_if_necessary(&servers, &no_overrides(), &factory).await.unwrap();

    assert!(api.calls().is_empty());
    assert!(!sessions.is_authenticated(1));
}

#[tokio::test]
async fn existing_token_wins_over_cli_credentials() {
    let api = Arc::new(RecordingLogin::default());
    let factory = VaultAuthenticationFactory::with_login_api(api.clone());
    let servers = vec![Server::new("http://a:8200").with_token("hvs.preset")];
    let overrides = AuthenticationSystemProperties::parse(["auth.github.pat[0]=ghp_cli"]).unwrap();

    let sessions = AuthenticationResolver::new(&factory)
        .continue_after_token(true)
        .resolve(&servers, &overrides)
        .await
        .unwrap();

    assert!(api.calls().is_empty());
    assert_eq!(sessions.get(0).unwrap().expose_secret(), "hvs.preset");

    let sessions = authenticate_if_necessary(&servers, &overrides, &factory).await.unwrap();
    assert!(api.calls().is_empty());
    assert_eq!(sessions.get(0).unwrap().expose_secret(), "hvs.preset");
}
