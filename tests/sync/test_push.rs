use vaultsync::store::{MemoryStoreProvider, SecretData, StoreCalls};
use vaultsync::sync::{Properties, PropertiesSink};
use vaultsync::SyncError;

use super::support::{engine, path, properties, server_with, sessions};

fn data(pairs: &[(&str, &str)]) -> SecretData {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[tokio::test]
async fn push_merges_with_existing_data() {
    let provider = MemoryStoreProvider::new().with_secret("app/db", [("other", "x")]);
    let servers = vec![server_with(vec![path("app/db", &[("user", "db.user")])])];

    engine(&provider)
        .push(&servers, &sessions(&servers), &properties(&[("db.user", "alice")]))
        .await
        .unwrap();

    assert_eq!(provider.secret("app/db").unwrap(), data(&[("other", "x"), ("user", "alice")]));
    assert_eq!(provider.calls(), StoreCalls { sessions: 1, reads: 1, lists: 1, writes: 1 });
}

#[tokio::test]
async fn push_overwrites_mapped_keys_only() {
    let provider =
        MemoryStoreProvider::new().with_secret("app/db", [("user", "old"), ("password", "keep")]);
    let servers = vec![server_with(vec![path("app/db", &[("user", "db.user")])])];

    engine(&provider)
        .push(&servers, &sessions(&servers), &properties(&[("db.user", "new"), ("unmapped", "x")]))
        .await
        .unwrap();

    assert_eq!(provider.secret("app/db").unwrap(), data(&[("password", "keep"), ("user", "new")]));
}

#[tokio::test]
async fn push_to_new_path_skips_read() {
    let provider = MemoryStoreProvider::new();
    let servers = vec![server_with(vec![path("app/new", &[("k1", "p1"), ("k2", "p2"), ("k3", "p3")])])];

    engine(&provider)
        .push(&servers, &sessions(&servers), &properties(&[("p1", "1"), ("p2", "2"), ("p3", "3")]))
        .await
        .unwrap();

    assert_eq!(provider.calls(), StoreCalls { sessions: 1, reads: 0, lists: 1, writes: 1 });
    assert_eq!(provider.secret("app/new").unwrap().len(), 3);
}

#[tokio::test]
async fn push_one_list_and_one_write_per_path() {
    let provider = MemoryStoreProvider::new().with_secret("app/a", [("x", "1")]);
    let servers = vec![server_with(vec![
        path("app/a", &[("k1", "p1"), ("k2", "p2")]),
        path("app/b", &[("k1", "p1")]),
        path("app/c", &[("k3", "p3"), ("k1", "p1"), ("k2", "p2")]),
    ])];

    let summary = engine(&provider)
        .push(&servers, &sessions(&servers), &properties(&[("p1", "1"), ("p2", "2"), ("p3", "3")]))
        .await
        .unwrap();

    let calls = provider.calls();
    assert_eq!(calls.lists, 3);
    assert_eq!(calls.writes, 3);
    assert_eq!(summary.paths, 3);
    assert_eq!(summary.mappings, 6);
}

#[tokio::test]
async fn push_missing_property_aborts_before_write() {
    let provider = MemoryStoreProvider::new().with_secret("app/b", [("keep", "me")]);
    let servers = vec![server_with(vec![
        path("app/a", &[("user", "db.user")]),
        path("app/b", &[("user", "db.user"), ("password", "db.password")]),
        path("app/c", &[("user", "db.user")]),
    ])];

    let err = engine(&provider)
        .push(&servers, &sessions(&servers), &properties(&[("db.user", "alice")]))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::PropertyNotFound { .. }));
    assert!(err.to_string().contains("db.password"));

    // The earlier path stays written, the failing path is untouched, later paths never run.
    assert_eq!(provider.secret("app/a").unwrap(), data(&[("user", "alice")]));
    assert_eq!(provider.secret("app/b").unwrap(), data(&[("keep", "me")]));
    assert!(provider.secret("app/c").is_none());
    assert_eq!(provider.calls().writes, 1);
}

#[tokio::test]
async fn push_skips_servers_without_store_contact() {
    let provider = MemoryStoreProvider::new();
    let servers = vec![server_with(vec![path("app/db", &[("user", "db.user")])]).skipped()];

    let summary = engine(&provider)
        .push(&servers, &sessions(&servers), &properties(&[]))
        .await
        .unwrap();

    assert_eq!(provider.calls().total(), 0);
    assert_eq!(summary.skipped, 1);
}

#[tokio::test]
async fn push_then_pull_round_trips() {
    let provider = MemoryStoreProvider::new().with_secret("app/db", [("unrelated", "x")]);
    let mappings = [("user", "db.user"), ("password", "db.password"), ("url", "db.url")];
    let servers = vec![server_with(vec![
        path("app/db", &mappings),
        path("app/api", &[("token", "api.token")]),
    ])];
    let original = properties(&[
        ("db.user", "alice"),
        ("db.password", "p@ss=word with spaces"),
        ("db.url", "jdbc:postgresql://db:5432/app?ssl=true"),
        ("api.token", ""),
    ]);

    let engine = engine(&provider);
    engine.push(&servers, &sessions(&servers), &original).await.unwrap();

    let mut pulled = Properties::new();
    engine.pull(&servers, &sessions(&servers), &mut pulled, &mut PropertiesSink).await.unwrap();

    assert_eq!(pulled, original);
}
