use vaultsync::store::{MemoryStoreProvider, StoreCalls};
use vaultsync::sync::{OutputSink, Properties, PropertiesSink};
use vaultsync::{Result, SyncError};
use vaultsync::config::Mapping;
use vaultsync::store::SecretData;

use super::support::{engine, path, properties, server_with, sessions};

/// Records every mapping it receives.
#[derive(Default)]
struct RecordingSink {
    flushed: Vec<(String, String)>,
}

impl OutputSink for RecordingSink {
    fn flush(&mut self, properties: &mut Properties, secrets: &SecretData, mapping: &Mapping) -> Result<()> {
        let value = secrets[&mapping.secret_key].clone();
        self.flushed.push((mapping.property_key.clone(), value.clone()));
        properties.insert(mapping.property_key.clone(), value);
        Ok(())
    }
}

#[tokio::test]
async fn pull_maps_secret_key_to_property() {
    let provider = MemoryStoreProvider::new().with_secret("app/db", [("user", "alice")]);
    let servers = vec![server_with(vec![path("app/db", &[("user", "db.user")])])];

    let mut props = Properties::new();
    engine(&provider).pull(&servers, &sessions(&servers), &mut props, &mut PropertiesSink).await.unwrap();

    assert_eq!(props, properties(&[("db.user", "alice")]));
}

#[tokio::test]
async fn pull_missing_key_names_path_and_key() {
    let provider = MemoryStoreProvider::new().with_secret("app/db", [("password", "x")]);
    let servers = vec![server_with(vec![path("app/db", &[("user", "db.user")])])];

    let err = engine(&provider)
        .pull(&servers, &sessions(&servers), &mut Properties::new(), &mut PropertiesSink)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::SecretKeyNotFound { .. }));
    let message = err.to_string();
    assert!(message.contains("app/db"), "{}", message);
    assert!(message.contains("user"), "{}", message);
}

#[tokio::test]
async fn pull_missing_key_stops_before_later_mappings() {
    let provider = MemoryStoreProvider::new()
        .with_secret("app/db", [("user", "alice")])
        .with_secret("app/api", [("key", "k1")]);
    let servers = vec![server_with(vec![
        path("app/db", &[("user", "db.user"), ("missing", "db.missing"), ("user", "db.user2")]),
        path("app/api", &[("key", "api.key")]),
    ])];

    let mut sink = RecordingSink::default();
    let mut props = Properties::new();
    let result = engine(&provider).pull(&servers, &sessions(&servers), &mut props, &mut sink).await;

    assert!(result.unwrap_err().is_not_found());
    assert_eq!(sink.flushed, vec![("db.user".to_string(), "alice".to_string())]);
    assert_eq!(provider.calls().reads, 1);
}

#[tokio::test]
async fn pull_reads_each_path_once_regardless_of_mappings() {
    let provider = MemoryStoreProvider::new()
        .with_secret("app/db", [("user", "alice"), ("password", "pw"), ("host", "db.local")])
        .with_secret("app/api", [("key", "k1")]);
    let servers = vec![server_with(vec![
        path("app/db", &[("user", "db.user"), ("password", "db.password"), ("host", "db.host")]),
        path("app/api", &[("key", "api.key")]),
    ])];

    let mut sink = RecordingSink::default();
    let summary = engine(&provider)
        .pull(&servers, &sessions(&servers), &mut Properties::new(), &mut sink)
        .await
        .unwrap();

    assert_eq!(provider.calls(), StoreCalls { sessions: 1, reads: 2, lists: 0, writes: 0 });
    assert_eq!(summary.paths, 2);
    assert_eq!(summary.mappings, 4);
    let order: Vec<&str> = sink.flushed.iter().map(|(property, _)| property.as_str()).collect();
    assert_eq!(order, vec!["db.user", "db.password", "db.host", "api.key"]);
}

#[tokio::test]
async fn pull_skips_servers_without_store_contact() {
    let provider = MemoryStoreProvider::new().with_secret("app/db", [("user", "alice")]);
    let servers = vec![
        server_with(vec![path("app/db", &[("user", "db.user")])]).skipped(),
        server_with(vec![path("app/db", &[("user", "db.user")])]).skipped(),
    ];

    let mut props = Properties::new();
    let summary = engine(&provider)
        .pull(&servers, &sessions(&servers), &mut props, &mut PropertiesSink)
        .await
        .unwrap();

    assert_eq!(provider.calls().total(), 0);
    assert_eq!(summary.skipped, 2);
    assert!(props.is_empty());
}

#[tokio::test]
async fn pull_server_without_paths_still_opens_one_session() {
    let provider = MemoryStoreProvider::new();
    let servers = vec![server_with(Vec::new())];

    engine(&provider)
        .pull(&servers, &sessions(&servers), &mut Properties::new(), &mut PropertiesSink)
        .await
        .unwrap();

    assert_eq!(provider.calls(), StoreCalls { sessions: 1, ..Default::default() });
}

#[tokio::test]
async fn pull_duplicate_property_keys_last_write_wins() {
    let provider = MemoryStoreProvider::new()
        .with_secret("app/one", [("value", "first")])
        .with_secret("app/two", [("value", "second")]);
    let servers = vec![server_with(vec![
        path("app/one", &[("value", "shared")]),
        path("app/two", &[("value", "shared")]),
    ])];

    let mut props = Properties::new();
    engine(&provider).pull(&servers, &sessions(&servers), &mut props, &mut PropertiesSink).await.unwrap();

    assert_eq!(props["shared"], "second");
}

#[tokio::test]
async fn pull_processes_servers_in_order() {
    let provider = MemoryStoreProvider::new().with_secret("app/db", [("user", "alice")]);
    let mut first = server_with(vec![path("app/db", &[("user", "a.user")])]);
    first.url = "http://first:8200".to_string();
    let mut second = server_with(vec![path("app/db", &[("user", "b.user")])]);
    second.url = "http://second:8200".to_string();
    let servers = vec![first, second];

    engine(&provider)
        .pull(&servers, &sessions(&servers), &mut Properties::new(), &mut PropertiesSink)
        .await
        .unwrap();

    assert_eq!(provider.opened_servers(), vec!["http://first:8200", "http://second:8200"]);
}
