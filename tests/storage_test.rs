//! Record store tests against on-disk databases

use tempfile::TempDir;

use bakerboard::config::DatabaseConfig;
use bakerboard::storage::{create_store, seed_bakeries, RecordStore, SqliteStore};
use bakerboard::types::RecordKind;
use bakerboard::Error;

fn file_config(dir: &TempDir) -> DatabaseConfig {
    DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("bakerboard.db").display()),
        max_connections: 4,
    }
}

#[tokio::test]
async fn test_records_survive_reconnect() {
    let temp_dir = TempDir::new().unwrap();
    let config = file_config(&temp_dir);

    let store = SqliteStore::connect(&config).await.unwrap();
    let message = store.create_message("Hello", "Liza").await.unwrap();
    let bakery = store.create_bakery("Test Bakery").await.unwrap();
    let baked_good = store
        .create_baked_good("Apple Fritter", bakery.id)
        .await
        .unwrap();
    store.close().await;

    // Reopening reruns migrations, which must leave existing data alone
    let store = create_store(&config).await.unwrap();
    assert_eq!(store.list_messages().await.unwrap(), vec![message]);
    assert_eq!(store.list_bakeries().await.unwrap(), vec![bakery]);
    assert_eq!(store.list_baked_goods().await.unwrap(), vec![baked_good]);
}

#[tokio::test]
async fn test_not_found_reports_kind_and_id() {
    let store = SqliteStore::in_memory().await.unwrap();

    let cases = [
        (store.delete_message(3).await, RecordKind::Message),
        (store.delete_baked_good(4).await, RecordKind::BakedGood),
        (
            store.update_bakery_name(5, Some("x")).await.map(|_| ()),
            RecordKind::Bakery,
        ),
        (
            store.update_message_body(6, None).await.map(|_| ()),
            RecordKind::Message,
        ),
    ];

    for (result, expected) in cases {
        match result {
            Err(Error::NotFound { kind, .. }) => assert_eq!(kind, expected),
            other => panic!("expected NotFound for {expected}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_concurrent_updates_keep_timestamps_increasing() {
    let temp_dir = TempDir::new().unwrap();
    let store = SqliteStore::connect(&file_config(&temp_dir)).await.unwrap();
    let created = store.create_message("v0", "Liza").await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        let body = format!("v{}", i + 1);
        handles.push(tokio::spawn(async move {
            store
                .update_message_body(created.id, Some(&body))
                .await
                .unwrap()
        }));
    }

    let mut stamps = Vec::new();
    for handle in handles {
        stamps.push(handle.await.unwrap().updated_at);
    }
    stamps.sort();
    stamps.dedup();

    // Every committed update moved the timestamp forward
    assert_eq!(stamps.len(), 8);
    assert!(stamps[0] > created.updated_at);

    let stored = store.get_message(created.id).await.unwrap();
    assert_eq!(stored.updated_at, *stamps.last().unwrap());
}

#[tokio::test]
async fn test_seed_bakeries_skips_existing_names() {
    let store = SqliteStore::in_memory().await.unwrap();
    store.create_bakery("Delightful donuts").await.unwrap();

    let names = vec![
        "Delightful donuts".to_string(),
        "Incredible crullers".to_string(),
    ];
    let created = seed_bakeries(&store, &names).await.unwrap();
    assert_eq!(created, 1);

    let created = seed_bakeries(&store, &names).await.unwrap();
    assert_eq!(created, 0);

    let bakeries: Vec<String> = store
        .list_bakeries()
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.name)
        .collect();
    assert_eq!(bakeries, names);
}
