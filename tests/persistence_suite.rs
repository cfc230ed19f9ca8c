mod common;

use std::fs;

use finance_core::notify::Severity;
use finance_core::storage::{LocalCache, RemoteStore, SqliteRemote};
use finance_core::{Config, FinanceStore, Transaction, TransactionKind};
use tempfile::tempdir;

use common::RecordingNotifier;

#[test]
fn cache_roundtrip_preserves_every_field() {
    let temp = tempdir().unwrap();
    let cache = LocalCache::new(temp.path()).expect("create cache");
    let transactions = vec![
        Transaction::new(TransactionKind::Income, "Gehalt", 2000.0).unwrap(),
        Transaction::new(TransactionKind::Expense, "Miete", 500.0).unwrap(),
    ];

    cache.save(&transactions).expect("save transactions");
    let loaded = cache.load().expect("load transactions");

    assert_eq!(loaded.len(), 2);
    for (restored, original) in loaded.iter().zip(&transactions) {
        assert_eq!(restored.id, original.id);
        assert_eq!(restored.kind, original.kind);
        assert_eq!(restored.amount, original.amount);
        assert_eq!(restored.description, original.description);
        assert_eq!(restored.created_at, original.created_at);
    }
}

#[test]
fn corrupt_cache_starts_the_session_empty() {
    let temp = tempdir().unwrap();
    let cache = LocalCache::new(temp.path()).unwrap();
    fs::write(cache.path(), "{ not json ]").unwrap();
    let notifier = RecordingNotifier::default();

    let store = FinanceStore::with_backends(None, cache, Box::new(notifier.clone()));

    assert!(store.transactions().is_empty());
    assert_eq!(store.balance(), 0.0);
    // Starting empty is not an error the user has to act on.
    assert!(store.last_error().is_none());
}

#[test]
fn open_against_a_provisioned_database_runs_remote() {
    let temp = tempdir().unwrap();
    let db_path = temp.path().join("remote.db");
    let remote = SqliteRemote::open(&db_path).expect("open database file");
    remote.provision().expect("provision schema");
    drop(remote);

    let config = Config {
        remote_database: Some(db_path.clone()),
        data_dir: temp.path().join("data"),
    };
    let notifier = RecordingNotifier::default();
    let mut store =
        FinanceStore::open(&config, Box::new(notifier.clone())).expect("open session");

    assert!(store.storage_mode().is_remote());
    store
        .add_transaction(TransactionKind::Income, "Gehalt", 2000.0)
        .expect("add income");
    store.close();

    // The row landed in the database, not just in memory.
    let remote = SqliteRemote::open(&db_path).unwrap();
    let rows = remote.select_all().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].description, "Gehalt");

    // And the passive backup mirrors it.
    let cache = LocalCache::new(&config.data_dir).unwrap();
    assert_eq!(cache.load().unwrap().len(), 1);
}

#[test]
fn open_against_an_unprovisioned_database_falls_back() {
    let temp = tempdir().unwrap();
    let db_path = temp.path().join("remote.db");
    // Touch the database file without creating the table.
    drop(SqliteRemote::open(&db_path).expect("create database file"));

    let config = Config {
        remote_database: Some(db_path),
        data_dir: temp.path().join("data"),
    };
    let notifier = RecordingNotifier::default();
    let store = FinanceStore::open(&config, Box::new(notifier.clone())).expect("open session");

    assert!(!store.storage_mode().is_remote());
    assert!(notifier.contains(Severity::Info, "not set up yet"));
}

#[test]
fn remote_sessions_leave_a_usable_offline_copy() {
    let temp = tempdir().unwrap();
    let db_path = temp.path().join("remote.db");
    let remote = SqliteRemote::open(&db_path).unwrap();
    remote.provision().unwrap();
    drop(remote);

    let config = Config {
        remote_database: Some(db_path.clone()),
        data_dir: temp.path().join("data"),
    };
    let notifier = RecordingNotifier::default();
    let mut store = FinanceStore::open(&config, Box::new(notifier.clone())).unwrap();
    store
        .add_transaction(TransactionKind::Income, "Gehalt", 2000.0)
        .unwrap();
    store
        .add_transaction(TransactionKind::Expense, "Miete", 500.0)
        .unwrap();
    store.close();

    // Simulate the remote disappearing between sessions.
    fs::remove_file(&db_path).unwrap();
    notifier.clear();
    let store = FinanceStore::open(&config, Box::new(notifier.clone())).unwrap();

    assert!(!store.storage_mode().is_remote());
    assert_eq!(store.transactions().len(), 2);
    assert_eq!(store.balance(), 1500.0);
    assert!(notifier.contains(Severity::Info, "local storage"));
}
