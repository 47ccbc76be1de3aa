//! SQLite store tests

use chrono::NaiveDate;
use std::time::Duration;
use worklog_ai::models::entry::NewEntry;
use worklog_ai::services::store::{CredentialStore, EntryStore, SqliteStore};
use worklog_ai::ProviderKind;

fn new_entry(date: &str, category: &str, duration: f64) -> NewEntry {
    NewEntry {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        category: category.to_string(),
        task: format!("{} task", category),
        description: "worked on it".to_string(),
        duration,
        images: vec![],
    }
}

#[tokio::test]
async fn test_upsert_replaces_single_row() {
    let store = SqliteStore::in_memory().unwrap();

    let first = store
        .upsert_credential("alice", ProviderKind::Anthropic, "aa:01")
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = store
        .upsert_credential("alice", ProviderKind::Anthropic, "bb:02")
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.ciphertext, "bb:02");
    assert_eq!(second.created_at, first.created_at);
    assert!(second.updated_at > first.updated_at);
    assert_eq!(store.list_credentials("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_latest_is_most_recently_created() {
    let store = SqliteStore::in_memory().unwrap();
    store.upsert_credential("alice", ProviderKind::DeepSeek, "aa:01").await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    store.upsert_credential("alice", ProviderKind::Anthropic, "bb:02").await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    // Re-saving an older provider does not make it the newest
    store.upsert_credential("alice", ProviderKind::DeepSeek, "cc:03").await.unwrap();

    let latest = store.latest_credential("alice").await.unwrap().unwrap();
    assert_eq!(latest.provider, ProviderKind::Anthropic);

    let listed: Vec<ProviderKind> = store
        .list_credentials("alice")
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.provider)
        .collect();
    assert_eq!(listed, vec![ProviderKind::Anthropic, ProviderKind::DeepSeek]);
}

#[tokio::test]
async fn test_latest_for_unknown_user() {
    let store = SqliteStore::in_memory().unwrap();
    assert!(store.latest_credential("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_credential() {
    let store = SqliteStore::in_memory().unwrap();
    store.upsert_credential("alice", ProviderKind::Google, "aa:01").await.unwrap();

    assert!(store.delete_credential("alice", ProviderKind::Google).await.unwrap());
    assert!(!store.delete_credential("alice", ProviderKind::Google).await.unwrap());
    assert!(store.find_credential("alice", ProviderKind::Google).await.unwrap().is_none());
}

#[tokio::test]
async fn test_entries_ordering_and_scoping() {
    let store = SqliteStore::in_memory().unwrap();
    store.create_entry("alice", new_entry("2024-03-01", "dev", 1.0)).await.unwrap();
    store.create_entry("alice", new_entry("2024-03-03", "dev", 2.0)).await.unwrap();
    store.create_entry("alice", new_entry("2024-03-02", "ops", 3.0)).await.unwrap();
    store.create_entry("bob", new_entry("2024-03-02", "ops", 3.0)).await.unwrap();

    let dates: Vec<String> = store
        .list_entries("alice")
        .await
        .unwrap()
        .iter()
        .map(|e| e.date.to_string())
        .collect();
    assert_eq!(dates, vec!["2024-03-03", "2024-03-02", "2024-03-01"]);

    let since = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
    assert_eq!(store.entries_since("alice", since).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_entry_only_own() {
    let store = SqliteStore::in_memory().unwrap();
    let entry = store.create_entry("alice", new_entry("2024-03-01", "dev", 1.0)).await.unwrap();

    assert!(!store.delete_entry("bob", entry.id).await.unwrap());
    assert!(store.delete_entry("alice", entry.id).await.unwrap());
    assert!(store.list_entries("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_on_disk_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("worklog.db");
    let path = path.to_str().unwrap();

    {
        let store = SqliteStore::open(path).unwrap();
        store.upsert_credential("alice", ProviderKind::OpenAI, "aa:01").await.unwrap();
    }

    let reopened = SqliteStore::open(path).unwrap();
    let found = reopened.find_credential("alice", ProviderKind::OpenAI).await.unwrap();
    assert_eq!(found.map(|c| c.ciphertext), Some("aa:01".to_string()));
}

#[tokio::test]
async fn test_list_users_counts_and_order() {
    let store = SqliteStore::in_memory().unwrap();
    store.create_entry("alice", new_entry("2024-03-01", "dev", 1.0)).await.unwrap();
    store.create_entry("alice", new_entry("2024-03-02", "dev", 2.0)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    // A user with only a saved key is still listed
    store.upsert_credential("bob", ProviderKind::OpenAI, "aa:01").await.unwrap();

    let users = store.list_users().await.unwrap();
    let summary: Vec<(&str, u64)> = users
        .iter()
        .map(|u| (u.user_id.as_str(), u.entry_count))
        .collect();
    assert_eq!(summary, vec![("bob", 0), ("alice", 2)]);
    assert!(users[0].first_seen_at > users[1].first_seen_at);

    assert_eq!(store.count_entries().await.unwrap(), 2);
}

#[tokio::test]
async fn test_user_exists() {
    let store = SqliteStore::in_memory().unwrap();
    assert!(!store.user_exists("alice").await.unwrap());
    assert_eq!(store.count_entries().await.unwrap(), 0);
    assert!(store.list_users().await.unwrap().is_empty());

    store.upsert_credential("alice", ProviderKind::Anthropic, "aa:01").await.unwrap();
    assert!(store.user_exists("alice").await.unwrap());

    store.create_entry("bob", new_entry("2024-03-01", "ops", 1.0)).await.unwrap();
    assert!(store.user_exists("bob").await.unwrap());
    assert!(!store.user_exists("carol").await.unwrap());
}
