//! Persistence layer
//!
//! Storage traits for credentials and journal entries plus the SQLite
//! implementation. Every query is scoped by user id.

use crate::models::admin::UserSummary;
use crate::models::credential::{CredentialSummary, StoredCredential};
use crate::models::entry::{NewEntry, WorkEntry};
use crate::models::provider::ProviderKind;
use crate::utils::error::{AppError, AppResult, ErrorContext};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

const DATE_FORMAT: &str = "%Y-%m-%d";

const SCHEMA: &str = r#"
PRAGMA journal_mode=WAL;
PRAGMA foreign_keys=ON;

CREATE TABLE IF NOT EXISTS user_api_keys (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    provider TEXT NOT NULL,
    api_key_encrypted TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(user_id, provider)
);

CREATE TABLE IF NOT EXISTS entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    date TEXT NOT NULL,
    category TEXT NOT NULL,
    task TEXT NOT NULL,
    description TEXT NOT NULL,
    duration REAL NOT NULL,
    images TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_entries_user_date ON entries(user_id, date);
"#;

const CREDENTIAL_COLUMNS: &str =
    "id, user_id, provider, api_key_encrypted, created_at, updated_at";
const ENTRY_COLUMNS: &str =
    "id, user_id, date, category, task, description, duration, images, created_at";
const NEWEST_FIRST: &str = "date DESC, created_at DESC, id DESC";
const OLDEST_FIRST: &str = "date ASC, created_at ASC, id ASC";

/// Encrypted credential records, at most one per (user, provider)
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert or replace the user's credential for a provider
    ///
    /// Replacing keeps `created_at` and advances `updated_at`.
    async fn upsert_credential(
        &self,
        user_id: &str,
        provider: ProviderKind,
        ciphertext: &str,
    ) -> AppResult<StoredCredential>;

    async fn find_credential(
        &self,
        user_id: &str,
        provider: ProviderKind,
    ) -> AppResult<Option<StoredCredential>>;

    /// Most recently created credential of any provider
    async fn latest_credential(&self, user_id: &str) -> AppResult<Option<StoredCredential>>;

    /// Providers with a stored credential, newest first
    async fn list_credentials(&self, user_id: &str) -> AppResult<Vec<CredentialSummary>>;

    /// Returns whether a row was removed
    async fn delete_credential(&self, user_id: &str, provider: ProviderKind) -> AppResult<bool>;
}

/// Journal entries
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn create_entry(&self, user_id: &str, entry: NewEntry) -> AppResult<WorkEntry>;

    /// All entries, newest date first
    async fn list_entries(&self, user_id: &str) -> AppResult<Vec<WorkEntry>>;

    /// Entries with `start <= date <= end`, oldest date first
    async fn entries_between(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<WorkEntry>>;

    /// Entries with `date >= since`, newest date first
    async fn entries_since(&self, user_id: &str, since: NaiveDate) -> AppResult<Vec<WorkEntry>>;

    /// Returns whether a row was removed
    async fn delete_entry(&self, user_id: &str, id: i64) -> AppResult<bool>;

    /// Every user with an entry or a stored credential, most recently seen first
    async fn list_users(&self) -> AppResult<Vec<UserSummary>>;

    /// Whether the user has any entry or stored credential
    async fn user_exists(&self, user_id: &str) -> AppResult<bool>;

    /// Entries across all users
    async fn count_entries(&self) -> AppResult<u64>;
}

/// SQLite-backed store
///
/// A single connection guarded by a mutex; queries run on the blocking pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file and apply the schema
    pub fn open(path: &str) -> AppResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        info!("Database ready at {}", path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// In-memory database
    pub fn in_memory() -> AppResult<Self> {
        Self::open(":memory:")
    }

    async fn with_conn<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| AppError::Internal("database connection lock poisoned".to_string()))?;
            f(&guard)
        })
        .await?
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    // Fixed-width so lexical order matches chronological order
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn parse_provider(row: &Row<'_>, idx: usize) -> rusqlite::Result<ProviderKind> {
    let raw: String = row.get(idx)?;
    raw.parse::<ProviderKind>().map_err(|e| conversion_error(idx, e))
}

fn credential_from_row(row: &Row<'_>) -> rusqlite::Result<StoredCredential> {
    Ok(StoredCredential {
        id: row.get(0)?,
        user_id: row.get(1)?,
        provider: parse_provider(row, 2)?,
        ciphertext: row.get(3)?,
        created_at: parse_timestamp(row, 4)?,
        updated_at: parse_timestamp(row, 5)?,
    })
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<WorkEntry> {
    let date: String = row.get(2)?;
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|e| conversion_error(2, e))?;
    let images: String = row.get(7)?;
    let images: Vec<String> = serde_json::from_str(&images).map_err(|e| conversion_error(7, e))?;

    Ok(WorkEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date,
        category: row.get(3)?,
        task: row.get(4)?,
        description: row.get(5)?,
        duration: row.get(6)?,
        images,
        created_at: parse_timestamp(row, 8)?,
    })
}

fn select_credential(
    conn: &Connection,
    user_id: &str,
    provider: ProviderKind,
) -> AppResult<Option<StoredCredential>> {
    let sql = format!(
        "SELECT {} FROM user_api_keys WHERE user_id = ?1 AND provider = ?2",
        CREDENTIAL_COLUMNS
    );
    let found = conn
        .query_row(&sql, params![user_id, provider.as_str()], credential_from_row)
        .optional()?;
    Ok(found)
}

fn query_entries(
    conn: &Connection,
    filter: &str,
    order: &str,
    args: &[&dyn rusqlite::ToSql],
) -> AppResult<Vec<WorkEntry>> {
    let sql = format!(
        "SELECT {} FROM entries WHERE {} ORDER BY {}",
        ENTRY_COLUMNS, filter, order
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(args, entry_from_row)?;
    let entries = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn upsert_credential(
        &self,
        user_id: &str,
        provider: ProviderKind,
        ciphertext: &str,
    ) -> AppResult<StoredCredential> {
        let user_id = user_id.to_string();
        let ciphertext = ciphertext.to_string();

        self.with_conn(move |conn| {
            let now = timestamp(Utc::now());
            conn.execute(
                "INSERT INTO user_api_keys (user_id, provider, api_key_encrypted, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT(user_id, provider) DO UPDATE SET
                     api_key_encrypted = excluded.api_key_encrypted,
                     updated_at = excluded.updated_at",
                params![user_id, provider.as_str(), ciphertext, now],
            )?;
            debug!(provider = %provider, "Credential upserted");

            select_credential(conn, &user_id, provider)?
                .ok_or_else(|| AppError::Storage("credential missing after upsert".to_string()))
        })
        .await
    }

    async fn find_credential(
        &self,
        user_id: &str,
        provider: ProviderKind,
    ) -> AppResult<Option<StoredCredential>> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| select_credential(conn, &user_id, provider))
            .await
    }

    async fn latest_credential(&self, user_id: &str) -> AppResult<Option<StoredCredential>> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {} FROM user_api_keys WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC LIMIT 1",
                CREDENTIAL_COLUMNS
            );
            let found = conn
                .query_row(&sql, params![user_id], credential_from_row)
                .optional()?;
            Ok(found)
        })
        .await
    }

    async fn list_credentials(&self, user_id: &str) -> AppResult<Vec<CredentialSummary>> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT provider, created_at FROM user_api_keys WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt.query_map(params![user_id], |row| {
                Ok(CredentialSummary {
                    provider: parse_provider(row, 0)?,
                    created_at: parse_timestamp(row, 1)?,
                })
            })?;
            let summaries = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(summaries)
        })
        .await
    }

    async fn delete_credential(&self, user_id: &str, provider: ProviderKind) -> AppResult<bool> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let removed = conn.execute(
                "DELETE FROM user_api_keys WHERE user_id = ?1 AND provider = ?2",
                params![user_id, provider.as_str()],
            )?;
            Ok(removed > 0)
        })
        .await
    }
}

#[async_trait]
impl EntryStore for SqliteStore {
    async fn create_entry(&self, user_id: &str, entry: NewEntry) -> AppResult<WorkEntry> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let created_at = Utc::now();
            let images =
                serde_json::to_string(&entry.images).internal_context("Failed to encode images")?;

            conn.execute(
                "INSERT INTO entries (user_id, date, category, task, description, duration, images, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    user_id,
                    entry.date.format(DATE_FORMAT).to_string(),
                    entry.category,
                    entry.task,
                    entry.description,
                    entry.duration,
                    images,
                    timestamp(created_at),
                ],
            )?;

            Ok(WorkEntry {
                id: conn.last_insert_rowid(),
                user_id,
                date: entry.date,
                category: entry.category,
                task: entry.task,
                description: entry.description,
                duration: entry.duration,
                images: entry.images,
                created_at,
            })
        })
        .await
    }

    async fn list_entries(&self, user_id: &str) -> AppResult<Vec<WorkEntry>> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            query_entries(conn, "user_id = ?1", NEWEST_FIRST, params![user_id])
        })
        .await
    }

    async fn entries_between(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<WorkEntry>> {
        let user_id = user_id.to_string();
        let start = start.format(DATE_FORMAT).to_string();
        let end = end.format(DATE_FORMAT).to_string();
        self.with_conn(move |conn| {
            query_entries(
                conn,
                "user_id = ?1 AND date >= ?2 AND date <= ?3",
                OLDEST_FIRST,
                params![user_id, start, end],
            )
        })
        .await
    }

    async fn entries_since(&self, user_id: &str, since: NaiveDate) -> AppResult<Vec<WorkEntry>> {
        let user_id = user_id.to_string();
        let since = since.format(DATE_FORMAT).to_string();
        self.with_conn(move |conn| {
            query_entries(
                conn,
                "user_id = ?1 AND date >= ?2",
                NEWEST_FIRST,
                params![user_id, since],
            )
        })
        .await
    }

    async fn delete_entry(&self, user_id: &str, id: i64) -> AppResult<bool> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let removed = conn.execute(
                "DELETE FROM entries WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
            )?;
            Ok(removed > 0)
        })
        .await
    }

    async fn list_users(&self) -> AppResult<Vec<UserSummary>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, SUM(entry_count), MIN(first_seen) FROM (
                     SELECT user_id, COUNT(*) AS entry_count, MIN(created_at) AS first_seen
                     FROM entries GROUP BY user_id
                     UNION ALL
                     SELECT user_id, 0, MIN(created_at) FROM user_api_keys GROUP BY user_id
                 )
                 GROUP BY user_id
                 ORDER BY MIN(first_seen) DESC, user_id ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                let entry_count: i64 = row.get(1)?;
                Ok(UserSummary {
                    user_id: row.get(0)?,
                    entry_count: entry_count.max(0) as u64,
                    first_seen_at: parse_timestamp(row, 2)?,
                })
            })?;
            let users = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(users)
        })
        .await
    }

    async fn user_exists(&self, user_id: &str) -> AppResult<bool> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM entries WHERE user_id = ?1)
                     OR EXISTS(SELECT 1 FROM user_api_keys WHERE user_id = ?1)",
                params![user_id],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
        .await
    }

    async fn count_entries(&self) -> AppResult<u64> {
        self.with_conn(|conn| {
            let total: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
            Ok(total.max(0) as u64)
        })
        .await
    }
}
