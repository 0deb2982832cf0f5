//! Document repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist the ordered item collection as one JSON payload under a
//!   single key, mirroring the browser-local storage model.
//! - Keep SQL and payload-encoding details inside this boundary.
//!
//! # Invariants
//! - Item order in the payload is collection order; no sorting.
//! - A missing key loads as an empty collection.
//! - Records with missing fields are defaulted, not dropped.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::item::{Item, StoredItem};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the serialized collection.
pub const STORAGE_KEY: &str = "containers";

/// Result type used by document repository operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from document repository operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Stored payload is not a JSON array of records at all.
    InvalidPayload(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidPayload(message) => write!(f, "invalid stored payload: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "document repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "document repository requires table `{table}`")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for the whole item collection.
pub trait DocumentRepository {
    /// Loads every persisted item in stored order.
    fn load_items(&self) -> StoreResult<Vec<Item>>;
    /// Replaces the persisted collection with the given items.
    fn save_items(&self, items: &[Item]) -> StoreResult<()>;
}

/// SQLite-backed document repository.
#[derive(Debug)]
pub struct SqliteDocumentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl DocumentRepository for SqliteDocumentRepository<'_> {
    fn load_items(&self) -> StoreResult<Vec<Item>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv_state WHERE key = ?1;",
                [STORAGE_KEY],
                |row| row.get(0),
            )
            .optional()?;

        let Some(payload) = payload else {
            return Ok(Vec::new());
        };

        let records: Vec<StoredItem> = serde_json::from_str(&payload)
            .map_err(|err| StoreError::InvalidPayload(err.to_string()))?;
        Ok(records.into_iter().map(StoredItem::into_item).collect())
    }

    fn save_items(&self, items: &[Item]) -> StoreResult<()> {
        let records: Vec<StoredItem> = items.iter().map(StoredItem::from_item).collect();
        let payload = serde_json::to_string(&records)
            .map_err(|err| StoreError::InvalidPayload(err.to_string()))?;

        self.conn.execute(
            "INSERT INTO kv_state (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![STORAGE_KEY, payload],
        )?;
        Ok(())
    }
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'kv_state'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(StoreError::MissingRequiredTable("kv_state"));
    }

    Ok(())
}
