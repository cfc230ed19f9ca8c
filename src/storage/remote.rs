//! The remote relational collaborator: a `transactions` table exposing
//! select-all, insert, and delete-by-id.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{Result, StoreError};
use crate::transaction::{Transaction, TransactionKind};

/// Row shape used by the remote `transactions` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    pub description: String,
    pub created_at: String,
}

impl TransactionRow {
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            id: transaction.id.to_string(),
            kind: match transaction.kind {
                TransactionKind::Income => "income".to_string(),
                TransactionKind::Expense => "expense".to_string(),
            },
            amount: transaction.amount,
            description: transaction.description.clone(),
            created_at: transaction.created_at.to_rfc3339(),
        }
    }

    /// Maps the row into the in-memory shape.
    ///
    /// # Errors
    ///
    /// Returns [StoreError::RemoteFetch] when the id, kind, or timestamp is
    /// malformed; a row the service hands back in a shape we cannot read is
    /// treated the same as a failed read.
    pub fn into_transaction(self) -> Result<Transaction> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|err| StoreError::RemoteFetch(format!("malformed row id `{}`: {err}", self.id)))?;
        let kind = match self.kind.as_str() {
            "income" => TransactionKind::Income,
            "expense" => TransactionKind::Expense,
            other => {
                return Err(StoreError::RemoteFetch(format!(
                    "unknown transaction type `{other}`"
                )))
            }
        };
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|err| {
                StoreError::RemoteFetch(format!(
                    "malformed row timestamp `{}`: {err}",
                    self.created_at
                ))
            })?
            .with_timezone(&Utc);
        Ok(Transaction {
            id,
            kind,
            amount: self.amount,
            description: self.description,
            created_at,
        })
    }
}

/// The remote persistent store.
///
/// Implementations are selected once at session start; the store never
/// reconstructs its backend mid-session.
pub trait RemoteStore {
    /// Checks that the `transactions` table is provisioned.
    fn verify_schema(&self) -> Result<bool>;
    fn select_all(&self) -> Result<Vec<TransactionRow>>;
    fn insert(&self, row: &TransactionRow) -> Result<()>;
    fn delete_by_id(&self, id: &str) -> Result<()>;
}

/// SQLite-backed implementation of the remote service.
pub struct SqliteRemote {
    conn: Connection,
}

impl SqliteRemote {
    /// Opens the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [StoreError::RemoteFetch] when the database cannot be opened;
    /// an unreachable database is indistinguishable from an unreachable
    /// service at this boundary.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|err| StoreError::RemoteFetch(format!("could not open database: {err}")))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|err| StoreError::RemoteFetch(err.to_string()))?;
        Ok(Self { conn })
    }

    /// Creates the `transactions` table.
    ///
    /// Provisioning is normally a service-side concern; this exists for
    /// self-hosted databases and tests.
    pub fn provision(&self) -> Result<()> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS transactions (
                    id          TEXT PRIMARY KEY,
                    type        TEXT NOT NULL,
                    amount      REAL NOT NULL,
                    description TEXT NOT NULL,
                    created_at  TEXT NOT NULL
                )",
                (),
            )
            .map_err(|err| StoreError::RemoteWrite(err.to_string()))?;
        Ok(())
    }
}

impl RemoteStore for SqliteRemote {
    fn verify_schema(&self) -> Result<bool> {
        self.conn
            .query_row(
                "SELECT EXISTS(
                    SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'transactions'
                )",
                [],
                |row| row.get(0),
            )
            .map_err(|err| StoreError::RemoteFetch(err.to_string()))
    }

    fn select_all(&self) -> Result<Vec<TransactionRow>> {
        let mut statement = self
            .conn
            .prepare("SELECT id, type, amount, description, created_at FROM transactions")
            .map_err(|err| StoreError::RemoteFetch(err.to_string()))?;
        let rows = statement
            .query_map([], |row| {
                Ok(TransactionRow {
                    id: row.get(0)?,
                    kind: row.get(1)?,
                    amount: row.get(2)?,
                    description: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })
            .map_err(|err| StoreError::RemoteFetch(err.to_string()))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|err| StoreError::RemoteFetch(err.to_string()))?;
        Ok(rows)
    }

    fn insert(&self, row: &TransactionRow) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO transactions (id, type, amount, description, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![row.id, row.kind, row.amount, row.description, row.created_at],
            )
            .map_err(|err| StoreError::RemoteWrite(err.to_string()))?;
        Ok(())
    }

    fn delete_by_id(&self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM transactions WHERE id = ?1", params![id])
            .map_err(|err| StoreError::RemoteWrite(err.to_string()))?;
        Ok(())
    }
}
