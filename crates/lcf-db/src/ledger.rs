//! Invoice ledger: an append-only fingerprint → invoice-id table.
//!
//! # Contract
//! - `find_by_fingerprint` returns every invoice id recorded for a fingerprint,
//!   oldest row first (ascending row id). An empty `Vec` is a normal answer.
//! - `insert` appends one row and returns it. Duplicate fingerprints are
//!   legal and never rejected; each insert is independent, so concurrent
//!   writers never contend on a shared row.
//! - There is no update or delete. Retention is someone else's job.

use std::fmt;

use async_trait::async_trait;
use lcf_schemas::{Fingerprint, LedgerEntry};
use sqlx::{PgPool, Row};

/// Failure talking to the ledger store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Store unreachable: connect/pool/IO failure.
    Unavailable(String),
    /// The write violated a table constraint.
    Constraint(String),
    /// Any other query or decode failure.
    Query(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable(msg) => write!(f, "ledger unavailable: {msg}"),
            StorageError::Constraint(msg) => write!(f, "ledger constraint violated: {msg}"),
            StorageError::Query(msg) => write!(f, "ledger query failed: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                // SQLSTATE class 23 = integrity constraint violation.
                let is_constraint = db_err
                    .code()
                    .map(|c| c.starts_with("23"))
                    .unwrap_or(false);
                if is_constraint {
                    StorageError::Constraint(db_err.message().to_string())
                } else {
                    StorageError::Query(db_err.message().to_string())
                }
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StorageError::Unavailable(err.to_string()),
            _ => StorageError::Query(err.to_string()),
        }
    }
}

/// Persistent fingerprint → invoice-id mapping.
///
/// Object-safe so the engine can hold an `Arc<dyn InvoiceLedger>`.
#[async_trait]
pub trait InvoiceLedger: Send + Sync {
    /// External invoice ids recorded for `fp`, oldest first.
    async fn find_by_fingerprint(&self, fp: &Fingerprint) -> Result<Vec<String>, StorageError>;

    /// Append a new row mapping `fp` to `invoice_id`.
    async fn insert(&self, invoice_id: &str, fp: &Fingerprint)
        -> Result<LedgerEntry, StorageError>;
}

/// Postgres-backed ledger over the `lightning_charge_field_invoices` table.
#[derive(Debug, Clone)]
pub struct PgInvoiceLedger {
    pool: PgPool,
}

impl PgInvoiceLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Full rows for a fingerprint, oldest first. Used by operator tooling.
    pub async fn entries_for(&self, fp: &Fingerprint) -> Result<Vec<LedgerEntry>, StorageError> {
        let rows = sqlx::query(
            r#"
            select id, invoice_id, hash, created_at
            from lightning_charge_field_invoices
            where hash = $1
            order by id asc
            "#,
        )
        .bind(fp.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(LedgerEntry {
                id: row.try_get("id")?,
                invoice_id: row.try_get("invoice_id")?,
                hash: Fingerprint::from_hex(row.try_get::<String, _>("hash")?),
                created_at: row.try_get("created_at")?,
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl InvoiceLedger for PgInvoiceLedger {
    async fn find_by_fingerprint(&self, fp: &Fingerprint) -> Result<Vec<String>, StorageError> {
        let rows: Vec<(String,)> = sqlx::query_as::<_, (String,)>(
            r#"
            select invoice_id
            from lightning_charge_field_invoices
            where hash = $1
            order by id asc
            "#,
        )
        .bind(fp.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn insert(
        &self,
        invoice_id: &str,
        fp: &Fingerprint,
    ) -> Result<LedgerEntry, StorageError> {
        let row = sqlx::query(
            r#"
            insert into lightning_charge_field_invoices (invoice_id, hash)
            values ($1, $2)
            returning id, created_at
            "#,
        )
        .bind(invoice_id)
        .bind(fp.as_str())
        .fetch_one(&self.pool)
        .await?;

        let entry = LedgerEntry {
            id: row.try_get("id")?,
            invoice_id: invoice_id.to_string(),
            hash: fp.clone(),
            created_at: row.try_get("created_at")?,
        };
        tracing::debug!(row_id = entry.id, invoice_id, hash = %fp, "ledger row appended");
        Ok(entry)
    }
}
