//! lcf-db
//!
//! Postgres persistence for the invoice ledger (fingerprint → invoice id).
//!
//! Connection + migration helpers return `anyhow::Result`; the ledger itself
//! is exposed through the [`InvoiceLedger`] trait with a typed
//! [`StorageError`] so the reconciliation engine can tell storage failures
//! apart from gateway failures.

mod ledger;

pub use ledger::{InvoiceLedger, PgInvoiceLedger, StorageError};

use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

pub const ENV_DB_URL: &str = "LCF_DATABASE_URL";

/// Name of the ledger table created by the embedded migrations.
pub const TABLE_INVOICES: &str = "lightning_charge_field_invoices";

/// Connect to Postgres using LCF_DATABASE_URL.
pub async fn connect_from_env() -> Result<PgPool> {
    let url = std::env::var(ENV_DB_URL)
        .with_context(|| format!("missing env var {ENV_DB_URL}"))?;
    connect(&url).await
}

pub async fn connect(url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await
        .context("failed to connect to Postgres")?;

    Ok(pool)
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_ledger_table: bool,
}

/// Connectivity + schema presence.
pub async fn status(pool: &PgPool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as::<_, (i32,)>("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;

    let (exists,): (bool,) = sqlx::query_as::<_, (bool,)>(
        r#"
        select exists (
            select 1
            from information_schema.tables
            where table_schema='public' and table_name=$1
        )
        "#,
    )
    .bind(TABLE_INVOICES)
    .fetch_one(pool)
    .await
    .context("status table-exists query failed")?;

    Ok(DbStatus {
        ok: one == 1,
        has_ledger_table: exists,
    })
}

/// Test helper: connect + migrate, or `None` when LCF_DATABASE_URL is unset.
pub async fn testkit_db_pool() -> Result<Option<PgPool>> {
    let url = match std::env::var(ENV_DB_URL) {
        Ok(v) => v,
        Err(_) => return Ok(None),
    };
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .context("testkit_db_pool connect failed")?;
    migrate(&pool).await?;
    Ok(Some(pool))
}
