//! In-memory invoice ledger.
//!
//! Same contract as the Postgres ledger: append-only, duplicates allowed,
//! reads ordered by row id. Reads and writes can be made to fail on demand.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use lcf_db::{InvoiceLedger, StorageError};
use lcf_schemas::{Fingerprint, LedgerEntry};

#[derive(Default)]
struct State {
    rows: Vec<LedgerEntry>,
    next_id: i64,
    fail_reads: Option<StorageError>,
    fail_writes: Option<StorageError>,
}

#[derive(Default)]
pub struct InMemoryLedger {
    state: Mutex<State>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StorageError> {
        self.state
            .lock()
            .map_err(|_| StorageError::Unavailable("in-memory ledger poisoned".to_string()))
    }

    fn append(state: &mut State, invoice_id: &str, fp: &Fingerprint) -> LedgerEntry {
        state.next_id += 1;
        let entry = LedgerEntry {
            id: state.next_id,
            invoice_id: invoice_id.to_string(),
            hash: fp.clone(),
            created_at: Some(Utc::now()),
        };
        state.rows.push(entry.clone());
        entry
    }

    /// Insert a row directly, bypassing failure injection.
    pub fn seed(&self, invoice_id: &str, fp: &Fingerprint) -> LedgerEntry {
        let mut st = self.state.lock().unwrap_or_else(|p| p.into_inner());
        Self::append(&mut st, invoice_id, fp)
    }

    pub fn entries(&self) -> Vec<LedgerEntry> {
        let st = self.state.lock().unwrap_or_else(|p| p.into_inner());
        st.rows.clone()
    }

    pub fn entries_for(&self, fp: &Fingerprint) -> Vec<LedgerEntry> {
        self.entries().into_iter().filter(|e| &e.hash == fp).collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every subsequent `find_by_fingerprint` fails with `err` (or succeeds
    /// again when `None`).
    pub fn fail_reads(&self, err: Option<StorageError>) {
        let mut st = self.state.lock().unwrap_or_else(|p| p.into_inner());
        st.fail_reads = err;
    }

    /// Every subsequent `insert` fails with `err` (or succeeds again when
    /// `None`).
    pub fn fail_writes(&self, err: Option<StorageError>) {
        let mut st = self.state.lock().unwrap_or_else(|p| p.into_inner());
        st.fail_writes = err;
    }
}

#[async_trait]
impl InvoiceLedger for InMemoryLedger {
    async fn find_by_fingerprint(&self, fp: &Fingerprint) -> Result<Vec<String>, StorageError> {
        let st = self.lock()?;
        if let Some(err) = &st.fail_reads {
            return Err(err.clone());
        }
        Ok(st
            .rows
            .iter()
            .filter(|e| &e.hash == fp)
            .map(|e| e.invoice_id.clone())
            .collect())
    }

    async fn insert(
        &self,
        invoice_id: &str,
        fp: &Fingerprint,
    ) -> Result<LedgerEntry, StorageError> {
        let mut st = self.lock()?;
        if let Some(err) = &st.fail_writes {
            return Err(err.clone());
        }
        Ok(Self::append(&mut st, invoice_id, fp))
    }
}
