//! Persistent storage using redb.
//!
//! # Table design
//!
//! ```text
//! cases         u64                    -> JSON Case
//! periods       (case_id, period_id)   -> JSON DeadlinePeriod
//! timeline      (case_id, entry_id)    -> JSON TimelineEntry
//! responsibles  (case_id, assign_id)   -> JSON ResponsibleAssignment
//! audit         u64                    -> JSON AuditRecord
//! sequences     &str                   -> last issued id
//! ```
//!
//! Child tables lead with the case id, so everything belonging to one case is
//! a single range scan and a mutation touches only the rows it changes.
//!
//! redb admits one write transaction at a time. Every mutation goes through
//! [`Store::write`], so check-then-insert sequences (one active period, one
//! active responsible, nothing added to a concluded case) cannot interleave.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadTransaction, ReadableTable, TableDefinition, WriteTransaction};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{db_err, PrazoError, Result};

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

pub(crate) const CASES: TableDefinition<u64, &[u8]> = TableDefinition::new("cases");
pub(crate) const PERIODS: TableDefinition<(u64, u64), &[u8]> = TableDefinition::new("periods");
pub(crate) const TIMELINE: TableDefinition<(u64, u64), &[u8]> = TableDefinition::new("timeline");
pub(crate) const RESPONSIBLES: TableDefinition<(u64, u64), &[u8]> =
    TableDefinition::new("responsibles");
pub(crate) const AUDIT: TableDefinition<u64, &[u8]> = TableDefinition::new("audit");
const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Shared handle to the case database. Cloning is cheap.
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

impl Store {
    /// Open or create the database at `path`, creating every table.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path).map_err(db_err)?;
        let wt = db.begin_write().map_err(db_err)?;
        wt.open_table(CASES).map_err(db_err)?;
        wt.open_table(PERIODS).map_err(db_err)?;
        wt.open_table(TIMELINE).map_err(db_err)?;
        wt.open_table(RESPONSIBLES).map_err(db_err)?;
        wt.open_table(AUDIT).map_err(db_err)?;
        wt.open_table(SEQUENCES).map_err(db_err)?;
        wt.commit().map_err(db_err)?;
        tracing::debug!(path = %path.display(), "opened store");
        Ok(Self { db: Arc::new(db) })
    }

    /// Run `f` in a write transaction. Commits on `Ok`; any error aborts, so
    /// none of the writes made by `f` become visible.
    pub fn write<T>(&self, f: impl FnOnce(&WriteTransaction) -> Result<T>) -> Result<T> {
        let wt = self.db.begin_write().map_err(db_err)?;
        match f(&wt) {
            Ok(value) => {
                wt.commit().map_err(db_err)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(abort) = wt.abort() {
                    tracing::warn!(error = %abort, "failed to abort write transaction");
                }
                Err(e)
            }
        }
    }

    /// Run `f` against a consistent read snapshot.
    pub fn read<T>(&self, f: impl FnOnce(&ReadTransaction) -> Result<T>) -> Result<T> {
        let rt = self.db.begin_read().map_err(db_err)?;
        f(&rt)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Issue the next id of the named sequence. Ids start at 1.
pub(crate) fn next_id(wt: &WriteTransaction, sequence: &str) -> Result<u64> {
    let mut table = wt.open_table(SEQUENCES).map_err(db_err)?;
    let next = table.get(sequence).map_err(db_err)?.map(|g| g.value()).unwrap_or(0) + 1;
    table.insert(sequence, next).map_err(db_err)?;
    Ok(next)
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Decode a stored record. Anything unreadable is a data integrity fault,
/// not a storage failure.
pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| PrazoError::DataIntegrity(e.to_string()))
}

/// All records of one case in a `(case_id, id)` keyed table, in id order.
pub(crate) fn scan_case<T, Tbl>(table: &Tbl, case_id: u64) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    Tbl: ReadableTable<(u64, u64), &'static [u8]>,
{
    let mut out = Vec::new();
    for entry in table
        .range((case_id, 0)..=(case_id, u64::MAX))
        .map_err(db_err)?
    {
        let (_, v) = entry.map_err(db_err)?;
        out.push(decode(v.value())?);
    }
    Ok(out)
}

/// Every record in a `u64` keyed table, in id order.
pub(crate) fn scan_all<T, Tbl>(table: &Tbl) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    Tbl: ReadableTable<u64, &'static [u8]>,
{
    let mut out = Vec::new();
    for entry in table.iter().map_err(db_err)? {
        let (_, v) = entry.map_err(db_err)?;
        out.push(decode(v.value())?);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    pub(crate) fn open_tmp() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(&dir.path().join("test.redb")).unwrap();
        (dir, store)
    }

    #[test]
    fn sequences_start_at_one_and_are_independent() {
        let (_dir, store) = open_tmp();
        let ids = store
            .write(|wt| {
                Ok((
                    next_id(wt, "a")?,
                    next_id(wt, "a")?,
                    next_id(wt, "b")?,
                ))
            })
            .unwrap();
        assert_eq!(ids, (1, 2, 1));
    }

    #[test]
    fn failed_write_rolls_back() {
        let (_dir, store) = open_tmp();
        let result: Result<()> = store.write(|wt| {
            let mut t = wt.open_table(CASES).map_err(db_err)?;
            t.insert(1u64, b"{}".as_slice()).map_err(db_err)?;
            Err(PrazoError::validation("abort"))
        });
        assert!(result.is_err());

        let count = store
            .read(|rt| {
                let t = rt.open_table(CASES).map_err(db_err)?;
                Ok(t.iter().map_err(db_err)?.count())
            })
            .unwrap();
        assert_eq!(count, 0, "aborted insert must not be visible");
    }

    #[test]
    fn decode_garbage_is_data_integrity() {
        let err = decode::<serde_json::Value>(b"not json").unwrap_err();
        assert!(matches!(err, PrazoError::DataIntegrity(_)));
    }

    #[test]
    fn reopen_keeps_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/dir/test.redb");
        {
            let store = Store::open(&path).unwrap();
            store.write(|wt| next_id(wt, "cases")).unwrap();
        }
        let store = Store::open(&path).unwrap();
        assert_eq!(store.write(|wt| next_id(wt, "cases")).unwrap(), 2);
    }
}
