//! Change records for every mutating operation.
//!
//! The engine emits one [`AuditEvent`] after each committed mutation. Where
//! events end up is the sink's business: [`Store`] keeps them in its `audit`
//! table, [`TracingAudit`] writes them to the log.

use crate::error::{db_err, Result};
use crate::session::Session;
use crate::store::{self, Store, AUDIT};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOp {
    Create,
    Update,
    Delete,
}

impl fmt::Display for AuditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuditOp::Create => "CREATE",
            AuditOp::Update => "UPDATE",
            AuditOp::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub table: String,
    pub record_id: u64,
    pub operation: AuditOp,
    pub actor_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
}

impl AuditEvent {
    pub fn new(
        table: &str,
        record_id: u64,
        operation: AuditOp,
        session: &Session,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            table: table.to_string(),
            record_id,
            operation,
            actor_id: session.actor_id.clone(),
            timestamp: Utc::now(),
            summary: summary.into(),
        }
    }
}

/// A stored event with its sequence number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: u64,
    #[serde(flatten)]
    pub event: AuditEvent,
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent) -> Result<()>;
}

impl AuditSink for Store {
    fn record(&self, event: &AuditEvent) -> Result<()> {
        self.write(|wt| {
            let id = store::next_id(wt, "audit")?;
            let record = AuditRecord {
                id,
                event: event.clone(),
            };
            let mut table = wt.open_table(AUDIT).map_err(db_err)?;
            table
                .insert(id, store::encode(&record)?.as_slice())
                .map_err(db_err)?;
            Ok(())
        })
    }
}

/// Writes events to the `prazos::audit` tracing target.
pub struct TracingAudit;

impl AuditSink for TracingAudit {
    fn record(&self, event: &AuditEvent) -> Result<()> {
        tracing::info!(
            target: "prazos::audit",
            table = %event.table,
            record_id = event.record_id,
            operation = %event.operation,
            actor = %event.actor_id,
            "{}",
            event.summary
        );
        Ok(())
    }
}

/// Deliver `event` to `sink`. The mutation it describes is already
/// committed, so a sink failure is logged rather than returned.
pub(crate) fn emit(sink: &dyn AuditSink, event: AuditEvent) {
    if let Err(e) = sink.record(&event) {
        tracing::warn!(
            error = %e,
            table = %event.table,
            record_id = event.record_id,
            "audit sink rejected event"
        );
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Stored audit records, newest first. `limit` of `None` returns everything.
pub fn list(store: &Store, limit: Option<usize>) -> Result<Vec<AuditRecord>> {
    let mut records: Vec<AuditRecord> = store.read(|rt| {
        let table = rt.open_table(AUDIT).map_err(db_err)?;
        store::scan_all(&table)
    })?;
    records.reverse();
    if let Some(n) = limit {
        records.truncate(n);
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
