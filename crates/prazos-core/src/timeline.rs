use crate::audit::{AuditEvent, AuditOp};
use crate::engine::Engine;
use crate::error::{db_err, PrazoError, Result};
use crate::session::Session;
use crate::store::{self, TIMELINE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TimelineEntry
// ---------------------------------------------------------------------------

/// A progress note (andamento) on a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub id: u64,
    pub case_id: u64,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// Most recent first. Ties on timestamp fall back to id so the order is total.
pub fn display_order(entries: &mut [TimelineEntry]) {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

pub struct Timeline<'a> {
    pub(crate) engine: &'a Engine,
}

impl Timeline<'_> {
    /// Add an entry to the case's timeline and return its id.
    pub fn append(&self, session: &Session, case_id: u64, text: &str) -> Result<u64> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PrazoError::validation("timeline entry text must not be empty"));
        }
        self.engine.cases().get(case_id)?;

        let entry = self.engine.store().write(|wt| {
            let entry = TimelineEntry {
                id: store::next_id(wt, "timeline")?,
                case_id,
                text: text.to_string(),
                author: session.display_name(),
                created_at: Utc::now(),
            };
            let mut table = wt.open_table(TIMELINE).map_err(db_err)?;
            table
                .insert((case_id, entry.id), store::encode(&entry)?.as_slice())
                .map_err(db_err)?;
            Ok(entry)
        })?;

        tracing::info!(case_id, entry_id = entry.id, "appended timeline entry");
        self.engine.emit(AuditEvent::new(
            "timeline",
            entry.id,
            AuditOp::Create,
            session,
            format!("case {case_id}"),
        ));
        Ok(entry.id)
    }

    /// Delete one entry. Fails if `entry_id` is not on `case_id`.
    pub fn remove(&self, session: &Session, case_id: u64, entry_id: u64) -> Result<()> {
        self.engine.store().write(|wt| {
            let mut table = wt.open_table(TIMELINE).map_err(db_err)?;
            let removed = table.remove((case_id, entry_id)).map_err(db_err)?;
            if removed.is_none() {
                return Err(PrazoError::TimelineEntryNotFound { case_id, entry_id });
            }
            Ok(())
        })?;

        tracing::info!(case_id, entry_id, "removed timeline entry");
        self.engine.emit(AuditEvent::new(
            "timeline",
            entry_id,
            AuditOp::Delete,
            session,
            format!("case {case_id}"),
        ));
        Ok(())
    }

    /// All entries of a case, most recent first.
    pub fn list(&self, case_id: u64) -> Result<Vec<TimelineEntry>> {
        self.engine.cases().get(case_id)?;
        let mut entries: Vec<TimelineEntry> = self.engine.store().read(|rt| {
            let table = rt.open_table(TIMELINE).map_err(db_err)?;
            store::scan_case(&table, case_id)
        })?;
        display_order(&mut entries);
        Ok(entries)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
