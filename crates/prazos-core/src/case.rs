//! Case records and the store-backed process repository.

use crate::audit::{AuditEvent, AuditOp};
use crate::engine::Engine;
use crate::error::{db_err, PrazoError, Result};
use crate::session::Session;
use crate::store::{self, Store, CASES};
use chrono::{DateTime, NaiveDate, Utc};
use redb::{ReadableTable, WriteTransaction};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// CaseCategory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseCategory {
    Case,
    Procedure,
}

impl CaseCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            CaseCategory::Case => "case",
            CaseCategory::Procedure => "procedure",
        }
    }
}

impl fmt::Display for CaseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CaseCategory {
    type Err = PrazoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "case" => Ok(CaseCategory::Case),
            "procedure" => Ok(CaseCategory::Procedure),
            _ => Err(PrazoError::validation(format!(
                "unknown category '{s}': must be case or procedure"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Case
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: u64,
    pub number: String,
    pub category: CaseCategory,
    /// Procedure type code, e.g. `IPM`, `SR`, `PADS`.
    pub type_detail: String,
    pub originating_document: String,
    #[serde(default)]
    pub instauration_date: Option<NaiveDate>,
    #[serde(default)]
    pub receipt_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completion_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concluded_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for [`CaseRegistry::register`].
#[derive(Debug, Clone)]
pub struct NewCase {
    pub number: String,
    pub category: CaseCategory,
    pub type_detail: String,
    pub originating_document: String,
    pub instauration_date: Option<NaiveDate>,
    pub receipt_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// ProcessRepository
// ---------------------------------------------------------------------------

/// Where the deadline engine reads case metadata and records conclusion.
pub trait ProcessRepository: Send + Sync {
    fn get(&self, case_id: u64) -> Result<Case>;

    /// Cases not yet concluded, in id order.
    fn list_open(&self) -> Result<Vec<Case>>;

    fn mark_concluded(&self, case_id: u64, on: NaiveDate, by: &str) -> Result<Case>;
}

impl ProcessRepository for Store {
    fn get(&self, case_id: u64) -> Result<Case> {
        self.read(|rt| {
            let table = rt.open_table(CASES).map_err(db_err)?;
            let guard = table
                .get(case_id)
                .map_err(db_err)?
                .ok_or(PrazoError::CaseNotFound(case_id))?;
            store::decode(guard.value())
        })
    }

    fn list_open(&self) -> Result<Vec<Case>> {
        Ok(list_all(self)?.into_iter().filter(|c| !c.completed).collect())
    }

    fn mark_concluded(&self, case_id: u64, on: NaiveDate, by: &str) -> Result<Case> {
        self.write(|wt| {
            let mut table = wt.open_table(CASES).map_err(db_err)?;
            let mut case: Case = {
                let guard = table
                    .get(case_id)
                    .map_err(db_err)?
                    .ok_or(PrazoError::CaseNotFound(case_id))?;
                store::decode(guard.value())?
            };
            if case.completed {
                return Err(PrazoError::CaseConcluded(case_id));
            }
            case.completed = true;
            case.completion_date = Some(on);
            case.concluded_by = Some(by.to_string());
            table
                .insert(case_id, store::encode(&case)?.as_slice())
                .map_err(db_err)?;
            Ok(case)
        })
    }
}

/// Re-read the stored case row under the writer lock and fail if it has been
/// concluded since the caller last looked. Cases served only by an external
/// repository have no row here and pass.
pub(crate) fn ensure_open_in(wt: &WriteTransaction, case_id: u64) -> Result<()> {
    let table = wt.open_table(CASES).map_err(db_err)?;
    let row = table.get(case_id).map_err(db_err)?;
    if let Some(guard) = row {
        let case: Case = store::decode(guard.value())?;
        if case.completed {
            return Err(PrazoError::CaseConcluded(case_id));
        }
    }
    Ok(())
}

fn list_all(store: &Store) -> Result<Vec<Case>> {
    store.read(|rt| {
        let table = rt.open_table(CASES).map_err(db_err)?;
        store::scan_all(&table)
    })
}

// ---------------------------------------------------------------------------
// CaseRegistry
// ---------------------------------------------------------------------------

/// Case registration and lookup on the engine's own store.
pub struct CaseRegistry<'a> {
    pub(crate) engine: &'a Engine,
}

impl CaseRegistry<'_> {
    pub fn register(&self, session: &Session, new: NewCase) -> Result<Case> {
        let number = new.number.trim().to_string();
        let type_detail = new.type_detail.trim().to_ascii_uppercase();
        if number.is_empty() {
            return Err(PrazoError::validation("case number must not be empty"));
        }
        if type_detail.is_empty() {
            return Err(PrazoError::validation("type detail must not be empty"));
        }

        let case = self.engine.store().write(|wt| {
            let id = store::next_id(wt, "cases")?;
            let case = Case {
                id,
                number,
                category: new.category,
                type_detail,
                originating_document: new.originating_document.trim().to_string(),
                instauration_date: new.instauration_date,
                receipt_date: new.receipt_date,
                completed: false,
                completion_date: None,
                concluded_by: None,
                created_at: Utc::now(),
            };
            let mut table = wt.open_table(CASES).map_err(db_err)?;
            table
                .insert(id, store::encode(&case)?.as_slice())
                .map_err(db_err)?;
            Ok(case)
        })?;

        tracing::info!(case_id = case.id, number = %case.number, "registered case");
        self.engine.emit(AuditEvent::new(
            "cases",
            case.id,
            AuditOp::Create,
            session,
            format!("registered {} {}", case.type_detail, case.number),
        ));
        Ok(case)
    }

    pub fn get(&self, case_id: u64) -> Result<Case> {
        self.engine.store().get(case_id)
    }

    /// Every case, concluded or not, in id order.
    pub fn list(&self) -> Result<Vec<Case>> {
        list_all(self.engine.store())
    }

    pub fn list_open(&self) -> Result<Vec<Case>> {
        self.engine.store().list_open()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
