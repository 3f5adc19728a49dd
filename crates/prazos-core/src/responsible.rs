//! Responsible officer (encarregado) assignments per case.
//!
//! Every substitution is a new row; the replaced assignment is deactivated in
//! the same transaction so exactly one stays active.

use crate::audit::{AuditEvent, AuditOp};
use crate::case::ensure_open_in;
use crate::engine::Engine;
use crate::error::{db_err, PrazoError, Result};
use crate::session::Session;
use crate::store::{self, RESPONSIBLES};
use chrono::{DateTime, Utc};
use redb::WriteTransaction;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsibleAssignment {
    pub id: u64,
    pub case_id: u64,
    pub officer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub assigned_by: String,
    pub assigned_at: DateTime<Utc>,
    pub active: bool,
}

fn put(wt: &WriteTransaction, a: &ResponsibleAssignment) -> Result<()> {
    let mut table = wt.open_table(RESPONSIBLES).map_err(db_err)?;
    table
        .insert((a.case_id, a.id), store::encode(a)?.as_slice())
        .map_err(db_err)?;
    Ok(())
}

pub struct Responsibles<'a> {
    pub(crate) engine: &'a Engine,
}

impl Responsibles<'_> {
    /// Make `officer` the responsible party, replacing the current one.
    pub fn assign(
        &self,
        session: &Session,
        case_id: u64,
        officer: &str,
        role: Option<&str>,
        reason: Option<&str>,
    ) -> Result<ResponsibleAssignment> {
        let officer = officer.trim();
        if officer.is_empty() {
            return Err(PrazoError::validation("officer name must not be empty"));
        }
        let case = self.engine.cases().get(case_id)?;
        if case.completed {
            return Err(PrazoError::CaseConcluded(case_id));
        }

        let (replaced, assignment) = self.engine.store().write(|wt| {
            ensure_open_in(wt, case_id)?;
            let current = {
                let table = wt.open_table(RESPONSIBLES).map_err(db_err)?;
                store::scan_case::<ResponsibleAssignment, _>(&table, case_id)?
                    .into_iter()
                    .find(|a| a.active)
            };
            let replaced = match current {
                Some(mut old) => {
                    old.active = false;
                    put(wt, &old)?;
                    Some(old.id)
                }
                None => None,
            };
            let assignment = ResponsibleAssignment {
                id: store::next_id(wt, "responsibles")?,
                case_id,
                officer: officer.to_string(),
                role: role.map(str::to_string),
                reason: reason.map(str::to_string),
                assigned_by: session.display_name(),
                assigned_at: Utc::now(),
                active: true,
            };
            put(wt, &assignment)?;
            Ok((replaced, assignment))
        })?;

        tracing::info!(case_id, officer = %assignment.officer, "assigned responsible officer");
        if let Some(old_id) = replaced {
            self.engine.emit(AuditEvent::new(
                "responsibles",
                old_id,
                AuditOp::Update,
                session,
                format!("replaced by assignment {}", assignment.id),
            ));
        }
        self.engine.emit(AuditEvent::new(
            "responsibles",
            assignment.id,
            AuditOp::Create,
            session,
            format!("case {case_id}: {}", assignment.officer),
        ));
        Ok(assignment)
    }

    pub fn current(&self, case_id: u64) -> Result<Option<ResponsibleAssignment>> {
        Ok(self.history(case_id)?.into_iter().find(|a| a.active))
    }

    /// Every assignment of the case, oldest first.
    pub fn history(&self, case_id: u64) -> Result<Vec<ResponsibleAssignment>> {
        self.engine.cases().get(case_id)?;
        self.engine.store().read(|rt| {
            let table = rt.open_table(RESPONSIBLES).map_err(db_err)?;
            store::scan_case(&table, case_id)
        })
    }
}
