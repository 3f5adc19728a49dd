//! Deadline ledger: the chain of deadline periods of each case.
//!
//! A case starts with one initial period and gains an extension per granted
//! prorrogação. Each extension starts the day after the previous due date.
//! Superseded periods are deactivated, never deleted, so the full chain stays
//! available for audit. At most one period per case is active at any time.

use crate::audit::{AuditEvent, AuditOp};
use crate::case::{ensure_open_in, Case};
use crate::engine::Engine;
use crate::error::{db_err, PrazoError, Result};
use crate::rules::resolve_base_days;
use crate::session::Session;
use crate::store::{self, PERIODS};
use chrono::{DateTime, Days, NaiveDate, Utc};
use redb::WriteTransaction;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// PeriodKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    Initial,
    Extension,
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKind::Initial => f.write_str("initial"),
            PeriodKind::Extension => f.write_str("extension"),
        }
    }
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

/// Who granted a period, and under which order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<NaiveDate>,
    /// Left empty by callers to mean "the session user".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorized_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorizer_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
}

impl Authorization {
    fn stamped(mut self, session: &Session) -> Self {
        if self.authorized_by.is_none() {
            self.authorized_by = Some(session.name.clone());
            if self.authorizer_role.is_none() {
                self.authorizer_role = session.role.clone();
            }
        }
        self
    }
}

// ---------------------------------------------------------------------------
// DeadlinePeriod
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlinePeriod {
    pub id: u64,
    pub case_id: u64,
    pub kind: PeriodKind,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub days_added: u32,
    /// 1..N for extensions, absent on the initial period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<u32>,
    pub authorization: Authorization,
    pub active: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Result of [`Ledger::ensure_initialized`].
#[derive(Debug, Clone, Serialize)]
pub struct Ensured {
    pub period: DeadlinePeriod,
    /// False when an active period already existed.
    pub created: bool,
}

// ---------------------------------------------------------------------------
// Date arithmetic
// ---------------------------------------------------------------------------

fn add_days(date: NaiveDate, days: u32) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| PrazoError::validation(format!("{date} + {days} days is out of range")))
}

/// Start and due date of an extension chained onto `previous_due`.
pub fn extension_dates(previous_due: NaiveDate, days: u32) -> Result<(NaiveDate, NaiveDate)> {
    let start = add_days(previous_due, 1)?;
    let due = add_days(start, days.saturating_sub(1))?;
    Ok((start, due))
}

// ---------------------------------------------------------------------------
// Storage helpers
// ---------------------------------------------------------------------------

fn put(wt: &WriteTransaction, period: &DeadlinePeriod) -> Result<()> {
    let mut table = wt.open_table(PERIODS).map_err(db_err)?;
    table
        .insert(
            (period.case_id, period.id),
            store::encode(period)?.as_slice(),
        )
        .map_err(db_err)?;
    Ok(())
}

fn periods_in(wt: &WriteTransaction, case_id: u64) -> Result<Vec<DeadlinePeriod>> {
    let table = wt.open_table(PERIODS).map_err(db_err)?;
    store::scan_case(&table, case_id)
}

fn chain_order(periods: &mut [DeadlinePeriod]) {
    periods.sort_by_key(|p| (p.kind == PeriodKind::Extension, p.ordinal, p.id));
}

fn require_open(case: &Case) -> Result<()> {
    if case.completed {
        return Err(PrazoError::CaseConcluded(case.id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

pub struct Ledger<'a> {
    pub(crate) engine: &'a Engine,
}

impl Ledger<'_> {
    /// Open the initial deadline period of a case at `start_date`.
    pub fn initialize(
        &self,
        session: &Session,
        case_id: u64,
        start_date: Option<NaiveDate>,
        authorization: Authorization,
    ) -> Result<DeadlinePeriod> {
        let start =
            start_date.ok_or_else(|| PrazoError::validation("start date is required"))?;
        let case = self.engine.cases().get(case_id)?;
        require_open(&case)?;

        let days = resolve_base_days(&case.type_detail, &case.originating_document);
        let due = add_days(start, days)?;
        let authorization = authorization.stamped(session);

        let period = self.engine.store().write(|wt| {
            ensure_open_in(wt, case_id)?;
            if periods_in(wt, case_id)?.iter().any(|p| p.active) {
                return Err(PrazoError::ActivePeriodExists(case_id));
            }
            let period = DeadlinePeriod {
                id: store::next_id(wt, "periods")?,
                case_id,
                kind: PeriodKind::Initial,
                start_date: start,
                due_date: due,
                days_added: days,
                ordinal: None,
                authorization,
                active: true,
                created_by: session.actor_id.clone(),
                created_at: Utc::now(),
            };
            put(wt, &period)?;
            Ok(period)
        })?;

        tracing::info!(
            case_id,
            period_id = period.id,
            due = %period.due_date,
            days,
            "initialized deadline"
        );
        self.engine.emit(AuditEvent::new(
            "periods",
            period.id,
            AuditOp::Create,
            session,
            format!("initial deadline for case {case_id}: {start} to {due} ({days} days)"),
        ));
        Ok(period)
    }

    /// Return the active period, opening one from the receipt date if the
    /// case has none yet.
    pub fn ensure_initialized(&self, session: &Session, case_id: u64) -> Result<Ensured> {
        if let Some(period) = self.active_period(case_id)? {
            return Ok(Ensured {
                period,
                created: false,
            });
        }
        let case = self.engine.cases().get(case_id)?;
        let receipt = case.receipt_date.ok_or_else(|| {
            PrazoError::validation(format!(
                "case {case_id} has no receipt date to start the deadline from"
            ))
        })?;
        let authorization = Authorization {
            justification: Some("initial deadline counted from receipt date".to_string()),
            ..Authorization::default()
        };
        match self.initialize(session, case_id, Some(receipt), authorization) {
            Ok(period) => Ok(Ensured {
                period,
                created: true,
            }),
            // Someone else initialized it between our read and write.
            Err(PrazoError::ActivePeriodExists(_)) => {
                let period = self
                    .active_period(case_id)?
                    .ok_or(PrazoError::NoActivePeriod(case_id))?;
                Ok(Ensured {
                    period,
                    created: false,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Grant `additional_days` on top of the active period.
    ///
    /// The new period starts the day after the current due date. The current
    /// period is deactivated and the new one inserted in the same transaction.
    pub fn extend(
        &self,
        session: &Session,
        case_id: u64,
        additional_days: i64,
        authorization: Authorization,
    ) -> Result<DeadlinePeriod> {
        if additional_days <= 0 {
            return Err(PrazoError::validation(format!(
                "extension must add at least one day, got {additional_days}"
            )));
        }
        let days = u32::try_from(additional_days).map_err(|_| {
            PrazoError::validation(format!("extension of {additional_days} days is too large"))
        })?;
        let case = self.engine.cases().get(case_id)?;
        require_open(&case)?;
        let authorization = authorization.stamped(session);

        let (previous, period) = self.engine.store().write(|wt| {
            ensure_open_in(wt, case_id)?;
            let periods = periods_in(wt, case_id)?;
            let mut previous = periods
                .iter()
                .find(|p| p.active)
                .cloned()
                .ok_or(PrazoError::NoActivePeriod(case_id))?;
            let last_ordinal = periods.iter().filter_map(|p| p.ordinal).max().unwrap_or(0);
            let (start, due) = extension_dates(previous.due_date, days)?;

            previous.active = false;
            put(wt, &previous)?;

            let period = DeadlinePeriod {
                id: store::next_id(wt, "periods")?,
                case_id,
                kind: PeriodKind::Extension,
                start_date: start,
                due_date: due,
                days_added: days,
                ordinal: Some(last_ordinal + 1),
                authorization,
                active: true,
                created_by: session.actor_id.clone(),
                created_at: Utc::now(),
            };
            put(wt, &period)?;
            Ok((previous, period))
        })?;

        tracing::info!(
            case_id,
            period_id = period.id,
            ordinal = period.ordinal,
            due = %period.due_date,
            "extended deadline"
        );
        self.engine.emit(AuditEvent::new(
            "periods",
            previous.id,
            AuditOp::Update,
            session,
            format!("deactivated, superseded by period {}", period.id),
        ));
        self.engine.emit(AuditEvent::new(
            "periods",
            period.id,
            AuditOp::Create,
            session,
            format!(
                "extension #{} for case {case_id}: {} to {} (+{days} days)",
                period.ordinal.unwrap_or_default(),
                period.start_date,
                period.due_date
            ),
        ));
        Ok(period)
    }

    /// Mark the case concluded. From here on its status is always concluded;
    /// the period chain is left as it is.
    pub fn conclude(&self, session: &Session, case_id: u64, on: NaiveDate) -> Result<Case> {
        let case = self.engine.cases().get(case_id)?;
        require_open(&case)?;
        let case = self
            .engine
            .cases()
            .mark_concluded(case_id, on, &session.display_name())?;

        tracing::info!(case_id, on = %on, "concluded case");
        self.engine.emit(AuditEvent::new(
            "cases",
            case_id,
            AuditOp::Update,
            session,
            format!("concluded on {on}"),
        ));
        Ok(case)
    }

    /// The full chain: initial period first, then extensions by ordinal.
    pub fn list_periods(&self, case_id: u64) -> Result<Vec<DeadlinePeriod>> {
        self.engine.cases().get(case_id)?;
        let mut periods: Vec<DeadlinePeriod> = self.engine.store().read(|rt| {
            let table = rt.open_table(PERIODS).map_err(db_err)?;
            store::scan_case(&table, case_id)
        })?;
        chain_order(&mut periods);
        Ok(periods)
    }

    pub fn active_period(&self, case_id: u64) -> Result<Option<DeadlinePeriod>> {
        Ok(self
            .list_periods(case_id)?
            .into_iter()
            .find(|p| p.active))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
