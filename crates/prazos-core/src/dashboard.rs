//! Deadline projections over all open cases.
//!
//! Everything here is recomputed from a full scan on every call. Fine for a
//! few thousand cases; past that, counts should be cached and invalidated by
//! ledger mutations.

use crate::case::Case;
use crate::classifier::{effective_due_date, status_with, Bucket};
use crate::engine::Engine;
use crate::error::{db_err, Result};
use crate::ledger::DeadlinePeriod;
use crate::store::{self, PERIODS};
use chrono::NaiveDate;
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub overdue: usize,
    pub due_today: usize,
    pub urgent: usize,
    pub attention: usize,
    pub on_track: usize,
    pub no_receipt_date: usize,
    /// All open cases, including those without a receipt date.
    pub total: usize,
}

impl DashboardSummary {
    fn count(&mut self, bucket: Bucket) {
        match bucket {
            Bucket::Overdue(_) => self.overdue += 1,
            Bucket::DueToday => self.due_today += 1,
            Bucket::Urgent(_) => self.urgent += 1,
            Bucket::Attention(_) => self.attention += 1,
            Bucket::OnTrack(_) => self.on_track += 1,
            Bucket::NoReceiptDate => self.no_receipt_date += 1,
            Bucket::Concluded => return,
        }
        self.total += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseStatus {
    pub case_id: u64,
    pub number: String,
    pub type_detail: String,
    pub due_date: Option<NaiveDate>,
    pub bucket: Bucket,
}

impl CaseStatus {
    fn new(case: &Case, due_date: Option<NaiveDate>, bucket: Bucket) -> Self {
        Self {
            case_id: case.id,
            number: case.number.clone(),
            type_detail: case.type_detail.clone(),
            due_date,
            bucket,
        }
    }
}

pub struct Dashboard<'a> {
    pub(crate) engine: &'a Engine,
}

impl Dashboard<'_> {
    /// Bucket counts for every open case as of `today`.
    pub fn summary(&self, today: NaiveDate) -> Result<DashboardSummary> {
        let mut summary = DashboardSummary::default();
        for row in self.classify_open(today)? {
            summary.count(row.bucket);
        }
        tracing::debug!(total = summary.total, overdue = summary.overdue, "computed dashboard");
        Ok(summary)
    }

    /// One row per open case, most pressing first.
    pub fn report(&self, today: NaiveDate) -> Result<Vec<CaseStatus>> {
        let mut rows = self.classify_open(today)?;
        rows.sort_by_key(|r| (r.bucket.pressure(), r.case_id));
        Ok(rows)
    }

    /// Status of a single case, concluded or not.
    pub fn case_status(&self, case_id: u64, today: NaiveDate) -> Result<CaseStatus> {
        let case = self.engine.cases().get(case_id)?;
        let active = self.engine.ledger().active_period(case_id)?;
        let due = effective_due_date(&case, active.as_ref());
        let bucket = status_with(self.engine.thresholds(), due, case.completed, today);
        Ok(CaseStatus::new(&case, due, bucket))
    }

    fn classify_open(&self, today: NaiveDate) -> Result<Vec<CaseStatus>> {
        let cases = self.engine.cases().list_open()?;
        let active = self.active_periods()?;
        Ok(cases
            .iter()
            .map(|case| {
                let due = effective_due_date(case, active.get(&case.id));
                let bucket = status_with(self.engine.thresholds(), due, case.completed, today);
                CaseStatus::new(case, due, bucket)
            })
            .collect())
    }

    fn active_periods(&self) -> Result<HashMap<u64, DeadlinePeriod>> {
        self.engine.store().read(|rt| {
            let table = rt.open_table(PERIODS).map_err(db_err)?;
            let mut active = HashMap::new();
            for entry in table.iter().map_err(db_err)? {
                let (_, v) = entry.map_err(db_err)?;
                let period: DeadlinePeriod = store::decode(v.value())?;
                if period.active {
                    active.insert(period.case_id, period);
                }
            }
            Ok(active)
        })
    }
}
