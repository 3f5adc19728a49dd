use crate::case::Case;
use crate::ledger::DeadlinePeriod;
use crate::rules::resolve_base_days;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Upper bounds (inclusive, in days remaining) of the urgent and attention
/// buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_urgent_days")]
    pub urgent_days: i64,
    #[serde(default = "default_attention_days")]
    pub attention_days: i64,
}

fn default_urgent_days() -> i64 {
    5
}

fn default_attention_days() -> i64 {
    10
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            urgent_days: default_urgent_days(),
            attention_days: default_attention_days(),
        }
    }
}

// ---------------------------------------------------------------------------
// Bucket
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "days", rename_all = "snake_case")]
pub enum Bucket {
    Concluded,
    NoReceiptDate,
    /// Days past the due date.
    Overdue(i64),
    DueToday,
    /// Days remaining.
    Urgent(i64),
    Attention(i64),
    OnTrack(i64),
}

impl Bucket {
    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Concluded => "concluded",
            Bucket::NoReceiptDate => "no_receipt_date",
            Bucket::Overdue(_) => "overdue",
            Bucket::DueToday => "due_today",
            Bucket::Urgent(_) => "urgent",
            Bucket::Attention(_) => "attention",
            Bucket::OnTrack(_) => "on_track",
        }
    }

    /// Sort key for "most pressing first" listings.
    pub(crate) fn pressure(self) -> (u8, i64) {
        match self {
            Bucket::Overdue(n) => (0, -n),
            Bucket::DueToday => (1, 0),
            Bucket::Urgent(n) | Bucket::Attention(n) | Bucket::OnTrack(n) => (2, n),
            Bucket::NoReceiptDate => (3, 0),
            Bucket::Concluded => (4, 0),
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Overdue(n) => write!(f, "overdue ({n}d late)"),
            Bucket::Urgent(n) | Bucket::Attention(n) | Bucket::OnTrack(n) => {
                write!(f, "{} ({n}d left)", self.as_str())
            }
            other => f.write_str(other.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classify a deadline with the default thresholds (5 and 10 days).
pub fn status(due_date: Option<NaiveDate>, completed: bool, today: NaiveDate) -> Bucket {
    status_with(&Thresholds::default(), due_date, completed, today)
}

pub fn status_with(
    thresholds: &Thresholds,
    due_date: Option<NaiveDate>,
    completed: bool,
    today: NaiveDate,
) -> Bucket {
    if completed {
        return Bucket::Concluded;
    }
    let Some(due) = due_date else {
        return Bucket::NoReceiptDate;
    };
    let remaining = due.signed_duration_since(today).num_days();
    match remaining {
        n if n < 0 => Bucket::Overdue(-n),
        0 => Bucket::DueToday,
        n if n <= thresholds.urgent_days => Bucket::Urgent(n),
        n if n <= thresholds.attention_days => Bucket::Attention(n),
        n => Bucket::OnTrack(n),
    }
}

/// The date a case is measured against: the active period's due date, or a
/// projected initial deadline from the receipt date when no period exists.
pub fn effective_due_date(case: &Case, active: Option<&DeadlinePeriod>) -> Option<NaiveDate> {
    if let Some(period) = active {
        return Some(period.due_date);
    }
    let receipt = case.receipt_date?;
    let days = resolve_base_days(&case.type_detail, &case.originating_document);
    receipt.checked_add_days(Days::new(u64::from(days)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
