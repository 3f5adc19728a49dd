//! Base deadline durations by procedure type.
//!
//! A preliminary report ("Feito Preliminar") always gets 15 days. Otherwise
//! the procedure's type code decides, falling back to [`DEFAULT_DAYS`].

/// Originating document that forces the short preliminary deadline.
pub const PRELIMINARY_DOCUMENT: &str = "Feito Preliminar";

pub const PRELIMINARY_DAYS: u32 = 15;

/// Used when the type code is not in [`BASE_DAYS`].
pub const DEFAULT_DAYS: u32 = 30;

/// Calendar days granted per type code.
pub const BASE_DAYS: &[(&str, u32)] = &[
    ("SV", 15),
    ("SR", 30),
    ("IPM", 40),
    ("FP", 30),
    ("CP", 30),
    ("PAD", 30),
    ("PADE", 30),
    ("CD", 30),
    ("CJ", 30),
    ("PADS", 30),
];

/// Resolve the base deadline, in calendar days, for a case.
pub fn resolve_base_days(type_detail: &str, originating_document: &str) -> u32 {
    if originating_document.trim() == PRELIMINARY_DOCUMENT {
        return PRELIMINARY_DAYS;
    }
    let code = type_detail.trim().to_ascii_uppercase();
    BASE_DAYS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|&(_, days)| days)
        .unwrap_or(DEFAULT_DAYS)
}
