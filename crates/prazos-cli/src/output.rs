use chrono::NaiveDate;
use prazos_core::envelope::Outcome;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print `result` through the result envelope.
///
/// In JSON mode the envelope goes to stdout whether or not the operation
/// succeeded; otherwise `human` renders the value. Failures come back as an
/// error so the process exits non-zero.
pub fn report<T: Serialize>(
    json: bool,
    result: prazos_core::Result<T>,
    human: impl FnOnce(&T),
) -> anyhow::Result<()> {
    let outcome = Outcome::from(result);
    if json {
        print_json(&outcome)?;
    }
    match (outcome.data, outcome.error) {
        (_, Some(failure)) => Err(anyhow::anyhow!(failure.message)),
        (Some(value), None) => {
            if !json {
                human(&value);
            }
            Ok(())
        }
        (None, None) => Ok(()),
    }
}

pub fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    for line in render_table(headers, &rows) {
        println!("{line}");
    }
}

/// Header, dash rule, then one line per row. Columns are sized by character
/// count; the last one is left unpadded. Cells past the header count are
/// dropped.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .fold(h.chars().count(), usize::max)
        })
        .collect();
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(aligned(headers.iter().copied(), &widths));
    lines.push(aligned(rule.iter().map(String::as_str), &widths));
    for row in rows {
        lines.push(aligned(row.iter().map(String::as_str), &widths));
    }
    lines
}

fn aligned<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let last = widths.len().saturating_sub(1);
    cells
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, &width))| {
            if i == last {
                cell.to_string()
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}
