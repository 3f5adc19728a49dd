use super::Ctx;
use crate::output::{self, fmt_date, print_table};

pub fn summary(ctx: &Ctx) -> anyhow::Result<()> {
    let engine = ctx.engine()?;
    let result = engine.dashboard().summary(ctx.today);
    output::report(ctx.json, result, |s| {
        println!("Open cases as of {}: {}", ctx.today, s.total);
        let rows = vec![
            vec!["overdue".to_string(), s.overdue.to_string()],
            vec!["due today".to_string(), s.due_today.to_string()],
            vec!["urgent".to_string(), s.urgent.to_string()],
            vec!["attention".to_string(), s.attention.to_string()],
            vec!["on track".to_string(), s.on_track.to_string()],
            vec!["no receipt date".to_string(), s.no_receipt_date.to_string()],
        ];
        print_table(&["STATUS", "CASES"], rows);
    })
}

pub fn report(ctx: &Ctx) -> anyhow::Result<()> {
    let engine = ctx.engine()?;
    let result = engine.dashboard().report(ctx.today);
    output::report(ctx.json, result, |rows| {
        if rows.is_empty() {
            println!("No open cases.");
            return;
        }
        let rows = rows
            .iter()
            .map(|r| {
                vec![
                    r.case_id.to_string(),
                    r.number.clone(),
                    r.type_detail.clone(),
                    fmt_date(r.due_date),
                    r.bucket.to_string(),
                ]
            })
            .collect();
        print_table(&["ID", "NUMBER", "TYPE", "DUE", "STATUS"], rows);
    })
}
