use super::Ctx;
use crate::output::{print_table, report};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum TimelineSubcommand {
    /// Add a progress note to a case
    Add { case_id: u64, text: String },
    /// List a case's notes, most recent first
    List { case_id: u64 },
    /// Delete a note
    Remove { case_id: u64, entry_id: u64 },
}

pub fn run(ctx: &Ctx, subcmd: TimelineSubcommand) -> anyhow::Result<()> {
    let engine = ctx.engine()?;
    let timeline = engine.timeline();
    match subcmd {
        TimelineSubcommand::Add { case_id, text } => {
            let result = timeline.append(&ctx.session, case_id, &text);
            report(ctx.json, result, |id| println!("Added entry [{id}] to case {case_id}"))
        }
        TimelineSubcommand::List { case_id } => {
            report(ctx.json, timeline.list(case_id), |entries| {
                if entries.is_empty() {
                    println!("No timeline entries for case {case_id}.");
                    return;
                }
                let rows = entries
                    .iter()
                    .map(|e| {
                        vec![
                            e.id.to_string(),
                            e.created_at.format("%Y-%m-%d %H:%M").to_string(),
                            e.author.clone(),
                            e.text.clone(),
                        ]
                    })
                    .collect();
                print_table(&["ID", "WHEN", "AUTHOR", "TEXT"], rows);
            })
        }
        TimelineSubcommand::Remove { case_id, entry_id } => {
            let result = timeline
                .remove(&ctx.session, case_id, entry_id)
                .map(|()| serde_json::json!({ "case_id": case_id, "entry_id": entry_id }));
            report(ctx.json, result, |_| {
                println!("Removed entry [{entry_id}] from case {case_id}.")
            })
        }
    }
}
