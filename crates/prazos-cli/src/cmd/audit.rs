use super::Ctx;
use crate::output::{print_table, report};
use clap::Subcommand;
use prazos_core::audit;

#[derive(Subcommand)]
pub enum AuditSubcommand {
    /// List recorded changes, newest first
    List {
        /// Show at most this many records
        #[arg(long)]
        limit: Option<usize>,
    },
}

pub fn run(ctx: &Ctx, subcmd: AuditSubcommand) -> anyhow::Result<()> {
    let engine = ctx.engine()?;
    match subcmd {
        AuditSubcommand::List { limit } => {
            let result = audit::list(engine.store(), limit);
            report(ctx.json, result, |records| {
                if records.is_empty() {
                    println!("No audit records.");
                    return;
                }
                let rows = records
                    .iter()
                    .map(|r| {
                        vec![
                            r.id.to_string(),
                            r.event.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                            r.event.operation.to_string(),
                            format!("{}:{}", r.event.table, r.event.record_id),
                            r.event.actor_id.clone(),
                            r.event.summary.clone(),
                        ]
                    })
                    .collect();
                print_table(&["ID", "WHEN", "OP", "RECORD", "ACTOR", "SUMMARY"], rows);
            })
        }
    }
}
