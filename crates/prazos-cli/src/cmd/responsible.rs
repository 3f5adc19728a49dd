use super::Ctx;
use crate::output::{print_table, report};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ResponsibleSubcommand {
    /// Assign (or substitute) the responsible officer of a case
    Assign {
        case_id: u64,
        officer: String,
        /// Officer's role, e.g. Encarregado, Presidente
        #[arg(long)]
        role: Option<String>,
        /// Reason for the substitution
        #[arg(long)]
        reason: Option<String>,
    },
    /// Show assignment history, oldest first
    Show { case_id: u64 },
}

pub fn run(ctx: &Ctx, subcmd: ResponsibleSubcommand) -> anyhow::Result<()> {
    let engine = ctx.engine()?;
    let responsibles = engine.responsibles();
    match subcmd {
        ResponsibleSubcommand::Assign {
            case_id,
            officer,
            role,
            reason,
        } => {
            let result = responsibles.assign(
                &ctx.session,
                case_id,
                &officer,
                role.as_deref(),
                reason.as_deref(),
            );
            report(ctx.json, result, |a| {
                println!("{} is now responsible for case {case_id}", a.officer)
            })
        }
        ResponsibleSubcommand::Show { case_id } => {
            report(ctx.json, responsibles.history(case_id), |history| {
                if history.is_empty() {
                    println!("No responsible officer assigned to case {case_id}.");
                    return;
                }
                let rows = history
                    .iter()
                    .map(|a| {
                        vec![
                            a.officer.clone(),
                            a.role.clone().unwrap_or_default(),
                            a.assigned_at.format("%Y-%m-%d").to_string(),
                            a.assigned_by.clone(),
                            a.reason.clone().unwrap_or_default(),
                            if a.active { "yes" } else { "" }.to_string(),
                        ]
                    })
                    .collect();
                print_table(
                    &["OFFICER", "ROLE", "SINCE", "ASSIGNED BY", "REASON", "CURRENT"],
                    rows,
                );
            })
        }
    }
}
