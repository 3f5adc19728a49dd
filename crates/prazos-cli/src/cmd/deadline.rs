use super::Ctx;
use crate::output::{fmt_date, print_table, report};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use prazos_core::ledger::{Authorization, DeadlinePeriod};

/// Order metadata attached to a deadline period.
#[derive(Args)]
pub struct AuthArgs {
    /// Order (portaria) number granting the period
    #[arg(long)]
    order: Option<String>,
    /// Order date (YYYY-MM-DD)
    #[arg(long)]
    order_date: Option<NaiveDate>,
    /// Who authorized it (default: the acting user)
    #[arg(long)]
    authorized_by: Option<String>,
    /// Role of the authorizer
    #[arg(long)]
    authorizer_role: Option<String>,
    /// Justification text
    #[arg(long)]
    justification: Option<String>,
}

impl From<AuthArgs> for Authorization {
    fn from(a: AuthArgs) -> Self {
        Authorization {
            order_number: a.order,
            order_date: a.order_date,
            authorized_by: a.authorized_by,
            authorizer_role: a.authorizer_role,
            justification: a.justification,
        }
    }
}

#[derive(Subcommand)]
pub enum DeadlineSubcommand {
    /// Open the initial deadline period at a given start date
    Init {
        case_id: u64,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        #[command(flatten)]
        auth: AuthArgs,
    },
    /// Open the initial period from the receipt date if the case has none
    Ensure { case_id: u64 },
    /// Extend the active deadline by a number of days
    Extend {
        case_id: u64,
        /// Days to add
        #[arg(long, allow_negative_numbers = true)]
        days: i64,
        /// Open the initial period from the receipt date first if missing
        #[arg(long)]
        bootstrap: bool,
        #[command(flatten)]
        auth: AuthArgs,
    },
    /// Show the chain of deadline periods
    Periods { case_id: u64 },
    /// Show the deadline status of a case
    Status { case_id: u64 },
}

pub fn run(ctx: &Ctx, subcmd: DeadlineSubcommand) -> anyhow::Result<()> {
    let engine = ctx.engine()?;
    let ledger = engine.ledger();
    match subcmd {
        DeadlineSubcommand::Init {
            case_id,
            start,
            auth,
        } => {
            let result = ledger.initialize(&ctx.session, case_id, start, auth.into());
            report(ctx.json, result, |p| {
                println!(
                    "Initial deadline for case {case_id}: {} to {} ({} days)",
                    p.start_date, p.due_date, p.days_added
                );
            })
        }
        DeadlineSubcommand::Ensure { case_id } => {
            let result = ledger.ensure_initialized(&ctx.session, case_id);
            report(ctx.json, result, |e| {
                let verb = if e.created { "Opened" } else { "Already active:" };
                println!(
                    "{verb} {} period for case {case_id}, due {}",
                    e.period.kind, e.period.due_date
                );
            })
        }
        DeadlineSubcommand::Extend {
            case_id,
            days,
            bootstrap,
            auth,
        } => {
            if bootstrap {
                match ledger.ensure_initialized(&ctx.session, case_id) {
                    Ok(e) if e.created && !ctx.json => println!(
                        "Opened initial period for case {case_id}, due {}",
                        e.period.due_date
                    ),
                    Ok(_) => {}
                    Err(e) => return report::<DeadlinePeriod>(ctx.json, Err(e), |_| {}),
                }
            }
            let result = ledger.extend(&ctx.session, case_id, days, auth.into());
            report(ctx.json, result, |p| {
                println!(
                    "Extension #{} for case {case_id}: {} to {} (+{} days)",
                    p.ordinal.unwrap_or(0),
                    p.start_date,
                    p.due_date,
                    p.days_added
                );
            })
        }
        DeadlineSubcommand::Periods { case_id } => {
            let result = ledger.list_periods(case_id);
            report(ctx.json, result, |periods| print_periods(periods))
        }
        DeadlineSubcommand::Status { case_id } => {
            let result = engine.dashboard().case_status(case_id, ctx.today);
            report(ctx.json, result, |s| {
                println!(
                    "Case {} ({}): due {}, {}",
                    s.case_id,
                    s.number,
                    fmt_date(s.due_date),
                    s.bucket
                );
            })
        }
    }
}

fn print_periods(periods: &[DeadlinePeriod]) {
    if periods.is_empty() {
        println!("No deadline periods.");
        return;
    }
    let rows = periods
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.kind.to_string(),
                p.ordinal.map(|o| o.to_string()).unwrap_or_default(),
                p.start_date.to_string(),
                p.due_date.to_string(),
                p.days_added.to_string(),
                p.authorization.order_number.clone().unwrap_or_default(),
                p.authorization.authorized_by.clone().unwrap_or_default(),
                if p.active { "yes" } else { "" }.to_string(),
            ]
        })
        .collect();
    print_table(
        &[
            "ID", "KIND", "#", "START", "DUE", "DAYS", "ORDER", "AUTHORIZED BY", "ACTIVE",
        ],
        rows,
    );
}
