use super::Ctx;
use crate::output::{fmt_date, print_table, report};
use chrono::NaiveDate;
use clap::Subcommand;
use prazos_core::case::{Case, CaseCategory, NewCase};
use prazos_core::dashboard::CaseStatus;
use prazos_core::ledger::DeadlinePeriod;
use prazos_core::responsible::ResponsibleAssignment;
use serde::Serialize;

#[derive(Subcommand)]
pub enum CaseSubcommand {
    /// Register a new case or procedure
    Register {
        /// Case number, e.g. IPM-014/2025
        number: String,
        /// Procedure type code (SR, IPM, PAD, PADS, ...)
        #[arg(long = "type")]
        type_detail: String,
        /// Originating document (e.g. Portaria, Feito Preliminar)
        #[arg(long, default_value = "Portaria")]
        document: String,
        /// case or procedure
        #[arg(long, default_value = "procedure")]
        category: CaseCategory,
        /// Instauration date (YYYY-MM-DD)
        #[arg(long)]
        instaurated: Option<NaiveDate>,
        /// Receipt date (YYYY-MM-DD); deadlines count from here
        #[arg(long)]
        received: Option<NaiveDate>,
    },
    /// List cases (open only unless --all)
    List {
        #[arg(long)]
        all: bool,
    },
    /// Show a case with its deadline status, active period and responsible officer
    Show { case_id: u64 },
    /// Mark a case concluded
    Conclude {
        case_id: u64,
        /// Completion date (default: --today)
        #[arg(long)]
        on: Option<NaiveDate>,
    },
}

pub fn run(ctx: &Ctx, subcmd: CaseSubcommand) -> anyhow::Result<()> {
    let engine = ctx.engine()?;
    match subcmd {
        CaseSubcommand::Register {
            number,
            type_detail,
            document,
            category,
            instaurated,
            received,
        } => {
            let new = NewCase {
                number,
                category,
                type_detail,
                originating_document: document,
                instauration_date: instaurated,
                receipt_date: received,
            };
            let result = engine.registry().register(&ctx.session, new);
            report(ctx.json, result, |case| {
                println!("Registered case [{}] {} ({})", case.id, case.number, case.type_detail);
            })
        }
        CaseSubcommand::List { all } => {
            let result = if all {
                engine.registry().list()
            } else {
                engine.registry().list_open()
            };
            report(ctx.json, result, |cases| print_cases(cases))
        }
        CaseSubcommand::Show { case_id } => {
            let result = detail(&engine, case_id, ctx.today);
            report(ctx.json, result, print_detail)
        }
        CaseSubcommand::Conclude { case_id, on } => {
            let on = on.unwrap_or(ctx.today);
            let result = engine.ledger().conclude(&ctx.session, case_id, on);
            report(ctx.json, result, |case| {
                println!("Concluded case [{}] {} on {on}.", case.id, case.number);
            })
        }
    }
}

fn print_cases(cases: &[Case]) {
    if cases.is_empty() {
        println!("No cases.");
        return;
    }
    let rows = cases
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.number.clone(),
                c.type_detail.clone(),
                c.originating_document.clone(),
                fmt_date(c.receipt_date),
                if c.completed {
                    format!("concluded {}", fmt_date(c.completion_date))
                } else {
                    "open".to_string()
                },
            ]
        })
        .collect();
    print_table(
        &["ID", "NUMBER", "TYPE", "DOCUMENT", "RECEIVED", "STATE"],
        rows,
    );
}

#[derive(Serialize)]
struct CaseDetail {
    case: Case,
    status: CaseStatus,
    active_period: Option<DeadlinePeriod>,
    responsible: Option<ResponsibleAssignment>,
}

fn detail(
    engine: &prazos_core::Engine,
    case_id: u64,
    today: NaiveDate,
) -> prazos_core::Result<CaseDetail> {
    Ok(CaseDetail {
        case: engine.registry().get(case_id)?,
        status: engine.dashboard().case_status(case_id, today)?,
        active_period: engine.ledger().active_period(case_id)?,
        responsible: engine.responsibles().current(case_id)?,
    })
}

fn print_detail(d: &CaseDetail) {
    let c = &d.case;
    println!("Case [{}] {}", c.id, c.number);
    println!("  category:    {}", c.category);
    println!("  type:        {}", c.type_detail);
    println!("  document:    {}", c.originating_document);
    println!("  instaurated: {}", fmt_date(c.instauration_date));
    println!("  received:    {}", fmt_date(c.receipt_date));
    println!("  due:         {}", fmt_date(d.status.due_date));
    println!("  status:      {}", d.status.bucket);
    if let Some(p) = &d.active_period {
        println!(
            "  period:      {} #{} {} to {}",
            p.kind,
            p.ordinal.unwrap_or(0),
            p.start_date,
            p.due_date
        );
    }
    if let Some(r) = &d.responsible {
        println!("  responsible: {}", r.officer);
    }
    if c.completed {
        println!(
            "  concluded:   {} by {}",
            fmt_date(c.completion_date),
            c.concluded_by.as_deref().unwrap_or("-")
        );
    }
}
