mod cmd;
mod output;
mod root;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use cmd::{
    audit::AuditSubcommand, case::CaseSubcommand, config::ConfigSubcommand,
    deadline::DeadlineSubcommand, responsible::ResponsibleSubcommand,
    timeline::TimelineSubcommand, Ctx,
};
use prazos_core::session::Session;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "prazos",
    about = "Deadlines, extensions and timelines for disciplinary procedures",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .prazos/)
    #[arg(long, global = true, env = "PRAZOS_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON result envelopes
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Identity recorded on every change
    #[arg(long = "as", global = true, env = "PRAZOS_USER", default_value = "operator")]
    user: String,

    /// Role of the acting user (e.g. Corregedor)
    #[arg(long, global = true, env = "PRAZOS_ROLE")]
    role: Option<String>,

    /// Evaluate deadlines as of this date (YYYY-MM-DD, default: today)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .prazos/ with a default config and an empty database
    Init,

    /// Register, list, show and conclude cases
    Case {
        #[command(subcommand)]
        subcommand: CaseSubcommand,
    },

    /// Initial deadlines, extensions and status
    Deadline {
        #[command(subcommand)]
        subcommand: DeadlineSubcommand,
    },

    /// Progress notes on a case
    Timeline {
        #[command(subcommand)]
        subcommand: TimelineSubcommand,
    },

    /// Responsible officer assignments
    Responsible {
        #[command(subcommand)]
        subcommand: ResponsibleSubcommand,
    },

    /// Count open cases by deadline status
    Dashboard,

    /// List open cases, most pressing deadline first
    Report,

    /// Show recorded changes
    Audit {
        #[command(subcommand)]
        subcommand: AuditSubcommand,
    },

    /// Show or validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut session = Session::new(cli.user.clone(), cli.user);
    if let Some(role) = cli.role {
        session = session.with_role(role);
    }
    let ctx = Ctx {
        root: root::resolve_root(cli.root.as_deref()),
        json: cli.json,
        session,
        today: cli
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive()),
    };

    let result = match cli.command {
        Commands::Init => cmd::init::run(&ctx),
        Commands::Case { subcommand } => cmd::case::run(&ctx, subcommand),
        Commands::Deadline { subcommand } => cmd::deadline::run(&ctx, subcommand),
        Commands::Timeline { subcommand } => cmd::timeline::run(&ctx, subcommand),
        Commands::Responsible { subcommand } => cmd::responsible::run(&ctx, subcommand),
        Commands::Dashboard => cmd::dashboard::summary(&ctx),
        Commands::Report => cmd::dashboard::report(&ctx),
        Commands::Audit { subcommand } => cmd::audit::run(&ctx, subcommand),
        Commands::Config { subcommand } => cmd::config::run(&ctx, subcommand),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
