use super::Ctx;
use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use prazos_core::config::{Config, WarnLevel};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show,
    /// Check the configuration for problems
    Validate,
}

pub fn run(ctx: &Ctx, subcmd: ConfigSubcommand) -> anyhow::Result<()> {
    let config = Config::load(&ctx.root).context("failed to load config")?;
    match subcmd {
        ConfigSubcommand::Show => {
            if ctx.json {
                print_json(&config)?;
            } else {
                println!("database:       {}", config.database_path(&ctx.root).display());
                println!("urgent_days:    {}", config.thresholds.urgent_days);
                println!("attention_days: {}", config.thresholds.attention_days);
                println!("audit:          {:?}", config.audit);
            }
            Ok(())
        }
        ConfigSubcommand::Validate => {
            let warnings = config.validate();
            let errors = warnings
                .iter()
                .filter(|w| w.level == WarnLevel::Error)
                .count();

            if ctx.json {
                print_json(&serde_json::json!({
                    "valid": errors == 0,
                    "warnings": warnings,
                }))?;
            } else if warnings.is_empty() {
                println!("Config OK.");
            } else {
                for w in &warnings {
                    let tag = match w.level {
                        WarnLevel::Warning => "warning",
                        WarnLevel::Error => "error",
                    };
                    println!("{tag}: {}", w.message);
                }
            }

            if errors > 0 {
                anyhow::bail!("config has {errors} error(s)");
            }
            Ok(())
        }
    }
}
