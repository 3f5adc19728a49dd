use super::Ctx;
use anyhow::Context;
use prazos_core::{config::Config, store::Store};

pub fn run(ctx: &Ctx) -> anyhow::Result<()> {
    let created = Config::write_default(&ctx.root).context("failed to write config")?;
    let config = Config::load(&ctx.root).context("failed to load config")?;
    let db_path = config.database_path(&ctx.root);
    Store::open(&db_path).with_context(|| format!("failed to open {}", db_path.display()))?;

    if ctx.json {
        crate::output::print_json(&serde_json::json!({
            "root": ctx.root,
            "database": db_path,
            "config_created": created,
        }))?;
    } else if created {
        println!("Initialized prazos in {}", ctx.root.display());
    } else {
        println!("Already initialized: {}", ctx.root.display());
    }
    Ok(())
}
