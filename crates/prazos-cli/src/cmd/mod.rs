pub mod audit;
pub mod case;
pub mod config;
pub mod dashboard;
pub mod deadline;
pub mod init;
pub mod responsible;
pub mod timeline;

use anyhow::Context;
use chrono::NaiveDate;
use prazos_core::{session::Session, Engine};
use std::path::PathBuf;

/// Everything a command needs besides its own arguments.
pub struct Ctx {
    pub root: PathBuf,
    pub json: bool,
    pub session: Session,
    pub today: NaiveDate,
}

impl Ctx {
    pub fn engine(&self) -> anyhow::Result<Engine> {
        Engine::open(&self.root).with_context(|| {
            format!("failed to open prazos project at {}", self.root.display())
        })
    }
}
