pub mod audit;
pub mod case;
pub mod classifier;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod io;
pub mod ledger;
pub mod paths;
pub mod responsible;
pub mod rules;
pub mod session;
pub mod store;
pub mod timeline;

pub use engine::Engine;
pub use error::{PrazoError, Result};
