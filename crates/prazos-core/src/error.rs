use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrazoError {
    #[error("not initialized: run 'prazos init'")]
    NotInitialized,

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("case not found: {0}")]
    CaseNotFound(u64),

    #[error("case {0} has no active deadline period")]
    NoActivePeriod(u64),

    #[error("timeline entry {entry_id} not found on case {case_id}")]
    TimelineEntryNotFound { case_id: u64, entry_id: u64 },

    #[error("case {0} already has an active deadline period")]
    ActivePeriodExists(u64),

    #[error("case {0} is concluded")]
    CaseConcluded(u64),

    #[error("malformed stored record: {0}")]
    DataIntegrity(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Error category reported in the result envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    DataIntegrity,
    Internal,
}

impl PrazoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PrazoError::Validation(_) => ErrorKind::Validation,
            PrazoError::CaseNotFound(_)
            | PrazoError::NoActivePeriod(_)
            | PrazoError::TimelineEntryNotFound { .. } => ErrorKind::NotFound,
            PrazoError::ActivePeriodExists(_) | PrazoError::CaseConcluded(_) => {
                ErrorKind::Conflict
            }
            PrazoError::DataIntegrity(_) => ErrorKind::DataIntegrity,
            PrazoError::NotInitialized
            | PrazoError::Storage(_)
            | PrazoError::Io(_)
            | PrazoError::Yaml(_)
            | PrazoError::Json(_) => ErrorKind::Internal,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        PrazoError::Validation(msg.into())
    }
}

/// Collapse any redb error into [`PrazoError::Storage`].
pub(crate) fn db_err(e: impl Into<redb::Error>) -> PrazoError {
    PrazoError::Storage(e.into().to_string())
}

pub type Result<T> = std::result::Result<T, PrazoError>;
