//! Registry-level errors.

use thiserror::Error;

use crate::game::{ActionError, MatchId, SetupError};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("match {0} not found")]
    MatchNotFound(MatchId),
    #[error("match {0} is closed")]
    MatchClosed(MatchId),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error(transparent)]
    Action(#[from] ActionError),
}

pub type TableResult<T> = Result<T, TableError>;
