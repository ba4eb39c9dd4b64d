//! Data-access errors.

use crate::error::InputError;
use thiserror::Error;

/// Failure reading roster data from the database.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Requested dancers that the database does not know, in request order.
    #[error("missing dancers: {}", .0.join(", "))]
    MissingDancers(Vec<String>),

    /// A stored row holds an invalid code.
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("database connection lock poisoned")]
    LockPoisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;
