//! Error types shared across the planning pipeline.
//!
//! Solver outcomes such as `Infeasible` are statuses, not errors; see
//! [`SolverStatus`](crate::solver::SolverStatus).

use crate::roster::{DanceId, DancerId, PositionId};
use thiserror::Error;

/// Raw input records are malformed or reference missing entities.
///
/// Raised by the normalizer before any model is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("dancer {0} is listed more than once")]
    DuplicateDancer(DancerId),

    #[error("dance {0} is listed more than once")]
    DuplicateDance(DanceId),

    #[error("dance {dance} has more than one position with id {position}")]
    DuplicatePosition { dance: DanceId, position: PositionId },

    #[error("preference references unknown dancer {0}")]
    UnknownDancer(DancerId),

    #[error("preference references unknown dance {0}")]
    UnknownDance(DanceId),

    #[error("preference references unknown position {position} of dance {dance}")]
    UnknownPosition { dance: DanceId, position: PositionId },

    #[error("dancer {dancer} has more than one preference for position {position} of dance {dance}")]
    DuplicatePreference {
        dancer: DancerId,
        dance: DanceId,
        position: PositionId,
    },

    #[error("invalid dance preference value: {0}")]
    InvalidPreferenceCode(i64),

    #[error("invalid dance preference: {0:?}")]
    InvalidPreference(String),

    #[error("invalid role value: {0}")]
    InvalidRoleCode(i64),
}

/// The constraint model is internally inconsistent.
///
/// Models built from a normalized roster never trigger this; seeing it
/// means a defect in model construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelInvalidError {
    #[error("duplicate variable: {0}")]
    DuplicateVariable(String),

    #[error("undefined variable: #{0}")]
    UndefinedVariable(usize),

    #[error("undefined slot: #{0}")]
    UndefinedSlot(usize),

    #[error("undefined dance: #{0}")]
    UndefinedDance(usize),

    #[error("undefined dancer: #{0}")]
    UndefinedDancer(usize),

    #[error("variable {0} carries a forbidden preference")]
    ForbiddenCandidate(String),

    #[error("constraint {index} mixes variables outside its scope")]
    InconsistentConstraint { index: usize },

    #[error("dance #{dance} has {count} performed constraints, expected exactly one")]
    PerformedConstraintCount { dance: usize, count: usize },

    #[error("objective is empty")]
    EmptyObjective,

    #[error("objective rewards forbidden preferences")]
    ForbiddenObjective,
}

/// Solver configuration could not be read or is out of range.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level error for a planning run.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    ModelInvalid(#[from] ModelInvalidError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
