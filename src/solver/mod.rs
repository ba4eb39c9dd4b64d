//! Solver engine.
//!
//! Provides the [`DanceSolver`] trait that search backends implement, the
//! shared [`SolverConfig`], and the [`Diagnostics`] hook through which a
//! solve reports what it is doing.
//!
//! # Backends
//!
//! - [`BranchAndBoundSolver`]: exact, the default
//! - [`BruteForceSolver`]: exhaustive, for tiny inputs and cross-checks
//!
//! # Status
//!
//! A solve ends in one of four [`SolverStatus`] values. `ModelInvalid`
//! means the model failed validation. Otherwise the status follows from
//! the number of performed dances and whether the search ran to
//! completion; see [`SolverStatus::classify`].

mod balance;
mod branch_bound;
mod brute_force;
mod budget;
mod config;
pub mod diagnostics;
mod index;
mod types;

pub use branch_bound::BranchAndBoundSolver;
pub use brute_force::BruteForceSolver;
pub use config::SolverConfig;
pub use diagnostics::{
    Diagnostics, EventLog, NullDiagnostics, SolveEvent, TracingDiagnostics, Unstaffable,
};
pub use types::{RawSolution, SolverStatus};

use crate::model::AssignmentModel;

/// Trait for search backends.
///
/// A backend validates the model first and returns an empty
/// `ModelInvalid` solution if that fails. It must never return a choice
/// set that breaks a constraint, and `chosen` only lists variables of
/// performed dances.
pub trait DanceSolver: Send + Sync {
    /// Short identifier used in diagnostics.
    fn name(&self) -> &'static str;

    /// Solves the model and returns a solution.
    fn solve(
        &self,
        model: &AssignmentModel,
        config: &SolverConfig,
        diagnostics: &dyn Diagnostics,
    ) -> RawSolution;
}
