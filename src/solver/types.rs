//! Solver status and raw solutions.

use crate::model::{Score, VarId};
use std::fmt;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SolverStatus {
    /// Model is invalid or malformed.
    ModelInvalid,
    /// No dance can be fully staffed.
    ///
    /// The empty assignment always satisfies the constraints; this status
    /// means nothing useful is achievable, not that the model is
    /// contradictory.
    Infeasible,
    /// At least one dance is performed, but the search stopped before it
    /// could prove the objective maximal.
    Feasible,
    /// At least one dance is performed and the objective is proven maximal.
    Optimal,
}

impl SolverStatus {
    /// Status of a finished search.
    pub fn classify(performed: usize, proven: bool) -> Self {
        if performed == 0 {
            SolverStatus::Infeasible
        } else if proven {
            SolverStatus::Optimal
        } else {
            SolverStatus::Feasible
        }
    }

    /// Whether a non-empty assignment came out of the solve.
    pub fn is_solution_found(self) -> bool {
        matches!(self, SolverStatus::Optimal | SolverStatus::Feasible)
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SolverStatus::ModelInvalid => "model invalid",
            SolverStatus::Infeasible => "infeasible",
            SolverStatus::Feasible => "feasible",
            SolverStatus::Optimal => "optimal",
        })
    }
}

/// What a solver hands back: a status and the chosen edge variables.
#[derive(Debug, Clone)]
pub struct RawSolution {
    pub status: SolverStatus,
    /// Chosen variables, ascending. Only variables of performed dances.
    pub chosen: Vec<VarId>,
    /// Objective value of `chosen` (if any).
    pub objective_value: Option<Score>,
    /// Search nodes visited.
    pub nodes: u64,
    /// Solve time in milliseconds.
    pub solve_time_ms: i64,
}

impl RawSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            chosen: Vec::new(),
            objective_value: None,
            nodes: 0,
            solve_time_ms: 0,
        }
    }

    /// Whether a non-empty assignment was found.
    pub fn is_solution_found(&self) -> bool {
        self.status.is_solution_found()
    }
}
