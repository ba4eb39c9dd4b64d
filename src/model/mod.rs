//! Constraint model for the dance assignment problem.
//!
//! # Key Components
//!
//! - **Variables**: [`EdgeVar`] - one boolean per candidate (dancer, position) edge
//! - **Constraints**: [`Constraint`] - slot capacity, per-dance dancer exclusivity,
//!   and "performed iff fully staffed"
//! - **Objective**: [`Objective`] - lexicographic, evaluated to a [`Score`]
//! - **Model**: [`AssignmentModel`] - container for all of the above
//! - **Builder**: [`ModelBuilder`] - encodes a [`Roster`](crate::roster::Roster)
//!
//! This module defines the modeling layer only; searching it is the job of
//! a [`DanceSolver`](crate::solver::DanceSolver).

mod builder;
mod definition;
mod objective;
mod variables;

pub use builder::ModelBuilder;
pub use definition::{AssignmentModel, Constraint};
pub use objective::{Criterion, Objective, Score};
pub use variables::{DanceInfo, EdgeVar, SlotInfo, VarId};
