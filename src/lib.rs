//! Works out which dances a group can perform and who dances what.
//!
//! Each dance has named positions, and every position needs exactly one
//! dancer. Dancers rate positions as favourite, yes, maybe or no. Given
//! the dancers who turned up, the planner picks dances and fills their
//! positions so that:
//!
//! 1. as many dances as possible are fully staffed;
//! 2. among those, as many favourites as possible are honoured, then yeses,
//!    then maybes.
//!
//! Nobody takes two positions in the same dance, and a dance is never
//! partly staffed.
//!
//! # Pipeline
//!
//! - [`roster`]: input records, validated and indexed
//! - [`model`]: the roster as choice variables, constraints and a
//!   lexicographic objective
//! - [`solver`]: exact branch and bound (plus a brute-force reference)
//! - [`assignment`]: the solution mapped back to dancers and positions
//! - [`planner`]: runs the stages above in order
//!
//! With the `sqlite` feature [`store`] reads records from the group's
//! database; with `cli` the binary adds text rendering and logging.

pub mod assignment;
pub mod error;
pub mod model;
pub mod planner;
pub mod roster;
pub mod solver;

#[cfg(feature = "sqlite")]
pub mod store;

#[cfg(feature = "cli")]
pub mod logging;
#[cfg(feature = "cli")]
pub mod render;

pub use assignment::{AssignmentResult, PreferenceTally};
pub use error::Error;
pub use planner::Planner;
pub use solver::{SolverConfig, SolverStatus};
