//! Dancers, dances and preferences, and their normalization.
//!
//! The raw records ([`Dancer`], [`Dance`], [`PreferenceEdge`]) mirror what the
//! data-access layer returns.
//! [`Roster::normalize`] validates them and produces the index-based view
//! every later stage works on: inactive dancers and `no` preferences are
//! gone, and all relationships are plain indices.

mod normalize;
mod types;

pub use normalize::{Candidate, NormalizeReport, Roster, Slot};
pub use types::{Dance, DanceId, Dancer, DancerId, Position, PositionId, Preference, PreferenceEdge, Role};
