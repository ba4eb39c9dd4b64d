//! Lexicographic objective and its value.

use crate::roster::Preference;
use std::fmt;

/// Objective function for the assignment model. Always maximized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Objective {
    /// Number of dances with every position filled.
    MaximizePerformedDances,

    /// Number of chosen edges of one tier, counted in performed dances only.
    MaximizePreference(Preference),

    /// Hierarchical (lexicographic) multi-objective, highest priority first.
    Hierarchical { objectives: Vec<Objective> },
}

impl Objective {
    /// Staffed dances first, then favourites, yeses and maybes.
    ///
    /// Being lexicographic, one more favourite outweighs any number of yes
    /// or maybe placements, and one more performed dance outweighs all of
    /// them.
    pub fn standard() -> Self {
        let mut objectives = vec![Objective::MaximizePerformedDances];
        objectives.extend(
            Preference::ASSIGNABLE
                .into_iter()
                .map(Objective::MaximizePreference),
        );
        Objective::Hierarchical { objectives }
    }

    /// Flattens nested hierarchies into criteria, highest priority first.
    pub fn criteria(&self) -> Vec<Criterion> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect(&self, out: &mut Vec<Criterion>) {
        match self {
            Objective::MaximizePerformedDances => out.push(Criterion::PerformedDances),
            Objective::MaximizePreference(p) => out.push(Criterion::Preference(*p)),
            Objective::Hierarchical { objectives } => {
                for objective in objectives {
                    objective.collect(out);
                }
            }
        }
    }
}

/// A single level of a flattened objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    PerformedDances,
    Preference(Preference),
}

/// Objective value, one entry per [`Criterion`], compared lexicographically.
///
/// Higher is better. Values of the same objective always have the same
/// length.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Score(Vec<i64>);

impl Score {
    pub fn zero(levels: usize) -> Self {
        Self(vec![0; levels])
    }

    pub fn levels(&self) -> &[i64] {
        &self.0
    }

    /// Adds `other` level by level.
    pub fn add(&mut self, other: &Score) {
        for (a, b) in self.0.iter_mut().zip(&other.0) {
            *a += b;
        }
    }

    pub fn sub(&mut self, other: &Score) {
        for (a, b) in self.0.iter_mut().zip(&other.0) {
            *a -= b;
        }
    }
}

impl From<Vec<i64>> for Score {
    fn from(levels: Vec<i64>) -> Self {
        Self(levels)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
