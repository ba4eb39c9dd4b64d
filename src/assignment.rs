//! Query-able assignment results.

use crate::model::{AssignmentModel, Score};
use crate::roster::{Dance, DanceId, Dancer, Position, PositionId, Preference, Roster};
use crate::solver::{RawSolution, SolverStatus};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Satisfied preferences, counted over performed dances only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PreferenceTally {
    pub favourite: usize,
    pub yes: usize,
    pub maybe: usize,
}

impl PreferenceTally {
    pub fn count(&self, preference: Preference) -> usize {
        match preference {
            Preference::Favourite => self.favourite,
            Preference::Yes => self.yes,
            Preference::Maybe => self.maybe,
            Preference::Forbidden => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.favourite + self.yes + self.maybe
    }

    fn record(&mut self, preference: Preference) {
        match preference {
            Preference::Favourite => self.favourite += 1,
            Preference::Yes => self.yes += 1,
            Preference::Maybe => self.maybe += 1,
            Preference::Forbidden => {}
        }
    }
}

/// One filled position of a performed dance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement<'a> {
    pub position: &'a Position,
    pub dancer: &'a Dancer,
    pub preference: Preference,
}

/// Outcome of one solve, keyed by input ids.
///
/// Only performed dances have entries; a dance that could not be fully
/// staffed contributes nothing, not even the positions that could have
/// been filled. Immutable once extracted.
#[derive(Debug, Clone)]
pub struct AssignmentResult {
    status: SolverStatus,
    dancers: Vec<Dancer>,
    dances: Vec<Dance>,
    /// (dance, position) -> (index into `dancers`, tier)
    assigned: HashMap<(DanceId, PositionId), (usize, Preference)>,
    performed: HashSet<DanceId>,
    tally: PreferenceTally,
    objective_value: Option<Score>,
}

impl AssignmentResult {
    /// Translates a raw solution back to the roster's ids.
    ///
    /// `model` must have been built from `roster`, and `raw` returned for
    /// `model`.
    pub fn extract(roster: &Roster, model: &AssignmentModel, raw: &RawSolution) -> Self {
        let mut result = Self {
            status: raw.status,
            dancers: roster.dancers().to_vec(),
            dances: roster.dances().to_vec(),
            assigned: HashMap::new(),
            performed: HashSet::new(),
            tally: PreferenceTally::default(),
            objective_value: raw.objective_value.clone(),
        };
        if !raw.is_solution_found() {
            return result;
        }

        let performed = model.performed_dances(&raw.chosen);
        for (d, _) in performed.iter().enumerate().filter(|(_, p)| **p) {
            result.performed.insert(roster.dance(d).id);
        }
        for &id in &raw.chosen {
            let var = model.var(id);
            let dance = model.slots[var.slot].dance;
            if !performed[dance] {
                continue;
            }
            let key = (roster.dance(dance).id, roster.position(var.slot).id);
            result.assigned.insert(key, (var.dancer, var.preference));
            result.tally.record(var.preference);
        }
        result
    }

    pub fn status(&self) -> SolverStatus {
        self.status
    }

    /// Who fills `position` of `dance`, if the dance is performed.
    pub fn dancer_for(&self, dance: DanceId, position: PositionId) -> Option<&Dancer> {
        self.assigned
            .get(&(dance, position))
            .map(|&(dancer, _)| &self.dancers[dancer])
    }

    /// The tier the assigned dancer gave `position` of `dance`.
    pub fn preference_for(&self, dance: DanceId, position: PositionId) -> Option<Preference> {
        self.assigned.get(&(dance, position)).map(|&(_, p)| p)
    }

    pub fn is_performed(&self, dance: DanceId) -> bool {
        self.performed.contains(&dance)
    }

    pub fn performed_count(&self) -> usize {
        self.performed.len()
    }

    /// Performed dances, in input order.
    pub fn performed_dances(&self) -> impl Iterator<Item = &Dance> + '_ {
        self.dances.iter().filter(|d| self.is_performed(d.id))
    }

    /// Number of filled positions.
    pub fn assignment_count(&self) -> usize {
        self.assigned.len()
    }

    pub fn tally(&self) -> PreferenceTally {
        self.tally
    }

    pub fn objective_value(&self) -> Option<&Score> {
        self.objective_value.as_ref()
    }

    /// Positions of `dance` with their dancers, in presentation order.
    ///
    /// Empty unless the dance is performed.
    pub fn lineup(&self, dance: DanceId) -> Vec<Placement<'_>> {
        let Some(dance) = self.dances.iter().find(|d| d.id == dance) else {
            return Vec::new();
        };
        dance
            .positions
            .iter()
            .filter_map(|position| {
                let &(dancer, preference) = self.assigned.get(&(dance.id, position.id))?;
                Some(Placement {
                    position,
                    dancer: &self.dancers[dancer],
                    preference,
                })
            })
            .collect()
    }
}

impl fmt::Display for AssignmentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.performed_count() == 0 {
            return writeln!(f, "Can't dance any dances");
        }
        for dance in self.performed_dances() {
            writeln!(f, "{}", dance.name)?;
            for placement in self.lineup(dance.id) {
                writeln!(f, "{}: {}", placement.position.name, placement.dancer.name)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelBuilder, VarId};
    use crate::roster::{DancerId, PreferenceEdge};

    fn roster() -> Roster {
        let dancers = vec![Dancer::new(1, "Ann"), Dancer::new(2, "Bob")];
        let dances = vec![
            Dance::new(10, "Reel")
                .with_position(1, "Lead")
                .with_position(2, "Follow"),
            Dance::new(20, "Jig").with_position(1, "Solo"),
        ];
        let edges = vec![
            PreferenceEdge::new(1, 10, 1, Preference::Favourite),
            PreferenceEdge::new(2, 10, 2, Preference::Maybe),
            PreferenceEdge::new(1, 20, 1, Preference::Yes),
        ];
        Roster::normalize(&dancers, &dances, &edges).unwrap()
    }

    fn raw(status: SolverStatus, chosen: Vec<VarId>) -> RawSolution {
        RawSolution {
            chosen,
            ..RawSolution::empty(status)
        }
    }

    #[test]
    fn test_extract_performed_dances() {
        let roster = roster();
        let model = ModelBuilder::new(&roster).build().unwrap();
        let result = AssignmentResult::extract(
            &roster,
            &model,
            &raw(SolverStatus::Optimal, vec![VarId(0), VarId(1), VarId(2)]),
        );

        assert_eq!(result.status(), SolverStatus::Optimal);
        assert_eq!(result.performed_count(), 2);
        assert_eq!(result.assignment_count(), 3);
        assert_eq!(
            result.dancer_for(DanceId(10), PositionId(2)).map(|d| d.id),
            Some(DancerId(2))
        );
        assert_eq!(
            result.preference_for(DanceId(10), PositionId(1)),
            Some(Preference::Favourite)
        );
        assert_eq!(
            result.tally(),
            PreferenceTally { favourite: 1, yes: 1, maybe: 1 }
        );
        let names: Vec<_> = result.performed_dances().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Reel", "Jig"]);
    }

    #[test]
    fn test_partly_filled_dance_is_left_out() {
        let roster = roster();
        let model = ModelBuilder::new(&roster).build().unwrap();
        // Reel lead only, plus the Jig
        let result = AssignmentResult::extract(
            &roster,
            &model,
            &raw(SolverStatus::Feasible, vec![VarId(0), VarId(2)]),
        );

        assert!(!result.is_performed(DanceId(10)));
        assert!(result.is_performed(DanceId(20)));
        assert_eq!(result.dancer_for(DanceId(10), PositionId(1)), None);
        assert!(result.lineup(DanceId(10)).is_empty());
        assert_eq!(result.tally().total(), 1);
    }

    #[test]
    fn test_infeasible_is_empty() {
        let roster = roster();
        let model = ModelBuilder::new(&roster).build().unwrap();
        let result = AssignmentResult::extract(&roster, &model, &raw(SolverStatus::Infeasible, Vec::new()));
        assert_eq!(result.performed_count(), 0);
        assert_eq!(result.assignment_count(), 0);
        assert_eq!(result.to_string(), "Can't dance any dances\n");
    }

    #[test]
    fn test_lineup_and_display_follow_position_order() {
        let roster = roster();
        let model = ModelBuilder::new(&roster).build().unwrap();
        let result = AssignmentResult::extract(
            &roster,
            &model,
            &raw(SolverStatus::Optimal, vec![VarId(1), VarId(0)]),
        );

        let lineup: Vec<_> = result
            .lineup(DanceId(10))
            .iter()
            .map(|p| (p.position.name.as_str(), p.dancer.name.as_str()))
            .collect();
        assert_eq!(lineup, vec![("Lead", "Ann"), ("Follow", "Bob")]);
        assert_eq!(result.to_string(), "Reel\nLead: Ann\nFollow: Bob\n");
    }
}
