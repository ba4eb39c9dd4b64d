//! Builds the assignment model from a normalized roster.

use super::definition::{AssignmentModel, Constraint};
use super::objective::Objective;
use super::variables::{DanceInfo, EdgeVar, SlotInfo, VarId};
use crate::error::ModelInvalidError;
use crate::roster::Roster;
use std::collections::BTreeMap;

/// Encodes a [`Roster`] as one [`AssignmentModel`] covering every dance.
///
/// # Examples
///
/// ```
/// use who_dances_what::model::ModelBuilder;
/// use who_dances_what::roster::{Dance, Dancer, Preference, PreferenceEdge, Roster};
///
/// let dancers = vec![Dancer::new(1, "Ann")];
/// let dances = vec![Dance::new(1, "Haymakers").with_position(1, "Top")];
/// let edges = vec![PreferenceEdge::new(1, 1, 1, Preference::Yes)];
///
/// let roster = Roster::normalize(&dancers, &dances, &edges).unwrap();
/// let model = ModelBuilder::new(&roster).build().unwrap();
/// assert_eq!(model.var_count(), 1);
/// ```
pub struct ModelBuilder<'a> {
    roster: &'a Roster,
    objective: Objective,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(roster: &'a Roster) -> Self {
        Self {
            roster,
            objective: Objective::standard(),
        }
    }

    /// Replaces the default [`Objective::standard`].
    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    /// Builds and validates the model.
    pub fn build(self) -> Result<AssignmentModel, ModelInvalidError> {
        let roster = self.roster;
        let mut model = AssignmentModel::new("dance_set");

        model.dancers = roster.dancers().iter().map(|d| d.id).collect();
        model.dances = roster
            .dances()
            .iter()
            .enumerate()
            .map(|(d, dance)| DanceInfo {
                id: dance.id,
                slots: roster.dance_slots(d).collect(),
            })
            .collect();
        model.slots = (0..roster.slots().len())
            .map(|s| SlotInfo {
                dance: roster.slots()[s].dance,
                position: roster.position(s).id,
            })
            .collect();

        let mut by_slot: Vec<Vec<VarId>> = vec![Vec::new(); model.slots.len()];
        let mut by_dancer_in_dance: BTreeMap<(usize, usize), Vec<VarId>> = BTreeMap::new();

        for candidate in roster.candidates() {
            let slot = model.slots[candidate.slot];
            let var = EdgeVar::new(
                (candidate.dancer, roster.dancer(candidate.dancer).id),
                (candidate.slot, model.dances[slot.dance].id, slot.position),
                candidate.preference,
            );
            let id = model.add_var(var);
            by_slot[candidate.slot].push(id);
            by_dancer_in_dance
                .entry((candidate.dancer, slot.dance))
                .or_default()
                .push(id);
        }

        for (slot, vars) in by_slot.into_iter().enumerate() {
            if vars.len() > 1 {
                model.add_constraint(Constraint::SlotCapacity { slot, vars });
            }
        }
        for ((dancer, dance), vars) in by_dancer_in_dance {
            if vars.len() > 1 {
                model.add_constraint(Constraint::DancerExclusive {
                    dancer,
                    dance,
                    vars,
                });
            }
        }
        for dance in 0..model.dances.len() {
            let slots = model.dances[dance].slots.clone();
            model.add_constraint(Constraint::PerformedIff { dance, slots });
        }

        model.set_objective(self.objective);
        model.validate()?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{Dance, Dancer, Preference, PreferenceEdge};

    fn roster() -> Roster {
        let dancers = vec![
            Dancer::new(1, "Ann"),
            Dancer::new(2, "Bob"),
            Dancer::new(3, "Cat").inactive(),
        ];
        let dances = vec![
            Dance::new(10, "Reel").with_position(1, "A").with_position(2, "B"),
            Dance::new(20, "Jig").with_position(1, "A"),
        ];
        let edges = vec![
            PreferenceEdge::new(1, 10, 1, Preference::Yes),
            PreferenceEdge::new(1, 10, 2, Preference::Maybe),
            PreferenceEdge::new(2, 10, 1, Preference::Favourite),
            PreferenceEdge::new(2, 20, 1, Preference::Forbidden),
            PreferenceEdge::new(3, 20, 1, Preference::Favourite),
            PreferenceEdge::new(1, 20, 1, Preference::Yes),
        ];
        Roster::normalize(&dancers, &dances, &edges).unwrap()
    }

    #[test]
    fn test_one_variable_per_candidate() {
        let model = ModelBuilder::new(&roster()).build().unwrap();
        assert_eq!(model.var_count(), 4);
        assert!(model.vars.iter().all(|v| v.preference.is_assignable()));
        assert_eq!(model.vars[0].name, "dancer_1_dance_10_position_1");
    }

    #[test]
    fn test_constraints() {
        let model = ModelBuilder::new(&roster()).build().unwrap();

        let capacity: Vec<_> = model
            .constraints
            .iter()
            .filter(|c| matches!(c, Constraint::SlotCapacity { .. }))
            .collect();
        // Only the Reel's first position has two candidates.
        assert_eq!(capacity.len(), 1);

        let exclusive: Vec<_> = model
            .constraints
            .iter()
            .filter_map(|c| match c {
                Constraint::DancerExclusive { dancer, dance, vars } => Some((*dancer, *dance, vars.len())),
                _ => None,
            })
            .collect();
        // Ann is a candidate for both Reel positions; her Jig edge is not linked.
        assert_eq!(exclusive, vec![(0, 0, 2)]);

        let performed = model
            .constraints
            .iter()
            .filter(|c| matches!(c, Constraint::PerformedIff { .. }))
            .count();
        assert_eq!(performed, 2);
    }

    #[test]
    fn test_position_without_candidates_is_not_an_error() {
        let dancers = vec![Dancer::new(1, "Ann")];
        let dances = vec![Dance::new(1, "Reel").with_position(1, "A").with_position(2, "B")];
        let edges = vec![PreferenceEdge::new(1, 1, 1, Preference::Yes)];
        let roster = Roster::normalize(&dancers, &dances, &edges).unwrap();

        let model = ModelBuilder::new(&roster).build().unwrap();
        assert_eq!(model.slots.len(), 2);
        assert_eq!(model.var_count(), 1);
    }

    #[test]
    fn test_invalid_objective_is_rejected() {
        let result = ModelBuilder::new(&roster())
            .with_objective(Objective::Hierarchical { objectives: Vec::new() })
            .build();
        assert_eq!(result.unwrap_err(), ModelInvalidError::EmptyObjective);
    }
}
