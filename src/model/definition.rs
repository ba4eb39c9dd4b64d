//! Assignment model definition.

use super::objective::{Criterion, Objective, Score};
use super::variables::{DanceInfo, EdgeVar, SlotInfo, VarId};
use crate::error::ModelInvalidError;
use crate::roster::{DancerId, Preference};
use std::collections::HashSet;

/// A constraint in the assignment model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// At most one of `vars` (all for `slot`) is chosen: one dancer per
    /// position.
    SlotCapacity { slot: usize, vars: Vec<VarId> },

    /// At most one of `vars` (all of `dancer` within `dance`) is chosen: a
    /// dancer holds at most one position per dance. Nothing links a
    /// dancer's positions across different dances.
    DancerExclusive {
        dancer: usize,
        dance: usize,
        vars: Vec<VarId>,
    },

    /// `dance` is performed iff each of `slots` has a chosen variable.
    ///
    /// With no slots the dance is never performed.
    PerformedIff { dance: usize, slots: Vec<usize> },
}

impl Constraint {
    /// Variables of an at-most-one constraint.
    pub fn at_most_one(&self) -> Option<&[VarId]> {
        match self {
            Constraint::SlotCapacity { vars, .. } | Constraint::DancerExclusive { vars, .. } => {
                Some(vars)
            }
            Constraint::PerformedIff { .. } => None,
        }
    }
}

/// Global model over all dances at once.
///
/// Dancers, dances and slots are plain index spaces; ids are carried along
/// only so solvers can report on what they see.
#[derive(Debug, Clone)]
pub struct AssignmentModel {
    /// Model name.
    pub name: String,
    /// Dancer ids by dancer index.
    pub dancers: Vec<DancerId>,
    pub dances: Vec<DanceInfo>,
    pub slots: Vec<SlotInfo>,
    /// One boolean per candidate edge.
    pub vars: Vec<EdgeVar>,
    pub constraints: Vec<Constraint>,
    pub objective: Option<Objective>,
}

impl AssignmentModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dancers: Vec::new(),
            dances: Vec::new(),
            slots: Vec::new(),
            vars: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    /// Adds a variable and returns its id.
    pub fn add_var(&mut self, var: EdgeVar) -> VarId {
        self.vars.push(var);
        VarId(self.vars.len() - 1)
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = Some(objective);
    }

    pub fn var(&self, id: VarId) -> &EdgeVar {
        &self.vars[id.0]
    }

    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Flattened objective; empty when no objective is set.
    pub fn criteria(&self) -> Vec<Criterion> {
        self.objective
            .as_ref()
            .map(Objective::criteria)
            .unwrap_or_default()
    }

    /// Validates the model for consistency.
    ///
    /// Checks that every index resolves, that constraints only mention
    /// variables inside their scope, and that each dance has exactly one
    /// performed constraint.
    pub fn validate(&self) -> Result<(), ModelInvalidError> {
        for slot in &self.slots {
            if slot.dance >= self.dances.len() {
                return Err(ModelInvalidError::UndefinedDance(slot.dance));
            }
        }
        for (d, dance) in self.dances.iter().enumerate() {
            for &slot in &dance.slots {
                match self.slots.get(slot) {
                    None => return Err(ModelInvalidError::UndefinedSlot(slot)),
                    Some(info) if info.dance != d => {
                        return Err(ModelInvalidError::UndefinedSlot(slot))
                    }
                    Some(_) => {}
                }
            }
        }

        let mut names = HashSet::with_capacity(self.vars.len());
        for var in &self.vars {
            if !names.insert(var.name.as_str()) {
                return Err(ModelInvalidError::DuplicateVariable(var.name.clone()));
            }
            if var.dancer >= self.dancers.len() {
                return Err(ModelInvalidError::UndefinedDancer(var.dancer));
            }
            if var.slot >= self.slots.len() {
                return Err(ModelInvalidError::UndefinedSlot(var.slot));
            }
            if !var.preference.is_assignable() {
                return Err(ModelInvalidError::ForbiddenCandidate(var.name.clone()));
            }
        }

        let mut performed = vec![0usize; self.dances.len()];
        for (index, constraint) in self.constraints.iter().enumerate() {
            match constraint {
                Constraint::SlotCapacity { slot, vars } => {
                    if *slot >= self.slots.len() {
                        return Err(ModelInvalidError::UndefinedSlot(*slot));
                    }
                    for &id in vars {
                        let var = self.checked_var(id)?;
                        if var.slot != *slot {
                            return Err(ModelInvalidError::InconsistentConstraint { index });
                        }
                    }
                }
                Constraint::DancerExclusive {
                    dancer,
                    dance,
                    vars,
                } => {
                    if *dance >= self.dances.len() {
                        return Err(ModelInvalidError::UndefinedDance(*dance));
                    }
                    for &id in vars {
                        let var = self.checked_var(id)?;
                        if var.dancer != *dancer || self.slots[var.slot].dance != *dance {
                            return Err(ModelInvalidError::InconsistentConstraint { index });
                        }
                    }
                }
                Constraint::PerformedIff { dance, slots } => {
                    let info = self
                        .dances
                        .get(*dance)
                        .ok_or(ModelInvalidError::UndefinedDance(*dance))?;
                    if slots != &info.slots {
                        return Err(ModelInvalidError::InconsistentConstraint { index });
                    }
                    performed[*dance] += 1;
                }
            }
        }
        if let Some((dance, &count)) = performed.iter().enumerate().find(|(_, c)| **c != 1) {
            return Err(ModelInvalidError::PerformedConstraintCount { dance, count });
        }

        let criteria = self.criteria();
        if criteria.is_empty() {
            return Err(ModelInvalidError::EmptyObjective);
        }
        if criteria.contains(&Criterion::Preference(Preference::Forbidden)) {
            return Err(ModelInvalidError::ForbiddenObjective);
        }
        Ok(())
    }

    fn checked_var(&self, id: VarId) -> Result<&EdgeVar, ModelInvalidError> {
        self.vars
            .get(id.0)
            .ok_or(ModelInvalidError::UndefinedVariable(id.0))
    }

    /// Which dances a set of chosen variables fully staffs.
    ///
    /// A dance with no slots is never performed.
    pub fn performed_dances(&self, chosen: &[VarId]) -> Vec<bool> {
        let mut filled = vec![false; self.slots.len()];
        for &id in chosen {
            filled[self.var(id).slot] = true;
        }
        self.dances
            .iter()
            .map(|dance| !dance.slots.is_empty() && dance.slots.iter().all(|&s| filled[s]))
            .collect()
    }

    /// Objective contribution of choosing one variable in a performed dance.
    pub fn gain(&self, criteria: &[Criterion], id: VarId) -> Score {
        let preference = self.var(id).preference;
        criteria
            .iter()
            .map(|c| i64::from(*c == Criterion::Preference(preference)))
            .collect::<Vec<_>>()
            .into()
    }

    /// Objective contribution of one performed dance on its own.
    pub fn dance_bonus(criteria: &[Criterion]) -> Score {
        criteria
            .iter()
            .map(|c| i64::from(*c == Criterion::PerformedDances))
            .collect::<Vec<_>>()
            .into()
    }

    /// Evaluates the objective for a set of chosen variables.
    ///
    /// Choices inside dances that are not fully staffed count for nothing.
    pub fn evaluate(&self, chosen: &[VarId]) -> Score {
        let criteria = self.criteria();
        let performed = self.performed_dances(chosen);
        let mut score = Score::zero(criteria.len());
        let bonus = Self::dance_bonus(&criteria);
        for _ in performed.iter().filter(|&&p| p) {
            score.add(&bonus);
        }
        for &id in chosen {
            if performed[self.slots[self.var(id).slot].dance] {
                score.add(&self.gain(&criteria, id));
            }
        }
        score
    }
}
