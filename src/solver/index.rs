//! Precomputed lookups shared by the search backends.

use super::diagnostics::Unstaffable;
use crate::model::{AssignmentModel, Constraint, Criterion, Score, VarId};
use std::collections::{BTreeSet, HashMap};

/// Flat lookup tables derived once per solve from a validated model.
pub(crate) struct ModelIndex {
    pub(crate) criteria: Vec<Criterion>,
    /// Objective gain of each variable.
    pub(crate) gains: Vec<Score>,
    /// Objective gain of a performed dance.
    pub(crate) bonus: Score,
    /// At-most-one constraints (numbered densely) containing each variable.
    pub(crate) var_limits: Vec<Vec<usize>>,
    pub(crate) limit_count: usize,
    /// Variables per slot, in model order.
    pub(crate) slot_vars: Vec<Vec<VarId>>,
    /// Independent groups of dance indices, ascending within and across groups.
    pub(crate) components: Vec<Vec<usize>>,
}

impl ModelIndex {
    pub(crate) fn new(model: &AssignmentModel) -> Self {
        let criteria = model.criteria();
        let gains = (0..model.var_count())
            .map(|v| model.gain(&criteria, VarId(v)))
            .collect();
        let bonus = AssignmentModel::dance_bonus(&criteria);

        let mut var_limits = vec![Vec::new(); model.var_count()];
        let mut limit_count = 0;
        for vars in model.constraints.iter().filter_map(|c| c.at_most_one()) {
            for id in vars {
                var_limits[id.0].push(limit_count);
            }
            limit_count += 1;
        }

        let mut slot_vars = vec![Vec::new(); model.slots.len()];
        for (v, var) in model.vars.iter().enumerate() {
            slot_vars[var.slot].push(VarId(v));
        }

        Self {
            criteria,
            gains,
            bonus,
            var_limits,
            limit_count,
            slot_vars,
            components: components(model),
        }
    }

    /// Whether no at-most-one constraint containing `id` is already used.
    pub(crate) fn is_free(&self, taken: &[bool], id: VarId) -> bool {
        self.var_limits[id.0].iter().all(|&l| !taken[l])
    }

    /// Why `dance` cannot be staffed even with nothing else chosen.
    pub(crate) fn unstaffable(&self, model: &AssignmentModel, dance: usize) -> Option<Unstaffable> {
        let slots = &model.dances[dance].slots;
        if slots.is_empty() {
            return Some(Unstaffable::NoPositions);
        }
        if let Some(&empty) = slots.iter().find(|&&s| self.slot_vars[s].is_empty()) {
            return Some(Unstaffable::NoCandidates {
                position: model.slots[empty].position,
            });
        }
        let available = slots
            .iter()
            .flat_map(|&s| &self.slot_vars[s])
            .map(|&id| model.var(id).dancer)
            .collect::<BTreeSet<_>>()
            .len();
        if available < slots.len() {
            return Some(Unstaffable::NotEnoughDancers {
                needed: slots.len(),
                available,
            });
        }
        let lists: Vec<&[VarId]> = slots.iter().map(|&s| self.slot_vars[s].as_slice()).collect();
        let mut matching = Matching::new(model.dancers.len());
        if matching.covers(model, &lists, |_| true) {
            None
        } else {
            Some(Unstaffable::NoMatching)
        }
    }
}

/// Groups dances that share a constraint scope, via union-find over slots.
fn components(model: &AssignmentModel) -> Vec<Vec<usize>> {
    let mut parent: Vec<usize> = (0..model.slots.len()).collect();

    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    let mut union = |slots: &mut dyn Iterator<Item = usize>| {
        if let Some(first) = slots.next() {
            let root = find(&mut parent, first);
            for s in slots {
                let other = find(&mut parent, s);
                parent[other] = root;
            }
        }
    };
    for constraint in &model.constraints {
        match constraint.at_most_one() {
            Some(vars) => union(&mut vars.iter().map(|&id| model.var(id).slot)),
            None => {
                if let Constraint::PerformedIff { slots, .. } = constraint {
                    union(&mut slots.iter().copied());
                }
            }
        }
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut by_root: HashMap<usize, usize> = HashMap::new();
    for (d, dance) in model.dances.iter().enumerate() {
        match dance.slots.first() {
            None => groups.push(vec![d]),
            Some(&s) => {
                let root = find(&mut parent, s);
                let group = *by_root.entry(root).or_insert_with(|| {
                    groups.push(Vec::new());
                    groups.len() - 1
                });
                groups[group].push(d);
            }
        }
    }
    groups
}

/// Bipartite matching of slots to dancers (Kuhn's augmenting paths).
///
/// Scratch space is kept between calls; one instance serves a whole search.
pub(crate) struct Matching {
    owner: Vec<Option<usize>>,
    seen: Vec<u32>,
    stamp: u32,
}

impl Matching {
    pub(crate) fn new(dancers: usize) -> Self {
        Self {
            owner: vec![None; dancers],
            seen: vec![0; dancers],
            stamp: 0,
        }
    }

    /// Whether every slot list can get its own dancer using only variables
    /// accepted by `usable`.
    pub(crate) fn covers<S, F>(&mut self, model: &AssignmentModel, slots: &[S], usable: F) -> bool
    where
        S: AsRef<[VarId]>,
        F: Fn(VarId) -> bool,
    {
        self.owner.fill(None);
        for s in 0..slots.len() {
            self.stamp = self.stamp.wrapping_add(1);
            if self.stamp == 0 {
                self.seen.fill(0);
                self.stamp = 1;
            }
            if !self.augment(model, slots, s, &usable) {
                return false;
            }
        }
        true
    }

    fn augment<S, F>(&mut self, model: &AssignmentModel, slots: &[S], s: usize, usable: &F) -> bool
    where
        S: AsRef<[VarId]>,
        F: Fn(VarId) -> bool,
    {
        for &id in slots[s].as_ref() {
            if !usable(id) {
                continue;
            }
            let dancer = model.var(id).dancer;
            if self.seen[dancer] == self.stamp {
                continue;
            }
            self.seen[dancer] = self.stamp;
            let free = match self.owner[dancer] {
                None => true,
                Some(other) => self.augment(model, slots, other, usable),
            };
            if free {
                self.owner[dancer] = Some(s);
                return true;
            }
        }
        false
    }
}
