//! Exhaustive enumeration.

use super::budget::Budget;
use super::config::SolverConfig;
use super::diagnostics::{Diagnostics, SolveEvent};
use super::index::ModelIndex;
use super::types::{RawSolution, SolverStatus};
use super::DanceSolver;
use crate::model::{AssignmentModel, Score, VarId};
use std::time::Instant;

/// Tries every constraint-respecting set of choices and scores each with
/// [`AssignmentModel::evaluate`].
///
/// Exponential in the number of positions; meant for tiny inputs and for
/// cross-checking [`BranchAndBoundSolver`](super::BranchAndBoundSolver).
/// Among equally scored assignments the first one enumerated is kept.
///
/// Budgets and `stop_after_first` only take effect once the best
/// assignment so far performs every dance that can be staffed on its own,
/// so a cut-short solve never reports fewer dances than possible.
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForceSolver;

impl BruteForceSolver {
    pub fn new() -> Self {
        Self
    }
}

impl DanceSolver for BruteForceSolver {
    fn name(&self) -> &'static str {
        "brute_force"
    }

    fn solve(
        &self,
        model: &AssignmentModel,
        config: &SolverConfig,
        diagnostics: &dyn Diagnostics,
    ) -> RawSolution {
        let start = Instant::now();
        if let Err(err) = model.validate() {
            diagnostics.on_event(&SolveEvent::ModelRejected {
                reason: err.to_string(),
            });
            return RawSolution::empty(SolverStatus::ModelInvalid);
        }

        let index = ModelIndex::new(model);
        diagnostics.on_event(&SolveEvent::SolveStarted {
            backend: self.name(),
            dances: model.dances.len(),
            vars: model.var_count(),
            components: 1,
        });

        let budget = Budget::new(config, start);
        let staffable = (0..model.dances.len())
            .filter(|&d| index.unstaffable(model, d).is_none())
            .count();
        let mut search = Enumeration {
            model,
            index: &index,
            budget: &budget,
            staffable,
            taken: vec![false; index.limit_count],
            chosen: Vec::new(),
            best: None,
            stopped: false,
        };
        search.step(0);
        let proven = !search.stopped;
        let (score, chosen) = search
            .best
            .map(|best| (best.score, best.chosen))
            .unwrap_or_else(|| (Score::zero(index.criteria.len()), Vec::new()));

        let performed_flags = model.performed_dances(&chosen);
        let performed = performed_flags.iter().filter(|&&p| p).count();
        let mut chosen: Vec<VarId> = chosen
            .into_iter()
            .filter(|&id| performed_flags[model.slots[model.var(id).slot].dance])
            .collect();
        chosen.sort_unstable();

        let nodes = budget.nodes();
        let elapsed_ms = budget.elapsed_ms();
        if budget.is_expired() {
            diagnostics.on_event(&SolveEvent::BudgetExhausted { nodes, elapsed_ms });
        }
        let status = SolverStatus::classify(performed, proven);
        diagnostics.on_event(&SolveEvent::SolveFinished {
            status,
            performed,
            score: Some(score.clone()),
            nodes,
            elapsed_ms,
        });

        RawSolution {
            status,
            chosen,
            objective_value: Some(score),
            nodes,
            solve_time_ms: elapsed_ms,
        }
    }
}

struct Best {
    score: Score,
    chosen: Vec<VarId>,
    performed: usize,
}

struct Enumeration<'a> {
    model: &'a AssignmentModel,
    index: &'a ModelIndex,
    budget: &'a Budget,
    /// Dances not ruled out up front; no assignment performs more.
    staffable: usize,
    taken: Vec<bool>,
    chosen: Vec<VarId>,
    best: Option<Best>,
    stopped: bool,
}

impl Enumeration<'_> {
    /// Whether the incumbent is good enough to stop on.
    fn settled(&self) -> bool {
        self.best
            .as_ref()
            .is_some_and(|best| best.performed >= self.staffable)
    }

    /// Slot `s` stays empty, or takes one free candidate.
    fn step(&mut self, s: usize) {
        if self.stopped {
            return;
        }
        if !self.budget.tick() && self.settled() {
            self.stopped = true;
            return;
        }
        if s == self.model.slots.len() {
            let score = self.model.evaluate(&self.chosen);
            if self.best.as_ref().map_or(true, |best| score > best.score) {
                let performed = self
                    .model
                    .performed_dances(&self.chosen)
                    .iter()
                    .filter(|&&p| p)
                    .count();
                self.best = Some(Best {
                    score,
                    chosen: self.chosen.clone(),
                    performed,
                });
            }
            if self.budget.stop_after_first && self.settled() {
                self.stopped = true;
            }
            return;
        }

        let index = self.index;
        for &id in &index.slot_vars[s] {
            if !index.is_free(&self.taken, id) {
                continue;
            }
            for &limit in &index.var_limits[id.0] {
                self.taken[limit] = true;
            }
            self.chosen.push(id);
            self.step(s + 1);
            self.chosen.pop();
            for &limit in &index.var_limits[id.0] {
                self.taken[limit] = false;
            }
            if self.stopped {
                return;
            }
        }
        self.step(s + 1);
    }
}
