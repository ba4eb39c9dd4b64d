//! Exact depth-first branch and bound.
//!
//! The model is split into independent components (groups of dances that
//! share a constraint), each searched on its own. Because the objective is
//! a sum over dances and lexicographic order is compatible with addition,
//! the per-component optima add up to the global optimum.
//!
//! Within a component the search decides dance by dance whether to perform
//! it, and for a performed dance fills its positions one at a time, trying
//! the highest-tier free candidates first. A node is cut when
//!
//! - its positions can no longer all receive distinct free dancers
//!   (checked with a bipartite matching), or
//! - an optimistic completion (best free tier per open position, best
//!   static value for every later dance) cannot beat the incumbent.
//!
//! With `balance_load` on, the lineups found are then re-matched dance by
//! dance to spread positions across dancers without changing the score;
//! see [`balance`](super::balance).

use super::balance::rebalance;
use super::budget::Budget;
use super::config::SolverConfig;
use super::diagnostics::{Diagnostics, SolveEvent, Unstaffable};
use super::index::{Matching, ModelIndex};
use super::types::{RawSolution, SolverStatus};
use super::DanceSolver;
use crate::model::{AssignmentModel, Score, VarId};
use std::time::Instant;

/// Exact solver; the reference [`DanceSolver`] backend.
///
/// # Examples
///
/// ```
/// use who_dances_what::model::ModelBuilder;
/// use who_dances_what::roster::{Dance, Dancer, Preference, PreferenceEdge, Roster};
/// use who_dances_what::solver::{
///     BranchAndBoundSolver, DanceSolver, NullDiagnostics, SolverConfig, SolverStatus,
/// };
///
/// let dancers = vec![Dancer::new(1, "Ann"), Dancer::new(2, "Bob")];
/// let dances = vec![Dance::new(1, "Reel").with_position(1, "Top")];
/// let edges = vec![
///     PreferenceEdge::new(1, 1, 1, Preference::Yes),
///     PreferenceEdge::new(2, 1, 1, Preference::Favourite),
/// ];
/// let roster = Roster::normalize(&dancers, &dances, &edges).unwrap();
/// let model = ModelBuilder::new(&roster).build().unwrap();
///
/// let solution = BranchAndBoundSolver.solve(&model, &SolverConfig::default(), &NullDiagnostics);
/// assert_eq!(solution.status, SolverStatus::Optimal);
/// assert_eq!(model.var(solution.chosen[0]).dancer, 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBoundSolver;

impl BranchAndBoundSolver {
    pub fn new() -> Self {
        Self
    }
}

impl DanceSolver for BranchAndBoundSolver {
    fn name(&self) -> &'static str {
        "branch_and_bound"
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
            components: index.components.len(),
        });

        let budget = Budget::new(config, start);
        let outcomes = search_components(model, &index, config, &budget);

        let mut chosen = Vec::new();
        let mut score = Score::zero(index.criteria.len());
        let mut performed = 0;
        let mut proven = true;
        for (dances, outcome) in index.components.iter().zip(outcomes) {
            for (dance, reason) in outcome.unstaffable {
                diagnostics.on_event(&SolveEvent::DanceUnstaffable {
                    dance: model.dances[dance].id,
                    reason,
                });
            }
            diagnostics.on_event(&SolveEvent::ComponentSolved {
                dances: dances.iter().map(|&d| model.dances[d].id).collect(),
                performed: outcome.performed,
                nodes: outcome.nodes,
                proven: outcome.proven,
            });
            score.add(&outcome.score);
            performed += outcome.performed;
            proven &= outcome.proven;
            chosen.extend(outcome.chosen);
        }
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

/// Best assignment of one component.
struct Outcome {
    chosen: Vec<VarId>,
    score: Score,
    performed: usize,
    proven: bool,
    nodes: u64,
    unstaffable: Vec<(usize, Unstaffable)>,
}

fn search_components(
    model: &AssignmentModel,
    index: &ModelIndex,
    config: &SolverConfig,
    budget: &Budget,
) -> Vec<Outcome> {
    let mut outcomes = search_all(model, index, config, budget);
    if config.balance_load {
        balance_outcomes(model, index, &mut outcomes);
    }
    outcomes
}

fn search_all(
    model: &AssignmentModel,
    index: &ModelIndex,
    config: &SolverConfig,
    budget: &Budget,
) -> Vec<Outcome> {
    #[cfg(feature = "parallel")]
    if config.num_workers > 1 {
        if let Some(outcomes) = search_parallel(model, index, config.num_workers, budget) {
            return outcomes;
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = config;

    index
        .components
        .iter()
        .map(|dances| ComponentSearch::new(model, index, budget, dances).run())
        .collect()
}

/// Searches components on a dedicated rayon pool, keeping component order.
#[cfg(feature = "parallel")]
fn search_parallel(
    model: &AssignmentModel,
    index: &ModelIndex,
    workers: usize,
    budget: &Budget,
) -> Option<Vec<Outcome>> {
    use rayon::prelude::*;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .ok()?;
    Some(pool.install(|| {
        index
            .components
            .par_iter()
            .map(|dances| ComponentSearch::new(model, index, budget, dances).run())
            .collect()
    }))
}

/// Re-matches each proven single-dance lineup in component order, counting
/// the positions every dancer already holds in earlier components.
///
/// Lineups cut short by a budget are left as found, as are components
/// spanning several dances.
fn balance_outcomes(model: &AssignmentModel, index: &ModelIndex, outcomes: &mut [Outcome]) {
    let mut loads = vec![0u32; model.dancers.len()];
    for (dances, outcome) in index.components.iter().zip(outcomes.iter_mut()) {
        if let [dance] = dances.as_slice() {
            if outcome.proven && outcome.performed == 1 {
                if let Some(chosen) = rebalance(model, index, *dance, &loads) {
                    let mut score = index.bonus.clone();
                    for &id in &chosen {
                        score.add(&index.gains[id.0]);
                    }
                    outcome.score = score;
                    outcome.chosen = chosen;
                }
            }
        }
        for &id in &outcome.chosen {
            loads[model.var(id).dancer] += 1;
        }
    }
}

/// Candidates of one position, best first.
struct SlotPlan {
    vars: Vec<VarId>,
}

impl AsRef<[VarId]> for SlotPlan {
    fn as_ref(&self) -> &[VarId] {
        &self.vars
    }
}

struct Incumbent {
    score: Score,
    chosen: Vec<VarId>,
    performed: usize,
}

/// Depth-first search state for one component.
struct ComponentSearch<'a> {
    model: &'a AssignmentModel,
    index: &'a ModelIndex,
    budget: &'a Budget,
    /// Staffable dances, each as a list of positions to fill.
    plans: Vec<Vec<SlotPlan>>,
    /// Optimistic value of dances `i..`, for every `i`.
    suffix: Vec<Score>,
    unstaffable: Vec<(usize, Unstaffable)>,
    matching: Matching,
    taken: Vec<bool>,
    chosen: Vec<VarId>,
    acc: Score,
    performed: usize,
    best: Option<Incumbent>,
    nodes: u64,
    stopped: bool,
}

impl<'a> ComponentSearch<'a> {
    fn new(
        model: &'a AssignmentModel,
        index: &'a ModelIndex,
        budget: &'a Budget,
        dances: &[usize],
    ) -> Self {
        let mut plans = Vec::new();
        let mut unstaffable = Vec::new();
        for &dance in dances {
            if let Some(reason) = index.unstaffable(model, dance) {
                unstaffable.push((dance, reason));
                continue;
            }
            let mut slots: Vec<SlotPlan> = model.dances[dance]
                .slots
                .iter()
                .map(|&s| {
                    let mut vars = index.slot_vars[s].clone();
                    vars.sort_by(|&a, &b| {
                        index.gains[b.0].cmp(&index.gains[a.0]).then(a.cmp(&b))
                    });
                    SlotPlan { vars }
                })
                .collect();
            // fail first
            slots.sort_by_key(|slot| slot.vars.len());
            plans.push(slots);
        }

        let levels = index.criteria.len();
        let mut suffix = vec![Score::zero(levels); plans.len() + 1];
        for i in (0..plans.len()).rev() {
            let mut bound = suffix[i + 1].clone();
            bound.add(&index.bonus);
            for slot in &plans[i] {
                if let Some(first) = slot.vars.first() {
                    bound.add(&index.gains[first.0]);
                }
            }
            suffix[i] = bound;
        }

        Self {
            model,
            index,
            budget,
            plans,
            suffix,
            unstaffable,
            matching: Matching::new(model.dancers.len()),
            taken: vec![false; index.limit_count],
            chosen: Vec::new(),
            acc: Score::zero(levels),
            performed: 0,
            best: None,
            nodes: 0,
            stopped: false,
        }
    }

    fn run(mut self) -> Outcome {
        self.dance_step(0);
        let proven = !self.stopped;
        let best = self.best.take().unwrap_or_else(|| Incumbent {
            score: Score::zero(self.index.criteria.len()),
            chosen: Vec::new(),
            performed: 0,
        });
        Outcome {
            chosen: best.chosen,
            score: best.score,
            performed: best.performed,
            proven,
            nodes: self.nodes,
            unstaffable: self.unstaffable,
        }
    }

    /// Counts a node. Budgets only stop the search once an incumbent exists.
    fn enter(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        self.nodes += 1;
        if !self.budget.tick() && self.best.is_some() {
            self.stopped = true;
        }
        !self.stopped
    }

    /// Decide dance `i`: perform it first, then skip it.
    fn dance_step(&mut self, i: usize) {
        if !self.enter() {
            return;
        }
        if i == self.plans.len() {
            self.record_leaf();
            return;
        }

        if self.fits(i, 0) {
            self.acc.add(&self.index.bonus);
            self.performed += 1;
            self.slot_step(i, 0);
            self.performed -= 1;
            self.acc.sub(&self.index.bonus);
            if self.stopped {
                return;
            }
        }

        let mut bound = self.acc.clone();
        bound.add(&self.suffix[i + 1]);
        if !self.dominated(&bound) {
            self.dance_step(i + 1);
        }
    }

    /// Fill position `k` of dance `i`.
    fn slot_step(&mut self, i: usize, k: usize) {
        if !self.enter() {
            return;
        }
        if k == self.plans[i].len() {
            self.dance_step(i + 1);
            return;
        }

        if self.dominated(&self.bound(i, k)) {
            return;
        }

        for j in 0..self.plans[i][k].vars.len() {
            let id = self.plans[i][k].vars[j];
            if !self.index.is_free(&self.taken, id) {
                continue;
            }
            self.choose(id);
            if self.fits(i, k + 1) {
                self.slot_step(i, k + 1);
            }
            self.unchoose(id);
            if self.stopped {
                return;
            }
        }
    }

    /// Whether positions `k..` of dance `i` can still all be filled.
    fn fits(&mut self, i: usize, k: usize) -> bool {
        let index = self.index;
        let taken = &self.taken;
        self.matching
            .covers(self.model, &self.plans[i][k..], |id| index.is_free(taken, id))
    }

    /// Optimistic value of the current node with positions `k..` of dance
    /// `i` still open.
    fn bound(&self, i: usize, k: usize) -> Score {
        let mut bound = self.acc.clone();
        for slot in &self.plans[i][k..] {
            let best_free = slot
                .vars
                .iter()
                .find(|&&id| self.index.is_free(&self.taken, id));
            if let Some(id) = best_free {
                bound.add(&self.index.gains[id.0]);
            }
        }
        bound.add(&self.suffix[i + 1]);
        bound
    }

    /// Whether the subtree cannot beat the incumbent. Ties are cut too:
    /// the first assignment reaching a score is kept.
    fn dominated(&self, bound: &Score) -> bool {
        self.best.as_ref().is_some_and(|best| *bound <= best.score)
    }

    fn record_leaf(&mut self) {
        let improves = self.best.as_ref().map_or(true, |best| self.acc > best.score);
        if improves {
            self.best = Some(Incumbent {
                score: self.acc.clone(),
                chosen: self.chosen.clone(),
                performed: self.performed,
            });
        }
        if self.budget.stop_after_first {
            self.stopped = true;
        }
    }

    fn choose(&mut self, id: VarId) {
        let index = self.index;
        for &limit in &index.var_limits[id.0] {
            self.taken[limit] = true;
        }
        self.acc.add(&index.gains[id.0]);
        self.chosen.push(id);
    }

    fn unchoose(&mut self, id: VarId) {
        let index = self.index;
        for &limit in &index.var_limits[id.0] {
            self.taken[limit] = false;
        }
        self.acc.sub(&index.gains[id.0]);
        self.chosen.pop();
    }
}
