//! End-to-end planning: raw records in, assignment out.

use crate::assignment::AssignmentResult;
use crate::error::Error;
use crate::model::{ModelBuilder, Objective};
use crate::roster::{Dance, Dancer, PreferenceEdge, Roster};
use crate::solver::{
    BranchAndBoundSolver, DanceSolver, Diagnostics, SolveEvent, SolverConfig, TracingDiagnostics,
};

/// Runs the normalize, build, solve and extract stages in order.
///
/// Holds no state between calls; every call builds a fresh roster and
/// model.
///
/// # Examples
///
/// ```
/// use who_dances_what::planner::Planner;
/// use who_dances_what::roster::{Dance, DanceId, Dancer, PositionId, Preference, PreferenceEdge};
/// use who_dances_what::solver::SolverStatus;
///
/// let dancers = vec![Dancer::new(1, "Ann"), Dancer::new(2, "Bob")];
/// let dances = vec![Dance::new(7, "Haymakers")
///     .with_position(1, "First")
///     .with_position(2, "Second")];
/// let edges = vec![
///     PreferenceEdge::new(1, 7, 1, Preference::Yes),
///     PreferenceEdge::new(2, 7, 2, Preference::Favourite),
/// ];
///
/// let result = Planner::new().solve(&dancers, &dances, &edges).unwrap();
/// assert_eq!(result.status(), SolverStatus::Optimal);
/// assert_eq!(result.dancer_for(DanceId(7), PositionId(2)).unwrap().name, "Bob");
/// ```
#[derive(Debug, Clone)]
pub struct Planner<S = BranchAndBoundSolver> {
    solver: S,
    config: SolverConfig,
    objective: Objective,
}

impl Planner {
    /// Planner with the exact solver and default configuration.
    pub fn new() -> Self {
        Self::with_solver(BranchAndBoundSolver)
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DanceSolver> Planner<S> {
    pub fn with_solver(solver: S) -> Self {
        Self {
            solver,
            config: SolverConfig::default(),
            objective: Objective::standard(),
        }
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Plans a dance set, reporting progress to `diagnostics`.
    ///
    /// Fails on invalid configuration, malformed input or an inconsistent
    /// model. `Infeasible` is a status of the returned result, not an
    /// error.
    pub fn plan(
        &self,
        dancers: &[Dancer],
        dances: &[Dance],
        edges: &[PreferenceEdge],
        diagnostics: &dyn Diagnostics,
    ) -> Result<AssignmentResult, Error> {
        self.config.validate()?;

        let roster = Roster::normalize(dancers, dances, edges)?;
        let report = roster.report();
        diagnostics.on_event(&SolveEvent::RosterNormalized {
            dancers: roster.dancers().len(),
            dances: roster.dances().len(),
            candidates: roster.candidates().len(),
            inactive_dancers: report.inactive_dancers,
            dropped_edges: report.inactive_edges + report.forbidden_edges,
        });

        let model = match ModelBuilder::new(&roster)
            .with_objective(self.objective.clone())
            .build()
        {
            Ok(model) => model,
            Err(err) => {
                diagnostics.on_event(&SolveEvent::ModelRejected {
                    reason: err.to_string(),
                });
                return Err(err.into());
            }
        };
        diagnostics.on_event(&SolveEvent::ModelBuilt {
            vars: model.var_count(),
            constraints: model.constraint_count(),
        });

        let raw = self.solver.solve(&model, &self.config, diagnostics);
        Ok(AssignmentResult::extract(&roster, &model, &raw))
    }

    /// [`plan`](Self::plan) with diagnostics forwarded to `tracing`.
    pub fn solve(
        &self,
        dancers: &[Dancer],
        dances: &[Dance],
        edges: &[PreferenceEdge],
    ) -> Result<AssignmentResult, Error> {
        self.plan(dancers, dances, edges, &TracingDiagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, InputError};
    use crate::roster::{DanceId, DancerId, PositionId, Preference};
    use crate::solver::{BruteForceSolver, EventLog, NullDiagnostics, SolverStatus};
    use proptest::prelude::*;
    use std::collections::{BTreeSet, HashSet};

    fn one_position_dance(id: i64) -> Dance {
        Dance::new(id, format!("Dance {id}")).with_position(1, "Position 1")
    }

    fn solve(dancers: &[Dancer], dances: &[Dance], edges: &[PreferenceEdge]) -> AssignmentResult {
        Planner::new()
            .plan(dancers, dances, edges, &NullDiagnostics)
            .unwrap()
    }

    #[test]
    fn test_one_dancer_one_position() {
        let result = solve(
            &[Dancer::new(1, "Ann")],
            &[one_position_dance(1)],
            &[PreferenceEdge::new(1, 1, 1, Preference::Yes)],
        );
        assert_eq!(result.status(), SolverStatus::Optimal);
        assert_eq!(result.assignment_count(), 1);
        assert!(result.is_performed(DanceId(1)));
        assert_eq!(
            result.dancer_for(DanceId(1), PositionId(1)).map(|d| d.id),
            Some(DancerId(1))
        );
    }

    #[test]
    fn test_all_dancers_inactive() {
        let dancers: Vec<_> = (1i64..=4)
            .map(|i| Dancer::new(i, format!("D{i}")).inactive())
            .collect();
        let edges: Vec<_> = (1i64..=4)
            .map(|i| PreferenceEdge::new(i, 1, 1, Preference::Yes))
            .collect();
        let result = solve(&dancers, &[one_position_dance(1)], &edges);
        assert_eq!(result.status(), SolverStatus::Infeasible);
        assert_eq!(result.assignment_count(), 0);
        assert_eq!(result.performed_count(), 0);
    }

    #[test]
    fn test_two_dancers_two_positions() {
        let dance = Dance::new(1, "Reel")
            .with_position(1, "A")
            .with_position(2, "B");
        let result = solve(
            &[Dancer::new(1, "Ann"), Dancer::new(2, "Bob")],
            &[dance],
            &[
                PreferenceEdge::new(1, 1, 1, Preference::Yes),
                PreferenceEdge::new(2, 1, 2, Preference::Yes),
            ],
        );
        assert_eq!(result.status(), SolverStatus::Optimal);
        assert_eq!(result.assignment_count(), 2);
    }

    #[test]
    fn test_two_dancers_one_usable_position() {
        let dance = Dance::new(1, "Reel")
            .with_position(1, "A")
            .with_position(2, "B");
        let result = solve(
            &[Dancer::new(1, "Ann"), Dancer::new(2, "Bob")],
            &[dance],
            &[
                PreferenceEdge::new(1, 1, 1, Preference::Yes),
                PreferenceEdge::new(2, 1, 1, Preference::Yes),
            ],
        );
        assert_eq!(result.status(), SolverStatus::Infeasible);
        assert_eq!(result.assignment_count(), 0);
    }

    #[test]
    fn test_favourite_beats_yes() {
        let result = solve(
            &[Dancer::new(1, "Ann"), Dancer::new(2, "Bob")],
            &[one_position_dance(1)],
            &[
                PreferenceEdge::new(1, 1, 1, Preference::Yes),
                PreferenceEdge::new(2, 1, 1, Preference::Favourite),
            ],
        );
        assert_eq!(result.status(), SolverStatus::Optimal);
        assert_eq!(
            result.dancer_for(DanceId(1), PositionId(1)).map(|d| d.id),
            Some(DancerId(2))
        );
        assert_eq!(result.tally().favourite, 1);
    }

    #[test]
    fn test_one_dancer_two_dances() {
        let result = solve(
            &[Dancer::new(1, "Ann")],
            &[one_position_dance(1), one_position_dance(2)],
            &[
                PreferenceEdge::new(1, 1, 1, Preference::Yes),
                PreferenceEdge::new(1, 2, 1, Preference::Yes),
            ],
        );
        assert_eq!(result.status(), SolverStatus::Optimal);
        assert_eq!(result.assignment_count(), 2);
        assert_eq!(result.performed_count(), 2);
    }

    #[test]
    fn test_only_forbidden_edge() {
        let result = solve(
            &[Dancer::new(1, "Ann")],
            &[one_position_dance(1)],
            &[PreferenceEdge::new(1, 1, 1, Preference::Forbidden)],
        );
        assert_eq!(result.status(), SolverStatus::Infeasible);
        assert_eq!(result.assignment_count(), 0);
    }

    #[test]
    fn test_only_one_dance_staffable() {
        let result = solve(
            &[Dancer::new(1, "Ann")],
            &[
                one_position_dance(1),
                Dance::new(2, "Pair").with_position(1, "A").with_position(2, "B"),
            ],
            &[
                PreferenceEdge::new(1, 1, 1, Preference::Maybe),
                PreferenceEdge::new(1, 2, 1, Preference::Favourite),
            ],
        );
        assert_eq!(result.status(), SolverStatus::Optimal);
        assert_eq!(result.performed_count(), 1);
        assert!(result.is_performed(DanceId(1)));
        assert!(!result.is_performed(DanceId(2)));
        assert_eq!(result.tally().favourite, 0);
    }

    #[test]
    fn test_balancing_gives_everyone_a_dance() {
        let dancers = [Dancer::new(1, "Ann"), Dancer::new(2, "Bob")];
        let dances = [one_position_dance(1), one_position_dance(2)];
        let edges: Vec<_> = [(1, 1), (1, 2), (2, 1), (2, 2)]
            .into_iter()
            .map(|(dancer, dance): (i64, i64)| PreferenceEdge::new(dancer, dance, 1, Preference::Yes))
            .collect();

        let result = solve(&dancers, &dances, &edges);
        let first = result.dancer_for(DanceId(1), PositionId(1)).map(|d| d.id);
        let second = result.dancer_for(DanceId(2), PositionId(1)).map(|d| d.id);
        assert!(first.is_some() && second.is_some());
        assert_ne!(first, second);
    }

    #[test]
    fn test_input_errors_surface() {
        let err = Planner::new()
            .plan(
                &[Dancer::new(1, "Ann")],
                &[one_position_dance(1)],
                &[PreferenceEdge::new(2, 1, 1, Preference::Yes)],
                &NullDiagnostics,
            )
            .unwrap_err();
        assert!(matches!(err, Error::Input(InputError::UnknownDancer(DancerId(2)))));
    }

    #[test]
    fn test_invalid_config_surfaces() {
        let err = Planner::new()
            .with_config(SolverConfig::default().with_num_workers(0))
            .plan(&[], &[], &[], &NullDiagnostics)
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_invalid_objective_is_model_invalid() {
        let log = EventLog::new();
        let err = Planner::new()
            .with_objective(Objective::Hierarchical { objectives: Vec::new() })
            .plan(&[Dancer::new(1, "Ann")], &[one_position_dance(1)], &[], &log)
            .unwrap_err();
        assert!(matches!(err, Error::ModelInvalid(_)));
        assert_eq!(
            log.count(|e| matches!(e, SolveEvent::ModelRejected { .. })),
            1
        );
    }

    #[test]
    fn test_reports_pipeline_events() {
        let log = EventLog::new();
        Planner::new()
            .plan(
                &[Dancer::new(1, "Ann"), Dancer::new(2, "Bob").inactive()],
                &[one_position_dance(1)],
                &[
                    PreferenceEdge::new(1, 1, 1, Preference::Yes),
                    PreferenceEdge::new(2, 1, 1, Preference::Yes),
                ],
                &log,
            )
            .unwrap();

        let events = log.events();
        assert_eq!(
            events[0],
            SolveEvent::RosterNormalized {
                dancers: 1,
                dances: 1,
                candidates: 1,
                inactive_dancers: 1,
                dropped_edges: 1,
            }
        );
        assert!(matches!(events[1], SolveEvent::ModelBuilt { vars: 1, .. }));
        assert!(matches!(
            events.last(),
            Some(SolveEvent::SolveFinished { status: SolverStatus::Optimal, .. })
        ));
    }

    #[test]
    fn test_brute_force_backend() {
        let result = Planner::with_solver(BruteForceSolver)
            .plan(
                &[Dancer::new(1, "Ann")],
                &[one_position_dance(1)],
                &[PreferenceEdge::new(1, 1, 1, Preference::Maybe)],
                &NullDiagnostics,
            )
            .unwrap();
        assert_eq!(result.status(), SolverStatus::Optimal);
        assert_eq!(result.tally().maybe, 1);
    }

    /// A small random instance: up to four dancers, two dances, three
    /// positions each, every tier equally likely.
    #[derive(Debug, Clone)]
    struct Instance {
        dancers: Vec<Dancer>,
        dances: Vec<Dance>,
        edges: Vec<PreferenceEdge>,
    }

    fn instance() -> impl Strategy<Value = Instance> {
        (1usize..=4, prop::collection::vec(1usize..=3, 1..=2))
            .prop_flat_map(|(dancers, shape)| {
                let cells = dancers * shape.iter().sum::<usize>();
                (
                    Just(shape),
                    prop::collection::vec(0i64..=3, cells),
                    prop::collection::vec(prop::bool::weighted(0.85), dancers),
                )
            })
            .prop_map(|(shape, codes, active)| {
                let dancers = active
                    .iter()
                    .enumerate()
                    .map(|(i, &active)| {
                        let dancer = Dancer::new(i as i64 + 1, format!("D{i}"));
                        if active {
                            dancer
                        } else {
                            dancer.inactive()
                        }
                    })
                    .collect::<Vec<_>>();
                let mut dances = Vec::new();
                let mut edges = Vec::new();
                let mut codes = codes.into_iter();
                for (d, &positions) in shape.iter().enumerate() {
                    let mut dance = Dance::new(d as i64 + 1, format!("Dance {d}"));
                    for p in 1..=positions as i64 {
                        dance = dance.with_position(p, format!("P{p}"));
                        for dancer in &dancers {
                            let code = codes.next().unwrap_or(0);
                            edges.push(PreferenceEdge::new(
                                dancer.id,
                                dance.id,
                                p,
                                Preference::from_code(code).unwrap(),
                            ));
                        }
                    }
                    dances.push(dance);
                }
                Instance { dancers, dances, edges }
            })
    }

    fn performed_ids(result: &AssignmentResult) -> BTreeSet<DanceId> {
        result.performed_dances().map(|d| d.id).collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn branch_and_bound_matches_brute_force(inst in instance()) {
            let exact = Planner::new()
                .plan(&inst.dancers, &inst.dances, &inst.edges, &NullDiagnostics)
                .unwrap();
            let brute = Planner::with_solver(BruteForceSolver)
                .plan(&inst.dancers, &inst.dances, &inst.edges, &NullDiagnostics)
                .unwrap();

            prop_assert_eq!(exact.status(), brute.status());
            prop_assert_eq!(exact.objective_value(), brute.objective_value());
            prop_assert_eq!(exact.tally(), brute.tally());
        }

        #[test]
        fn balancing_keeps_the_score(inst in instance()) {
            let balanced = Planner::new()
                .plan(&inst.dancers, &inst.dances, &inst.edges, &NullDiagnostics)
                .unwrap();
            let plain = Planner::new()
                .with_config(SolverConfig::default().with_balance_load(false))
                .plan(&inst.dancers, &inst.dances, &inst.edges, &NullDiagnostics)
                .unwrap();

            prop_assert_eq!(balanced.status(), plain.status());
            prop_assert_eq!(balanced.objective_value(), plain.objective_value());
            prop_assert_eq!(performed_ids(&balanced), performed_ids(&plain));
        }

        #[test]
        fn assignments_respect_constraints(inst in instance()) {
            let result = Planner::new()
                .plan(&inst.dancers, &inst.dances, &inst.edges, &NullDiagnostics)
                .unwrap();

            for dance in &inst.dances {
                let lineup = result.lineup(dance.id);
                if result.is_performed(dance.id) {
                    prop_assert_eq!(lineup.len(), dance.positions.len());
                } else {
                    prop_assert!(lineup.is_empty());
                }
                let mut seen = HashSet::new();
                for placement in &lineup {
                    prop_assert!(seen.insert(placement.dancer.id));
                    prop_assert!(placement.dancer.active);
                    let edge = inst.edges.iter().find(|e| {
                        e.dancer == placement.dancer.id
                            && e.dance == dance.id
                            && e.position == placement.position.id
                    });
                    prop_assert!(edge.is_some_and(|e| e.preference.is_assignable()));
                }
            }
        }

        #[test]
        fn permuted_input_gives_same_outcome(inst in instance(), seed in any::<u64>()) {
            let original = solve(&inst.dancers, &inst.dances, &inst.edges);

            // rotate every list by a seed-derived amount
            let rotate = |len: usize| if len == 0 { 0 } else { (seed as usize) % len };
            let mut dancers = inst.dancers.clone();
            let n = rotate(dancers.len());
            dancers.rotate_left(n);
            let mut dances = inst.dances.clone();
            dances.reverse();
            let n = rotate(dances.len());
            dances.rotate_left(n);
            let mut edges = inst.edges.clone();
            edges.reverse();
            let n = rotate(edges.len());
            edges.rotate_left(n);

            let permuted = solve(&dancers, &dances, &edges);
            prop_assert_eq!(original.status(), permuted.status());
            prop_assert_eq!(performed_ids(&original), performed_ids(&permuted));
            prop_assert_eq!(original.tally(), permuted.tally());
        }

        #[test]
        fn strictly_higher_tier_wins(
            low in 1i64..=2,
            gap in 1i64..=2,
            swap in any::<bool>(),
        ) {
            let high = (low + gap).min(3);
            prop_assume!(high > low);
            let dancers = [Dancer::new(1, "Ann"), Dancer::new(2, "Bob")];
            let mut edges = vec![
                PreferenceEdge::new(1, 1, 1, Preference::from_code(low).unwrap()),
                PreferenceEdge::new(2, 1, 1, Preference::from_code(high).unwrap()),
            ];
            if swap {
                edges.reverse();
            }

            let result = solve(&dancers, &[one_position_dance(1)], &edges);
            prop_assert_eq!(
                result.dancer_for(DanceId(1), PositionId(1)).map(|d| d.id),
                Some(DancerId(2))
            );
        }
    }
}
