//! Criterion benchmarks for the assignment solvers.
//!
//! Uses seeded random rosters so runs are comparable.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use who_dances_what::model::ModelBuilder;
use who_dances_what::roster::{Dance, Dancer, Preference, PreferenceEdge, Roster};
use who_dances_what::solver::{
    BranchAndBoundSolver, BruteForceSolver, DanceSolver, NullDiagnostics, SolverConfig,
};

struct Instance {
    dancers: Vec<Dancer>,
    dances: Vec<Dance>,
    edges: Vec<PreferenceEdge>,
}

/// `dances` dances of 2..=4 positions; each dancer rates each position
/// with probability `density`.
fn random_instance(dancers: i64, dances: i64, density: f64, seed: u64) -> Instance {
    let mut rng = StdRng::seed_from_u64(seed);
    let dancer_list: Vec<Dancer> = (1..=dancers)
        .map(|i| Dancer::new(i, format!("dancer-{i}")))
        .collect();
    let mut dance_list = Vec::new();
    let mut edges = Vec::new();
    for d in 1..=dances {
        let mut dance = Dance::new(d, format!("dance-{d}"));
        for p in 1..=rng.random_range(2..=4i64) {
            dance = dance.with_position(p, format!("pos-{p}"));
            for i in 1..=dancers {
                if rng.random_bool(density) {
                    let preference = Preference::ALL[rng.random_range(0..Preference::ALL.len())];
                    edges.push(PreferenceEdge::new(i, d, p, preference));
                }
            }
        }
        dance_list.push(dance);
    }
    Instance {
        dancers: dancer_list,
        dances: dance_list,
        edges,
    }
}

fn bench_branch_and_bound(c: &mut Criterion) {
    let mut group = c.benchmark_group("branch_and_bound");
    group.sample_size(10);

    for &(dancers, dances) in &[(8, 6), (12, 12), (20, 24)] {
        let instance = random_instance(dancers, dances, 0.5, 42);
        let roster = Roster::normalize(&instance.dancers, &instance.dances, &instance.edges)
            .expect("valid instance");
        let model = ModelBuilder::new(&roster).build().expect("valid model");
        for balance in [true, false] {
            let config = SolverConfig::default().with_balance_load(balance);
            group.bench_with_input(
                BenchmarkId::new(format!("balance_{balance}"), format!("{dancers}x{dances}")),
                &(&model, config),
                |b, (m, c)| b.iter(|| BranchAndBoundSolver.solve(black_box(m), c, &NullDiagnostics)),
            );
        }
    }
    group.finish();
}

fn bench_brute_force(c: &mut Criterion) {
    let mut group = c.benchmark_group("brute_force");
    group.sample_size(10);

    for &(dancers, dances) in &[(4, 2), (5, 3)] {
        let instance = random_instance(dancers, dances, 0.6, 7);
        let roster = Roster::normalize(&instance.dancers, &instance.dances, &instance.edges)
            .expect("valid instance");
        let model = ModelBuilder::new(&roster).build().expect("valid model");
        let config = SolverConfig::default();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{dancers}x{dances}")),
            &(&model, config),
            |b, (m, c)| b.iter(|| BruteForceSolver.solve(black_box(m), c, &NullDiagnostics)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_branch_and_bound, bench_brute_force);
criterion_main!(benches);
