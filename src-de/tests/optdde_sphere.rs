use std::sync::Arc;

use metric_evolve_dde::{DDEConfigBuilder, DynamicDifferentialEvolution, EvolutionStrategy, FitnessOrder};

mod common;
use common::{Echo, dataset, init_logging, squared_distance};

/// One-dimensional sphere around 0.3: two sub-populations of 2 regular + 1
/// brownian individuals in (-1, 1), five generations.
fn sphere_1d(seed: u64) -> DynamicDifferentialEvolution {
    let (x, y) = dataset(40, 2);
    let config = DDEConfigBuilder::new()
        .n_gen(5)
        .population_size(2)
        .population_regular(2)
        .population_brownian(1)
        .bounds(-1.0, 1.0)
        .build();
    let mut dde = DynamicDifferentialEvolution::new(config);
    dde.configure(
        1,
        vec![squared_distance(vec![0.3])],
        FitnessOrder::minimize(1),
        Some(Arc::new(Echo::new())),
        Some(seed),
        false,
    );
    dde.fit(&x, &y).unwrap();
    dde
}

/// Hall-of-fame score of every generation record
fn best_per_generation(dde: &DynamicDifferentialEvolution) -> Vec<f64> {
    dde.logbook().records().iter().map(|r| r.best.as_ref().unwrap()[0]).collect()
}

#[test]
fn test_dde_sphere_1d() {
    init_logging();
    let dde = sphere_1d(1);
    let best = best_per_generation(&dde);
    assert_eq!(best.len(), 5);
    for w in best.windows(2) {
        assert!(w[1] <= w[0], "best fitness increased: {:?}", best);
    }
    assert!(best[4] < best[0], "no improvement over {:?}", best);

    let final_best = dde.best_individual().unwrap();
    assert!(final_best.fitness.values()[0] <= best[4]);
}

#[test]
fn test_dde_sphere_1d_improves_across_seeds() {
    init_logging();
    let seeds = 0..60u64;
    let mut improved = 0;
    for seed in seeds.clone() {
        let best = best_per_generation(&sphere_1d(seed));
        assert_eq!(best.len(), 5);
        for w in best.windows(2) {
            assert!(w[1] <= w[0], "seed {}: best fitness increased: {:?}", seed, best);
        }
        if best[4] < best[0] {
            improved += 1;
        }
    }
    // a lucky generation-0 champion can survive five generations; most runs improve
    assert!(improved >= 45, "only {} of {} seeds improved", improved, seeds.count());
}

#[test]
fn test_dde_sphere_3d_parallel() {
    init_logging();
    let (x, y) = dataset(60, 2);
    let config = DDEConfigBuilder::new()
        .seed(3)
        .n_gen(30)
        .population_size(3)
        .max_workers(3)
        .build();
    let mut dde = DynamicDifferentialEvolution::new(config);
    dde.configure(
        3,
        vec![squared_distance(vec![0.1, -0.2, 0.4])],
        FitnessOrder::minimize(1),
        Some(Arc::new(Echo::new())),
        Some(3),
        false,
    );
    dde.fit(&x, &y).unwrap();

    let report = dde.report().unwrap();
    assert!(report.success);
    assert_eq!(report.nit, 30);
    assert!(report.best.fitness.values()[0] < 0.05, "{:?}", report);
}
