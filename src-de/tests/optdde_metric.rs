use std::sync::Arc;

use ndarray::{Array1, Array2};

use metric_evolve_dde::{
    DDEConfigBuilder, DDEError, DynamicDifferentialEvolution, EvolutionStrategy, FitnessOrder, StatsMode,
};

mod common;
use common::{DiagonalScaling, init_logging, nearest_neighbour_accuracy};

/// Feature 0 separates the classes, feature 1 is large-scale noise
fn noisy_dataset(n: usize) -> (Array2<f64>, Array1<f64>) {
    let y = Array1::from_iter((0..n).map(|i| (i % 2) as f64));
    let x = Array2::from_shape_fn((n, 2), |(i, j)| {
        if j == 0 { y[i] + 0.01 * (i % 5) as f64 } else { ((i * 7919) % 101) as f64 }
    });
    (x, y)
}

#[test]
fn test_dde_learns_feature_weights() {
    init_logging();
    let (x, y) = noisy_dataset(60);
    let config = DDEConfigBuilder::new()
        .seed(17)
        .n_gen(8)
        .population_size(2)
        .stats(StatsMode::Numeric)
        .max_workers(2)
        .build();
    let mut dde = DynamicDifferentialEvolution::new(config);
    dde.configure(
        2,
        vec![nearest_neighbour_accuracy()],
        FitnessOrder::maximize(1),
        Some(Arc::new(DiagonalScaling::new())),
        Some(17),
        false,
    );
    dde.fit(&x, &y).unwrap();

    let records = dde.logbook().records();
    let first = records[0].best.as_ref().unwrap()[0];
    let best = dde.best_individual().unwrap();
    assert!(best.fitness.values()[0] >= first);
    assert!((0.0..=1.0).contains(&best.fitness.values()[0]));
}

#[test]
fn test_gene_slice_and_transformer_errors() {
    init_logging();
    let (x, y) = noisy_dataset(30);
    let config = DDEConfigBuilder::new().seed(1).n_gen(3).population_size(2).build();
    let mut dde = DynamicDifferentialEvolution::new(config);
    dde.configure(
        3,
        vec![nearest_neighbour_accuracy()],
        FitnessOrder::maximize(1),
        Some(Arc::new(DiagonalScaling::new())),
        Some(1),
        false,
    );
    // three genes but only two features: the transformer refuses
    let err = dde.fit(&x, &y).err().unwrap();
    assert!(matches!(err, DDEError::TransformerFit(_)));

    dde.harness_mut().set_gene_slice(Some(1..3));
    dde.fit(&x, &y).unwrap();
    assert_eq!(dde.best_individual().unwrap().len(), 3);
}
