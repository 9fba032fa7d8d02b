use std::sync::Arc;

use metric_evolve_dde::{
    DDEConfigBuilder, DynamicDifferentialEvolution, EvolutionStrategy, FitnessOrder, StatsMode, load_logbook_json,
    save_to_records_dir,
};

mod common;
use common::{Echo, dataset, init_logging, squared_distance};

fn fitted(n_gen: usize) -> DynamicDifferentialEvolution {
    let (x, y) = dataset(30, 2);
    let config = DDEConfigBuilder::new()
        .seed(5)
        .n_gen(n_gen)
        .population_size(2)
        .stats(StatsMode::Numeric)
        .build();
    let mut dde = DynamicDifferentialEvolution::new(config);
    dde.configure(
        2,
        vec![squared_distance(vec![0.0, 0.5]), squared_distance(vec![0.5, 0.0])],
        FitnessOrder::minimize(2),
        Some(Arc::new(Echo::new())),
        Some(5),
        false,
    );
    dde.fit(&x, &y).unwrap();
    dde
}

#[test]
fn test_csv_has_header_and_one_row_per_generation() {
    init_logging();
    let dde = fitted(4);
    let dir = tempfile::tempdir().unwrap();
    let csv_path = save_to_records_dir(dde.logbook(), "sphere_2obj", Some(dir.path())).unwrap();

    let text = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1 + 4);
    assert!(lines[0].starts_with("gen,nevals,changed,excluded,best_0,best_1,avg_0,avg_1"));
    assert!(lines[0].ends_with("max_0,max_1"));
    assert!(lines[1].starts_with("0,12,false,0,"));

    let back = load_logbook_json(dir.path().join("sphere_2obj.json")).unwrap();
    assert_eq!(&back, dde.logbook());
}

#[test]
fn test_default_records_dir_from_environment() {
    let dde = fitted(2);
    let root = tempfile::tempdir().unwrap();
    let original = std::env::var("METRIC_EVOLVE_DIR").ok();
    unsafe { std::env::set_var("METRIC_EVOLVE_DIR", root.path()) };

    let csv_path = save_to_records_dir(dde.logbook(), "env_run", None).unwrap();
    assert_eq!(csv_path, root.path().join("data_generated/records/env_run.csv"));
    assert!(csv_path.exists());

    match original {
        Some(v) => unsafe { std::env::set_var("METRIC_EVOLVE_DIR", v) },
        None => unsafe { std::env::remove_var("METRIC_EVOLVE_DIR") },
    }
}
