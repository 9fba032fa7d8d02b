//! Dynamic Differential Evolution (DDE) for metric learning
//!
//! Searches the parameters of a metric transformer by directly optimizing a
//! validation objective that may be noisy and non-differentiable. Each
//! evaluation fits a fresh transformer on a resampled train/validation split
//! and scores it with user supplied fitness functions.
//!
//! Supported features:
//! - K sub-populations tracking distinct optima, kept apart by an exclusion radius
//! - Landscape change detection by re-scoring sub-population champions
//! - DE/best/2 mutation with binomial crossover for the regular tier
//! - Brownian (Gaussian) local search for the tail of each sub-population
//! - Multi-objective fitness with an explicit lexicographic or weighted order
//! - Optional random sub-sampling of the dataset before each split
//! - Parallel evaluation on a bounded worker pool, reproducible under a seed
//! - Generation log with numeric or raw statistics, JSON and CSV export

#![allow(missing_docs)]
use std::fmt;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

pub mod argbest;
pub mod brownian;
pub mod crossover_binomial;
pub mod dataset;
pub mod distinct_indices;
pub mod dynamic_differential_evolution;
pub mod error;
pub mod exclusion;
pub mod fitness_order;
pub mod hall_of_fame;
pub mod individual;
pub mod init_random;
pub mod mutant_best2;
pub mod parallel_eval;
pub mod recorder;
pub mod split;
pub mod statistics;
pub mod strategy;
pub mod transformer;


pub use dataset::{Dataset, EvaluationContext, Split};
pub use dynamic_differential_evolution::DynamicDifferentialEvolution;
pub use error::{BoxedError, DDEError, Result};
pub use exclusion::exclusion_radius;
pub use fitness_order::FitnessOrder;
pub use hall_of_fame::HallOfFame;
pub use individual::{Fitness, Individual};
pub use parallel_eval::{EvaluationTask, IndexedFitness, ParallelConfig, WorkerPool};
pub use recorder::{load_logbook_json, save_logbook_csv, save_logbook_json, save_to_records_dir};
pub use statistics::{
	AggregateFn, CustomStats, GenerationRecord, Logbook, NumericStats, RecordStats, Statistics, StatsMode,
};
pub use strategy::{EvolutionConfig, EvolutionHarness, EvolutionStrategy};
pub use transformer::{FitnessFn, Transformer, fitness_fn};

/// What happens when an offspring scores exactly as well as its parent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TiePolicy {
	/// Offspring replaces the parent (`offspring >= parent`)
	#[default]
	Replace,
	/// Parent survives; only strict improvements are accepted
	KeepParent,
}

/// Information passed to callback after each generation
pub struct DDEIntermediate {
	pub generation: usize,
	/// Hall-of-fame genes
	pub x: Array1<f64>,
	/// Hall-of-fame fitness
	pub fitness: Vec<f64>,
	/// Objective evaluations so far
	pub nfev: usize,
	pub changed: bool,
}

/// Action returned by callback
pub enum CallbackAction {
	Continue,
	Stop,
}

/// Configuration for the Dynamic Differential Evolution optimizer
pub struct DDEConfig {
	pub evolution: EvolutionConfig,
	/// Number of sub-populations (K), ideally the number of peaks
	pub population_size: usize,
	/// Individuals per sub-population evolved by DE
	pub population_regular: usize,
	/// Individuals per sub-population regenerated around the best each generation
	pub population_brownian: usize,
	/// Crossover rate in [0, 1]
	pub cr: f64,
	/// Differential weight in [0, 2]
	pub f: f64,
	/// Gene range (lower, upper) for every dimension
	pub bounds: (f64, f64),
	/// Standard deviation of brownian perturbations
	pub sigma: f64,
	pub tie_policy: TiePolicy,
	/// Optional per-generation callback (may stop early)
	pub callback: Option<Box<dyn FnMut(&DDEIntermediate) -> CallbackAction>>,
}

impl Default for DDEConfig {
	fn default() -> Self {
		Self {
			evolution: EvolutionConfig::default(),
			population_size: 10,
			population_regular: 4,
			population_brownian: 2,
			cr: 0.6,
			f: 0.4,
			bounds: (-1.0, 1.0),
			sigma: 0.3,
			tie_policy: TiePolicy::default(),
			callback: None,
		}
	}
}

/// Fluent builder for `DDEConfig` for ergonomic configuration.
pub struct DDEConfigBuilder {
	cfg: DDEConfig,
}

impl Default for DDEConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl DDEConfigBuilder {
	pub fn new() -> Self {
		Self { cfg: DDEConfig::default() }
	}
	pub fn n_gen(mut self, v: usize) -> Self {
		self.cfg.evolution.n_gen = v;
		self
	}
	pub fn population_size(mut self, v: usize) -> Self {
		self.cfg.population_size = v;
		self
	}
	pub fn population_regular(mut self, v: usize) -> Self {
		self.cfg.population_regular = v;
		self
	}
	pub fn population_brownian(mut self, v: usize) -> Self {
		self.cfg.population_brownian = v;
		self
	}
	pub fn cr(mut self, v: f64) -> Self {
		self.cfg.cr = v;
		self
	}
	pub fn f(mut self, v: f64) -> Self {
		self.cfg.f = v;
		self
	}
	pub fn bounds(mut self, lower: f64, upper: f64) -> Self {
		self.cfg.bounds = (lower, upper);
		self
	}
	pub fn sigma(mut self, v: f64) -> Self {
		self.cfg.sigma = v;
		self
	}
	pub fn tie_policy(mut self, v: TiePolicy) -> Self {
		self.cfg.tie_policy = v;
		self
	}
	pub fn split_size(mut self, v: f64) -> Self {
		self.cfg.evolution.split_size = v;
		self
	}
	pub fn train_subset_size(mut self, v: f64) -> Self {
		self.cfg.evolution.train_subset_size = v;
		self
	}
	pub fn stats(mut self, v: StatsMode) -> Self {
		self.cfg.evolution.stats = v;
		self
	}
	pub fn max_workers(mut self, v: usize) -> Self {
		self.cfg.evolution.parallel.max_workers = v;
		self
	}
	pub fn seed(mut self, v: u64) -> Self {
		self.cfg.evolution.seed = Some(v);
		self
	}
	pub fn verbose(mut self, v: bool) -> Self {
		self.cfg.evolution.verbose = v;
		self
	}
	pub fn callback(mut self, cb: Box<dyn FnMut(&DDEIntermediate) -> CallbackAction>) -> Self {
		self.cfg.callback = Some(cb);
		self
	}
	pub fn build(self) -> DDEConfig {
		self.cfg
	}
}

/// Result/Report of a DDE run
#[derive(Clone, Serialize, Deserialize)]
pub struct DDEReport {
	pub best: Individual,
	pub success: bool,
	pub message: String,
	/// Generations run, including generation 0
	pub nit: usize,
	pub nfev: usize,
}

impl fmt::Debug for DDEReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DDEReport")
			.field("x", &format!("len={}", self.best.len()))
			.field("fitness", &self.best.fitness.values())
			.field("success", &self.success)
			.field("message", &self.message)
			.field("nit", &self.nit)
			.field("nfev", &self.nfev)
			.finish()
	}
}

#[cfg(test)]
mod config_tests {
	use super::*;

	#[test]
	fn test_builder_sets_nested_config() {
		let cfg = DDEConfigBuilder::new()
			.n_gen(7)
			.population_size(3)
			.population_regular(2)
			.population_brownian(1)
			.bounds(-2.0, 2.0)
			.max_workers(4)
			.seed(9)
			.tie_policy(TiePolicy::KeepParent)
			.build();
		assert_eq!(cfg.evolution.n_gen, 7);
		assert_eq!(cfg.population_size, 3);
		assert_eq!(cfg.bounds, (-2.0, 2.0));
		assert_eq!(cfg.evolution.parallel.max_workers, 4);
		assert_eq!(cfg.evolution.seed, Some(9));
		assert_eq!(cfg.tie_policy, TiePolicy::KeepParent);
	}

	#[test]
	fn test_defaults() {
		let cfg = DDEConfig::default();
		assert_eq!(cfg.evolution.n_gen, 25);
		assert_eq!(cfg.evolution.split_size, 0.33);
		assert_eq!(cfg.evolution.train_subset_size, 1.0);
		assert_eq!(cfg.evolution.parallel.max_workers, 1);
		assert_eq!((cfg.population_regular, cfg.population_brownian), (4, 2));
		assert_eq!((cfg.cr, cfg.f, cfg.sigma), (0.6, 0.4, 0.3));
		assert_eq!(cfg.tie_policy, TiePolicy::Replace);
	}
}
