//! Evaluation harness shared by evolution strategies.
//!
//! The harness owns everything a strategy needs to turn genes into a fitness
//! vector: split configuration, the transformer template, the ordered
//! fitness functions and their comparison order. Strategies implement
//! [`EvolutionStrategy`] on top of it.

use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dataset::{EvaluationContext, Split};
use crate::error::{DDEError, Result};
use crate::fitness_order::FitnessOrder;
use crate::individual::Individual;
use crate::parallel_eval::{EvaluationTask, ParallelConfig, WorkerPool};
use crate::split::{subset_rows, train_test_split};
use crate::statistics::{Statistics, StatsMode};
use crate::transformer::{FitnessFn, Transformer};

/// Knobs common to every evolution strategy
#[derive(Debug, Clone)]
pub struct EvolutionConfig {
	/// Number of generations, including generation 0
	pub n_gen: usize,
	/// Validation fraction of each split, in (0, 1)
	pub split_size: f64,
	/// Fraction of rows sampled before splitting, in (0, 1]
	pub train_subset_size: f64,
	pub stats: StatsMode,
	pub parallel: ParallelConfig,
	/// Seed of the master RNG; also fixes the split permutation
	pub seed: Option<u64>,
	/// Emit every generation record at info level
	pub verbose: bool,
}

impl Default for EvolutionConfig {
	fn default() -> Self {
		Self {
			n_gen: 25,
			split_size: 0.33,
			train_subset_size: 1.0,
			stats: StatsMode::None,
			parallel: ParallelConfig::default(),
			seed: None,
			verbose: false,
		}
	}
}

/// Base evaluation machinery: split, fit the transformer, score.
pub struct EvolutionHarness {
	pub config: EvolutionConfig,
	n_dim: usize,
	fitness: Vec<FitnessFn>,
	order: FitnessOrder,
	transformer: Option<Arc<dyn Transformer>>,
	gene_slice: Option<Range<usize>>,
	timing: bool,
}

impl EvolutionHarness {
	pub fn new(config: EvolutionConfig) -> Self {
		Self {
			config,
			n_dim: 0,
			fitness: Vec::new(),
			order: FitnessOrder::minimize(0),
			transformer: None,
			gene_slice: None,
			timing: metric_evolve_env::timing_enabled(),
		}
	}

	/// Bind the search space, objectives and transformer for the next runs.
	pub fn configure(
		&mut self,
		n_dim: usize,
		fitness: Vec<FitnessFn>,
		order: FitnessOrder,
		transformer: Option<Arc<dyn Transformer>>,
		seed: Option<u64>,
		verbose: bool,
	) {
		self.n_dim = n_dim;
		self.fitness = fitness;
		self.order = order;
		self.transformer = transformer;
		self.config.seed = seed;
		self.config.verbose = verbose;
	}

	/// Hand only `range` of the genotype to the transformer
	pub fn set_gene_slice(&mut self, range: Option<Range<usize>>) {
		self.gene_slice = range;
	}

	pub fn n_dim(&self) -> usize {
		self.n_dim
	}

	pub fn n_objectives(&self) -> usize {
		self.fitness.len()
	}

	pub fn order(&self) -> &FitnessOrder {
		&self.order
	}

	/// Check everything a run relies on before the first evaluation
	pub fn validate(&self) -> Result<()> {
		check_subset_size(self.config.train_subset_size)?;
		let split = self.config.split_size;
		if !(split > 0.0 && split < 1.0) {
			return Err(DDEError::InvalidSplitSize { value: split });
		}
		if self.fitness.is_empty() {
			return Err(DDEError::NoFitnessFunctions);
		}
		if self.order.n_objectives() != self.fitness.len() {
			return Err(DDEError::ObjectiveCountMismatch {
				expected: self.order.n_objectives(),
				got: self.fitness.len(),
			});
		}
		if self.n_dim == 0 {
			return Err(DDEError::InvalidPopulation { reason: "genotype has no genes".into() });
		}
		if let Some(r) = &self.gene_slice {
			if r.start >= r.end || r.end > self.n_dim {
				return Err(DDEError::InvalidGeneSlice { start: r.start, end: r.end, n_genes: self.n_dim });
			}
		}
		Ok(())
	}

	/// Train/validation split, optionally on a random sub-sample of the rows.
	pub fn split<R: Rng + ?Sized>(
		&self,
		x: &Array2<f64>,
		y: &Array1<f64>,
		rng: &mut R,
	) -> Result<Split> {
		let subset = self.config.train_subset_size;
		check_subset_size(subset)?;
		if x.nrows() != y.len() {
			return Err(DDEError::DatasetShape { x_rows: x.nrows(), y_rows: y.len() });
		}

		let rows: Vec<usize> =
			if subset == 1.0 { (0..x.nrows()).collect() } else { subset_rows(x.nrows(), subset, rng) };

		match self.config.seed {
			Some(seed) => {
				let mut split_rng = StdRng::seed_from_u64(seed);
				train_test_split(x, y, &rows, self.config.split_size, &mut split_rng)
			}
			None => train_test_split(x, y, &rows, self.config.split_size, rng),
		}
	}

	/// The part of the genotype the transformer is fitted with
	pub fn cut_individual<'g>(&self, genes: &'g [f64]) -> Result<&'g [f64]> {
		match &self.gene_slice {
			Some(r) => genes.get(r.clone()).filter(|cut| !cut.is_empty()).ok_or(DDEError::InvalidGeneSlice {
				start: r.start,
				end: r.end,
				n_genes: genes.len(),
			}),
			None => Ok(genes),
		}
	}

	/// Score `genes` on a fresh split; the individual itself is not touched.
	pub fn evaluate<R: Rng + ?Sized>(
		&self,
		ctx: &EvaluationContext<'_>,
		genes: &Array1<f64>,
		rng: &mut R,
	) -> Result<Vec<f64>> {
		let t0 = Instant::now();
		let Split { mut x_train, mut x_test, y_train, y_test } = self.split(ctx.x(), ctx.y(), rng)?;

		if let Some(template) = &self.transformer {
			let params = genes.to_vec();
			let cut = self.cut_individual(&params)?;
			let mut transformer = template.duplicate_instance();
			transformer.fit(&x_train, &y_train, cut).map_err(DDEError::TransformerFit)?;
			x_train = transformer.transform(&x_train);
			x_test = transformer.transform(&x_test);
		}

		let scores = self.fitness.iter().map(|f| f(&x_train, &x_test, &y_train, &y_test)).collect();
		if self.timing {
			log::trace!("evaluate: {:.3} ms", t0.elapsed().as_secs_f64() * 1e3);
		}
		Ok(scores)
	}

	/// Evaluate a dispatched task with its own seeded RNG
	pub fn evaluate_task(&self, ctx: &EvaluationContext<'_>, task: &EvaluationTask) -> Result<Vec<f64>> {
		let mut rng = StdRng::seed_from_u64(task.seed);
		self.evaluate(ctx, &task.genes, &mut rng)
	}

	pub fn build_statistics(&self) -> Option<Statistics> {
		Statistics::from_mode(&self.config.stats)
	}

	/// Worker pool sized from the parallel configuration
	pub fn worker_pool(&self) -> Result<WorkerPool> {
		WorkerPool::new(&self.config.parallel)
	}
}

fn check_subset_size(subset: f64) -> Result<()> {
	if subset > 0.0 && subset <= 1.0 {
		Ok(())
	} else {
		Err(DDEError::InvalidSubsetSize { value: subset })
	}
}

/// Algorithm-level contract of an evolution strategy.
///
/// The defaults report the operation as not implemented.
pub trait EvolutionStrategy {
	fn harness(&self) -> &EvolutionHarness;

	fn harness_mut(&mut self) -> &mut EvolutionHarness;

	/// Search for the best transformer parameters on `(x, y)`
	fn fit(&mut self, _x: &Array2<f64>, _y: &Array1<f64>) -> Result<&mut Self>
	where
		Self: Sized,
	{
		Err(DDEError::NotImplemented { operation: "fit" })
	}

	/// Best candidate found by the last `fit`
	fn best_individual(&self) -> Result<&Individual> {
		Err(DDEError::NotImplemented { operation: "best_individual" })
	}
}
