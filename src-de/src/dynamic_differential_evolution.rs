//! The DDE engine: K sub-populations evolved with DE/best/2 plus a brownian
//! tail, with landscape change detection and exclusion between
//! sub-populations.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

use crate::argbest::argbest;
use crate::brownian::brownian_individual;
use crate::crossover_binomial::binomial_crossover;
use crate::dataset::EvaluationContext;
use crate::distinct_indices::random_donors;
use crate::error::{DDEError, Result};
use crate::exclusion::{excluded_subpopulations, exclusion_radius};
use crate::fitness_order::FitnessOrder;
use crate::hall_of_fame::HallOfFame;
use crate::individual::Individual;
use crate::init_random::init_random;
use crate::mutant_best2::mutant_best2;
use crate::parallel_eval::{EvaluationTask, IndexedFitness, WorkerPool};
use crate::statistics::{GenerationRecord, Logbook, Statistics};
use crate::strategy::{EvolutionHarness, EvolutionStrategy};
use crate::transformer::{FitnessFn, Transformer};
use crate::{CallbackAction, DDEConfig, DDEIntermediate, DDEReport, TiePolicy};

type Callback = Box<dyn FnMut(&DDEIntermediate) -> CallbackAction>;

/// Algorithm parameters that stay fixed during a run
#[derive(Debug, Clone)]
struct DDEParams {
	population_size: usize,
	population_regular: usize,
	population_brownian: usize,
	cr: f64,
	f: f64,
	bounds: (f64, f64),
	sigma: f64,
	tie_policy: TiePolicy,
}

impl DDEParams {
	fn subpop_len(&self) -> usize {
		self.population_regular + self.population_brownian
	}
}

/// Dynamic Differential Evolution optimizer
pub struct DynamicDifferentialEvolution {
	harness: EvolutionHarness,
	params: DDEParams,
	callback: Option<Callback>,
	hall_of_fame: HallOfFame,
	logbook: Logbook,
	populations: Vec<Vec<Individual>>,
	report: Option<DDEReport>,
}

/// Where a batch result goes back to
enum Slot {
	Offspring { subpop: usize, parent: usize },
	Brownian { subpop: usize },
}

impl DynamicDifferentialEvolution {
	pub fn new(config: DDEConfig) -> Self {
		let DDEConfig {
			evolution,
			population_size,
			population_regular,
			population_brownian,
			cr,
			f,
			bounds,
			sigma,
			tie_policy,
			callback,
		} = config;
		Self {
			harness: EvolutionHarness::new(evolution),
			params: DDEParams {
				population_size,
				population_regular,
				population_brownian,
				cr,
				f,
				bounds,
				sigma,
				tie_policy,
			},
			callback,
			hall_of_fame: HallOfFame::new(),
			logbook: Logbook::default(),
			populations: Vec::new(),
			report: None,
		}
	}

	/// Bind the genotype size, objectives and transformer for the next runs.
	pub fn configure(
		&mut self,
		n_dim: usize,
		fitness: Vec<FitnessFn>,
		order: FitnessOrder,
		transformer: Option<Arc<dyn Transformer>>,
		seed: Option<u64>,
		verbose: bool,
	) -> &mut Self {
		self.harness.configure(n_dim, fitness, order, transformer, seed, verbose);
		self
	}

	/// Check the harness and the algorithm parameters
	pub fn validate(&self) -> Result<()> {
		self.harness.validate()?;
		let p = &self.params;
		let (lower, upper) = p.bounds;
		if !(lower.is_finite() && upper.is_finite() && lower < upper) {
			return Err(DDEError::InvalidBounds { lower, upper });
		}
		if p.population_size == 0 {
			return Err(DDEError::InvalidPopulation { reason: "population_size must be at least 1".into() });
		}
		if p.subpop_len() == 0 {
			return Err(DDEError::InvalidPopulation {
				reason: "sub-populations need at least one regular or brownian individual".into(),
			});
		}
		if self.harness.config.n_gen == 0 {
			return Err(DDEError::InvalidPopulation { reason: "n_gen must be at least 1".into() });
		}
		if !(0.0..=2.0).contains(&p.f) {
			return Err(DDEError::InvalidMutationFactor { factor: p.f });
		}
		if !(0.0..=1.0).contains(&p.cr) {
			return Err(DDEError::InvalidCrossoverRate { rate: p.cr });
		}
		if !(p.sigma.is_finite() && p.sigma > 0.0) {
			return Err(DDEError::InvalidSigma { sigma: p.sigma });
		}
		Ok(())
	}

	pub fn hall_of_fame(&self) -> &HallOfFame {
		&self.hall_of_fame
	}

	pub fn logbook(&self) -> &Logbook {
		&self.logbook
	}

	/// Sub-populations as left by the last run
	pub fn populations(&self) -> &[Vec<Individual>] {
		&self.populations
	}

	pub fn report(&self) -> Option<&DDEReport> {
		self.report.as_ref()
	}

	/// Exclusion radius for the configured bounds, K and genotype size
	pub fn rexcl(&self) -> f64 {
		let (lower, upper) = self.params.bounds;
		exclusion_radius(lower, upper, self.params.population_size, self.harness.n_dim())
	}

	/// Forget the outcome of the previous run
	fn reset(&mut self) {
		self.hall_of_fame = HallOfFame::new();
		self.logbook = Logbook::default();
		self.populations.clear();
		self.report = None;
	}

	fn run(
		&mut self,
		ctx: &EvaluationContext<'_>,
		pool: &WorkerPool,
		callback: &mut Option<Callback>,
	) -> Result<()> {
		let params = self.params.clone();
		let harness = &self.harness;
		let order = harness.order().clone();
		let n_dim = harness.n_dim();
		let n_obj = harness.n_objectives();
		let n_gen = harness.config.n_gen;
		let verbose = harness.config.verbose;
		let timing = metric_evolve_env::timing_enabled();

		let mut rng: StdRng = match harness.config.seed {
			Some(s) => StdRng::seed_from_u64(s),
			None => {
				let mut thread_rng = rand::rng();
				StdRng::from_rng(&mut thread_rng)
			}
		};
		let noise =
			Normal::new(0.0, params.sigma).map_err(|_| DDEError::InvalidSigma { sigma: params.sigma })?;
		let stats = harness.build_statistics();
		let rexcl = self.rexcl();

		log::info!(
			"DDE init: {} sub-populations of {}+{} individuals, {} dimensions, n_gen={}, workers={}",
			params.population_size,
			params.population_regular,
			params.population_brownian,
			n_dim,
			n_gen,
			pool.num_workers()
		);
		log::info!("  CR={:.3}, F={:.3}, sigma={:.3}, rexcl={:.4e}", params.cr, params.f, params.sigma, rexcl);

		let mut hof = HallOfFame::new();
		let mut logbook = Logbook::new(stats.as_ref());
		let mut populations: Vec<Vec<Individual>> = (0..params.population_size)
			.map(|_| init_random(params.subpop_len(), n_dim, n_obj, params.bounds, &mut rng))
			.collect();

		let mut nfev = evaluate_invalid(harness, &mut populations, ctx, pool, &mut rng)?;
		let mut nevals = nfev;
		for pop in &populations {
			hof.update(pop, &order);
		}
		let mut stopped_at = None;
		let record = generation_record(0, nevals, false, 0, &hof, stats.as_ref(), &populations);
		if emit(&mut logbook, record, verbose, &hof, nfev, callback) {
			stopped_at = Some(0);
		}
		nevals = 0;

		let mut generation = 1;
		while stopped_at.is_none() && generation < n_gen {
			let t0 = Instant::now();

			// Re-score each champion on a fresh split
			let champion_idx: Vec<usize> =
				populations.iter().map(|pop| argbest(pop, &order).unwrap_or(0)).collect();
			let tasks: Vec<EvaluationTask> = champion_idx
				.iter()
				.enumerate()
				.map(|(p, &i)| EvaluationTask {
					index: p,
					genes: populations[p][i].genes.clone(),
					seed: rng.random(),
				})
				.collect();
			nevals += tasks.len();
			nfev += tasks.len();
			let rescored = evaluate_batch(harness, tasks, ctx, pool)?;
			let changed = rescored.iter().any(|r| {
				let champion = &populations[r.index][champion_idx[r.index]];
				!champion.fitness.is_valid() || r.scores.as_slice() != champion.fitness.values()
			});
			if changed {
				log::debug!("gen {}: landscape change detected, invalidating all fitness", generation);
				for ind in populations.iter_mut().flatten() {
					ind.fitness.invalidate();
				}
			}

			let champions: Vec<Individual> =
				champion_idx.iter().enumerate().map(|(p, &i)| populations[p][i].clone()).collect();
			let losers = excluded_subpopulations(&champions, rexcl, &order);
			for &k in &losers {
				log::debug!("gen {}: sub-population {} excluded, reinitializing", generation, k);
				populations[k] = init_random(params.subpop_len(), n_dim, n_obj, params.bounds, &mut rng);
			}

			let n = evaluate_invalid(harness, &mut populations, ctx, pool, &mut rng)?;
			nevals += n;
			nfev += n;
			for pop in &populations {
				hof.update(pop, &order);
			}

			let record = generation_record(
				generation,
				nevals,
				changed,
				losers.len(),
				&hof,
				stats.as_ref(),
				&populations,
			);
			nevals = 0;
			if emit(&mut logbook, record, verbose, &hof, nfev, callback) {
				stopped_at = Some(generation);
				break;
			}

			let n = evolve(harness, &params, &noise, &mut populations, ctx, pool, &mut rng)?;
			nevals += n;
			nfev += n;

			if timing {
				log::trace!("gen {}: {:.3} ms", generation, t0.elapsed().as_secs_f64() * 1e3);
			}
			generation += 1;
		}

		// Keep the offspring of the last evolution step
		for pop in &populations {
			hof.update(pop, &order);
		}

		let best = hof.best().cloned().ok_or(DDEError::NotFitted)?;
		let message = match stopped_at {
			Some(g) => format!("Stopped by callback at generation {}", g),
			None => format!("Completed {} generations", n_gen),
		};
		log::info!("DDE finished: {} ({} evaluations), best fitness {:?}", message, nfev, best.fitness.values());

		self.report = Some(DDEReport { best, success: true, message, nit: logbook.len(), nfev });
		self.hall_of_fame = hof;
		self.logbook = logbook;
		self.populations = populations;
		Ok(())
	}
}

impl EvolutionStrategy for DynamicDifferentialEvolution {
	fn harness(&self) -> &EvolutionHarness {
		&self.harness
	}

	fn harness_mut(&mut self) -> &mut EvolutionHarness {
		&mut self.harness
	}

	fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
		self.reset();
		self.validate()?;
		let ctx = EvaluationContext::new(x, y)?;
		let pool = self.harness.worker_pool()?;

		let mut callback = self.callback.take();
		let outcome = self.run(&ctx, &pool, &mut callback);
		self.callback = callback;
		outcome?;
		Ok(self)
	}

	fn best_individual(&self) -> Result<&Individual> {
		self.hall_of_fame.best().ok_or(DDEError::NotFitted)
	}
}

fn evaluate_batch(
	harness: &EvolutionHarness,
	tasks: Vec<EvaluationTask>,
	ctx: &EvaluationContext<'_>,
	pool: &WorkerPool,
) -> Result<Vec<IndexedFitness>> {
	pool.evaluate(tasks, |task| harness.evaluate_task(ctx, task))
}

/// Evaluate every individual without a valid fitness; returns the count.
fn evaluate_invalid(
	harness: &EvolutionHarness,
	populations: &mut [Vec<Individual>],
	ctx: &EvaluationContext<'_>,
	pool: &WorkerPool,
	rng: &mut StdRng,
) -> Result<usize> {
	let mut slots: Vec<(usize, usize)> = Vec::new();
	let mut tasks: Vec<EvaluationTask> = Vec::new();
	for (p, pop) in populations.iter().enumerate() {
		for (i, ind) in pop.iter().enumerate() {
			if !ind.fitness.is_valid() {
				tasks.push(EvaluationTask { index: slots.len(), genes: ind.genes.clone(), seed: rng.random() });
				slots.push((p, i));
			}
		}
	}
	for r in evaluate_batch(harness, tasks, ctx, pool)? {
		let (p, i) = slots[r.index];
		populations[p][i].fitness.assign(r.scores);
	}
	Ok(slots.len())
}

/// One DE + brownian step over every sub-population; returns evaluations done.
fn evolve(
	harness: &EvolutionHarness,
	params: &DDEParams,
	noise: &Normal<f64>,
	populations: &mut [Vec<Individual>],
	ctx: &EvaluationContext<'_>,
	pool: &WorkerPool,
	rng: &mut StdRng,
) -> Result<usize> {
	let order = harness.order();
	let n_obj = harness.n_objectives();

	let mut candidates: Vec<Individual> = Vec::new();
	let mut slots: Vec<Slot> = Vec::new();
	let mut tasks: Vec<EvaluationTask> = Vec::new();
	for (p, pop) in populations.iter().enumerate() {
		let Some(b) = argbest(pop, order) else {
			continue;
		};
		let xbest = &pop[b];
		for k in 0..params.population_regular.min(pop.len()) {
			let [d1, d2, d3, d4] = random_donors(pop.len(), rng);
			let mutant = mutant_best2(
				&xbest.genes,
				[&pop[d1].genes, &pop[d2].genes, &pop[d3].genes, &pop[d4].genes],
				params.f,
			);
			let trial = binomial_crossover(&pop[k].genes, &mutant, params.cr, rng);
			tasks.push(EvaluationTask { index: tasks.len(), genes: trial.clone(), seed: rng.random() });
			candidates.push(Individual::from_genes(trial, n_obj));
			slots.push(Slot::Offspring { subpop: p, parent: k });
		}
		for _ in 0..params.population_brownian {
			let ind = brownian_individual(xbest, noise, n_obj, rng);
			tasks.push(EvaluationTask { index: tasks.len(), genes: ind.genes.clone(), seed: rng.random() });
			candidates.push(ind);
			slots.push(Slot::Brownian { subpop: p });
		}
	}

	let n = tasks.len();
	for r in evaluate_batch(harness, tasks, ctx, pool)? {
		candidates[r.index].fitness.assign(r.scores);
	}

	// Regular survivors first, then the fresh brownian tail
	let mut next: Vec<Vec<Individual>> = populations
		.iter()
		.map(|pop| pop.iter().take(params.population_regular).cloned().collect())
		.collect();
	for (slot, child) in slots.into_iter().zip(candidates) {
		match slot {
			Slot::Offspring { subpop, parent } => {
				let current = &next[subpop][parent];
				let accept = match params.tie_policy {
					TiePolicy::Replace => order.compare(&child.fitness, &current.fitness) != Ordering::Less,
					TiePolicy::KeepParent => order.is_better(&child.fitness, &current.fitness),
				};
				if accept {
					next[subpop][parent] = child;
				}
			}
			Slot::Brownian { subpop } => next[subpop].push(child),
		}
	}
	for (pop, new_pop) in populations.iter_mut().zip(next) {
		*pop = new_pop;
	}
	Ok(n)
}

fn generation_record(
	generation: usize,
	nevals: usize,
	changed: bool,
	excluded: usize,
	hof: &HallOfFame,
	stats: Option<&Statistics>,
	populations: &[Vec<Individual>],
) -> GenerationRecord {
	GenerationRecord {
		generation,
		nevals,
		changed,
		excluded,
		best: hof.best().map(|b| b.fitness.values().to_vec()),
		stats: stats.map(|s| s.compile(populations.iter().flatten())),
	}
}

/// Append and log a record, then run the callback; `true` means stop.
fn emit(
	logbook: &mut Logbook,
	record: GenerationRecord,
	verbose: bool,
	hof: &HallOfFame,
	nfev: usize,
	callback: &mut Option<Callback>,
) -> bool {
	if verbose {
		log::info!("{}", record);
	} else {
		log::debug!("{}", record);
	}
	let (generation, changed) = (record.generation, record.changed);
	logbook.record(record);

	let (Some(cb), Some(best)) = (callback.as_mut(), hof.best()) else {
		return false;
	};
	let intermediate = DDEIntermediate {
		generation,
		x: best.genes.clone(),
		fitness: best.fitness.values().to_vec(),
		nfev,
		changed,
	};
	matches!(cb(&intermediate), CallbackAction::Stop)
}
