//! Total ordering over fitness vectors.
//!
//! Scores are multiplied by per-objective weights before comparing: a
//! positive weight maximizes its objective, a negative weight minimizes it.
//! "Greater" always means "better".

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::individual::Fitness;

/// How fitness vectors are compared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FitnessOrder {
	/// Compare weighted scores objective by objective, first difference wins
	Lexicographic { weights: Vec<f64> },
	/// Compare the sum of weighted scores
	WeightedSum { weights: Vec<f64> },
}

impl FitnessOrder {
	/// Every objective minimized, lexicographic
	pub fn minimize(n_objectives: usize) -> Self {
		FitnessOrder::Lexicographic { weights: vec![-1.0; n_objectives] }
	}

	/// Every objective maximized, lexicographic
	pub fn maximize(n_objectives: usize) -> Self {
		FitnessOrder::Lexicographic { weights: vec![1.0; n_objectives] }
	}

	pub fn weights(&self) -> &[f64] {
		match self {
			FitnessOrder::Lexicographic { weights } | FitnessOrder::WeightedSum { weights } => {
				weights
			}
		}
	}

	/// Number of objectives this ordering expects
	pub fn n_objectives(&self) -> usize {
		self.weights().len()
	}

	/// Compare raw score vectors; `Greater` means `a` is better than `b`.
	pub fn compare_scores(&self, a: &[f64], b: &[f64]) -> Ordering {
		match self {
			FitnessOrder::Lexicographic { weights } => {
				for ((&wa, &wb), &w) in a.iter().zip(b.iter()).zip(weights.iter()) {
					match (wa * w).total_cmp(&(wb * w)) {
						Ordering::Equal => continue,
						other => return other,
					}
				}
				Ordering::Equal
			}
			FitnessOrder::WeightedSum { weights } => {
				let sa: f64 = a.iter().zip(weights.iter()).map(|(v, w)| v * w).sum();
				let sb: f64 = b.iter().zip(weights.iter()).map(|(v, w)| v * w).sum();
				sa.total_cmp(&sb)
			}
		}
	}

	/// Compare two fitness records; an invalid fitness is worse than any valid one.
	pub fn compare(&self, a: &Fitness, b: &Fitness) -> Ordering {
		match (a.is_valid(), b.is_valid()) {
			(true, true) => self.compare_scores(a.values(), b.values()),
			(true, false) => Ordering::Greater,
			(false, true) => Ordering::Less,
			(false, false) => Ordering::Equal,
		}
	}

	/// `true` if `a` is strictly better than `b`
	pub fn is_better(&self, a: &Fitness, b: &Fitness) -> bool {
		self.compare(a, b) == Ordering::Greater
	}
}
