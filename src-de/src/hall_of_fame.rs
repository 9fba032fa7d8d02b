use serde::{Deserialize, Serialize};

use crate::argbest::argbest;
use crate::fitness_order::FitnessOrder;
use crate::individual::Individual;

/// Best individual seen so far; only ever replaced by a strictly better one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HallOfFame {
    best: Option<Individual>,
}

impl HallOfFame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn best(&self) -> Option<&Individual> {
        self.best.as_ref()
    }

    /// Offer `candidates`; returns `true` if the record changed.
    pub fn update(&mut self, candidates: &[Individual], order: &FitnessOrder) -> bool {
        let Some(i) = argbest(candidates, order) else {
            return false;
        };
        let candidate = &candidates[i];
        if !candidate.fitness.is_valid() {
            return false;
        }
        let replace = match &self.best {
            Some(current) => order.is_better(&candidate.fitness, &current.fitness),
            None => true,
        };
        if replace {
            self.best = Some(candidate.clone());
        }
        replace
    }

    pub fn clear(&mut self) {
        self.best = None;
    }
}
