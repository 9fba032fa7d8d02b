use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Vector of objective scores with a validity flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fitness {
    n_objectives: usize,
    values: Vec<f64>,
    valid: bool,
}

impl Fitness {
    /// Empty, invalid fitness for `n_objectives` objectives
    pub fn new(n_objectives: usize) -> Self {
        Self { n_objectives, values: Vec::with_capacity(n_objectives), valid: false }
    }

    /// Store fresh scores and mark the fitness valid
    pub fn assign(&mut self, values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.n_objectives, "objective count mismatch");
        self.values = values;
        self.valid = true;
    }

    /// Drop the scores; the candidate must be evaluated again
    pub fn invalidate(&mut self) {
        self.values.clear();
        self.valid = false;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Scores, empty while invalid
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn n_objectives(&self) -> usize {
        self.n_objectives
    }
}

/// A candidate solution: genes plus the fitness they scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub genes: Array1<f64>,
    pub fitness: Fitness,
}

impl Individual {
    /// Build `n` genes by calling `gene` repeatedly; fitness starts invalid
    pub fn generate<G>(n: usize, n_objectives: usize, mut gene: G) -> Self
    where
        G: FnMut() -> f64,
    {
        let genes = Array1::from_iter((0..n).map(|_| gene()));
        Self::from_genes(genes, n_objectives)
    }

    pub fn from_genes(genes: Array1<f64>, n_objectives: usize) -> Self {
        Self { genes, fitness: Fitness::new(n_objectives) }
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Euclidean distance between two gene vectors
    pub fn distance(&self, other: &Individual) -> f64 {
        (&self.genes - &other.genes).mapv(|v| v * v).sum().sqrt()
    }
}
