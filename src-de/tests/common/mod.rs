//! Shared fixtures for the DDE integration tests
//!
//! A transformer that hands its parameters back to the fitness functions, a
//! few fitness functions built on it, and a small synthetic dataset.

#![allow(dead_code)]

use ndarray::{Array1, Array2};

use metric_evolve_dde::{BoxedError, FitnessFn, Transformer, fitness_fn};

/// Install `env_logger` once per test binary; `RUST_LOG` controls the output.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Linear features with labels alternating over three classes
pub fn dataset(n: usize, n_features: usize) -> (Array2<f64>, Array1<f64>) {
    let x = Array2::from_shape_fn((n, n_features), |(i, j)| ((i * n_features + j) % 17) as f64 / 17.0);
    let y = Array1::from_iter((0..n).map(|i| (i % 3) as f64));
    (x, y)
}

/// Transformer whose output rows are its parameters, so fitness functions
/// see the candidate genes directly.
pub struct Echo {
    params: Vec<f64>,
}

impl Echo {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }
}

impl Transformer for Echo {
    fn duplicate_instance(&self) -> Box<dyn Transformer> {
        Box::new(Echo::new())
    }

    fn fit(&mut self, _x: &Array2<f64>, _y: &Array1<f64>, params: &[f64]) -> Result<(), BoxedError> {
        self.params = params.to_vec();
        Ok(())
    }

    fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        Array2::from_shape_fn((x.nrows(), self.params.len()), |(_, j)| self.params[j])
    }
}

/// Diagonal feature scaling, the simplest metric a learner can fit
pub struct DiagonalScaling {
    scale: Vec<f64>,
}

impl DiagonalScaling {
    pub fn new() -> Self {
        Self { scale: Vec::new() }
    }
}

impl Transformer for DiagonalScaling {
    fn duplicate_instance(&self) -> Box<dyn Transformer> {
        Box::new(DiagonalScaling::new())
    }

    fn fit(&mut self, x: &Array2<f64>, _y: &Array1<f64>, params: &[f64]) -> Result<(), BoxedError> {
        if params.len() != x.ncols() {
            return Err(format!("expected {} parameters, got {}", x.ncols(), params.len()).into());
        }
        self.scale = params.to_vec();
        Ok(())
    }

    fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        Array2::from_shape_fn(x.raw_dim(), |(i, j)| x[[i, j]] * self.scale[j])
    }
}

/// Squared distance of the genes (row 0 of the transformed training data) to `target`
pub fn squared_distance(target: Vec<f64>) -> FitnessFn {
    fitness_fn(move |xtr, _, _, _| {
        xtr.row(0).iter().zip(target.iter()).map(|(g, t)| (g - t) * (g - t)).sum()
    })
}

/// Leave-one-out 1-NN accuracy of the validation rows against the training rows
pub fn nearest_neighbour_accuracy() -> FitnessFn {
    fitness_fn(|xtr, xte, ytr, yte| {
        let mut hits = 0usize;
        for (i, row) in xte.rows().into_iter().enumerate() {
            let mut best = (f64::INFINITY, 0.0);
            for (j, other) in xtr.rows().into_iter().enumerate() {
                let d: f64 = row.iter().zip(other.iter()).map(|(a, b)| (a - b) * (a - b)).sum();
                if d < best.0 {
                    best = (d, ytr[j]);
                }
            }
            if best.1 == yte[i] {
                hits += 1;
            }
        }
        hits as f64 / yte.len().max(1) as f64
    })
}
