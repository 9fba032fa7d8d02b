use ndarray::{Array1, Array2, Axis};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::dataset::Split;
use crate::error::{DDEError, Result};

/// Rows kept by an independent Bernoulli(`p`) draw per row; `p` must lie in [0, 1]
pub(crate) fn subset_rows<R: Rng + ?Sized>(n: usize, p: f64, rng: &mut R) -> Vec<usize> {
    (0..n).filter(|_| rng.random_bool(p)).collect()
}

/// Shuffle `rows` and cut them into validation (first `ceil(test_size * n)`)
/// and training (the rest) parts.
pub(crate) fn train_test_split<R: Rng + ?Sized>(
    x: &Array2<f64>,
    y: &Array1<f64>,
    rows: &[usize],
    test_size: f64,
    rng: &mut R,
) -> Result<Split> {
    let n_samples = rows.len();
    let n_test = (test_size * n_samples as f64).ceil() as usize;
    let n_train = n_samples.saturating_sub(n_test);
    if n_train == 0 || n_test == 0 {
        return Err(DDEError::EmptySplit { n_samples, n_train, n_test });
    }

    let mut permutation = rows.to_vec();
    permutation.shuffle(rng);
    let (test_idx, train_idx) = permutation.split_at(n_test);

    Ok(Split {
        x_train: x.select(Axis(0), train_idx),
        x_test: x.select(Axis(0), test_idx),
        y_train: y.select(Axis(0), train_idx),
        y_test: y.select(Axis(0), test_idx),
    })
}
