//! Interfaces of the collaborators the harness drives: the metric
//! transformer being learned and the fitness functions scoring it.

use std::sync::Arc;

use ndarray::{Array1, Array2};

use crate::error::BoxedError;

/// A parameterized feature transformation learned by the optimizer.
///
/// The harness never reuses an instance across evaluations: every candidate
/// gets a fresh copy from [`Transformer::duplicate_instance`].
pub trait Transformer: Send + Sync {
	/// Independent, freshly initialized instance with the same configuration
	fn duplicate_instance(&self) -> Box<dyn Transformer>;

	/// Set the transformation from `params`; may fail on degenerate parameters
	fn fit(
		&mut self,
		x: &Array2<f64>,
		y: &Array1<f64>,
		params: &[f64],
	) -> std::result::Result<(), BoxedError>;

	/// Apply the learned transformation, preserving the row count
	fn transform(&self, x: &Array2<f64>) -> Array2<f64>;
}

/// Objective scoring a split: `f(x_train, x_test, y_train, y_test)`
pub type FitnessFn =
	Arc<dyn Fn(&Array2<f64>, &Array2<f64>, &Array1<f64>, &Array1<f64>) -> f64 + Send + Sync>;

/// Wrap a closure as a [`FitnessFn`]
pub fn fitness_fn<FN>(f: FN) -> FitnessFn
where
	FN: Fn(&Array2<f64>, &Array2<f64>, &Array1<f64>, &Array1<f64>) -> f64 + Send + Sync + 'static,
{
	Arc::new(f)
}
