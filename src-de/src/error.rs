//! Error types for the Dynamic Differential Evolution engine.
//!
//! Configuration problems are reported before any evaluation happens;
//! failures of the external transformer are wrapped with their source and
//! abort the run.

use thiserror::Error;

/// Boxed error returned by external transformers.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while configuring or running an evolution strategy.
#[derive(Debug, Error)]
pub enum DDEError {
    /// The training subset ratio must lie in (0, 1].
    #[error("train_subset_size must be in (0, 1], got {value}")]
    InvalidSubsetSize {
        /// The rejected ratio
        value: f64,
    },

    /// The validation ratio must lie in (0, 1).
    #[error("split_size must be in (0, 1), got {value}")]
    InvalidSplitSize {
        /// The rejected ratio
        value: f64,
    },

    /// The split left the training or the validation part empty.
    #[error("split of {n_samples} samples leaves {n_train} train / {n_test} validation rows")]
    EmptySplit {
        /// Rows available after sub-sampling
        n_samples: usize,
        /// Rows in the training part
        n_train: usize,
        /// Rows in the validation part
        n_test: usize,
    },

    /// Feature and label row counts disagree.
    #[error("dataset shape mismatch: X has {x_rows} rows, y has {y_rows}")]
    DatasetShape {
        /// Rows of the feature matrix
        x_rows: usize,
        /// Length of the label vector
        y_rows: usize,
    },

    /// Lower bound is not strictly below the upper bound.
    #[error("invalid bounds: lower ({lower}) must be < upper ({upper})")]
    InvalidBounds {
        /// The lower bound value
        lower: f64,
        /// The upper bound value
        upper: f64,
    },

    /// Population layout cannot be evolved.
    #[error("invalid population: {reason}")]
    InvalidPopulation {
        /// Human readable description of the problem
        reason: String,
    },

    /// The gene slice handed to the transformer does not fit the genotype.
    #[error("gene slice {start}..{end} outside a genotype of {n_genes} genes")]
    InvalidGeneSlice {
        /// First gene of the slice
        start: usize,
        /// One past the last gene of the slice
        end: usize,
        /// Genes available
        n_genes: usize,
    },

    /// Mutation factor is out of valid range [0, 2].
    #[error("invalid mutation factor: {factor} (must be in [0, 2])")]
    InvalidMutationFactor {
        /// The invalid mutation factor
        factor: f64,
    },

    /// Crossover rate is out of valid range [0, 1].
    #[error("invalid crossover rate: {rate} (must be in [0, 1])")]
    InvalidCrossoverRate {
        /// The invalid crossover rate
        rate: f64,
    },

    /// Brownian standard deviation must be finite and positive.
    #[error("invalid brownian sigma: {sigma}")]
    InvalidSigma {
        /// The invalid standard deviation
        sigma: f64,
    },

    /// The fitness ordering does not match the number of fitness functions.
    #[error("fitness order expects {expected} objectives, {got} fitness functions configured")]
    ObjectiveCountMismatch {
        /// Objectives described by the ordering
        expected: usize,
        /// Fitness functions configured
        got: usize,
    },

    /// No fitness function was configured.
    #[error("at least one fitness function is required")]
    NoFitnessFunctions,

    /// The strategy does not provide this operation.
    #[error("{operation}() is not implemented")]
    NotImplemented {
        /// Name of the missing operation
        operation: &'static str,
    },

    /// The strategy has not been run yet.
    #[error("no best individual: fit() has not completed")]
    NotFitted,

    /// The external transformer failed to fit the candidate parameters.
    #[error("transformer fit failed: {0}")]
    TransformerFit(#[source] BoxedError),

    /// The evaluation worker pool could not be created.
    #[error("cannot build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("environment error: {0}")]
    Env(#[from] metric_evolve_env::EnvError),
}

/// A specialized `Result` type for DDE operations.
pub type Result<T> = std::result::Result<T, DDEError>;

impl DDEError {
    /// Returns `true` if this error was raised while validating configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            DDEError::InvalidSubsetSize { .. }
                | DDEError::InvalidSplitSize { .. }
                | DDEError::EmptySplit { .. }
                | DDEError::DatasetShape { .. }
                | DDEError::InvalidBounds { .. }
                | DDEError::InvalidPopulation { .. }
                | DDEError::InvalidGeneSlice { .. }
                | DDEError::InvalidMutationFactor { .. }
                | DDEError::InvalidCrossoverRate { .. }
                | DDEError::InvalidSigma { .. }
                | DDEError::ObjectiveCountMismatch { .. }
                | DDEError::NoFitnessFunctions
        )
    }

    /// Returns `true` if the external transformer failed.
    pub fn is_transformer_error(&self) -> bool {
        matches!(self, DDEError::TransformerFit(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DDEError::InvalidSubsetSize { value: 1.5 };
        assert_eq!(err.to_string(), "train_subset_size must be in (0, 1], got 1.5");

        let err = DDEError::NotImplemented { operation: "fit" };
        assert_eq!(err.to_string(), "fit() is not implemented");
    }

    #[test]
    fn test_error_categories() {
        let config_err = DDEError::InvalidCrossoverRate { rate: 1.5 };
        let fit_err = DDEError::TransformerFit("singular matrix".into());

        assert!(config_err.is_config_error());
        assert!(!config_err.is_transformer_error());
        assert!(fit_err.is_transformer_error());
        assert!(!fit_err.is_config_error());
        assert!(!DDEError::NotFitted.is_config_error());
    }

    #[test]
    fn test_transformer_error_keeps_source() {
        use std::error::Error;
        let err = DDEError::TransformerFit("degenerate parameters".into());
        let source = err.source().expect("source is kept");
        assert_eq!(source.to_string(), "degenerate parameters");
    }
}
