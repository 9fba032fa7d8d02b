use ndarray::Array1;
use rayon::prelude::*;

use crate::error::Result;

/// Parallel evaluation configuration
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Worker threads; 0 or 1 evaluates sequentially on the calling thread
    pub max_workers: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self { max_workers: 1 }
    }
}

/// One candidate to score: its position in the batch, the genes, and the
/// seed of the RNG the evaluation must use.
#[derive(Debug, Clone)]
pub struct EvaluationTask {
    pub index: usize,
    pub genes: Array1<f64>,
    pub seed: u64,
}

/// Scores computed for the task with the same `index`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedFitness {
    pub index: usize,
    pub scores: Vec<f64>,
}

/// Bounded pool evaluating independent candidates.
///
/// Owns a dedicated rayon pool so the worker count of one run does not leak
/// into the global pool used by other code.
pub struct WorkerPool {
    pool: Option<rayon::ThreadPool>,
}

impl WorkerPool {
    pub fn new(config: &ParallelConfig) -> Result<Self> {
        let pool = if config.max_workers > 1 {
            Some(rayon::ThreadPoolBuilder::new().num_threads(config.max_workers).build()?)
        } else {
            None
        };
        Ok(Self { pool })
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    pub fn num_workers(&self) -> usize {
        self.pool.as_ref().map(|p| p.current_num_threads()).unwrap_or(1)
    }

    /// Apply `f` to every item; output order matches input order.
    pub fn map<T, U, F>(&self, items: Vec<T>, f: F) -> Vec<U>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> U + Send + Sync,
    {
        match &self.pool {
            Some(pool) => pool.install(|| items.into_par_iter().map(&f).collect()),
            None => items.into_iter().map(f).collect(),
        }
    }

    /// Score every task; the first error aborts the batch.
    pub fn evaluate<F>(&self, tasks: Vec<EvaluationTask>, eval: F) -> Result<Vec<IndexedFitness>>
    where
        F: Fn(&EvaluationTask) -> Result<Vec<f64>> + Send + Sync,
    {
        self.map(tasks, |task| eval(&task).map(|scores| IndexedFitness { index: task.index, scores }))
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DDEError;
    use ndarray::array;

    fn tasks(n: usize) -> Vec<EvaluationTask> {
        (0..n)
            .map(|i| EvaluationTask { index: i, genes: array![i as f64, 1.0], seed: i as u64 })
            .collect()
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let eval = |t: &EvaluationTask| -> Result<Vec<f64>> { Ok(vec![t.genes.sum()]) };

        let seq = WorkerPool::new(&ParallelConfig::default()).unwrap();
        assert!(!seq.is_parallel());
        let par = WorkerPool::new(&ParallelConfig { max_workers: 3 }).unwrap();
        assert!(par.is_parallel());
        assert_eq!(par.num_workers(), 3);

        let a = seq.evaluate(tasks(16), eval).unwrap();
        let b = par.evaluate(tasks(16), eval).unwrap();
        assert_eq!(a, b);
        for r in &a {
            assert_eq!(r.scores, vec![r.index as f64 + 1.0]);
        }
    }

    #[test]
    fn test_error_aborts_batch() {
        let pool = WorkerPool::new(&ParallelConfig { max_workers: 2 }).unwrap();
        let result = pool.evaluate(tasks(8), |t| {
            if t.index == 5 {
                Err(DDEError::TransformerFit("singular".into()))
            } else {
                Ok(vec![0.0])
            }
        });
        assert!(matches!(result, Err(DDEError::TransformerFit(_))));
    }

    #[test]
    fn test_map_preserves_order() {
        let pool = WorkerPool::new(&ParallelConfig { max_workers: 4 }).unwrap();
        let out = pool.map((0..100).collect(), |i: usize| i * 2);
        assert_eq!(out, (0..100).map(|i| i * 2).collect::<Vec<_>>());
    }
}
