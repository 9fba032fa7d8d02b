use rand::Rng;
use rand_distr::Normal;

use crate::individual::Individual;

/// Local exploration around `best`: every gene gets independent `noise` added.
pub(crate) fn brownian_individual<R: Rng + ?Sized>(
    best: &Individual,
    noise: &Normal<f64>,
    n_objectives: usize,
    rng: &mut R,
) -> Individual {
    let genes = best.genes.mapv(|g| g + rng.sample(noise));
    Individual::from_genes(genes, n_objectives)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, array};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_brownian_noise_statistics() {
        let sigma = 0.3;
        let noise = Normal::new(0.0, sigma).unwrap();
        let mut rng = StdRng::seed_from_u64(17);
        let mut best = Individual::from_genes(array![0.5, -0.25, 2.0], 1);
        best.fitness.assign(vec![1.0]);

        let n = 5000;
        let mut deltas: Vec<Array1<f64>> = Vec::with_capacity(n);
        for _ in 0..n {
            let ind = brownian_individual(&best, &noise, 1, &mut rng);
            assert!(!ind.fitness.is_valid());
            deltas.push(&ind.genes - &best.genes);
        }

        for j in 0..3 {
            let mean = deltas.iter().map(|d| d[j]).sum::<f64>() / n as f64;
            let var = deltas.iter().map(|d| (d[j] - mean).powi(2)).sum::<f64>() / n as f64;
            assert!(mean.abs() < 0.02, "gene {} mean {}", j, mean);
            assert!((var.sqrt() - sigma).abs() < 0.02, "gene {} std {}", j, var.sqrt());
        }

        // genes are perturbed independently
        let cov = deltas.iter().map(|d| d[0] * d[1]).sum::<f64>() / n as f64;
        assert!(cov.abs() < 0.01, "cov {}", cov);
    }
}
