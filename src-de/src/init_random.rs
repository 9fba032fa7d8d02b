use rand::Rng;

use crate::individual::Individual;

/// `npop` individuals with genes uniform in `[lower, upper)` and empty fitness
pub(crate) fn init_random<R: Rng + ?Sized>(
    npop: usize,
    n: usize,
    n_objectives: usize,
    (lower, upper): (f64, f64),
    rng: &mut R,
) -> Vec<Individual> {
    (0..npop)
        .map(|_| {
            Individual::generate(n, n_objectives, || {
                let u: f64 = rng.random::<f64>();
                lower + u * (upper - lower)
            })
        })
        .collect()
}
