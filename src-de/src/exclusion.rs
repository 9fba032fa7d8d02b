use crate::fitness_order::FitnessOrder;
use crate::individual::Individual;

/// Expected spacing of `k` evenly spread optima in a `d`-dimensional box of
/// side `upper - lower`.
pub fn exclusion_radius(lower: f64, upper: f64, k: usize, d: usize) -> f64 {
    (upper - lower) / (2.0 * (k as f64).powf(1.0 / d as f64))
}

/// Sub-populations to reinitialize, one entry per close pair of champions.
///
/// Pairs are visited in `(i, j)`, `i < j` order. Only pairs whose champions
/// both hold a valid fitness are considered; of two champions closer than
/// `rexcl`, the worse one loses (the second on a tie). Each index is
/// reported once.
pub(crate) fn excluded_subpopulations(
    champions: &[Individual],
    rexcl: f64,
    order: &FitnessOrder,
) -> Vec<usize> {
    let mut losers: Vec<usize> = Vec::new();
    for i in 0..champions.len() {
        for j in (i + 1)..champions.len() {
            let (a, b) = (&champions[i], &champions[j]);
            if !(a.fitness.is_valid() && b.fitness.is_valid()) {
                continue;
            }
            if a.distance(b) < rexcl {
                let k = if order.is_better(&b.fitness, &a.fitness) { i } else { j };
                if !losers.contains(&k) {
                    losers.push(k);
                }
            }
        }
    }
    losers
}
