use crate::fitness_order::FitnessOrder;
use crate::individual::Individual;

/// Index of the best individual under `order`; the first one wins ties.
pub(crate) fn argbest(pop: &[Individual], order: &FitnessOrder) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, ind) in pop.iter().enumerate() {
        match best {
            Some(b) if !order.is_better(&ind.fitness, &pop[b].fitness) => {}
            _ => best = Some(i),
        }
    }
    best
}
