use rand::Rng;

/// Four donor positions drawn uniformly, with replacement, from `0..pool_size`.
///
/// Drawing with replacement keeps the operator defined for sub-populations
/// smaller than five; the parent itself may be drawn.
pub(crate) fn random_donors<R: Rng + ?Sized>(pool_size: usize, rng: &mut R) -> [usize; 4] {
    debug_assert!(pool_size > 0);
    [
        rng.random_range(0..pool_size),
        rng.random_range(0..pool_size),
        rng.random_range(0..pool_size),
        rng.random_range(0..pool_size),
    ]
}
