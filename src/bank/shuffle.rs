use rand::Rng;

/// In-place Fisher-Yates shuffle. Every permutation is equally likely, and the
/// same seeded rng always yields the same order.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Shuffle `pool` and keep the first `count` items.
pub fn shuffle_take<T, R: Rng + ?Sized>(mut pool: Vec<T>, count: usize, rng: &mut R) -> Vec<T> {
    fisher_yates(&mut pool, rng);
    pool.truncate(count);
    pool
}
