use rand::Rng;

/// Draw `count` distinct indices in `[0, pool_size)` by rejection sampling,
/// none of which appears in `exclude`.
pub(crate) fn distinct_indices<R: Rng + ?Sized>(
    exclude: &[usize],
    count: usize,
    pool_size: usize,
    rng: &mut R,
) -> Vec<usize> {
    debug_assert!(
        {
            let excluded = exclude
                .iter()
                .enumerate()
                .filter(|&(k, e)| *e < pool_size && !exclude[..k].contains(e))
                .count();
            excluded + count <= pool_size
        },
        "cannot draw {} distinct indices from a pool of {} excluding {:?}",
        count,
        pool_size,
        exclude
    );
    let mut out: Vec<usize> = Vec::with_capacity(count);
    for _ in 0..count {
        loop {
            let candidate = rng.random_range(0..pool_size);
            if !exclude.contains(&candidate) && !out.contains(&candidate) {
                out.push(candidate);
                break;
            }
        }
    }
    out
}
