use ndarray::Array1;
use rand::Rng;

/// Copies a contiguous (wrapping) run of trial genes starting at a random
/// position; the run continues while `u < cr`.
pub(crate) fn exponential_crossover<R: Rng + ?Sized>(
    trial: &Array1<f64>,
    parent: &Array1<f64>,
    cr: f64,
    rng: &mut R,
) -> Array1<f64> {
    let n = parent.len();
    let mut child = parent.clone();
    if n == 0 {
        return child;
    }
    let mut j = rng.random_range(0..n);
    let mut l = 0usize;
    // at least one gene from the trial vector
    loop {
        child[j] = trial[j];
        l += 1;
        j = (j + 1) % n;
        if rng.random::<f64>() >= cr || l >= n {
            break;
        }
    }
    child
}
