use ndarray::Array1;
use rand::Rng;

use crate::individual::Individual;
use crate::population::Population;

/// One individual with every gene drawn uniformly in `[lower[j], upper[j]]`.
pub fn create_individual<R: Rng + ?Sized>(
    lower: &Array1<f64>,
    upper: &Array1<f64>,
    rng: &mut R,
) -> Individual {
    debug_assert_eq!(lower.len(), upper.len());
    let mut genome = Array1::<f64>::zeros(lower.len());
    for j in 0..lower.len() {
        let u: f64 = rng.random::<f64>();
        genome[j] = lower[j] + u * (upper[j] - lower[j]);
    }
    Individual::new(genome)
}

pub(crate) fn init_random<R: Rng + ?Sized>(
    npop: usize,
    lower: &Array1<f64>,
    upper: &Array1<f64>,
    rng: &mut R,
) -> Population {
    Population::new((0..npop).map(|_| create_individual(lower, upper, rng)).collect())
}
