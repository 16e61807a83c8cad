use ndarray::{Array1, Array2};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::population::Population;

pub(crate) fn init_latin_hypercube<R: Rng + ?Sized>(
    npop: usize,
    lower: &Array1<f64>,
    upper: &Array1<f64>,
    rng: &mut R,
) -> Population {
    let n = lower.len();
    let mut samples = Array2::<f64>::zeros((npop, n));
    // One stratum per member and dimension, strata permuted per dimension
    for j in 0..n {
        let mut vals: Vec<f64> = (0..npop)
            .map(|k| ((k as f64) + rng.random::<f64>()) / (npop as f64))
            .collect();
        vals.shuffle(rng);
        for (i, v) in vals.into_iter().enumerate() {
            samples[(i, j)] = lower[j] + v * (upper[j] - lower[j]);
        }
    }
    Population::from_rows(&samples)
}
