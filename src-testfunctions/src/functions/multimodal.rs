//! Multimodal test functions
//!
//! These functions have multiple local minima and are used to test the global
//! search capabilities of the optimizers.

use std::f64::consts::{E, TAU};

use ndarray::Array1;

/// Ackley: deep central funnel on a cosine-modulated plateau.
/// Minimum 0 at the origin.
pub fn ackley(x: &Array1<f64>) -> f64 {
    let n = x.len() as f64;
    let rms = (x.mapv(|v| v * v).sum() / n).sqrt();
    let mean_cos = x.mapv(|v| (TAU * v).cos()).sum() / n;
    20.0 + E - 20.0 * (-0.2 * rms).exp() - mean_cos.exp()
}

/// Rastrigin: `10 n + sum(x_i^2 - 10 cos(2 pi x_i))`, local minima on the
/// integer lattice, global minimum 0 at the origin.
pub fn rastrigin(x: &Array1<f64>) -> f64 {
    x.fold(0.0, |acc, &v| acc + 10.0 + v * v - 10.0 * (TAU * v).cos())
}

/// Griewank, minimum 0 at the origin
pub fn griewank(x: &Array1<f64>) -> f64 {
    let mut sum = 0.0;
    let mut prod = 1.0;
    for (i, &v) in x.iter().enumerate() {
        sum += v * v;
        prod *= (v / ((i + 1) as f64).sqrt()).cos();
    }
    1.0 + sum / 4000.0 - prod
}
