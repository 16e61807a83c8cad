use crate::{DEConfig, DEReport, DifferentialEvolution, Result};
use ndarray::Array1;

/// Runs Differential Evolution optimization on a function.
///
/// Convenience wrapper: builds the engine from `(lower, upper)` pairs, samples
/// the initial population and runs it to completion.
///
/// # Errors
///
/// Any configuration error (bounds, population size, step size, crossover
/// rate, number of differences) is returned before the first evaluation.
///
/// # Example
///
/// ```rust
/// use evolab_de::{differential_evolution, DEConfigBuilder};
///
/// let result = differential_evolution(
///     &|x| x[0].powi(2) + x[1].powi(2),
///     &[(-5.0, 5.0), (-5.0, 5.0)],
///     DEConfigBuilder::new().maxiter(100).popsize(20).seed(42).build(),
/// )
/// .expect("optimization failed");
///
/// assert!(result.fun < 0.01);
/// ```
pub fn differential_evolution<F>(
	func: &F,
	bounds: &[(f64, f64)],
	config: DEConfig,
) -> Result<DEReport>
where
	F: Fn(&Array1<f64>) -> f64,
{
	let lower: Array1<f64> = bounds.iter().map(|&(lo, _)| lo).collect();
	let upper: Array1<f64> = bounds.iter().map(|&(_, hi)| hi).collect();
	let mut de = DifferentialEvolution::new(func, lower, upper, config)?;
	Ok(de.solve())
}
