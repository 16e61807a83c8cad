use ndarray::Array1;

use crate::{
	CallbackAction, Combination, DEError, DEIntermediate, DEReport, DifferentialEvolution,
	FitnessComparator, Mutation, Result,
};

// ------------------------------ Internal helpers ------------------------------

/// Lower/upper must have the same, non-zero length with `lower[i] <= upper[i]`
pub(crate) fn validate_bounds(lower: &Array1<f64>, upper: &Array1<f64>) -> Result<()> {
	if lower.len() != upper.len() {
		return Err(DEError::BoundsMismatch { lower_len: lower.len(), upper_len: upper.len() });
	}
	if lower.is_empty() {
		return Err(DEError::EmptyBounds);
	}
	for (i, (&lo, &hi)) in lower.iter().zip(upper.iter()).enumerate() {
		if lo.is_nan() || hi.is_nan() || lo > hi {
			return Err(DEError::InvalidBounds { index: i, lower: lo, upper: hi });
		}
	}
	Ok(())
}

impl<'a, F, M, C> DifferentialEvolution<'a, F, M, C>
where
	F: Fn(&Array1<f64>) -> f64,
	M: Mutation,
	C: Combination,
{
	/// Append the fitness of every member to the log; failures are reported, not fatal
	pub(crate) fn log_population(&mut self) {
		let Some(sink) = self.sink.as_mut() else {
			return;
		};
		let values = self.population.fitness_values(&self.comparator);
		if let Err(e) = sink.append_record(&values) {
			log::warn!("DE fitness log write failed at generation {}: {}", self.generation, e);
		}
	}

	/// Best member and the spread of the population fitness
	fn best_and_spread(&self) -> (usize, f64, f64) {
		let energies = self.population.fitness_values(&self.comparator);
		let best = self.population.best_index(&self.comparator);
		let n = energies.len().max(1) as f64;
		let mean = energies.iter().sum::<f64>() / n;
		let var = energies.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n;
		(best, energies[best], var.sqrt())
	}

	pub(crate) fn report_progress(&self, accepted: usize) {
		let (_, best_f, spread) = self.best_and_spread();
		if self.config.disp {
			log::info!(
				"DE gen {:4}  best_f={:.6e}  std={:.3e}  accepted={}/{}",
				self.generation,
				best_f,
				spread,
				accepted,
				self.population.len()
			);
		} else {
			log::debug!(
				"DE gen {:4}  best_f={:.6e}  std={:.3e}  accepted={}/{}",
				self.generation,
				best_f,
				spread,
				accepted,
				self.population.len()
			);
		}
	}

	pub(crate) fn notify_callback(&mut self) -> CallbackAction {
		if self.config.callback.is_none() {
			return CallbackAction::Continue;
		}
		let (best, fun, convergence) = self.best_and_spread();
		let intermediate = DEIntermediate {
			x: self.population.get(best).genome().clone(),
			fun,
			convergence,
			iter: self.generation,
		};
		match self.config.callback.as_mut() {
			Some(cb) => cb(&intermediate),
			None => CallbackAction::Continue,
		}
	}

	/// Report built from the (sorted) final population
	pub(crate) fn finish_report(&self, success: bool, runaway: bool, message: String) -> DEReport {
		let best = self.population.get(0);
		let energies = Array1::from(self.population.fitness_values(&self.comparator));
		DEReport {
			x: best.genome().clone(),
			fun: self.comparator.fitness(best),
			success,
			runaway,
			message,
			nit: self.generation,
			nfev: self.comparator.evaluations(),
			population: self.population.to_array(),
			population_energies: energies,
		}
	}
}
