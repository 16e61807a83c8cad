//! Serializable run parameters and run summaries.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
	Crossover, DEConfig, DEReport, ForcedGene, Init, MutationConfig, Result, ScaleFactor,
	TrialVector, Updating,
};

/// Plain-data subset of [`DEConfig`] that can be read from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DEParams {
	pub maxiter: usize,
	pub popsize: usize,
	pub stepsize: f64,
	pub num_differences: usize,
	pub trial_vector: TrialVector,
	pub scale_factor: ScaleFactor,
	pub recombination: f64,
	pub crossover: Crossover,
	pub forced_gene: ForcedGene,
	pub init: Init,
	pub updating: Updating,
	pub seed: Option<u64>,
	pub threshold: Option<f64>,
	pub log_path: Option<PathBuf>,
}

impl Default for DEParams {
	fn default() -> Self {
		let cfg = DEConfig::default();
		Self {
			maxiter: cfg.maxiter,
			popsize: cfg.popsize,
			stepsize: cfg.mutation.stepsize,
			num_differences: cfg.mutation.num_differences,
			trial_vector: cfg.mutation.trial_vector,
			scale_factor: cfg.mutation.scale_factor,
			recombination: cfg.recombination,
			crossover: cfg.crossover,
			forced_gene: cfg.forced_gene,
			init: cfg.init,
			updating: cfg.updating,
			seed: cfg.seed,
			threshold: cfg.threshold,
			log_path: cfg.log_path,
		}
	}
}

impl DEParams {
	pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
		serde_json::from_str(s)
	}

	pub fn into_config(self) -> DEConfig {
		DEConfig {
			maxiter: self.maxiter,
			popsize: self.popsize,
			mutation: MutationConfig {
				stepsize: self.stepsize,
				num_differences: self.num_differences,
				trial_vector: self.trial_vector,
				scale_factor: self.scale_factor,
			},
			recombination: self.recombination,
			crossover: self.crossover,
			forced_gene: self.forced_gene,
			init: self.init,
			updating: self.updating,
			seed: self.seed,
			threshold: self.threshold,
			log_path: self.log_path,
			..DEConfig::default()
		}
	}

	/// Checks the parameters without running anything
	pub fn validate(&self) -> Result<()> {
		let mutation = MutationConfig {
			stepsize: self.stepsize,
			num_differences: self.num_differences,
			trial_vector: self.trial_vector,
			scale_factor: self.scale_factor,
		};
		mutation.validate(self.popsize)?;
		crate::DifferentialCrossover::new(self.crossover, self.recombination, self.forced_gene)?;
		Ok(())
	}
}

/// Outcome of a run in a form suitable for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DESummary {
	pub x: Vec<f64>,
	pub fun: f64,
	pub success: bool,
	pub runaway: bool,
	pub message: String,
	pub nit: usize,
	pub nfev: usize,
}

impl From<&DEReport> for DESummary {
	fn from(report: &DEReport) -> Self {
		Self {
			x: report.x.to_vec(),
			fun: report.fun,
			success: report.success,
			runaway: report.runaway,
			message: report.message.clone(),
			nit: report.nit,
			nfev: report.nfev,
		}
	}
}
