//! Differential Evolution (DE) engine in pure Rust using ndarray
//!
//! Minimises a scalar objective over a box-bounded real vector domain with a
//! population of individuals evolved generation by generation.
//!
//! Supported features:
//! - Box bounds used for initialisation (trial vectors are never clamped)
//! - Mutation variants: rand/1, best/1, rand/2, best/2
//! - Step size: static, dither (per trial vector) or jitter (per gene) in [0.4, 0.9]
//! - Binomial crossover (forced gene in {0,1} or uniform) and exponential crossover
//! - Replacement when the child is not worse than its parent (ties favour the child)
//! - Immediate (asynchronous) or deferred (snapshot) generation updates
//! - Termination on a fitness threshold, capped by a maximum number of generations
//! - Initialization: random uniform or Latin Hypercube Sampling (LHS)
//! - Per-generation fitness log (CSV) and progress callback
//!
//! ```rust
//! use evolab_de::{DEConfigBuilder, differential_evolution};
//! use ndarray::Array1;
//!
//! let sphere = |x: &Array1<f64>| x.iter().map(|v| v * v).sum::<f64>();
//! let config = DEConfigBuilder::new().seed(7).popsize(20).threshold(1e-3).build();
//! let report = differential_evolution(&sphere, &[(-5.0, 5.0), (-5.0, 5.0)], config).unwrap();
//! assert!(report.fun < 1e-3);
//! ```

#![allow(missing_docs)]
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

pub mod comparator;
pub mod error;
pub mod individual;
pub mod policy;
pub mod population;

pub mod distinct_indices;
pub mod init_latin_hypercube;
pub mod init_random;

pub mod mutant_differential;

pub mod crossover_binomial;
pub mod crossover_exponential;

pub mod differential_evolution;
pub mod impl_helpers;
pub mod params;
pub mod recorder;

#[cfg(test)]
mod de_tests;

pub use comparator::{FitnessComparator, MinimizeComparator, TerminationCriterion};
pub use crossover_binomial::ForcedGene;
pub use differential_evolution::differential_evolution;
pub use error::{DEError, Result};
pub use individual::{Genome, Individual};
pub use init_random::create_individual;
pub use mutant_differential::{DifferentialMutation, MutationConfig, ScaleFactor, TrialVector};
pub use params::{DEParams, DESummary};
pub use policy::{Combination, Mutation};
pub use population::Population;
pub use recorder::{CsvFitnessLog, FitnessHistory, FitnessLog, create_log_file};

/// Differential Evolution strategy: base vector, number of differences, crossover
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
	Rand1Bin,
	Rand1Exp,
	Best1Bin,
	Best1Exp,
	Rand2Bin,
	Rand2Exp,
	Best2Bin,
	Best2Exp,
}

impl FromStr for Strategy {
	type Err = DEError;
	fn from_str(s: &str) -> Result<Self> {
		let t = s.to_lowercase();
		match t.as_str() {
			"rand1bin" | "rand1" | "rand/1/bin" => Ok(Strategy::Rand1Bin),
			"rand1exp" | "rand/1/exp" => Ok(Strategy::Rand1Exp),
			"best1bin" | "best1" | "best/1/bin" => Ok(Strategy::Best1Bin),
			"best1exp" | "best/1/exp" => Ok(Strategy::Best1Exp),
			"rand2bin" | "rand2" | "rand/2/bin" => Ok(Strategy::Rand2Bin),
			"rand2exp" | "rand/2/exp" => Ok(Strategy::Rand2Exp),
			"best2bin" | "best2" | "best/2/bin" => Ok(Strategy::Best2Bin),
			"best2exp" | "best/2/exp" => Ok(Strategy::Best2Exp),
			_ => Err(DEError::UnknownStrategy(s.to_string())),
		}
	}
}

impl Strategy {
	pub fn trial_vector(&self) -> TrialVector {
		match self {
			Strategy::Rand1Bin | Strategy::Rand1Exp | Strategy::Rand2Bin | Strategy::Rand2Exp => {
				TrialVector::Random
			}
			Strategy::Best1Bin | Strategy::Best1Exp | Strategy::Best2Bin | Strategy::Best2Exp => {
				TrialVector::Best
			}
		}
	}

	pub fn num_differences(&self) -> usize {
		match self {
			Strategy::Rand1Bin | Strategy::Rand1Exp | Strategy::Best1Bin | Strategy::Best1Exp => 1,
			Strategy::Rand2Bin | Strategy::Rand2Exp | Strategy::Best2Bin | Strategy::Best2Exp => 2,
		}
	}

	pub fn crossover(&self) -> Crossover {
		match self {
			Strategy::Rand1Bin | Strategy::Best1Bin | Strategy::Rand2Bin | Strategy::Best2Bin => {
				Crossover::Binomial
			}
			Strategy::Rand1Exp | Strategy::Best1Exp | Strategy::Rand2Exp | Strategy::Best2Exp => {
				Crossover::Exponential
			}
		}
	}
}

impl fmt::Display for Strategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let cross = match self.crossover() {
			Crossover::Binomial => "bin",
			Crossover::Exponential => "exp",
		};
		write!(f, "{}{}{}", self.trial_vector(), self.num_differences(), cross)
	}
}

/// Crossover type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Crossover {
	/// Binomial (uniform) crossover
	#[default]
	Binomial,
	/// Exponential crossover
	Exponential,
}

/// Crossover operator with its rate, as used by the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialCrossover {
	pub kind: Crossover,
	/// CR in [0, 1]
	pub rate: f64,
	/// Forced gene rule (binomial only)
	pub forced: ForcedGene,
}

impl DifferentialCrossover {
	pub fn new(kind: Crossover, rate: f64, forced: ForcedGene) -> Result<Self> {
		if !(0.0..=1.0).contains(&rate) {
			return Err(DEError::InvalidCrossoverRate { rate });
		}
		Ok(Self { kind, rate, forced })
	}
}

impl Combination for DifferentialCrossover {
	fn combine<R: rand::Rng + ?Sized>(&self, trial: &Genome, parent: &Genome, rng: &mut R) -> Genome {
		use crossover_binomial::binomial_crossover;
		use crossover_exponential::exponential_crossover;

		match self.kind {
			Crossover::Binomial => binomial_crossover(trial, parent, self.rate, self.forced, rng),
			Crossover::Exponential => exponential_crossover(trial, parent, self.rate, rng),
		}
	}
}

/// Initialization scheme for the population
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Init {
	#[default]
	Random,
	LatinHypercube,
}

/// Which population mutation reads during a generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Updating {
	/// The live population, including replacements made earlier in the same pass
	#[default]
	Immediate,
	/// A snapshot taken at the start of the generation
	Deferred,
}

/// Configuration for the Differential Evolution optimizer
pub struct DEConfig {
	/// Generation cap; reaching it without meeting the threshold is a runaway run
	pub maxiter: usize,
	/// Number of individuals (absolute, not per dimension)
	pub popsize: usize,
	pub mutation: MutationConfig,
	pub recombination: f64, // CR in [0,1]
	pub crossover: Crossover,
	pub forced_gene: ForcedGene,
	pub init: Init,
	pub updating: Updating,
	pub seed: Option<u64>,
	/// Stop as soon as a member is strictly better than this fitness
	pub threshold: Option<f64>,
	/// Optional CSV fitness log (disambiguated if the file already exists)
	pub log_path: Option<PathBuf>,
	/// Report progress at info level instead of debug
	pub disp: bool,
	/// Optional per-generation callback (may stop early)
	pub callback: Option<Box<dyn FnMut(&DEIntermediate) -> CallbackAction>>,
}

impl Default for DEConfig {
	fn default() -> Self {
		Self {
			maxiter: 1000,
			popsize: 40,
			mutation: MutationConfig::default(),
			recombination: 0.5,
			crossover: Crossover::default(),
			forced_gene: ForcedGene::default(),
			init: Init::default(),
			updating: Updating::default(),
			seed: None,
			threshold: None,
			log_path: None,
			disp: false,
			callback: None,
		}
	}
}

impl fmt::Debug for DEConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DEConfig")
			.field("maxiter", &self.maxiter)
			.field("popsize", &self.popsize)
			.field("mutation", &self.mutation)
			.field("recombination", &self.recombination)
			.field("crossover", &self.crossover)
			.field("forced_gene", &self.forced_gene)
			.field("init", &self.init)
			.field("updating", &self.updating)
			.field("seed", &self.seed)
			.field("threshold", &self.threshold)
			.field("log_path", &self.log_path)
			.field("disp", &self.disp)
			.field("callback", &self.callback.is_some())
			.finish()
	}
}

/// Fluent builder for `DEConfig` for ergonomic configuration.
pub struct DEConfigBuilder {
	cfg: DEConfig,
}
impl Default for DEConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}
impl DEConfigBuilder {
	pub fn new() -> Self {
		Self { cfg: DEConfig::default() }
	}
	pub fn maxiter(mut self, v: usize) -> Self {
		self.cfg.maxiter = v;
		self
	}
	pub fn popsize(mut self, v: usize) -> Self {
		self.cfg.popsize = v;
		self
	}
	pub fn mutation(mut self, v: MutationConfig) -> Self {
		self.cfg.mutation = v;
		self
	}
	pub fn stepsize(mut self, v: f64) -> Self {
		self.cfg.mutation.stepsize = v;
		self
	}
	pub fn num_differences(mut self, v: usize) -> Self {
		self.cfg.mutation.num_differences = v;
		self
	}
	pub fn trial_vector(mut self, v: TrialVector) -> Self {
		self.cfg.mutation.trial_vector = v;
		self
	}
	pub fn scale_factor(mut self, v: ScaleFactor) -> Self {
		self.cfg.mutation.scale_factor = v;
		self
	}
	/// Sets trial vector, number of differences and crossover type at once
	pub fn strategy(mut self, v: Strategy) -> Self {
		self.cfg.mutation.trial_vector = v.trial_vector();
		self.cfg.mutation.num_differences = v.num_differences();
		self.cfg.crossover = v.crossover();
		self
	}
	pub fn recombination(mut self, v: f64) -> Self {
		self.cfg.recombination = v;
		self
	}
	pub fn crossover(mut self, v: Crossover) -> Self {
		self.cfg.crossover = v;
		self
	}
	pub fn forced_gene(mut self, v: ForcedGene) -> Self {
		self.cfg.forced_gene = v;
		self
	}
	pub fn init(mut self, v: Init) -> Self {
		self.cfg.init = v;
		self
	}
	pub fn updating(mut self, v: Updating) -> Self {
		self.cfg.updating = v;
		self
	}
	pub fn seed(mut self, v: u64) -> Self {
		self.cfg.seed = Some(v);
		self
	}
	pub fn threshold(mut self, v: f64) -> Self {
		self.cfg.threshold = Some(v);
		self
	}
	pub fn log_path(mut self, v: impl Into<PathBuf>) -> Self {
		self.cfg.log_path = Some(v.into());
		self
	}
	pub fn disp(mut self, v: bool) -> Self {
		self.cfg.disp = v;
		self
	}
	pub fn callback(mut self, cb: Box<dyn FnMut(&DEIntermediate) -> CallbackAction>) -> Self {
		self.cfg.callback = Some(cb);
		self
	}
	pub fn build(self) -> DEConfig {
		self.cfg
	}
}

/// Result/Report of a DE optimization run
#[derive(Clone)]
pub struct DEReport {
	pub x: Array1<f64>,
	pub fun: f64,
	pub success: bool,
	/// The generation cap was hit before the threshold was bettered
	pub runaway: bool,
	pub message: String,
	pub nit: usize,
	pub nfev: usize,
	/// Final population, sorted fittest first
	pub population: Array2<f64>,
	pub population_energies: Array1<f64>,
}

impl fmt::Debug for DEReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DEReport")
			.field("x", &format!("len={}", self.x.len()))
			.field("fun", &self.fun)
			.field("success", &self.success)
			.field("runaway", &self.runaway)
			.field("message", &self.message)
			.field("nit", &self.nit)
			.field("nfev", &self.nfev)
			.field(
				"population",
				&format!("{}x{}", self.population.nrows(), self.population.ncols()),
			)
			.field("population_energies", &format!("len={}", self.population_energies.len()))
			.finish()
	}
}

/// Information passed to callback after each generation
pub struct DEIntermediate {
	pub x: Array1<f64>,
	pub fun: f64,
	pub convergence: f64, // measured as std(pop_f)
	pub iter: usize,
}

/// Action returned by callback
pub enum CallbackAction {
	Continue,
	Stop,
}

/// Engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
	Running,
	Terminated,
}

/// Differential Evolution optimizer
pub struct DifferentialEvolution<'a, F, M = DifferentialMutation, C = DifferentialCrossover>
where
	F: Fn(&Array1<f64>) -> f64,
{
	comparator: MinimizeComparator<'a, F>,
	lower: Array1<f64>,
	upper: Array1<f64>,
	config: DEConfig,
	mutation: M,
	combination: C,
	termination: Option<TerminationCriterion>,
	sink: Option<Box<dyn FitnessLog + 'a>>,
	rng: StdRng,
	population: Population,
	generation: usize,
	state: RunState,
}

impl<'a, F> DifferentialEvolution<'a, F>
where
	F: Fn(&Array1<f64>) -> f64,
{
	/// Create a new DE optimizer with objective `func` and bounds [lower, upper].
	///
	/// Every configuration error is reported here.
	pub fn new(
		func: &'a F,
		lower: Array1<f64>,
		upper: Array1<f64>,
		config: DEConfig,
	) -> Result<Self> {
		let mutation = DifferentialMutation::new(config.mutation, config.popsize)?;
		let combination =
			DifferentialCrossover::new(config.crossover, config.recombination, config.forced_gene)?;
		Self::with_policies(func, lower, upper, config, mutation, combination)
	}
}

impl<'a, F, M, C> DifferentialEvolution<'a, F, M, C>
where
	F: Fn(&Array1<f64>) -> f64,
	M: Mutation,
	C: Combination,
{
	/// Create an optimizer with caller supplied mutation and combination policies
	pub fn with_policies(
		func: &'a F,
		lower: Array1<f64>,
		upper: Array1<f64>,
		config: DEConfig,
		mutation: M,
		combination: C,
	) -> Result<Self> {
		impl_helpers::validate_bounds(&lower, &upper)?;
		if config.popsize == 0 {
			return Err(DEError::EmptyPopulation);
		}
		mutation.validate_population(config.popsize)?;

		let rng: StdRng = match config.seed {
			Some(s) => StdRng::seed_from_u64(s),
			None => {
				let mut thread_rng = rand::rng();
				StdRng::from_rng(&mut thread_rng)
			}
		};

		let sink: Option<Box<dyn FitnessLog + 'a>> = match &config.log_path {
			Some(path) => match CsvFitnessLog::create(path) {
				Ok(csv_log) => {
					log::info!("DE fitness log: {}", csv_log.path().display());
					Some(Box::new(csv_log))
				}
				Err(e) => {
					log::warn!("DE fitness log {} unavailable: {}", path.display(), e);
					None
				}
			},
			None => None,
		};

		Ok(Self {
			comparator: MinimizeComparator::new(func),
			lower,
			upper,
			termination: config.threshold.map(TerminationCriterion::new),
			config,
			mutation,
			combination,
			sink,
			rng,
			population: Population::new(Vec::new()),
			generation: 0,
			state: RunState::Running,
		})
	}

	/// Send per-generation fitness records to `sink` instead of the configured file
	pub fn with_log(mut self, sink: impl FitnessLog + 'a) -> Self {
		self.sink = Some(Box::new(sink));
		self
	}

	pub fn config(&self) -> &DEConfig {
		&self.config
	}

	/// Mutable access to configuration
	pub fn config_mut(&mut self) -> &mut DEConfig {
		&mut self.config
	}

	pub fn comparator(&self) -> &MinimizeComparator<'a, F> {
		&self.comparator
	}

	/// Current population (empty before initialisation)
	pub fn population(&self) -> &Population {
		&self.population
	}

	/// Generations run so far
	pub fn generation(&self) -> usize {
		self.generation
	}

	pub fn state(&self) -> RunState {
		self.state
	}

	/// Objective evaluations so far
	pub fn evaluations(&self) -> usize {
		self.comparator.evaluations()
	}

	/// Sample a fresh population within the bounds
	pub fn initialize(&mut self) {
		use init_latin_hypercube::init_latin_hypercube;
		use init_random::init_random;

		self.population = match self.config.init {
			Init::Random => init_random(self.config.popsize, &self.lower, &self.upper, &mut self.rng),
			Init::LatinHypercube => {
				init_latin_hypercube(self.config.popsize, &self.lower, &self.upper, &mut self.rng)
			}
		};
		self.generation = 0;
		self.state = RunState::Running;
	}

	/// Start from a caller supplied population
	pub fn set_population(&mut self, population: Population) -> Result<()> {
		let n = self.lower.len();
		let bad_dim = population.iter().map(Individual::dim).find(|&d| d != n);
		if population.len() != self.config.popsize || bad_dim.is_some() {
			return Err(DEError::PopulationShapeMismatch {
				expected_len: self.config.popsize,
				expected_dim: n,
				got_len: population.len(),
				got_dim: bad_dim.unwrap_or(n),
			});
		}
		self.population = population;
		self.generation = 0;
		self.state = RunState::Running;
		Ok(())
	}

	/// Run one generation: sort, log, then mutate, cross and select every slot
	/// in order.
	pub fn next_generation(&mut self) {
		if self.population.is_empty() {
			self.initialize();
		}

		self.population.sort(&self.comparator);
		self.log_population();

		let snapshot = match self.config.updating {
			Updating::Immediate => None,
			Updating::Deferred => Some(self.population.clone()),
		};

		let mut accepted = 0usize;
		for i in 0..self.population.len() {
			let parent = self.population.get(i).clone();
			let source = snapshot.as_ref().unwrap_or(&self.population);
			let trial = self.mutation.trial_vector(i, source, &mut self.rng);
			let child = Individual::new(self.combination.combine(&trial, parent.genome(), &mut self.rng));

			// ties go to the child
			if self.comparator.compare(&child, &parent) != Ordering::Greater {
				self.population.set(i, child);
				accepted += 1;
			}
		}
		self.generation += 1;

		self.report_progress(accepted);
	}

	/// Any member strictly better than the threshold
	pub fn is_termination_condition(&self) -> bool {
		match &self.termination {
			Some(criterion) => {
				self.population.iter().any(|ind| criterion.is_met_by(&self.comparator, ind))
			}
			None => false,
		}
	}

	/// Run the optimization and return a report
	pub fn solve(&mut self) -> DEReport {
		if self.population.is_empty() {
			self.initialize();
		}
		self.state = RunState::Running;

		log::info!(
			"DE start: {} dimensions, population={}, maxiter={}, mutation={:?}, CR={:.3}, crossover={:?}",
			self.lower.len(),
			self.config.popsize,
			self.config.maxiter,
			self.config.mutation,
			self.config.recombination,
			self.config.crossover
		);

		let mut success = false;
		let mut runaway = false;
		let message;

		loop {
			if self.is_termination_condition() {
				success = true;
				message = format!(
					"Threshold {:.3e} bettered after {} generations",
					self.termination.as_ref().map_or(f64::NAN, TerminationCriterion::threshold),
					self.generation
				);
				break;
			}
			if self.generation >= self.config.maxiter {
				if self.termination.is_some() {
					runaway = true;
					message = format!("Maximum generations reached: {}", self.config.maxiter);
					log::warn!("DE runaway: threshold not bettered within {} generations", self.config.maxiter);
				} else {
					success = true;
					message = format!("Completed {} generations", self.config.maxiter);
				}
				break;
			}

			self.next_generation();

			if let CallbackAction::Stop = self.notify_callback() {
				success = true;
				message = "Optimization stopped by callback".to_string();
				break;
			}
		}

		self.population.sort(&self.comparator);
		self.log_population();
		self.state = RunState::Terminated;

		log::info!("DE finished: {}", message);
		self.finish_report(success, runaway, message)
	}
}

#[cfg(test)]
mod strategy_tests {
	use super::*;

	#[test]
	fn test_parse_strategy_variants() {
		assert_eq!("best1exp".parse::<Strategy>().unwrap(), Strategy::Best1Exp);
		assert_eq!("rand1bin".parse::<Strategy>().unwrap(), Strategy::Rand1Bin);
		assert_eq!("best/2/bin".parse::<Strategy>().unwrap(), Strategy::Best2Bin);
		assert!(matches!("worst1bin".parse::<Strategy>(), Err(DEError::UnknownStrategy(_))));
	}

	#[test]
	fn test_strategy_components() {
		let s = Strategy::Best2Exp;
		assert_eq!(s.trial_vector(), TrialVector::Best);
		assert_eq!(s.num_differences(), 2);
		assert_eq!(s.crossover(), Crossover::Exponential);
		assert_eq!(s.to_string(), "best2exp");
		assert_eq!(Strategy::Rand1Bin.to_string().parse::<Strategy>().unwrap(), Strategy::Rand1Bin);
	}
}
