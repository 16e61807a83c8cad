//! Differential mutation: `base + F * (a - b) [+ F * (c - d)]`.
//!
//! The base vector is either a random member (`rand/k`) or the fittest one
//! (`best/k`); the step size `F` is either fixed, drawn once per trial vector
//! (dither) or drawn per gene (jitter).

use std::fmt;
use std::str::FromStr;

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::distinct_indices::distinct_indices;
use crate::error::{DEError, Result};
use crate::individual::Genome;
use crate::policy::Mutation;
use crate::population::Population;

/// Lower end of the dither/jitter step size range
pub const RANDOM_STEPSIZE_MIN: f64 = 0.4;
/// Upper end of the dither/jitter step size range
pub const RANDOM_STEPSIZE_MAX: f64 = 0.9;

/// How the base vector of a trial vector is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialVector {
    /// Random member, distinct from the target
    #[default]
    #[serde(alias = "rnd", alias = "rand")]
    Random,
    /// Fittest member; expects the population sorted fittest first
    Best,
}

impl FromStr for TrialVector {
    type Err = DEError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "rnd" | "rand" | "random" => Ok(TrialVector::Random),
            "best" => Ok(TrialVector::Best),
            _ => Err(DEError::UnknownVariation { kind: "trial vector", label: s.to_string() }),
        }
    }
}

impl fmt::Display for TrialVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrialVector::Random => write!(f, "rand"),
            TrialVector::Best => write!(f, "best"),
        }
    }
}

/// How the step size (scale factor) is resolved for a trial vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleFactor {
    /// Configured step size, unchanged
    #[default]
    #[serde(alias = "s")]
    Static,
    /// One random step size per trial vector
    #[serde(alias = "d")]
    Dither,
    /// A fresh random step size for every gene
    #[serde(alias = "j")]
    Jitter,
}

impl FromStr for ScaleFactor {
    type Err = DEError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "s" | "static" => Ok(ScaleFactor::Static),
            "d" | "dither" => Ok(ScaleFactor::Dither),
            "j" | "jitter" => Ok(ScaleFactor::Jitter),
            _ => Err(DEError::UnknownVariation { kind: "scale factor", label: s.to_string() }),
        }
    }
}

/// Parameters of the differential mutation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Step size F, used as-is by `ScaleFactor::Static`
    pub stepsize: f64,
    /// Number of difference vectors, 1 or 2
    pub num_differences: usize,
    pub trial_vector: TrialVector,
    pub scale_factor: ScaleFactor,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            stepsize: 0.5,
            num_differences: 1,
            trial_vector: TrialVector::Random,
            scale_factor: ScaleFactor::Static,
        }
    }
}

impl MutationConfig {
    /// Distinct population slots one trial vector consumes
    pub fn required_indices(&self) -> usize {
        2 * self.num_differences + 1
    }

    /// Check the configuration against a population size
    pub fn validate(&self, pop_size: usize) -> Result<()> {
        if !(1..=2).contains(&self.num_differences) {
            return Err(DEError::InvalidDifferenceCount { num: self.num_differences });
        }
        if !self.stepsize.is_finite() || !(0.0..=2.0).contains(&self.stepsize) {
            return Err(DEError::InvalidMutationFactor { factor: self.stepsize });
        }
        let required = self.required_indices();
        if pop_size <= required {
            return Err(DEError::PopulationTooSmall {
                pop_size,
                required,
                num_differences: self.num_differences,
            });
        }
        Ok(())
    }
}

/// Differential mutation over a population of a fixed size
#[derive(Debug, Clone)]
pub struct DifferentialMutation {
    config: MutationConfig,
}

impl DifferentialMutation {
    /// Validates `config` for populations of `pop_size` members
    pub fn new(config: MutationConfig, pop_size: usize) -> Result<Self> {
        config.validate(pop_size)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MutationConfig {
        &self.config
    }

    /// Slots `[base, a, b]` or `[base, a, b, c, d]` used for the target.
    ///
    /// Donors are distinct and never the target. With `TrialVector::Best` the
    /// base is slot 0 and the donors also avoid slot 0.
    pub fn select_donors<R: Rng + ?Sized>(
        &self,
        target: usize,
        pop_size: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        let k = self.config.required_indices();
        match self.config.trial_vector {
            TrialVector::Random => distinct_indices(&[target], k, pop_size, rng),
            TrialVector::Best => {
                let mut idxs = Vec::with_capacity(k);
                idxs.push(0);
                idxs.extend(distinct_indices(&[target, 0], k - 1, pop_size, rng));
                idxs
            }
        }
    }

    fn random_stepsize<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        rng.random_range(RANDOM_STEPSIZE_MIN..=RANDOM_STEPSIZE_MAX)
    }
}

impl Mutation for DifferentialMutation {
    fn trial_vector<R: Rng + ?Sized>(
        &self,
        target: usize,
        population: &Population,
        rng: &mut R,
    ) -> Genome {
        let idxs = self.select_donors(target, population.len(), rng);
        let dim = population.get(target).dim();

        let mut f = match self.config.scale_factor {
            ScaleFactor::Static => self.config.stepsize,
            ScaleFactor::Dither => Self::random_stepsize(rng),
            ScaleFactor::Jitter => 0.0,
        };

        let mut trial = Array1::<f64>::zeros(dim);
        for g in 0..dim {
            if self.config.scale_factor == ScaleFactor::Jitter {
                f = Self::random_stepsize(rng);
            }
            let base = population.gene(idxs[0], g);
            let mut v = base + f * (population.gene(idxs[1], g) - population.gene(idxs[2], g));
            if self.config.num_differences == 2 {
                v += f * (population.gene(idxs[3], g) - population.gene(idxs[4], g));
            }
            trial[g] = v;
        }
        trial
    }

    fn validate_population(&self, pop_size: usize) -> Result<()> {
        self.config.validate(pop_size)
    }
}
