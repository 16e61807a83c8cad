//! Error types for the Differential Evolution engine.
//!
//! Configuration errors are fatal and raised when the engine (or one of its
//! policies) is constructed. Log errors are recoverable: the engine reports
//! them and carries on with the run.

use thiserror::Error;

/// Errors that can occur while configuring or running Differential Evolution.
#[derive(Debug, Error)]
pub enum DEError {
    /// Lower and upper bounds have different lengths.
    #[error("bounds mismatch: lower has {lower_len} elements, upper has {upper_len}")]
    BoundsMismatch {
        /// Length of the lower bounds array
        lower_len: usize,
        /// Length of the upper bounds array
        upper_len: usize,
    },

    /// A lower bound exceeds its corresponding upper bound.
    #[error("invalid bounds at index {index}: lower ({lower}) > upper ({upper})")]
    InvalidBounds {
        /// Index of the invalid bound pair
        index: usize,
        /// The lower bound value
        lower: f64,
        /// The upper bound value
        upper: f64,
    },

    /// No dimension at all.
    #[error("bounds are empty: at least one dimension is required")]
    EmptyBounds,

    /// Number of difference vectors is not 1 or 2.
    #[error("invalid number of difference vectors: {num} (must be 1 or 2)")]
    InvalidDifferenceCount {
        /// The requested number of differences
        num: usize,
    },

    /// Population cannot provide enough distinct donors.
    #[error("population size ({pop_size}) must be > {required} for {num_differences} difference vector(s)")]
    PopulationTooSmall {
        /// The invalid population size
        pop_size: usize,
        /// Number of distinct indices a trial vector needs (2 * num_differences + 1)
        required: usize,
        /// Requested number of difference vectors
        num_differences: usize,
    },

    /// Population with no member at all.
    #[error("population must hold at least one individual")]
    EmptyPopulation,

    /// Step size is out of valid range [0, 2].
    #[error("invalid mutation factor: {factor} (must be in [0, 2])")]
    InvalidMutationFactor {
        /// The invalid step size
        factor: f64,
    },

    /// Crossover rate is out of valid range [0, 1].
    #[error("invalid crossover rate: {rate} (must be in [0, 1])")]
    InvalidCrossoverRate {
        /// The invalid crossover rate
        rate: f64,
    },

    /// A variation label could not be parsed.
    #[error("unknown {kind} variation: {label:?}")]
    UnknownVariation {
        /// Which setting was being parsed (e.g. "trial vector")
        kind: &'static str,
        /// The offending label
        label: String,
    },

    /// A strategy name could not be parsed.
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    /// A user supplied population does not fit the problem.
    #[error("population shape mismatch: expected {expected_len}x{expected_dim}, got {got_len}x{got_dim}")]
    PopulationShapeMismatch {
        /// Configured population size
        expected_len: usize,
        /// Problem dimension
        expected_dim: usize,
        /// Size of the supplied population
        got_len: usize,
        /// Dimension of the first offending genome
        got_dim: usize,
    },

    /// I/O failure while writing the fitness log.
    #[error("log I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding failure while writing the fitness log.
    #[error("log CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A specialized `Result` type for DE operations.
pub type Result<T> = std::result::Result<T, DEError>;

impl DEError {
    /// Returns `true` if this is a bounds-related error.
    pub fn is_bounds_error(&self) -> bool {
        matches!(
            self,
            DEError::BoundsMismatch { .. } | DEError::InvalidBounds { .. } | DEError::EmptyBounds
        )
    }

    /// Returns `true` for every error raised while validating a configuration.
    ///
    /// These are always fatal.
    pub fn is_config_error(&self) -> bool {
        !self.is_log_error()
    }

    /// Returns `true` if the error comes from writing the fitness log.
    pub fn is_log_error(&self) -> bool {
        matches!(self, DEError::Io(_) | DEError::Csv(_))
    }
}
