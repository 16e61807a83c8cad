//! Capability traits the engine is generic over.

use rand::Rng;

use crate::error::Result;
use crate::individual::Genome;
use crate::population::Population;

/// Produces a trial vector for the member in slot `target`.
///
/// Implementations only read the population; the target stays untouched.
pub trait Mutation {
    fn trial_vector<R: Rng + ?Sized>(
        &self,
        target: usize,
        population: &Population,
        rng: &mut R,
    ) -> Genome;

    /// Checks that populations of `pop_size` members can feed this policy
    fn validate_population(&self, pop_size: usize) -> Result<()> {
        let _ = pop_size;
        Ok(())
    }
}

/// Merges a trial vector and the parent genome into a child genome.
pub trait Combination {
    fn combine<R: Rng + ?Sized>(&self, trial: &Genome, parent: &Genome, rng: &mut R) -> Genome;
}
