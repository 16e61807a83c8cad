use std::cell::Cell;
use std::cmp::Ordering;

use crate::individual::{Genome, Individual};

/// Total order over individuals.
///
/// `Ordering::Less` means the first individual is fitter and sorts first.
pub trait FitnessComparator {
    /// Objective value of `ind`, computed at most once per individual
    fn fitness(&self, ind: &Individual) -> f64;

    fn compare(&self, a: &Individual, b: &Individual) -> Ordering {
        self.fitness(a).total_cmp(&self.fitness(b))
    }

    /// `a` strictly fitter than `b`
    fn is_better(&self, a: &Individual, b: &Individual) -> bool {
        self.compare(a, b) == Ordering::Less
    }
}

/// Ranks individuals by ascending objective value (minimisation).
pub struct MinimizeComparator<'a, F>
where
    F: Fn(&Genome) -> f64,
{
    func: &'a F,
    nfev: Cell<usize>,
}

impl<'a, F> MinimizeComparator<'a, F>
where
    F: Fn(&Genome) -> f64,
{
    pub fn new(func: &'a F) -> Self {
        Self { func, nfev: Cell::new(0) }
    }

    /// Number of objective evaluations performed so far
    pub fn evaluations(&self) -> usize {
        self.nfev.get()
    }
}

impl<F> FitnessComparator for MinimizeComparator<'_, F>
where
    F: Fn(&Genome) -> f64,
{
    fn fitness(&self, ind: &Individual) -> f64 {
        ind.fitness_or_eval(|g| {
            self.nfev.set(self.nfev.get() + 1);
            (self.func)(g)
        })
    }
}

/// Fitness threshold below which a run is considered done.
#[derive(Debug, Clone)]
pub struct TerminationCriterion {
    sentinel: Individual,
}

impl TerminationCriterion {
    pub fn new(threshold: f64) -> Self {
        Self { sentinel: Individual::sentinel(threshold) }
    }

    pub fn threshold(&self) -> f64 {
        self.sentinel.cached_fitness().unwrap_or(f64::NEG_INFINITY)
    }

    pub fn sentinel(&self) -> &Individual {
        &self.sentinel
    }

    /// `ind` is strictly better than the threshold under `cmp`
    pub fn is_met_by<C: FitnessComparator + ?Sized>(&self, cmp: &C, ind: &Individual) -> bool {
        cmp.is_better(ind, &self.sentinel)
    }
}
