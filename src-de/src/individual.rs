use std::cell::OnceCell;

use ndarray::Array1;

/// Fixed-length real vector encoding one candidate solution
pub type Genome = Array1<f64>;

/// A genome plus its memoised objective value.
///
/// The fitness is filled in lazily by a comparator the first time the
/// individual is ranked, and dropped whenever the genome is replaced.
#[derive(Debug, Clone)]
pub struct Individual {
    genome: Genome,
    fitness: OnceCell<f64>,
}

impl Individual {
    pub fn new(genome: Genome) -> Self {
        Self { genome, fitness: OnceCell::new() }
    }

    /// Genome-less individual whose fitness is fixed to `fitness`.
    ///
    /// Used as a threshold to compare population members against.
    pub fn sentinel(fitness: f64) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(fitness);
        Self { genome: Array1::zeros(0), fitness: cell }
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Mutable access to the genes; invalidates the cached fitness.
    pub fn genome_mut(&mut self) -> &mut Genome {
        self.fitness.take();
        &mut self.genome
    }

    /// Replace the genome; invalidates the cached fitness.
    pub fn set_genome(&mut self, genome: Genome) {
        self.fitness.take();
        self.genome = genome;
    }

    pub fn into_genome(self) -> Genome {
        self.genome
    }

    pub fn dim(&self) -> usize {
        self.genome.len()
    }

    /// Cached fitness, if it has been computed
    pub fn cached_fitness(&self) -> Option<f64> {
        self.fitness.get().copied()
    }

    /// Cached fitness, computing it with `eval` on first use
    pub fn fitness_or_eval<E>(&self, eval: E) -> f64
    where
        E: FnOnce(&Genome) -> f64,
    {
        *self.fitness.get_or_init(|| eval(&self.genome))
    }

    /// Elementwise genome equality within `tol`
    pub fn approx_eq(&self, other: &Individual, tol: f64) -> bool {
        self.genome.len() == other.genome.len()
            && self.genome.iter().zip(other.genome.iter()).all(|(a, b)| (a - b).abs() <= tol)
    }
}

impl From<Vec<f64>> for Individual {
    fn from(v: Vec<f64>) -> Self {
        Individual::new(Array1::from(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fitness_is_cached_once() {
        let ind = Individual::from(vec![1.0, 2.0]);
        let mut calls = 0;
        let f = ind.fitness_or_eval(|g| {
            calls += 1;
            g.sum()
        });
        assert_eq!(f, 3.0);
        assert_eq!(ind.fitness_or_eval(|_| unreachable!()), 3.0);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_set_genome_invalidates_cache() {
        let mut ind = Individual::from(vec![1.0, 2.0]);
        ind.fitness_or_eval(|g| g.sum());
        ind.set_genome(Array1::from(vec![5.0, 5.0]));
        assert_eq!(ind.cached_fitness(), None);
        assert_eq!(ind.fitness_or_eval(|g| g.sum()), 10.0);

        ind.genome_mut()[0] = 0.0;
        assert_eq!(ind.cached_fitness(), None);
    }

    #[test]
    fn test_clone_is_deep() {
        let a = Individual::from(vec![1.0, 2.0]);
        let mut b = a.clone();
        b.genome_mut()[0] = 9.0;
        assert_eq!(a.genome()[0], 1.0);
        assert!(!a.approx_eq(&b, 1e-9));
        assert_eq!(b.into_genome(), Array1::from(vec![9.0, 2.0]));
    }

    #[test]
    fn test_sentinel_and_approx_eq() {
        let s = Individual::sentinel(0.001);
        assert_eq!(s.cached_fitness(), Some(0.001));
        assert_eq!(s.dim(), 0);

        let a = Individual::from(vec![1.0, 2.0]);
        let b = Individual::from(vec![1.0 + 1e-7, 2.0]);
        assert!(a.approx_eq(&b, 1e-6));
        assert!(!a.approx_eq(&b, 1e-8));
    }
}
