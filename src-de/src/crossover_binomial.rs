use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Which gene binomial crossover always takes from the trial vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForcedGene {
    /// Drawn in `{0, 1}`; only guarantees a trial gene when `dim == 2`
    #[default]
    LowPair,
    /// Drawn in `[0, dim)`, the classical DE/bin rule
    Uniform,
}

impl ForcedGene {
    fn draw<R: Rng + ?Sized>(self, n: usize, rng: &mut R) -> usize {
        match self {
            ForcedGene::LowPair => rng.random_range(0..2),
            ForcedGene::Uniform => rng.random_range(0..n.max(1)),
        }
    }
}

/// Gene-wise merge: trial gene if `u < cr` or at the forced index, parent
/// gene otherwise.
pub(crate) fn binomial_crossover<R: Rng + ?Sized>(
    trial: &Array1<f64>,
    parent: &Array1<f64>,
    cr: f64,
    forced: ForcedGene,
    rng: &mut R,
) -> Array1<f64> {
    let n = parent.len();
    let jrand = forced.draw(n, rng);
    let mut child = parent.clone();
    for j in 0..n {
        if rng.random::<f64>() < cr || j == jrand {
            child[j] = trial[j];
        }
    }
    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_dim2_always_keeps_a_trial_gene() {
        let trial = Array1::from(vec![1.0, 1.0]);
        let parent = Array1::from(vec![0.0, 0.0]);
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..1000 {
            let child = binomial_crossover(&trial, &parent, 0.0, ForcedGene::LowPair, &mut rng);
            assert_eq!(child.sum(), 1.0, "exactly the forced gene comes from the trial");
        }
    }

    #[test]
    fn test_low_pair_only_forces_first_two_genes() {
        // with cr = 0, genes 2.. are always inherited from the parent
        let trial = Array1::from(vec![1.0; 6]);
        let parent = Array1::from(vec![0.0; 6]);
        let mut rng = StdRng::seed_from_u64(2);
        let mut hits = [0usize; 6];
        for _ in 0..500 {
            let child = binomial_crossover(&trial, &parent, 0.0, ForcedGene::LowPair, &mut rng);
            for j in 0..6 {
                hits[j] += child[j] as usize;
            }
        }
        assert!(hits[0] > 0 && hits[1] > 0);
        assert_eq!(&hits[2..], &[0, 0, 0, 0]);
        assert_eq!(hits[0] + hits[1], 500);
    }

    #[test]
    fn test_uniform_forcing_spans_all_genes() {
        let trial = Array1::from(vec![1.0; 6]);
        let parent = Array1::from(vec![0.0; 6]);
        let mut rng = StdRng::seed_from_u64(2);
        let mut hits = [0usize; 6];
        for _ in 0..600 {
            let child = binomial_crossover(&trial, &parent, 0.0, ForcedGene::Uniform, &mut rng);
            assert_eq!(child.sum(), 1.0);
            for j in 0..6 {
                hits[j] += child[j] as usize;
            }
        }
        assert!(hits.iter().all(|&h| h > 0), "{:?}", hits);
    }

    #[test]
    fn test_full_rate_copies_trial() {
        let trial = Array1::from(vec![3.0, 4.0, 5.0]);
        let parent = Array1::from(vec![0.0, 0.0, 0.0]);
        let mut rng = StdRng::seed_from_u64(1);
        let child = binomial_crossover(&trial, &parent, 1.0, ForcedGene::LowPair, &mut rng);
        assert_eq!(child, trial);
    }

    #[test]
    fn test_low_pair_may_miss_in_1d() {
        // forced index 1 does not exist for a single gene
        let trial = Array1::from(vec![1.0]);
        let parent = Array1::from(vec![0.0]);
        let mut rng = StdRng::seed_from_u64(4);
        let taken = (0..200)
            .filter(|_| binomial_crossover(&trial, &parent, 0.0, ForcedGene::LowPair, &mut rng)[0] == 1.0)
            .count();
        assert!(taken > 0 && taken < 200, "taken={}", taken);
    }
}
