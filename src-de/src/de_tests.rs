use std::io;

use ndarray::{Array1, array};
use rand::Rng;
use tempfile::tempdir;

use crate::{
    CallbackAction, Combination, Crossover, DEConfigBuilder, DEError, DEIntermediate,
    DifferentialCrossover, DifferentialEvolution, DifferentialMutation, FitnessHistory, FitnessLog,
    ForcedGene, Genome, Mutation, MutationConfig, Population, RunState, Strategy, Updating,
};

fn sphere(x: &Array1<f64>) -> f64 {
    x.iter().map(|&xi| xi * xi).sum()
}

#[test]
fn test_same_seed_same_run() {
    let run = || {
        let mut history = FitnessHistory::new();
        let report = {
            let cfg = DEConfigBuilder::new().seed(2024).popsize(12).maxiter(30).build();
            let mut de =
                DifferentialEvolution::new(&sphere, array![-5.0, -5.0, -5.0], array![5.0, 5.0, 5.0], cfg)
                    .unwrap()
                    .with_log(&mut history);
            de.solve()
        };
        (report, history)
    };

    let (r1, h1) = run();
    let (r2, h2) = run();
    assert_eq!(r1.x, r2.x);
    assert_eq!(r1.fun, r2.fun);
    assert_eq!(r1.nfev, r2.nfev);
    assert_eq!(h1.records(), h2.records());
}

#[test]
fn test_replacement_never_regresses_a_slot() {
    for updating in [Updating::Immediate, Updating::Deferred] {
        let cfg = DEConfigBuilder::new().seed(9).popsize(15).updating(updating).build();
        let mut de = DifferentialEvolution::new(&sphere, array![-5.0, -5.0], array![5.0, 5.0], cfg)
            .unwrap();
        de.initialize();
        for _ in 0..20 {
            let mut before = de.population().clone();
            before.sort(de.comparator());
            let f_before = before.fitness_values(de.comparator());
            de.next_generation();
            let f_after = de.population().fitness_values(de.comparator());
            for (i, (a, b)) in f_after.iter().zip(f_before.iter()).enumerate() {
                assert!(a <= b, "{:?}: slot {} went from {} to {}", updating, i, b, a);
            }
        }
    }
}

#[test]
fn test_sphere_2d_fifty_generations() {
    let mut history = FitnessHistory::new();
    let report = {
        let cfg = DEConfigBuilder::new()
            .seed(42)
            .popsize(10)
            .stepsize(0.5)
            .recombination(0.9)
            .strategy(Strategy::Rand1Bin)
            .maxiter(50)
            .build();
        let mut de = DifferentialEvolution::new(&sphere, array![-5.0, -5.0], array![5.0, 5.0], cfg)
            .unwrap()
            .with_log(&mut history);
        de.solve()
    };

    assert_eq!(report.nit, 50);
    assert!(report.success && !report.runaway);
    assert!(report.fun < 1.0, "f={}", report.fun);

    let best = history.best_per_record();
    assert_eq!(best.len(), 51);
    for w in best.windows(2) {
        assert!(w[1] <= w[0], "best regressed: {} -> {}", w[0], w[1]);
    }
    assert_eq!(*best.last().unwrap(), report.fun);
}

#[test]
fn test_population_must_exceed_donor_count() {
    let lo = array![-1.0, -1.0];
    let hi = array![1.0, 1.0];

    let cfg = DEConfigBuilder::new().popsize(3).build();
    let err = DifferentialEvolution::new(&sphere, lo.clone(), hi.clone(), cfg).err().unwrap();
    assert!(matches!(err, DEError::PopulationTooSmall { pop_size: 3, required: 3, .. }));
    assert!(err.is_config_error());

    let cfg = DEConfigBuilder::new().popsize(4).build();
    assert!(DifferentialEvolution::new(&sphere, lo.clone(), hi.clone(), cfg).is_ok());

    let cfg = DEConfigBuilder::new().popsize(5).strategy(Strategy::Best2Bin).build();
    assert!(DifferentialEvolution::new(&sphere, lo.clone(), hi.clone(), cfg).is_err());
    let cfg = DEConfigBuilder::new().popsize(6).strategy(Strategy::Best2Bin).build();
    assert!(DifferentialEvolution::new(&sphere, lo, hi, cfg).is_ok());
}

#[test]
fn test_rejects_bad_configuration() {
    let lo = array![-1.0, -1.0];
    let hi = array![1.0, 1.0];

    let cfg = DEConfigBuilder::new().num_differences(3).build();
    let err = DifferentialEvolution::new(&sphere, lo.clone(), hi.clone(), cfg).err().unwrap();
    assert!(matches!(err, DEError::InvalidDifferenceCount { num: 3 }));

    let cfg = DEConfigBuilder::new().stepsize(f64::NAN).build();
    let err = DifferentialEvolution::new(&sphere, lo.clone(), hi.clone(), cfg).err().unwrap();
    assert!(matches!(err, DEError::InvalidMutationFactor { .. }));

    let cfg = DEConfigBuilder::new().recombination(-0.1).build();
    let err = DifferentialEvolution::new(&sphere, lo.clone(), hi.clone(), cfg).err().unwrap();
    assert!(matches!(err, DEError::InvalidCrossoverRate { .. }));

    let cfg = DEConfigBuilder::new().build();
    let err = DifferentialEvolution::new(&sphere, lo, array![1.0, -2.0], cfg).err().unwrap();
    assert!(err.is_bounds_error());
}

#[test]
fn test_stops_once_threshold_is_bettered() {
    let cfg = DEConfigBuilder::new().seed(3).popsize(20).threshold(1e-4).build();
    let mut de =
        DifferentialEvolution::new(&sphere, array![-5.0, -5.0], array![5.0, 5.0], cfg).unwrap();
    let report = de.solve();

    assert!(report.success);
    assert!(!report.runaway);
    assert!(report.fun < 1e-4);
    assert!(report.nit < 1000);
    assert!(de.is_termination_condition());
    assert_eq!(de.state(), RunState::Terminated);
}

#[test]
fn test_initial_population_may_already_terminate() {
    let cfg = DEConfigBuilder::new().seed(1).popsize(8).threshold(100.0).build();
    let mut de =
        DifferentialEvolution::new(&sphere, array![-1.0, -1.0], array![1.0, 1.0], cfg).unwrap();
    let report = de.solve();
    assert_eq!(report.nit, 0);
    assert!(report.success);
    assert_eq!(report.nfev, 8);
}

#[test]
fn test_runaway_when_cap_is_hit() {
    let cfg = DEConfigBuilder::new().seed(5).popsize(10).maxiter(5).threshold(-1.0).build();
    let mut de =
        DifferentialEvolution::new(&sphere, array![-5.0, -5.0], array![5.0, 5.0], cfg).unwrap();
    let report = de.solve();
    assert!(report.runaway);
    assert!(!report.success);
    assert_eq!(report.nit, 5);
    assert!(!de.is_termination_condition());
}

#[test]
fn test_cap_without_threshold_is_not_runaway() {
    let cfg = DEConfigBuilder::new().seed(5).popsize(10).maxiter(7).build();
    let mut de =
        DifferentialEvolution::new(&sphere, array![-5.0, -5.0], array![5.0, 5.0], cfg).unwrap();
    let report = de.solve();
    assert!(report.success);
    assert!(!report.runaway);
    assert_eq!(report.nit, 7);
    // every individual is evaluated exactly once
    assert_eq!(report.nfev, 10 * (7 + 1));
}

#[test]
fn test_report_population_is_sorted() {
    let cfg = DEConfigBuilder::new().seed(11).popsize(10).maxiter(10).build();
    let mut de =
        DifferentialEvolution::new(&sphere, array![-5.0, -5.0], array![5.0, 5.0], cfg).unwrap();
    let report = de.solve();
    assert_eq!(report.population.dim(), (10, 2));
    let energies = report.population_energies.to_vec();
    assert!(energies.windows(2).all(|w| w[0] <= w[1]), "{:?}", energies);
    assert_eq!(report.population_energies[0], report.fun);
    assert_eq!(report.population.row(0), report.x);
}

/// Trial vector = half of whatever currently sits in slot 0
struct HalveBest;

impl Mutation for HalveBest {
    fn trial_vector<R: Rng + ?Sized>(&self, _target: usize, population: &Population, _rng: &mut R) -> Genome {
        population.get(0).genome() * 0.5
    }
}

struct TakeTrial;

impl Combination for TakeTrial {
    fn combine<R: Rng + ?Sized>(&self, trial: &Genome, _parent: &Genome, _rng: &mut R) -> Genome {
        trial.clone()
    }
}

#[test]
fn test_updating_visibility() {
    let start = Population::from(vec![vec![4.0], vec![5.0], vec![6.0], vec![7.0]]);

    let run = |updating: Updating| {
        let cfg = DEConfigBuilder::new().popsize(4).updating(updating).build();
        let mut de =
            DifferentialEvolution::with_policies(&sphere, array![-8.0], array![8.0], cfg, HalveBest, TakeTrial)
                .unwrap();
        de.set_population(start.clone()).unwrap();
        de.next_generation();
        de.population().iter().map(|ind| ind.genome()[0]).collect::<Vec<_>>()
    };

    // live population: later slots see the already replaced slot 0
    assert_eq!(run(Updating::Immediate), vec![2.0, 1.0, 1.0, 1.0]);
    // snapshot: every slot reads the generation start
    assert_eq!(run(Updating::Deferred), vec![2.0, 2.0, 2.0, 2.0]);
}

#[test]
fn test_set_population_checks_shape() {
    let cfg = DEConfigBuilder::new().popsize(5).maxiter(0).build();
    let mut de =
        DifferentialEvolution::new(&sphere, array![-5.0, -5.0], array![5.0, 5.0], cfg).unwrap();

    let err = de.set_population(Population::from(vec![vec![0.0, 0.0]; 4])).unwrap_err();
    assert!(matches!(err, DEError::PopulationShapeMismatch { expected_len: 5, got_len: 4, .. }));
    let err = de.set_population(Population::from(vec![vec![0.0]; 5])).unwrap_err();
    assert!(matches!(err, DEError::PopulationShapeMismatch { got_dim: 1, .. }));

    let rows = vec![vec![3.0, 0.0], vec![0.0, 1.0], vec![2.0, 2.0], vec![0.5, 0.0], vec![1.0, 1.0]];
    de.set_population(Population::from(rows)).unwrap();
    let report = de.solve();
    assert_eq!(report.nit, 0);
    assert_eq!(report.x, array![0.5, 0.0]);
    assert_eq!(report.population_energies.to_vec(), vec![0.25, 1.0, 2.0, 8.0, 9.0]);
}

#[test]
fn test_callback_can_stop() {
    let cfg = DEConfigBuilder::new()
        .seed(8)
        .popsize(10)
        .callback(Box::new(|inter: &DEIntermediate| {
            if inter.iter >= 3 { CallbackAction::Stop } else { CallbackAction::Continue }
        }))
        .build();
    let mut de =
        DifferentialEvolution::new(&sphere, array![-5.0, -5.0], array![5.0, 5.0], cfg).unwrap();
    let report = de.solve();
    assert_eq!(report.nit, 3);
    assert!(report.success);
}

#[test]
fn test_csv_log_has_one_record_per_generation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("logs").join("fitness.csv");
    let cfg = DEConfigBuilder::new().seed(4).popsize(8).maxiter(3).log_path(&path).build();
    let mut de =
        DifferentialEvolution::new(&sphere, array![-5.0, -5.0], array![5.0, 5.0], cfg).unwrap();
    let report = de.solve();

    let content = std::fs::read_to_string(&path).unwrap();
    let records: Vec<Vec<f64>> = content
        .lines()
        .map(|l| l.split(',').map(|v| v.parse::<f64>().unwrap()).collect())
        .collect();
    assert_eq!(records.len(), 4);
    for r in &records {
        assert_eq!(r.len(), 8);
        assert!(r.windows(2).all(|w| w[0] <= w[1]));
    }
    assert_eq!(records[3][0], report.fun);

    // a second run never overwrites the first log
    let cfg = DEConfigBuilder::new().seed(4).popsize(8).maxiter(1).log_path(&path).build();
    DifferentialEvolution::new(&sphere, array![-5.0, -5.0], array![5.0, 5.0], cfg).unwrap().solve();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    assert!(dir.path().join("logs").join("fitness1.csv").exists());
}

struct FailingLog;

impl FitnessLog for FailingLog {
    fn append_record(&mut self, _values: &[f64]) -> crate::Result<()> {
        Err(DEError::Io(io::Error::other("disk full")))
    }
}

#[test]
fn test_log_failures_do_not_abort_the_run() {
    let cfg = DEConfigBuilder::new().seed(6).popsize(10).maxiter(4).build();
    let mut de = DifferentialEvolution::new(&sphere, array![-5.0, -5.0], array![5.0, 5.0], cfg)
        .unwrap()
        .with_log(FailingLog);
    let report = de.solve();
    assert_eq!(report.nit, 4);
    assert!(report.success);
}

#[test]
fn test_policies_are_checked_against_configured_popsize() {
    // mutation validated for 100 members, engine configured for 3
    let mutation = DifferentialMutation::new(MutationConfig::default(), 100).unwrap();
    let crossover = DifferentialCrossover::new(Crossover::Binomial, 0.5, ForcedGene::LowPair).unwrap();
    let cfg = DEConfigBuilder::new().popsize(3).build();
    let err = DifferentialEvolution::with_policies(&sphere, array![-1.0], array![1.0], cfg, mutation, crossover)
        .err()
        .unwrap();
    assert!(matches!(err, DEError::PopulationTooSmall { pop_size: 3, required: 3, num_differences: 1 }));

    let mutation = DifferentialMutation::new(MutationConfig::default(), 100).unwrap();
    let cfg = DEConfigBuilder::new().popsize(4).maxiter(2).seed(1).build();
    let mut de = DifferentialEvolution::with_policies(&sphere, array![-1.0], array![1.0], cfg, mutation, crossover)
        .unwrap();
    assert_eq!(de.solve().nit, 2);
}

#[test]
fn test_empty_population_is_rejected() {
    let cfg = DEConfigBuilder::new().popsize(0).build();
    let err = DifferentialEvolution::with_policies(&sphere, array![-1.0], array![1.0], cfg, HalveBest, TakeTrial)
        .err()
        .unwrap();
    assert!(matches!(err, DEError::EmptyPopulation));
    assert!(err.is_config_error());
}
