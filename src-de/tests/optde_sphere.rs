use evolab_de::{DEConfigBuilder, ScaleFactor, Strategy, differential_evolution};
use evolab_testfunctions::{get_function_bounds_nd, sphere};

#[test]
fn test_de_sphere_2d() {
    let bounds = get_function_bounds_nd("sphere", 2, (-5.0, 5.0));
    let config = DEConfigBuilder::new()
        .seed(42)
        .popsize(10)
        .stepsize(0.5)
        .recombination(0.9)
        .maxiter(50)
        .build();
    let report = differential_evolution(&sphere, &bounds, config).unwrap();
    assert!(report.fun < 1.0, "f={}", report.fun);
    assert_eq!(report.nit, 50);
}

#[test]
fn test_de_sphere_5d_all_strategies() {
    let bounds = vec![(-5.0, 5.0); 5];
    for (i, strategy) in ["rand1bin", "best1bin", "rand2bin", "best2bin", "rand1exp", "best1exp"]
        .iter()
        .enumerate()
    {
        let config = DEConfigBuilder::new()
            .seed(100 + i as u64)
            .popsize(30)
            .strategy(strategy.parse::<Strategy>().unwrap())
            .recombination(0.9)
            .threshold(1e-6)
            .build();
        let report = differential_evolution(&sphere, &bounds, config).unwrap();
        assert!(report.success, "{}: {}", strategy, report.message);
        assert!(!report.runaway);
        assert!(report.fun < 1e-6, "{}: f={}", strategy, report.fun);
    }
}

#[test]
fn test_de_sphere_random_step_sizes() {
    let bounds = vec![(-5.0, 5.0); 3];
    for scale in [ScaleFactor::Dither, ScaleFactor::Jitter] {
        let config = DEConfigBuilder::new()
            .seed(7)
            .popsize(20)
            .scale_factor(scale)
            .threshold(1e-4)
            .build();
        let report = differential_evolution(&sphere, &bounds, config).unwrap();
        assert!(report.success, "{:?}: {}", scale, report.message);
        assert!(report.fun < 1e-4);
    }
}
