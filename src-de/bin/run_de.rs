use clap::Parser;
use evolab_de::{
    CallbackAction, DEConfig, DEIntermediate, DEParams, DESummary, ScaleFactor, Strategy,
    TrialVector, differential_evolution,
};
use evolab_testfunctions::{FunctionMetadata, get_function_bounds_nd, get_function_metadata};
use std::process;
use std::str::FromStr;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    name = "run_de",
    about = "Run differential evolution on a selected benchmark function"
)]
struct Cli {
    /// Name of the benchmark function to minimise (use --list-functions to see available options)
    #[arg(long, default_value = "ackley")]
    function: String,

    /// Dimensionality of the problem
    #[arg(long, default_value_t = 2)]
    dim: usize,

    /// Number of individuals in the population
    #[arg(long)]
    popsize: Option<usize>,

    /// Maximum number of generations
    #[arg(long)]
    maxiter: Option<usize>,

    /// Step size F in [0, 2] (static scale factor)
    #[arg(long)]
    stepsize: Option<f64>,

    /// Crossover rate CR in [0, 1]
    #[arg(long)]
    crossover_rate: Option<f64>,

    /// Number of difference vectors (1 or 2)
    #[arg(long)]
    num_differences: Option<usize>,

    /// Base vector: rnd | best
    #[arg(long)]
    trial_vector: Option<String>,

    /// Scale factor: S (static) | D (dither) | J (jitter)
    #[arg(long)]
    scale_factor: Option<String>,

    /// Strategy shortcut, e.g. rand1bin, best2exp (overrides trial vector,
    /// number of differences and crossover type)
    #[arg(long)]
    strategy: Option<String>,

    /// Stop once the best fitness is strictly below this value
    #[arg(long)]
    threshold: Option<f64>,

    /// Optional random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Append one CSV record of population fitness per generation to this file
    #[arg(long)]
    log: Option<std::path::PathBuf>,

    /// JSON file with run parameters; command line options take precedence
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Print progress every N generations (0 disables)
    #[arg(long, default_value_t = 50)]
    progress_every: usize,

    /// List all available functions and exit
    #[arg(long)]
    list_functions: bool,
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    process::exit(2);
}

fn load_params(args: &Cli) -> DEParams {
    let mut params = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .unwrap_or_else(|e| fail(format!("cannot read {}: {e}", path.display())));
            DEParams::from_json_str(&text)
                .unwrap_or_else(|e| fail(format!("invalid config {}: {e}", path.display())))
        }
        None => DEParams {
            // the classical test bench setting
            threshold: Some(0.001),
            ..DEParams::default()
        },
    };

    if let Some(v) = args.popsize {
        params.popsize = v;
    }
    if let Some(v) = args.maxiter {
        params.maxiter = v;
    }
    if let Some(v) = args.stepsize {
        params.stepsize = v;
    }
    if let Some(v) = args.crossover_rate {
        params.recombination = v;
    }
    if let Some(v) = args.num_differences {
        params.num_differences = v;
    }
    if let Some(label) = &args.trial_vector {
        params.trial_vector = TrialVector::from_str(label).unwrap_or_else(|e| fail(e));
    }
    if let Some(label) = &args.scale_factor {
        params.scale_factor = ScaleFactor::from_str(label).unwrap_or_else(|e| fail(e));
    }
    if let Some(name) = &args.strategy {
        let strategy = Strategy::from_str(name).unwrap_or_else(|e| fail(e));
        params.trial_vector = strategy.trial_vector();
        params.num_differences = strategy.num_differences();
        params.crossover = strategy.crossover();
    }
    if args.threshold.is_some() {
        params.threshold = args.threshold;
    }
    if args.seed.is_some() {
        params.seed = args.seed;
    }
    if args.log.is_some() {
        params.log_path = args.log.clone();
    }
    params
}

fn list_available_functions() {
    let metadata = get_function_metadata();
    let mut names: Vec<&String> = metadata.keys().collect();
    names.sort();
    println!("Available functions:");
    for name in names {
        print_metadata(&metadata[name]);
    }
}

fn print_metadata(meta: &FunctionMetadata) {
    println!(
        "  {:<12} {} ({}, bounds {:?})",
        meta.name,
        meta.description,
        if meta.multimodal { "multimodal" } else { "unimodal" },
        meta.bounds.first().copied().unwrap_or((-5.0, 5.0))
    );
}

fn main() {
    env_logger::init();
    let args = Cli::parse();

    if args.list_functions {
        list_available_functions();
        return;
    }

    let metadata = get_function_metadata();
    let meta = metadata.get(args.function.trim()).unwrap_or_else(|| {
        fail(format!(
            "function '{}' not found. Use --list-functions to inspect available names.",
            args.function
        ))
    });
    if args.dim == 0 {
        fail("problem dimension must be greater than zero.");
    }
    let bounds = get_function_bounds_nd(&meta.name, args.dim, (-5.0, 5.0));

    let params = load_params(&args);
    if let Err(e) = params.validate() {
        fail(e);
    }

    let mut config: DEConfig = params.into_config();
    let every = args.progress_every;
    if every > 0 && !args.json {
        config.callback = Some(Box::new(move |inter: &DEIntermediate| {
            if inter.iter % every == 0 {
                println!(
                    "gen {:5}  best_f={:.6e}  std={:.3e}",
                    inter.iter, inter.fun, inter.convergence
                );
            }
            CallbackAction::Continue
        }));
    }

    log::info!(
        "Running DE on {} ({} dimensions, bounds {:?})",
        meta.name,
        args.dim,
        bounds.first()
    );

    let start = Instant::now();
    let func = meta.function;
    let objective = |x: &ndarray::Array1<f64>| func(x);
    let report = differential_evolution(&objective, &bounds, config).unwrap_or_else(|e| fail(e));
    let elapsed = start.elapsed();

    if args.json {
        let summary = DESummary::from(&report);
        match serde_json::to_string_pretty(&summary) {
            Ok(s) => println!("{s}"),
            Err(e) => fail(e),
        }
        return;
    }

    println!("\nFunction: {}", meta.name);
    println!("Status:   {}", report.message);
    println!("Success:  {}  Runaway: {}", report.success, report.runaway);
    println!("Best f:   {:.6e}", report.fun);
    println!("Best x:   {:?}", report.x.to_vec());
    println!("Generations: {}  Evaluations: {}", report.nit, report.nfev);
    println!("Elapsed:  {:.3}s", elapsed.as_secs_f64());
    if let Some((x_min, f_min)) = meta.global_minima.first() {
        if x_min.len() == args.dim {
            println!("Known global minimum: f={f_min} at {x_min:?}");
        }
    }

    if report.runaway {
        process::exit(1);
    }
}
