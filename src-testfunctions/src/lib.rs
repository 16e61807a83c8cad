//! Benchmark objective functions
//!
//! Functions used to exercise and benchmark the evolab optimizers, grouped by
//! landscape:
//!
//! - **Unimodal**: single global optimum (sphere, rosenbrock)
//! - **Multimodal**: many local minima (ackley, rastrigin, griewank)
//!
//! # Example
//!
//! ```rust
//! use ndarray::Array1;
//! use evolab_testfunctions::*;
//!
//! let x = Array1::from_vec(vec![0.0, 0.0]);
//! assert_eq!(sphere(&x), 0.0);
//!
//! let bounds = get_function_bounds("sphere").unwrap();
//! assert_eq!(bounds.len(), 2);
//! ```

use ndarray::Array1;
use std::collections::HashMap;

pub mod functions;
pub use functions::*;

/// Signature shared by every benchmark function
pub type ObjectiveFn = fn(&Array1<f64>) -> f64;

/// Metadata for a test function: bounds, known minima, and a short description
#[derive(Debug, Clone)]
pub struct FunctionMetadata {
    /// Function name
    pub name: String,
    /// Default bounds for each dimension (min, max)
    pub bounds: Vec<(f64, f64)>,
    /// Global minima locations and values
    pub global_minima: Vec<(Vec<f64>, f64)>,
    /// Description of the function
    pub description: String,
    /// Whether the function is multimodal
    pub multimodal: bool,
    /// Typical dimension(s) for the function
    pub dimensions: Vec<usize>,
    /// The function itself
    pub function: ObjectiveFn,
}

fn entry(
    name: &str,
    bound: (f64, f64),
    minimum: [f64; 2],
    description: &str,
    multimodal: bool,
    function: ObjectiveFn,
) -> (String, FunctionMetadata) {
    let meta = FunctionMetadata {
        name: name.to_string(),
        bounds: vec![bound; 2],
        global_minima: vec![(minimum.to_vec(), 0.0)],
        description: description.to_string(),
        multimodal,
        dimensions: vec![2, 5, 10],
        function,
    };
    (name.to_string(), meta)
}

/// Metadata of every benchmark, keyed by name (2-D defaults)
pub fn get_function_metadata() -> HashMap<String, FunctionMetadata> {
    HashMap::from([
        entry("sphere", (-5.0, 5.0), [0.0, 0.0], "N-dimensional bowl, sum of squares", false, sphere),
        entry(
            "rosenbrock",
            (-5.0, 10.0),
            [1.0, 1.0],
            "N-dimensional narrow curved valley",
            false,
            rosenbrock,
        ),
        entry(
            "ackley",
            (-5.12, 5.12),
            [0.0, 0.0],
            "N-dimensional multimodal function with a deep central funnel",
            true,
            ackley,
        ),
        entry(
            "rastrigin",
            (-5.12, 5.12),
            [0.0, 0.0],
            "N-dimensional, regularly distributed local minima",
            true,
            rastrigin,
        ),
        entry(
            "griewank",
            (-600.0, 600.0),
            [0.0, 0.0],
            "N-dimensional, product term couples the variables",
            true,
            griewank,
        ),
    ])
}

/// Get the default bounds of a function, if it is known
pub fn get_function_bounds(function_name: &str) -> Option<Vec<(f64, f64)>> {
    let metadata = get_function_metadata();
    metadata.get(function_name).map(|meta| meta.bounds.clone())
}

/// Bounds for `dim` dimensions, repeating the first default bound of the
/// function; falls back to `default_bounds` for unknown names
pub fn get_function_bounds_nd(
    function_name: &str,
    dim: usize,
    default_bounds: (f64, f64),
) -> Vec<(f64, f64)> {
    let bound = get_function_bounds(function_name)
        .and_then(|b| b.first().copied())
        .unwrap_or(default_bounds);
    vec![bound; dim]
}

/// Look a function up by name
pub fn get_function(function_name: &str) -> Option<ObjectiveFn> {
    get_function_metadata().get(function_name).map(|meta| meta.function)
}
