//! Session configuration
//!
//! Every tunable of the engine lives in an explicit [`Config`] passed at
//! construction, so independent sessions can coexist with different
//! parameters. There is no global state.

use crate::formula::Formula;
use crate::planner::LikelihoodParams;
use serde::{Deserialize, Serialize};

/// Default constructor sigils for filter rule 1 (regex patterns)
pub const DEFAULT_CONSTRUCTOR_SIGILS: &[&str] = &["#<init>", "#<clinit>"];

/// Default infrastructure-method substrings for filter rule 3
pub const DEFAULT_FRAMEWORK_BLOCKLIST: &[&str] = &[
    "junit.framework",
    "org.junit",
    "org.hamcrest",
    "java.lang.Object#",
    "sun.reflect",
];

/// Tunables for one TDP session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Suspiciousness formula used for ranking and the parsimony prior
    pub formula: Formula,
    /// Largest hitting-set size the enumerator will try (`S_max`)
    pub max_set_size: usize,
    /// Cap on returned diagnoses (`N`)
    pub max_diagnoses: usize,
    /// Parsimony penalty base `alpha`; raw weight is `avg_score * alpha^(|D|-1)`
    pub size_penalty: f64,
    /// Prune threshold `epsilon` for unnormalized weights in the Bayesian update
    pub min_weight: f64,
    /// Upper bound on TDP loop iterations
    pub max_iterations: usize,
    /// Universal-coverage cutoff for filter rule 2
    pub coverage_threshold: f64,
    /// Regex patterns marking constructor-like elements (filter rule 1)
    pub constructor_sigils: Vec<String>,
    /// Substrings marking framework/infrastructure elements (filter rule 3)
    pub framework_blocklist: Vec<String>,
    /// Likelihood model constants for the planner
    pub likelihood: LikelihoodParams,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            formula: Formula::Barinel,
            max_set_size: 3,
            max_diagnoses: 20,
            size_penalty: 0.5,
            min_weight: 1e-3,
            max_iterations: 10,
            coverage_threshold: 0.8,
            constructor_sigils: DEFAULT_CONSTRUCTOR_SIGILS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            framework_blocklist: DEFAULT_FRAMEWORK_BLOCKLIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
            likelihood: LikelihoodParams::default(),
        }
    }
}
