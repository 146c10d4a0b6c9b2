//! # Culpar - Entropy-Guided Spectrum-Based Fault Localization
// Allow unwrap in test code - tests should panic on unexpected conditions
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow indexing in test code - tests should panic on out-of-bounds
#![cfg_attr(test, allow(clippy::indexing_slicing))]
//!
//! Culpar implements the interactive *Test, Diagnose, Plan* (TDP) loop over
//! the output of a spectrum-based fault-localization run: it derives
//! conflicts from failing tests, enumerates minimal hitting sets as
//! candidate diagnoses, weights them with a suspiciousness formula and a
//! parsimony prior, and picks the next test to execute by expected
//! information gain.
//!
//! ## Features
//!
//! - **Deterministic**: identical spectra and parameters always produce the
//!   identical diagnosis distribution and test plan
//! - **Bounded**: layered hitting-set enumeration with hard size caps
//! - **Self-contained sessions**: every tunable lives in an explicit
//!   [`Config`]; independent sessions can run with different parameters
//!
//! ## Quick Start
//!
//! ```rust
//! use culpar::{diagnose, Config, Spectrum, TestCase};
//!
//! // Two failures share one covered element; two passes thin the noise.
//! let spectrum = Spectrum::new(
//!     vec!["a".into(), "b".into(), "c".into()],
//!     vec![
//!         TestCase::failed("t1"),
//!         TestCase::failed("t2"),
//!         TestCase::passed("t3"),
//!         TestCase::passed("t4"),
//!     ],
//!     vec![
//!         vec![true, true, false],
//!         vec![true, false, true],
//!         vec![false, true, false],
//!         vec![false, false, true],
//!     ],
//! )
//! .unwrap();
//!
//! let omega = diagnose(&spectrum, &Config::default()).unwrap();
//! let best = omega.argmax().unwrap();
//! assert!(best.contains("a"));
//! assert!((best.probability() - 1.0).abs() < 1e-9);
//! ```
//!
//! ## Driving the full loop
//!
//! Wire a [`TdpSession`] with a spectrum (or a [`SpectraLoader`]), a
//! [`CandidateTestSource`], and a [`TestExecutor`]; `run` drives the loop
//! until the distribution collapses, the planner starves, or the iteration
//! budget runs out.

/// Pluggable loader, candidate-source, and executor adapters
pub mod adapters;
/// Session configuration record
pub mod config;
/// Conflict extraction from failed tests
pub mod conflict;
/// Diagnoses and their probability distribution
pub mod diagnosis;
/// Error types
pub mod error;
/// Component relevance filter
pub mod filter;
/// Suspiciousness formulas (Ochiai, Tarantula, Barinel)
pub mod formula;
/// Layered minimal hitting-set enumeration
pub mod hitting;
/// Entropy-based test planner
pub mod planner;
/// Per-element suspiciousness ranking
pub mod ranking;
/// TDP session controller
pub mod session;
/// Spectrum model: elements, tests, coverage bitmap, counters
pub mod spectrum;

pub use adapters::{
    load_from_dir, CandidateTestSource, DirSpectraLoader, ScriptedExecutor, SpectraLoader,
    StaticSpectraLoader, StaticTestSource, TestExecutor,
};
pub use config::Config;
pub use conflict::{extract_conflicts, Conflict};
pub use diagnosis::{Diagnosis, DiagnosisSet};
pub use error::{Error, ExecutorError, LoadError};
pub use filter::{ComponentFilter, ExclusionReason};
pub use formula::Formula;
pub use hitting::{enumerate, Enumeration};
pub use planner::{
    information_gain, select_next_test, LikelihoodParams, TestPlan,
};
pub use ranking::{RankedElement, Ranking};
pub use session::{
    diagnose, CancelToken, ExecutedTest, SessionOutcome, SessionState, TdpSession,
    TdpSessionBuilder, Termination,
};
pub use spectrum::{AvailableTest, Counter, Element, Spectrum, TestCase, TestResult};
