//! Error types for spectrum loading, test execution, and session wiring
//!
//! Provides structured error types with:
//! - Fatal load errors (malformed spectra surface to the caller)
//! - Recoverable executor errors (the session drops the candidate and continues)
//! - Construction errors for misconfigured sessions

use thiserror::Error;

/// Fatal errors raised while building or mutating a spectrum
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("coverage matrix has {rows} rows but the spectrum declares {tests} tests")]
    RowCount { rows: usize, tests: usize },

    #[error("coverage row {row} has {found} columns but the spectrum declares {expected} elements")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("duplicate element id '{id}'")]
    DuplicateElement { id: String },

    #[error("spectrum declares no tests")]
    NoTests,

    #[error("test '{test}' reports coverage of unknown element '{id}'")]
    UnknownElement { id: String, test: String },

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Recoverable failure of a single test execution
///
/// The session logs the failure, removes the candidate from the pool, and
/// continues the loop without touching the spectrum.
#[derive(Error, Debug)]
#[error("test '{test}' failed to execute: {reason}")]
pub struct ExecutorError {
    pub test: String,
    pub reason: String,
}

impl ExecutorError {
    pub fn new(test: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            test: test.into(),
            reason: reason.into(),
        }
    }
}

/// Top-level error type for session construction and one-shot pipelines
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("invalid constructor sigil pattern '{pattern}'")]
    InvalidSigil {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("session requires a test executor")]
    MissingExecutor,

    #[error("session requires a spectrum or a spectra loader")]
    MissingSpectrum,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_display_row_count() {
        let err = LoadError::RowCount { rows: 3, tests: 2 };
        assert_eq!(
            err.to_string(),
            "coverage matrix has 3 rows but the spectrum declares 2 tests"
        );
    }

    #[test]
    fn test_executor_error_display() {
        let err = ExecutorError::new("t1", "build timed out");
        assert_eq!(err.to_string(), "test 't1' failed to execute: build timed out");
    }

    #[test]
    fn test_error_wraps_load_error() {
        let err: Error = LoadError::NoTests.into();
        assert!(matches!(err, Error::Load(LoadError::NoTests)));
    }
}
