//! Pluggable adapters at the engine boundary
//!
//! The core consumes three interfaces: a [`SpectraLoader`] supplying the
//! initial spectrum, a [`CandidateTestSource`] supplying unexecuted test
//! candidates, and a [`TestExecutor`] running one candidate at a time
//! (possibly waiting on a human or a build system).
//!
//! Ships with in-memory implementations for offline replay and tests, plus
//! a loader for the plain-text form emitted by external SFL tooling:
//!
//! - `spectra.csv` — one element id per line
//! - `matrix.txt` — one row per test of `0`/`1` columns, ending in `+`
//!   (pass) or `-` (fail)
//! - `tests.csv` — optional, one test name per line

use crate::error::{ExecutorError, LoadError};
use crate::spectrum::{AvailableTest, Spectrum, TestCase, TestResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Supplies the initial spectrum for a session
pub trait SpectraLoader {
    fn load(&self) -> Result<Spectrum, LoadError>;
}

/// Supplies zero or more candidate tests with estimated traces
///
/// Candidate names must be unique within the pool and every estimated
/// trace element should appear in the spectrum's element universe.
pub trait CandidateTestSource {
    fn candidates(&mut self) -> Vec<AvailableTest>;
}

/// Executes one candidate test and reports the observed result
pub trait TestExecutor {
    fn execute(&mut self, test: &AvailableTest) -> Result<TestResult, ExecutorError>;
}

/// Loader wrapping an already-built spectrum
#[derive(Debug, Clone)]
pub struct StaticSpectraLoader {
    spectrum: Spectrum,
}

impl StaticSpectraLoader {
    pub fn new(spectrum: Spectrum) -> Self {
        Self { spectrum }
    }
}

impl SpectraLoader for StaticSpectraLoader {
    fn load(&self) -> Result<Spectrum, LoadError> {
        Ok(self.spectrum.clone())
    }
}

/// Fixed candidate pool handed out once
#[derive(Debug, Clone, Default)]
pub struct StaticTestSource {
    pool: Vec<AvailableTest>,
}

impl StaticTestSource {
    pub fn new(pool: Vec<AvailableTest>) -> Self {
        Self { pool }
    }
}

impl CandidateTestSource for StaticTestSource {
    fn candidates(&mut self) -> Vec<AvailableTest> {
        std::mem::take(&mut self.pool)
    }
}

/// Executor replaying a table of predetermined results
///
/// Useful for offline replay and for driving the controller in tests. A
/// candidate without a scripted result fails recoverably.
#[derive(Debug, Clone, Default)]
pub struct ScriptedExecutor {
    results: HashMap<String, TestResult>,
}

impl ScriptedExecutor {
    pub fn new(results: impl IntoIterator<Item = TestResult>) -> Self {
        Self {
            results: results
                .into_iter()
                .map(|result| (result.name.clone(), result))
                .collect(),
        }
    }
}

impl TestExecutor for ScriptedExecutor {
    fn execute(&mut self, test: &AvailableTest) -> Result<TestResult, ExecutorError> {
        self.results
            .remove(&test.name)
            .ok_or_else(|| ExecutorError::new(&test.name, "no scripted result"))
    }
}

/// Loader for the three-part plain-text spectra directory
#[derive(Debug, Clone)]
pub struct DirSpectraLoader {
    dir: PathBuf,
}

impl DirSpectraLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SpectraLoader for DirSpectraLoader {
    fn load(&self) -> Result<Spectrum, LoadError> {
        load_from_dir(&self.dir)
    }
}

/// Read `spectra.csv`, `matrix.txt`, and optional `tests.csv` from `dir`
pub fn load_from_dir(dir: &Path) -> Result<Spectrum, LoadError> {
    let elements = parse_elements(&std::fs::read_to_string(dir.join("spectra.csv"))?);
    let (rows, verdicts) = parse_matrix(&std::fs::read_to_string(dir.join("matrix.txt"))?)?;

    let names = match std::fs::read_to_string(dir.join("tests.csv")) {
        Ok(content) => {
            let names = parse_test_names(&content);
            if names.len() != rows.len() {
                return Err(LoadError::Parse {
                    line: names.len(),
                    reason: format!(
                        "tests.csv names {} tests but matrix.txt has {} rows",
                        names.len(),
                        rows.len()
                    ),
                });
            }
            names
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            (0..rows.len()).map(|row| format!("test_{row}")).collect()
        }
        Err(err) => return Err(err.into()),
    };

    let tests = names
        .into_iter()
        .zip(&verdicts)
        .map(|(name, &failed)| TestCase { name, failed })
        .collect();

    Spectrum::new(elements, tests, rows)
}

fn parse_elements(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .skip_while(|line| *line == "name")
        .map(str::to_string)
        .collect()
}

fn parse_test_names(content: &str) -> Vec<String> {
    parse_elements(content)
}

/// Parse matrix rows of `0`/`1` columns with a trailing `+`/`-` verdict
fn parse_matrix(content: &str) -> Result<(Vec<Vec<bool>>, Vec<bool>), LoadError> {
    let mut rows = Vec::new();
    let mut verdicts = Vec::new();

    for (line_number, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let mut tokens: Vec<&str> = trimmed.split_whitespace().collect();
        let verdict = tokens.pop().ok_or_else(|| LoadError::Parse {
            line: line_number + 1,
            reason: "empty matrix row".to_string(),
        })?;
        let failed = match verdict {
            "+" => false,
            "-" => true,
            other => {
                return Err(LoadError::Parse {
                    line: line_number + 1,
                    reason: format!("expected '+' or '-' verdict, found '{other}'"),
                })
            }
        };

        let mut row = Vec::with_capacity(tokens.len());
        for token in tokens {
            match token {
                "0" => row.push(false),
                "1" => row.push(true),
                other => {
                    return Err(LoadError::Parse {
                        line: line_number + 1,
                        reason: format!("expected '0' or '1' coverage bit, found '{other}'"),
                    })
                }
            }
        }

        rows.push(row);
        verdicts.push(failed);
    }

    Ok((rows, verdicts))
}
