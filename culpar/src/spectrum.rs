//! In-memory spectrum model
//!
//! The spectrum is the joint data of program elements, executed tests, and
//! the coverage bitmap `M[test][element]`. Per-element counters
//! `(ef, ep, nf, np)` are an exact function of the bitmap and the pass/fail
//! vector and are recomputed on every mutation.

use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// 2x2 coverage counter for one element
///
/// `ef`/`ep` count failing/passing tests that covered the element,
/// `nf`/`np` count failing/passing tests that did not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub ef: u32,
    pub ep: u32,
    pub nf: u32,
    pub np: u32,
}

impl Counter {
    /// Total number of tests tallied into this counter
    #[must_use]
    pub fn total(&self) -> u32 {
        self.ef + self.ep + self.nf + self.np
    }

    /// Fraction of tests that covered the element
    #[must_use]
    pub fn coverage_ratio(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        f64::from(self.ef + self.ep) / f64::from(total)
    }
}

/// A unit of program code the spectrum tracks (e.g. a method signature)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Opaque byte-stable identifier
    pub id: String,
    /// Counters derived from the current spectrum
    pub counter: Counter,
}

/// An executed test with its verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub failed: bool,
}

impl TestCase {
    pub fn passed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failed: false,
        }
    }

    pub fn failed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failed: true,
        }
    }
}

/// An unexecuted candidate test with a predicted trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableTest {
    pub name: String,
    pub estimated_trace: BTreeSet<String>,
}

impl AvailableTest {
    pub fn new<I, S>(name: impl Into<String>, estimated_trace: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            estimated_trace: estimated_trace.into_iter().map(Into::into).collect(),
        }
    }
}

/// The observed outcome of executing a candidate test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub actual_trace: BTreeSet<String>,
}

impl TestResult {
    pub fn new<I, S>(name: impl Into<String>, passed: bool, actual_trace: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            passed,
            actual_trace: actual_trace.into_iter().map(Into::into).collect(),
        }
    }
}

/// Elements, tests, and the coverage bitmap with derived counters
///
/// Invariants: `matrix.len() == tests.len()`, every row has
/// `elements.len()` columns, element ids are unique, and counters always
/// reflect the current bitmap and verdict vector.
#[derive(Debug, Clone)]
pub struct Spectrum {
    elements: Vec<Element>,
    tests: Vec<TestCase>,
    matrix: Vec<Vec<bool>>,
    index: HashMap<String, usize>,
}

impl Spectrum {
    /// Build a spectrum, validating dimensions and id uniqueness
    pub fn new(
        element_ids: Vec<String>,
        tests: Vec<TestCase>,
        matrix: Vec<Vec<bool>>,
    ) -> Result<Self, LoadError> {
        if tests.is_empty() {
            return Err(LoadError::NoTests);
        }
        if matrix.len() != tests.len() {
            return Err(LoadError::RowCount {
                rows: matrix.len(),
                tests: tests.len(),
            });
        }
        for (row, columns) in matrix.iter().enumerate() {
            if columns.len() != element_ids.len() {
                return Err(LoadError::RowWidth {
                    row,
                    expected: element_ids.len(),
                    found: columns.len(),
                });
            }
        }

        let mut index = HashMap::with_capacity(element_ids.len());
        for (position, id) in element_ids.iter().enumerate() {
            if index.insert(id.clone(), position).is_some() {
                return Err(LoadError::DuplicateElement { id: id.clone() });
            }
        }

        let elements = element_ids
            .into_iter()
            .map(|id| Element {
                id,
                counter: Counter::default(),
            })
            .collect();

        let mut spectrum = Self {
            elements,
            tests,
            matrix,
            index,
        };
        spectrum.recompute_counters();
        Ok(spectrum)
    }

    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    #[must_use]
    pub fn tests(&self) -> &[TestCase] {
        &self.tests
    }

    /// Look up an element by id
    #[must_use]
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.index.get(id).map(|&position| &self.elements[position])
    }

    /// Whether the given test covered the given element
    #[must_use]
    pub fn covers(&self, test: usize, id: &str) -> bool {
        self.index
            .get(id)
            .is_some_and(|&position| self.matrix[test][position])
    }

    /// The set of element ids covered by the given test row
    #[must_use]
    pub fn trace(&self, test: usize) -> BTreeSet<String> {
        self.matrix[test]
            .iter()
            .enumerate()
            .filter(|(_, &covered)| covered)
            .map(|(position, _)| self.elements[position].id.clone())
            .collect()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.tests.iter().any(|test| test.failed)
    }

    /// Failed tests with their row indices, in spectrum order
    pub fn failed_tests(&self) -> impl Iterator<Item = (usize, &TestCase)> {
        self.tests
            .iter()
            .enumerate()
            .filter(|(_, test)| test.failed)
    }

    /// Append an executed test as a new coverage row and recompute counters
    ///
    /// The actual trace must only name elements already in the spectrum;
    /// elements are created at load time and never added later.
    pub fn append_result(&mut self, result: &TestResult) -> Result<(), LoadError> {
        let mut row = vec![false; self.elements.len()];
        for id in &result.actual_trace {
            let position = self.index.get(id).ok_or_else(|| LoadError::UnknownElement {
                id: id.clone(),
                test: result.name.clone(),
            })?;
            row[*position] = true;
        }

        self.tests.push(TestCase {
            name: result.name.clone(),
            failed: !result.passed,
        });
        self.matrix.push(row);
        self.recompute_counters();
        Ok(())
    }

    fn recompute_counters(&mut self) {
        for element in &mut self.elements {
            element.counter = Counter::default();
        }
        for (row, test) in self.tests.iter().enumerate() {
            for (position, element) in self.elements.iter_mut().enumerate() {
                let covered = self.matrix[row][position];
                match (covered, test.failed) {
                    (true, true) => element.counter.ef += 1,
                    (true, false) => element.counter.ep += 1,
                    (false, true) => element.counter.nf += 1,
                    (false, false) => element.counter.np += 1,
                }
            }
        }
    }
}
