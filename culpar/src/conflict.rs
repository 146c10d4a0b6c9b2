//! Conflict extraction from failed tests
//!
//! A conflict is the set of elements covered by a single failed test: at
//! least one of them must be faulty for that failure to be explained.
//! Conflicts are immutable once created and are rebuilt from the spectrum on
//! every loop iteration.

use crate::spectrum::Spectrum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The elements covered by one failed test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    components: BTreeSet<String>,
    test_name: String,
}

impl Conflict {
    /// Create a conflict; returns `None` for an empty component set
    ///
    /// A failure with an empty trace conveys no localization information.
    #[must_use]
    pub fn new(components: BTreeSet<String>, test_name: impl Into<String>) -> Option<Self> {
        if components.is_empty() {
            return None;
        }
        Some(Self {
            components,
            test_name: test_name.into(),
        })
    }

    #[must_use]
    pub fn components(&self) -> &BTreeSet<String> {
        &self.components
    }

    #[must_use]
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// Whether the given set intersects this conflict
    #[must_use]
    pub fn hit_by(&self, set: &BTreeSet<String>) -> bool {
        // Iterate the smaller side
        if set.len() <= self.components.len() {
            set.iter().any(|id| self.components.contains(id))
        } else {
            self.components.iter().any(|id| set.contains(id))
        }
    }
}

/// Build one conflict per failed test from its coverage row
///
/// Failed tests with empty traces are skipped. The output order follows the
/// spectrum's test order, and each component set follows the spectrum's
/// element order, so extraction is deterministic.
#[must_use]
pub fn extract_conflicts(spectrum: &Spectrum) -> Vec<Conflict> {
    spectrum
        .failed_tests()
        .filter_map(|(row, test)| Conflict::new(spectrum.trace(row), &test.name))
        .collect()
}
