//! Suspiciousness ranking of individual elements
//!
//! The classic SFL report: every element with its counter and score under a
//! chosen formula, sorted most-suspicious first. Independent of the
//! diagnosis pipeline; useful on its own and as the source of the fallback
//! singleton diagnoses.

use crate::formula::Formula;
use crate::spectrum::{Counter, Spectrum};
use serde::{Deserialize, Serialize};

/// One row of the ranking report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedElement {
    pub id: String,
    pub score: f64,
    pub counter: Counter,
}

/// Score-sorted view of every element in a spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub formula: Formula,
    entries: Vec<RankedElement>,
}

impl Ranking {
    /// Rank every element by suspiciousness, ties broken by id
    #[must_use]
    pub fn rank(spectrum: &Spectrum, formula: Formula) -> Self {
        let mut entries: Vec<RankedElement> = spectrum
            .elements()
            .iter()
            .map(|element| RankedElement {
                id: element.id.clone(),
                score: formula.score(&element.counter),
                counter: element.counter,
            })
            .collect();

        entries.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        Self { formula, entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[RankedElement] {
        &self.entries
    }

    /// The `n` most suspicious elements
    #[must_use]
    pub fn top(&self, n: usize) -> &[RankedElement] {
        &self.entries[..n.min(self.entries.len())]
    }
}
