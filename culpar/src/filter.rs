//! Component relevance filter
//!
//! Drops elements that cannot usefully appear in a diagnosis before the
//! hitting-set enumeration runs. Exclusion rules are evaluated in order and
//! the first match wins:
//!
//! 1. Constructor-like ids (configured sigils or the class-name heuristic)
//! 2. Universally covered elements (coverage ratio above the cutoff)
//! 3. Framework/infrastructure ids (configured substring block-list)
//! 4. Elements never covered by a failing test (`ef = 0`)

use crate::config::Config;
use crate::conflict::Conflict;
use crate::error::Error;
use crate::spectrum::{Element, Spectrum};
use regex::Regex;

/// Why an element was excluded from the conflict universe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    ConstructorLike,
    UniversallyCovered,
    Framework,
    ZeroIncrimination,
}

/// Relevance filter compiled from a [`Config`]
#[derive(Debug)]
pub struct ComponentFilter {
    sigils: Vec<Regex>,
    blocklist: Vec<String>,
    coverage_threshold: f64,
}

impl ComponentFilter {
    /// Compile the filter; fails on an invalid sigil pattern
    pub fn new(config: &Config) -> Result<Self, Error> {
        let mut sigils = Vec::with_capacity(config.constructor_sigils.len());
        for pattern in &config.constructor_sigils {
            let regex = Regex::new(pattern).map_err(|source| Error::InvalidSigil {
                pattern: pattern.clone(),
                source,
            })?;
            sigils.push(regex);
        }
        Ok(Self {
            sigils,
            blocklist: config.framework_blocklist.clone(),
            coverage_threshold: config.coverage_threshold,
        })
    }

    /// Decide exclusion for one element; `None` means the element is kept
    #[must_use]
    pub fn exclusion(&self, element: &Element) -> Option<ExclusionReason> {
        if self.is_constructor_like(&element.id) {
            return Some(ExclusionReason::ConstructorLike);
        }
        if element.counter.coverage_ratio() > self.coverage_threshold {
            return Some(ExclusionReason::UniversallyCovered);
        }
        if self.blocklist.iter().any(|block| element.id.contains(block)) {
            return Some(ExclusionReason::Framework);
        }
        if element.counter.ef == 0 {
            return Some(ExclusionReason::ZeroIncrimination);
        }
        None
    }

    /// Filter one conflict's component set; `None` when nothing survives
    #[must_use]
    pub fn retain(&self, conflict: &Conflict, spectrum: &Spectrum) -> Option<Conflict> {
        let kept = conflict
            .components()
            .iter()
            .filter(|id| {
                spectrum
                    .element(id)
                    .is_some_and(|element| self.exclusion(element).is_none())
            })
            .cloned()
            .collect();
        Conflict::new(kept, conflict.test_name())
    }

    /// Filter every conflict, dropping those left empty
    #[must_use]
    pub fn apply(&self, conflicts: &[Conflict], spectrum: &Spectrum) -> Vec<Conflict> {
        conflicts
            .iter()
            .filter_map(|conflict| self.retain(conflict, spectrum))
            .collect()
    }

    fn is_constructor_like(&self, id: &str) -> bool {
        if self.sigils.iter().any(|sigil| sigil.is_match(id)) {
            return true;
        }
        constructor_heuristic(id)
    }
}

/// Class-name heuristic for implicit constructors
///
/// Matches ids of the shape `pkg.Class#Class()`: the method segment ends in
/// `()`, starts with an uppercase letter, and repeats the simple class name.
fn constructor_heuristic(id: &str) -> bool {
    let Some((class_path, method)) = id.rsplit_once('#') else {
        return false;
    };
    let Some(method_name) = method.strip_suffix("()") else {
        return false;
    };
    if !method_name.chars().next().is_some_and(char::is_uppercase) {
        return false;
    }
    let simple_class = class_path
        .rsplit(['.', '$'])
        .next()
        .unwrap_or(class_path);
    method_name == simple_class
}
