//! Diagnoses and their probability distribution
//!
//! A diagnosis is a hitting set of the current conflicts together with a
//! probability. Identity is set-valued: two diagnoses with the same
//! components are the same diagnosis regardless of insertion order.
//!
//! ## Prior assignment
//!
//! ```text
//! raw(D) = avg_score(D) * alpha^(|D| - 1)
//! p(D)   = raw(D) / sum(raw)
//! ```
//!
//! `avg_score` is the mean suspiciousness of the components under the
//! configured formula and `alpha` is the parsimony penalty. When every raw
//! weight is zero the distribution falls back to uniform.

use crate::config::Config;
use crate::spectrum::Spectrum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

/// A candidate explanation: a set of elements assumed jointly faulty
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnosis {
    components: BTreeSet<String>,
    probability: f64,
}

impl Diagnosis {
    #[must_use]
    pub fn new(components: BTreeSet<String>, probability: f64) -> Self {
        Self {
            components,
            probability,
        }
    }

    #[must_use]
    pub fn components(&self) -> &BTreeSet<String> {
        &self.components
    }

    #[must_use]
    pub fn probability(&self) -> f64 {
        self.probability
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.components.contains(id)
    }

    /// Number of blamed components
    #[must_use]
    pub fn cardinality(&self) -> usize {
        self.components.len()
    }
}

// Identity is the component set alone; the probability is derived state.
impl PartialEq for Diagnosis {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl Eq for Diagnosis {}

impl Hash for Diagnosis {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.components.hash(state);
    }
}

/// A normalized probability distribution over diagnoses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisSet {
    diagnoses: Vec<Diagnosis>,
}

impl DiagnosisSet {
    /// The empty distribution (no failures to explain)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assign the parsimony-weighted prior over the given hitting sets
    #[must_use]
    pub fn assign(sets: Vec<BTreeSet<String>>, spectrum: &Spectrum, config: &Config) -> Self {
        let diagnoses = sets
            .into_iter()
            .map(|components| {
                let raw = average_score(&components, spectrum, config)
                    * config
                        .size_penalty
                        .powi(components.len().saturating_sub(1) as i32);
                Diagnosis::new(components, raw)
            })
            .collect();

        let mut omega = Self { diagnoses };
        omega.normalize();
        omega
    }

    /// Uniform distribution over the given component sets
    #[must_use]
    pub fn uniform(sets: Vec<BTreeSet<String>>) -> Self {
        let count = sets.len();
        if count == 0 {
            return Self::empty();
        }
        let probability = 1.0 / count as f64;
        Self {
            diagnoses: sets
                .into_iter()
                .map(|components| Diagnosis::new(components, probability))
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnoses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnoses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnosis> {
        self.diagnoses.iter()
    }

    /// The most probable diagnosis; ties keep the lexicographically first
    #[must_use]
    pub fn argmax(&self) -> Option<&Diagnosis> {
        self.diagnoses.iter().reduce(|best, challenger| {
            if challenger.probability > best.probability {
                challenger
            } else {
                best
            }
        })
    }

    #[must_use]
    pub fn max_probability(&self) -> f64 {
        self.argmax().map_or(0.0, Diagnosis::probability)
    }

    /// Diagnoses sorted by probability descending, component set ascending
    #[must_use]
    pub fn ranked(&self) -> Vec<&Diagnosis> {
        let mut ranked: Vec<&Diagnosis> = self.diagnoses.iter().collect();
        ranked.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.components.cmp(&b.components))
        });
        ranked
    }

    /// Shannon entropy in nats, with `0 * ln 0 == 0`
    #[must_use]
    pub fn entropy(&self) -> f64 {
        let entropy = -self
            .diagnoses
            .iter()
            .map(|diagnosis| diagnosis.probability)
            .filter(|&p| p > 0.0)
            .map(|p| p * p.ln())
            .sum::<f64>();
        // ln of probabilities in (0, 1] is never positive, but guard drift
        entropy.max(0.0)
    }

    /// Bayesian update: `p'(D) ~ p(D) * likelihood[D]`
    ///
    /// Diagnoses whose unnormalized weight falls below `min_weight` are
    /// dropped. When every weight vanishes the prior is kept unchanged.
    /// `likelihoods` is positional over the current diagnoses.
    #[must_use]
    pub fn updated(&self, likelihoods: &[f64], min_weight: f64) -> Self {
        debug_assert_eq!(likelihoods.len(), self.diagnoses.len());

        let survivors: Vec<Diagnosis> = self
            .diagnoses
            .iter()
            .zip(likelihoods)
            .map(|(diagnosis, &likelihood)| {
                Diagnosis::new(
                    diagnosis.components.clone(),
                    diagnosis.probability * likelihood,
                )
            })
            .filter(|diagnosis| diagnosis.probability >= min_weight)
            .collect();

        if survivors.is_empty() {
            return self.clone();
        }

        let mut posterior = Self {
            diagnoses: survivors,
        };
        posterior.normalize();
        posterior
    }

    fn normalize(&mut self) {
        let total: f64 = self
            .diagnoses
            .iter()
            .map(|diagnosis| diagnosis.probability)
            .sum();
        if total > 0.0 {
            for diagnosis in &mut self.diagnoses {
                diagnosis.probability /= total;
            }
        } else if !self.diagnoses.is_empty() {
            let uniform = 1.0 / self.diagnoses.len() as f64;
            for diagnosis in &mut self.diagnoses {
                diagnosis.probability = uniform;
            }
        }
    }
}

/// Mean suspiciousness of a component set under the configured formula
fn average_score(components: &BTreeSet<String>, spectrum: &Spectrum, config: &Config) -> f64 {
    if components.is_empty() {
        return 0.0;
    }
    let total: f64 = components
        .iter()
        .map(|id| {
            spectrum
                .element(id)
                .map_or(0.0, |element| config.formula.score(&element.counter))
        })
        .sum();
    total / components.len() as f64
}
