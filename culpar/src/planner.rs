//! Entropy-based test planner
//!
//! Scores every candidate test by the expected reduction in Shannon entropy
//! of the diagnosis distribution and selects the most informative one.
//!
//! ## Likelihood model
//!
//! For a candidate trace `T` and diagnosis `D`, with overlap
//! `o = |T ∩ D| / |D|`:
//!
//! ```text
//! P(pass | D) = pass_clear                     if T ∩ D = ∅
//!               max(floor, pass_base - o)      otherwise
//! P(fail | D) = fail_clear                     if T ∩ D = ∅
//!               min(ceiling, fail_base + o)    otherwise
//! ```
//!
//! The two rows are independent conditional likelihoods, not complements;
//! the clamp to `[floor, ceiling]` keeps posteriors non-degenerate across
//! repeated Bayesian updates. The same clamp is applied to the aggregated
//! predicted-pass probability.

use crate::diagnosis::{Diagnosis, DiagnosisSet};
use crate::spectrum::AvailableTest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Named constants of the likelihood model
///
/// The defaults are deliberate and documented; they are parameters rather
/// than magic numbers so experimental variation stays possible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikelihoodParams {
    /// P(pass | diagnosis untouched by the trace)
    pub pass_clear: f64,
    /// P(fail | diagnosis untouched by the trace)
    pub fail_clear: f64,
    /// Base of the overlap-discounted pass likelihood
    pub pass_base: f64,
    /// Base of the overlap-boosted fail likelihood
    pub fail_base: f64,
    /// Lower clamp for every likelihood and the predicted-pass probability
    pub floor: f64,
    /// Upper clamp for every likelihood and the predicted-pass probability
    pub ceiling: f64,
}

impl Default for LikelihoodParams {
    fn default() -> Self {
        Self {
            pass_clear: 0.9,
            fail_clear: 0.1,
            pass_base: 0.8,
            fail_base: 0.2,
            floor: 0.1,
            ceiling: 0.9,
        }
    }
}

/// The planner's choice: the test expected to be most informative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestPlan {
    pub test: AvailableTest,
    /// Expected entropy reduction upon observing the outcome
    pub info_gain: f64,
    /// Clamped probability that the test passes under the current beliefs
    pub predicted_pass: f64,
}

/// Fraction of a diagnosis touched by the trace: `|T ∩ D| / |D|`
#[must_use]
pub fn overlap(trace: &BTreeSet<String>, diagnosis: &Diagnosis) -> f64 {
    if diagnosis.cardinality() == 0 {
        return 0.0;
    }
    let touched = diagnosis
        .components()
        .iter()
        .filter(|id| trace.contains(*id))
        .count();
    touched as f64 / diagnosis.cardinality() as f64
}

/// P(test passes | diagnosis is the true fault)
#[must_use]
pub fn pass_likelihood(
    trace: &BTreeSet<String>,
    diagnosis: &Diagnosis,
    params: &LikelihoodParams,
) -> f64 {
    let o = overlap(trace, diagnosis);
    if o == 0.0 {
        params.pass_clear
    } else {
        (params.pass_base - o).max(params.floor)
    }
}

/// P(test fails | diagnosis is the true fault)
#[must_use]
pub fn fail_likelihood(
    trace: &BTreeSet<String>,
    diagnosis: &Diagnosis,
    params: &LikelihoodParams,
) -> f64 {
    let o = overlap(trace, diagnosis);
    if o == 0.0 {
        params.fail_clear
    } else {
        (params.fail_base + o).min(params.ceiling)
    }
}

/// Expected pass probability under the current distribution, clamped
#[must_use]
pub fn predicted_pass(
    omega: &DiagnosisSet,
    trace: &BTreeSet<String>,
    params: &LikelihoodParams,
) -> f64 {
    let expected: f64 = omega
        .iter()
        .map(|diagnosis| diagnosis.probability() * pass_likelihood(trace, diagnosis, params))
        .sum();
    expected.clamp(params.floor, params.ceiling)
}

/// Expected information gain of executing a test with the given trace
///
/// `IG = H - (P(pass) * H_pass + (1 - P(pass)) * H_fail)`, clamped to zero
/// against floating-point drift. A trace disjoint from every diagnosis
/// leaves both hypothetical posteriors equal to the prior, so its gain is
/// exactly zero.
#[must_use]
pub fn information_gain(
    omega: &DiagnosisSet,
    trace: &BTreeSet<String>,
    params: &LikelihoodParams,
    min_weight: f64,
) -> f64 {
    let pass_likelihoods: Vec<f64> = omega
        .iter()
        .map(|diagnosis| pass_likelihood(trace, diagnosis, params))
        .collect();
    let fail_likelihoods: Vec<f64> = omega
        .iter()
        .map(|diagnosis| fail_likelihood(trace, diagnosis, params))
        .collect();

    let p_pass = predicted_pass(omega, trace, params);
    let entropy_pass = omega.updated(&pass_likelihoods, min_weight).entropy();
    let entropy_fail = omega.updated(&fail_likelihoods, min_weight).entropy();

    let expected_posterior = p_pass * entropy_pass + (1.0 - p_pass) * entropy_fail;
    (omega.entropy() - expected_posterior).max(0.0)
}

/// Pick the candidate with maximum information gain
///
/// Ties break on the lexicographically smaller test name. Returns `None`
/// when the pool is empty, when at most one diagnosis remains (no
/// uncertainty to reduce), or when no candidate can gain any information.
#[must_use]
pub fn select_next_test(
    omega: &DiagnosisSet,
    candidates: &[AvailableTest],
    params: &LikelihoodParams,
    min_weight: f64,
) -> Option<TestPlan> {
    if candidates.is_empty() || omega.len() <= 1 {
        return None;
    }

    let mut ordered: Vec<&AvailableTest> = candidates.iter().collect();
    ordered.sort_by(|a, b| a.name.cmp(&b.name));

    let mut best: Option<(f64, &AvailableTest)> = None;
    for candidate in ordered {
        let gain = information_gain(omega, &candidate.estimated_trace, params, min_weight);
        if best.is_none_or(|(best_gain, _)| gain > best_gain) {
            best = Some((gain, candidate));
        }
    }

    let (info_gain, test) = best?;
    if info_gain <= 0.0 {
        // Nothing to learn from any remaining candidate
        return None;
    }
    Some(TestPlan {
        test: test.clone(),
        info_gain,
        predicted_pass: predicted_pass(omega, &test.estimated_trace, params),
    })
}
