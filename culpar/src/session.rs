//! TDP session controller
//!
//! Drives the Test, Diagnose, Plan loop: extract conflicts, enumerate
//! hitting sets, assign probabilities, plan the next test, execute it, and
//! fold the result back into the spectrum until a termination condition
//! holds. The controller is the sole owner and sole writer of the spectrum;
//! every subordinate component receives read-only views.

use crate::adapters::{CandidateTestSource, SpectraLoader, TestExecutor};
use crate::config::Config;
use crate::conflict::extract_conflicts;
use crate::diagnosis::{Diagnosis, DiagnosisSet};
use crate::error::Error;
use crate::filter::ComponentFilter;
use crate::hitting;
use crate::planner::select_next_test;
use crate::ranking::Ranking;
use crate::spectrum::{AvailableTest, Spectrum};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Probability above which the top diagnosis counts as solved
const SOLVED_PROBABILITY: f64 = 0.9;

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// A single diagnosis remains or one dominates the distribution
    Solved,
    /// The spectrum contains no failing test
    NoFailure,
    /// The planner starved or the iteration budget ran out
    Exhausted,
    /// The cooperative cancel signal was observed
    Cancelled,
}

/// Controller state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    Diagnosing,
    Planning,
    Executing,
    Updating,
    Terminated(Termination),
}

/// Cooperative cancellation signal, checked at state transitions
///
/// Cancelling mid-loop leaves the spectrum untouched since the last
/// completed update.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// One executed test recorded in the session log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutedTest {
    pub name: String,
    pub passed: bool,
}

/// Final report of one TDP session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub termination: Termination,
    /// Number of completed execute-and-update cycles
    pub iterations: usize,
    pub executed: Vec<ExecutedTest>,
    /// The final diagnosis distribution
    pub diagnoses: DiagnosisSet,
    /// Most probable diagnosis, if any
    pub best: Option<Diagnosis>,
    /// Entropy of the distribution after each diagnosing pass
    pub entropy_trace: Vec<f64>,
}

/// Builder for [`TdpSession`]
#[derive(Default)]
pub struct TdpSessionBuilder {
    config: Config,
    spectrum: Option<Spectrum>,
    loader: Option<Box<dyn SpectraLoader>>,
    source: Option<Box<dyn CandidateTestSource>>,
    executor: Option<Box<dyn TestExecutor>>,
    cancel: Option<CancelToken>,
}

impl TdpSessionBuilder {
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Use an already-built spectrum (takes precedence over a loader)
    #[must_use]
    pub fn spectrum(mut self, spectrum: Spectrum) -> Self {
        self.spectrum = Some(spectrum);
        self
    }

    #[must_use]
    pub fn loader(mut self, loader: impl SpectraLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    #[must_use]
    pub fn candidates(mut self, source: impl CandidateTestSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    #[must_use]
    pub fn executor(mut self, executor: impl TestExecutor + 'static) -> Self {
        self.executor = Some(Box::new(executor));
        self
    }

    #[must_use]
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Wire the session; loader errors abort here, before diagnosing starts
    pub fn build(self) -> Result<TdpSession, Error> {
        let spectrum = match (self.spectrum, self.loader) {
            (Some(spectrum), _) => spectrum,
            (None, Some(loader)) => loader.load()?,
            (None, None) => return Err(Error::MissingSpectrum),
        };
        let executor = self.executor.ok_or(Error::MissingExecutor)?;
        let filter = ComponentFilter::new(&self.config)?;
        let pool = self
            .source
            .map(|mut source| source.candidates())
            .unwrap_or_default();

        info!(
            "session initialized: {} elements, {} tests, {} candidates",
            spectrum.elements().len(),
            spectrum.tests().len(),
            pool.len()
        );

        Ok(TdpSession {
            config: self.config,
            filter,
            spectrum,
            pool,
            executor,
            cancel: self.cancel.unwrap_or_default(),
            state: SessionState::Initializing,
        })
    }
}

/// Interactive fault-localization session
pub struct TdpSession {
    config: Config,
    filter: ComponentFilter,
    spectrum: Spectrum,
    pool: Vec<AvailableTest>,
    executor: Box<dyn TestExecutor>,
    cancel: CancelToken,
    state: SessionState,
}

impl TdpSession {
    #[must_use]
    pub fn builder() -> TdpSessionBuilder {
        TdpSessionBuilder::default()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn spectrum(&self) -> &Spectrum {
        &self.spectrum
    }

    /// A clone of the cancel signal for another thread to trigger
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run one diagnosing pass over the current spectrum
    #[must_use]
    pub fn diagnose(&self) -> DiagnosisSet {
        diagnose_filtered(&self.spectrum, &self.filter, &self.config)
    }

    /// Drive the TDP loop to termination
    pub fn run(&mut self) -> SessionOutcome {
        let mut executed = Vec::new();
        let mut entropy_trace = Vec::new();
        let mut iterations = 0;
        let mut omega = DiagnosisSet::empty();

        loop {
            if self.cancel.is_cancelled() {
                return self.terminate(
                    Termination::Cancelled,
                    omega,
                    iterations,
                    executed,
                    entropy_trace,
                );
            }

            self.state = SessionState::Diagnosing;
            omega = self.diagnose();
            entropy_trace.push(omega.entropy());
            debug!(
                "iteration {}: {} diagnoses, entropy {:.4}",
                iterations,
                omega.len(),
                omega.entropy()
            );

            if omega.is_empty() && !self.spectrum.has_failures() {
                return self.terminate(
                    Termination::NoFailure,
                    omega,
                    iterations,
                    executed,
                    entropy_trace,
                );
            }
            if omega.len() == 1 || omega.max_probability() > SOLVED_PROBABILITY {
                info!(
                    "solved after {} iterations with p = {:.4}",
                    iterations,
                    omega.max_probability()
                );
                return self.terminate(
                    Termination::Solved,
                    omega,
                    iterations,
                    executed,
                    entropy_trace,
                );
            }
            if iterations >= self.config.max_iterations {
                info!("iteration budget of {} exhausted", self.config.max_iterations);
                return self.terminate(
                    Termination::Exhausted,
                    omega,
                    iterations,
                    executed,
                    entropy_trace,
                );
            }

            self.state = SessionState::Planning;
            let Some(plan) = select_next_test(
                &omega,
                &self.pool,
                &self.config.likelihood,
                self.config.min_weight,
            ) else {
                info!("planner starved after {} iterations", iterations);
                return self.terminate(
                    Termination::Exhausted,
                    omega,
                    iterations,
                    executed,
                    entropy_trace,
                );
            };
            debug!(
                "planned '{}' with expected gain {:.4}",
                plan.test.name, plan.info_gain
            );

            self.state = SessionState::Executing;
            let result = match self.executor.execute(&plan.test) {
                Ok(result) => result,
                Err(err) => {
                    // Recoverable: drop the candidate, leave the spectrum alone
                    warn!("{err}; removing candidate from the pool");
                    self.remove_candidate(&plan.test.name);
                    continue;
                }
            };

            if self.cancel.is_cancelled() {
                return self.terminate(
                    Termination::Cancelled,
                    omega,
                    iterations,
                    executed,
                    entropy_trace,
                );
            }

            self.state = SessionState::Updating;
            if let Err(err) = self.spectrum.append_result(&result) {
                warn!("discarding result of '{}': {err}", result.name);
                self.remove_candidate(&plan.test.name);
                continue;
            }
            executed.push(ExecutedTest {
                name: result.name.clone(),
                passed: result.passed,
            });
            self.remove_candidate(&plan.test.name);
            iterations += 1;
        }
    }

    fn remove_candidate(&mut self, name: &str) {
        self.pool.retain(|candidate| candidate.name != name);
    }

    fn terminate(
        &mut self,
        termination: Termination,
        omega: DiagnosisSet,
        iterations: usize,
        executed: Vec<ExecutedTest>,
        entropy_trace: Vec<f64>,
    ) -> SessionOutcome {
        self.state = SessionState::Terminated(termination);
        let best = omega.argmax().cloned();
        SessionOutcome {
            termination,
            iterations,
            executed,
            diagnoses: omega,
            best,
            entropy_trace,
        }
    }
}

/// One diagnosing pass: conflicts, filter, enumeration, probabilities
///
/// Builds the component filter from the config; use [`TdpSession::diagnose`]
/// to reuse a compiled filter across iterations.
pub fn diagnose(spectrum: &Spectrum, config: &Config) -> Result<DiagnosisSet, Error> {
    let filter = ComponentFilter::new(config)?;
    Ok(diagnose_filtered(spectrum, &filter, config))
}

fn diagnose_filtered(
    spectrum: &Spectrum,
    filter: &ComponentFilter,
    config: &Config,
) -> DiagnosisSet {
    let conflicts = extract_conflicts(spectrum);
    if conflicts.is_empty() {
        if !spectrum.has_failures() {
            return DiagnosisSet::empty();
        }
        warn!("every failing test has an empty trace; falling back to the suspiciousness ranking");
        return fallback_singletons(spectrum, config);
    }

    let filtered = filter.apply(&conflicts, spectrum);
    if filtered.is_empty() {
        warn!("component filter removed every conflict; falling back to the suspiciousness ranking");
        return fallback_singletons(spectrum, config);
    }

    let enumeration = hitting::enumerate(&filtered, config.max_set_size, config.max_diagnoses);
    if enumeration.exhausted {
        warn!(
            "no hitting set within size bound {}; returning the conflict universe",
            config.max_set_size
        );
    }
    DiagnosisSet::assign(enumeration.sets, spectrum, config)
}

/// Top suspicious elements as uniformly-weighted singleton diagnoses
fn fallback_singletons(spectrum: &Spectrum, config: &Config) -> DiagnosisSet {
    let ranking = Ranking::rank(spectrum, config.formula);
    let sets: Vec<BTreeSet<String>> = ranking
        .entries()
        .iter()
        .filter(|entry| entry.score > 0.0)
        .take(config.max_diagnoses)
        .map(|entry| BTreeSet::from([entry.id.clone()]))
        .collect();
    DiagnosisSet::uniform(sets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ScriptedExecutor, StaticTestSource};
    use crate::spectrum::{AvailableTest, TestCase, TestResult};

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn single_fault_spectrum() -> Spectrum {
        // One failed test covering only "a"
        Spectrum::new(
            ids(&["a", "b", "c"]),
            vec![TestCase::failed("t1")],
            vec![vec![true, false, false]],
        )
        .unwrap()
    }

    #[test]
    fn test_builder_requires_spectrum() {
        let result = TdpSession::builder()
            .executor(ScriptedExecutor::default())
            .build();
        assert!(matches!(result, Err(Error::MissingSpectrum)));
    }

    #[test]
    fn test_builder_requires_executor() {
        let result = TdpSession::builder()
            .spectrum(single_fault_spectrum())
            .build();
        assert!(matches!(result, Err(Error::MissingExecutor)));
    }

    #[test]
    fn test_single_fault_solves_immediately() {
        let mut session = TdpSession::builder()
            .spectrum(single_fault_spectrum())
            .executor(ScriptedExecutor::default())
            .build()
            .unwrap();

        let outcome = session.run();
        assert_eq!(outcome.termination, Termination::Solved);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.diagnoses.len(), 1);
        let best = outcome.best.unwrap();
        assert!(best.contains("a"));
        assert!((best.probability() - 1.0).abs() < 1e-9);
        assert_eq!(session.state(), SessionState::Terminated(Termination::Solved));
    }

    #[test]
    fn test_no_failures_terminates_without_diagnoses() {
        let spectrum = Spectrum::new(
            ids(&["a"]),
            vec![TestCase::passed("t1")],
            vec![vec![true]],
        )
        .unwrap();
        let mut session = TdpSession::builder()
            .spectrum(spectrum)
            .executor(ScriptedExecutor::default())
            .build()
            .unwrap();

        let outcome = session.run();
        assert_eq!(outcome.termination, Termination::NoFailure);
        assert!(outcome.diagnoses.is_empty());
        assert!(outcome.best.is_none());
    }

    #[test]
    fn test_cancel_before_start() {
        let token = CancelToken::new();
        token.cancel();
        let mut session = TdpSession::builder()
            .spectrum(single_fault_spectrum())
            .executor(ScriptedExecutor::default())
            .cancel_token(token)
            .build()
            .unwrap();

        let outcome = session.run();
        assert_eq!(outcome.termination, Termination::Cancelled);
        assert_eq!(outcome.iterations, 0);
        // No update happened: the spectrum still has its original single test
        assert_eq!(session.spectrum().tests().len(), 1);
    }

    #[test]
    fn test_executor_failure_is_recoverable() {
        // Two ambiguous diagnoses and one candidate the executor cannot run:
        // the loop drops it and terminates exhausted instead of erroring.
        let spectrum = Spectrum::new(
            ids(&["a", "b"]),
            vec![TestCase::failed("t1"), TestCase::failed("t2")],
            vec![vec![true, true], vec![true, true]],
        )
        .unwrap();
        let mut session = TdpSession::builder()
            .spectrum(spectrum)
            .candidates(StaticTestSource::new(vec![AvailableTest::new("t3", ["a"])]))
            .executor(ScriptedExecutor::default())
            .build()
            .unwrap();

        let outcome = session.run();
        assert_eq!(outcome.termination, Termination::Exhausted);
        assert_eq!(outcome.iterations, 0);
        assert!(outcome.executed.is_empty());
        assert_eq!(session.spectrum().tests().len(), 2);
    }

    #[test]
    fn test_result_with_unknown_element_is_discarded() {
        let spectrum = Spectrum::new(
            ids(&["a", "b"]),
            vec![TestCase::failed("t1"), TestCase::failed("t2")],
            vec![vec![true, true], vec![true, true]],
        )
        .unwrap();
        let mut session = TdpSession::builder()
            .spectrum(spectrum)
            .candidates(StaticTestSource::new(vec![AvailableTest::new("t3", ["a"])]))
            .executor(ScriptedExecutor::new([TestResult::new(
                "t3",
                true,
                ["mystery"],
            )]))
            .build()
            .unwrap();

        let outcome = session.run();
        assert_eq!(outcome.termination, Termination::Exhausted);
        assert_eq!(session.spectrum().tests().len(), 2);
    }

    #[test]
    fn test_fallback_singletons_excludes_zero_scores() {
        let omega = fallback_singletons(&single_fault_spectrum(), &Config::default());
        // Only "a" has a positive Barinel score
        assert_eq!(omega.len(), 1);
        assert!(omega.argmax().unwrap().contains("a"));
    }
}
