//! End-to-end tests of the TDP loop against small hand-built spectra

use culpar::{
    diagnose, AvailableTest, Config, DiagnosisSet, LikelihoodParams, Spectrum, TestCase,
    TestResult, ScriptedExecutor, StaticTestSource, TdpSession, Termination,
};
use std::collections::BTreeSet;

fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn probability_sum(omega: &DiagnosisSet) -> f64 {
    omega.iter().map(|d| d.probability()).sum()
}

/// Single-fault trivial: one failed test covering only `a`
#[test]
fn test_single_fault_trivial() {
    let spectrum = Spectrum::new(
        ids(&["a", "b", "c"]),
        vec![TestCase::failed("t1")],
        vec![vec![true, false, false]],
    )
    .unwrap();

    let mut session = TdpSession::builder()
        .spectrum(spectrum)
        .executor(ScriptedExecutor::default())
        .build()
        .unwrap();
    let outcome = session.run();

    assert_eq!(outcome.termination, Termination::Solved);
    assert_eq!(outcome.diagnoses.len(), 1);
    let best = outcome.best.unwrap();
    assert_eq!(*best.components(), set(&["a"]));
    assert!((best.probability() - 1.0).abs() < 1e-9);
    assert_eq!(outcome.entropy_trace, vec![0.0]);
    assert!(outcome.executed.is_empty());
}

/// Two conflicts sharing one element collapse to that element
#[test]
fn test_shared_element_dominates() {
    // Passing tests keep the coverage ratios below the universal cutoff
    let spectrum = Spectrum::new(
        ids(&["a", "b", "c"]),
        vec![
            TestCase::failed("t1"),
            TestCase::failed("t2"),
            TestCase::passed("t3"),
            TestCase::passed("t4"),
        ],
        vec![
            vec![true, true, false],
            vec![true, false, true],
            vec![false, true, false],
            vec![false, false, true],
        ],
    )
    .unwrap();

    let omega = diagnose(&spectrum, &Config::default()).unwrap();
    assert_eq!(omega.len(), 1);
    let best = omega.argmax().unwrap();
    assert_eq!(*best.components(), set(&["a"]));
    assert!((best.probability() - 1.0).abs() < 1e-9);
}

/// Disjoint conflicts force size-two diagnoses
#[test]
fn test_disjoint_conflicts_yield_pairs() {
    let spectrum = Spectrum::new(
        ids(&["a", "b", "c", "d"]),
        vec![
            TestCase::failed("t1"),
            TestCase::failed("t2"),
            TestCase::passed("t3"),
            TestCase::passed("t4"),
            TestCase::passed("t5"),
            TestCase::passed("t6"),
        ],
        vec![
            vec![true, true, false, false],
            vec![false, false, true, true],
            vec![true, false, false, false],
            vec![false, true, false, false],
            vec![false, false, true, false],
            vec![false, false, false, true],
        ],
    )
    .unwrap();

    let omega = diagnose(&spectrum, &Config::default()).unwrap();
    assert_eq!(omega.len(), 4);
    assert!((probability_sum(&omega) - 1.0).abs() < 1e-9);

    let expected = [
        set(&["a", "c"]),
        set(&["a", "d"]),
        set(&["b", "c"]),
        set(&["b", "d"]),
    ];
    for components in &expected {
        assert!(
            omega.iter().any(|d| d.components() == components),
            "missing diagnosis {components:?}"
        );
    }
    // Symmetric evidence: the four pairs are equally likely
    for diagnosis in omega.iter() {
        assert!((diagnosis.probability() - 0.25).abs() < 1e-9);
    }
}

/// The worked planner example: a single sharp test splits a fair coin
#[test]
fn test_planner_disambiguates_fair_coin() {
    let params = LikelihoodParams::default();
    let omega = DiagnosisSet::uniform(vec![set(&["a"]), set(&["b"])]);
    let candidates = [AvailableTest::new("t1", ["a"])];

    let plan = culpar::select_next_test(&omega, &candidates, &params, 1e-3).unwrap();
    assert_eq!(plan.test.name, "t1");
    assert!((plan.predicted_pass - 0.5).abs() < 1e-9);
    assert!(plan.info_gain > 0.0);

    // Observed failure: posterior mass concentrates on {a}
    let fail_likelihoods: Vec<f64> = omega
        .iter()
        .map(|d| culpar::planner::fail_likelihood(&plan.test.estimated_trace, d, &params))
        .collect();
    let posterior = omega.updated(&fail_likelihoods, 1e-3);
    let a = posterior.iter().find(|d| d.contains("a")).unwrap();
    let b = posterior.iter().find(|d| d.contains("b")).unwrap();
    assert!((a.probability() - 0.9).abs() < 1e-9);
    assert!((b.probability() - 0.1).abs() < 1e-9);

    let before = omega.entropy();
    let after = posterior.entropy();
    assert!((before - std::f64::consts::LN_2).abs() < 1e-9);
    assert!((after - 0.325).abs() < 1e-3);
    assert!(before > after);
}

/// Constructor-only conflict falls back to the suspiciousness ranking
#[test]
fn test_filter_fallback_on_constructor_conflict() {
    let spectrum = Spectrum::new(
        ids(&["com.app.Widget#<init>", "com.app.Widget#render()"]),
        vec![TestCase::failed("t1"), TestCase::passed("t2")],
        vec![vec![true, false], vec![false, true]],
    )
    .unwrap();

    let omega = diagnose(&spectrum, &Config::default()).unwrap();
    assert_eq!(omega.len(), 1);
    let best = omega.argmax().unwrap();
    assert_eq!(*best.components(), set(&["com.app.Widget#<init>"]));
    assert!((best.probability() - 1.0).abs() < 1e-9);
}

/// Candidates that never disambiguate stop the loop at the iteration budget
#[test]
fn test_termination_by_iteration_budget() {
    let spectrum = Spectrum::new(
        ids(&["a", "b"]),
        vec![
            TestCase::failed("t1"),
            TestCase::passed("p1"),
            TestCase::passed("p2"),
        ],
        vec![vec![true, true], vec![true, false], vec![false, true]],
    )
    .unwrap();

    // Twelve candidates, each touching only `a`; every observed run fails
    // covering both elements, so the evidence stays perfectly symmetric.
    let candidates: Vec<AvailableTest> = (0..12)
        .map(|i| AvailableTest::new(format!("c{i:02}"), ["a"]))
        .collect();
    let results = (0..12).map(|i| TestResult::new(format!("c{i:02}"), false, ["a", "b"]));

    let mut session = TdpSession::builder()
        .spectrum(spectrum)
        .candidates(StaticTestSource::new(candidates))
        .executor(ScriptedExecutor::new(results))
        .build()
        .unwrap();
    let outcome = session.run();

    assert_eq!(outcome.termination, Termination::Exhausted);
    assert_eq!(outcome.iterations, 10);
    assert_eq!(outcome.executed.len(), 10);
    // Best effort: the argmax of a still-ambiguous distribution
    let best = outcome.best.unwrap();
    assert!((best.probability() - 0.5).abs() < 1e-9);
    assert_eq!(outcome.diagnoses.len(), 2);
}

/// A passing result with an empty trace only drains the candidate pool
#[test]
fn test_empty_trace_pass_leaves_beliefs_alone() {
    let spectrum = Spectrum::new(
        ids(&["a", "b"]),
        vec![
            TestCase::failed("t1"),
            TestCase::passed("p1"),
            TestCase::passed("p2"),
        ],
        vec![vec![true, true], vec![true, false], vec![false, true]],
    )
    .unwrap();
    let before = diagnose(&spectrum, &Config::default()).unwrap();

    let mut session = TdpSession::builder()
        .spectrum(spectrum)
        .candidates(StaticTestSource::new(vec![AvailableTest::new("c1", ["a"])]))
        .executor(ScriptedExecutor::new([TestResult::new(
            "c1",
            true,
            Vec::<String>::new(),
        )]))
        .build()
        .unwrap();
    let outcome = session.run();

    assert_eq!(outcome.termination, Termination::Exhausted);
    assert_eq!(outcome.iterations, 1);
    assert_eq!(outcome.diagnoses.len(), before.len());
    for diagnosis in outcome.diagnoses.iter() {
        let twin = before
            .iter()
            .find(|candidate| candidate.components() == diagnosis.components())
            .unwrap();
        assert!((twin.probability() - diagnosis.probability()).abs() < 1e-9);
    }
}

/// The pipeline is a pure function of the spectrum and parameters
#[test]
fn test_diagnosis_is_deterministic() {
    let spectrum = Spectrum::new(
        ids(&["a", "b", "c", "d"]),
        vec![
            TestCase::failed("t1"),
            TestCase::failed("t2"),
            TestCase::passed("t3"),
            TestCase::passed("t4"),
        ],
        vec![
            vec![true, true, false, false],
            vec![false, true, true, false],
            vec![true, false, false, true],
            vec![false, false, true, true],
        ],
    )
    .unwrap();

    let first = diagnose(&spectrum, &Config::default()).unwrap();
    let second = diagnose(&spectrum, &Config::default()).unwrap();
    assert_eq!(first.len(), second.len());
    for (left, right) in first.iter().zip(second.iter()) {
        assert_eq!(left.components(), right.components());
        assert!((left.probability() - right.probability()).abs() < 1e-12);
    }
}

/// A full happy-path run: one informative test collapses the distribution
#[test]
fn test_loop_converges_after_one_test() {
    // Symmetric failure over {a, b}; the candidate touches only `a` and its
    // real run passes without covering anything suspicious of `b`.
    let spectrum = Spectrum::new(
        ids(&["a", "b"]),
        vec![
            TestCase::failed("t1"),
            TestCase::passed("p1"),
            TestCase::passed("p2"),
        ],
        vec![vec![true, true], vec![true, false], vec![false, true]],
    )
    .unwrap();

    // The executed test fails covering only `a`: `b` stops explaining the
    // failures (ef stays 1 of 2) while `a` becomes the shared element.
    let mut session = TdpSession::builder()
        .spectrum(spectrum)
        .candidates(StaticTestSource::new(vec![AvailableTest::new("c1", ["a"])]))
        .executor(ScriptedExecutor::new([TestResult::new("c1", false, ["a"])]))
        .build()
        .unwrap();
    let outcome = session.run();

    assert_eq!(outcome.termination, Termination::Solved);
    assert_eq!(outcome.iterations, 1);
    assert_eq!(outcome.executed.len(), 1);
    let best = outcome.best.unwrap();
    assert_eq!(*best.components(), set(&["a"]));
    assert!((best.probability() - 1.0).abs() < 1e-9);
    // Entropy fell from ln 2 to zero across the two diagnosing passes
    assert_eq!(outcome.entropy_trace.len(), 2);
    assert!(outcome.entropy_trace[0] > outcome.entropy_trace[1]);
}
