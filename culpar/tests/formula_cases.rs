//! Parameterized suspiciousness-formula cases

use culpar::{Counter, Formula};
use rstest::rstest;

fn counter(ef: u32, ep: u32, nf: u32, np: u32) -> Counter {
    Counter { ef, ep, nf, np }
}

#[rstest]
// Element covered by every failing test and nothing else
#[case(Formula::Ochiai, counter(3, 0, 0, 7), 1.0)]
#[case(Formula::Tarantula, counter(3, 0, 0, 7), 1.0)]
#[case(Formula::Barinel, counter(3, 0, 0, 7), 1.0)]
// Element covered by one of two failures and one of two passes
#[case(Formula::Ochiai, counter(1, 1, 1, 1), 0.5)]
#[case(Formula::Tarantula, counter(1, 1, 1, 1), 0.5)]
#[case(Formula::Barinel, counter(1, 1, 1, 1), 0.5)]
// Element never covered at all
#[case(Formula::Ochiai, counter(0, 0, 2, 2), 0.0)]
#[case(Formula::Tarantula, counter(0, 0, 2, 2), 0.0)]
#[case(Formula::Barinel, counter(0, 0, 2, 2), 0.0)]
// Element covered only by passing tests
#[case(Formula::Ochiai, counter(0, 4, 2, 0), 0.0)]
#[case(Formula::Tarantula, counter(0, 4, 2, 0), 0.0)]
#[case(Formula::Barinel, counter(0, 4, 2, 0), 0.0)]
// Ochiai: 2 / sqrt((2+2) * (2+6)) = 2 / sqrt(32)
#[case(Formula::Ochiai, counter(2, 6, 2, 0), 2.0 / 5.656_854_249_492_381)]
// Tarantula: (2/4) / (2/4 + 6/6) = 1/3
#[case(Formula::Tarantula, counter(2, 6, 2, 0), 1.0 / 3.0)]
// Barinel: 1 - 6/8
#[case(Formula::Barinel, counter(2, 6, 2, 0), 0.25)]
fn test_formula_value(#[case] formula: Formula, #[case] counter: Counter, #[case] expected: f64) {
    let score = formula.score(&counter);
    assert!(
        (score - expected).abs() < 1e-9,
        "{formula} on {counter:?}: expected {expected}, got {score}"
    );
}

#[rstest]
#[case(Formula::Ochiai)]
#[case(Formula::Tarantula)]
#[case(Formula::Barinel)]
fn test_empty_counter_scores_zero(#[case] formula: Formula) {
    assert_eq!(formula.score(&counter(0, 0, 0, 0)), 0.0);
}
