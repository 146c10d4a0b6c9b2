//! Suspiciousness formulas for spectrum-based fault localization
//!
//! Pure scoring functions over a per-element 2x2 counter `(ef, ep, nf, np)`.
//!
//! ## Formulas
//!
//! ```text
//! Ochiai:    ef / sqrt((ef + nf) * (ef + ep))
//! Tarantula: (ef/(ef+nf)) / (ef/(ef+nf) + ep/(ep+np))
//! Barinel:   1 - ep / (ep + ef)
//! ```
//!
//! Every formula is total: undefined ratios and NaN results are coerced to
//! `0.0`, so scores are always finite and non-negative.

use crate::spectrum::Counter;
use serde::{Deserialize, Serialize};

/// Suspiciousness formula selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formula {
    /// Ochiai similarity coefficient (Abreu et al. 2006)
    Ochiai,
    /// Tarantula fault localization (Jones & Harrold 2005)
    Tarantula,
    /// Barinel fault probability (Abreu et al. 2009)
    Barinel,
}

impl Formula {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ochiai => "ochiai",
            Self::Tarantula => "tarantula",
            Self::Barinel => "barinel",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ochiai" => Some(Self::Ochiai),
            "tarantula" => Some(Self::Tarantula),
            "barinel" => Some(Self::Barinel),
            _ => None,
        }
    }

    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::Ochiai, Self::Tarantula, Self::Barinel]
    }

    /// Score a counter with this formula
    ///
    /// Returns a finite value `>= 0.0`. Higher means more suspicious.
    #[must_use]
    pub fn score(&self, counter: &Counter) -> f64 {
        let raw = match self {
            Self::Ochiai => ochiai(counter),
            Self::Tarantula => tarantula(counter),
            Self::Barinel => barinel(counter),
        };
        sanitize(raw)
    }
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coerce NaN and negative drift to zero
fn sanitize(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.max(0.0)
    }
}

fn ochiai(c: &Counter) -> f64 {
    let ef = f64::from(c.ef);
    let denominator = (f64::from(c.ef + c.nf) * f64::from(c.ef + c.ep)).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }
    ef / denominator
}

fn tarantula(c: &Counter) -> f64 {
    let total_failed = c.ef + c.nf;
    let total_passed = c.ep + c.np;
    if total_failed == 0 || total_passed == 0 {
        return 0.0;
    }
    let fail_ratio = f64::from(c.ef) / f64::from(total_failed);
    let pass_ratio = f64::from(c.ep) / f64::from(total_passed);
    if fail_ratio + pass_ratio == 0.0 {
        return 0.0;
    }
    fail_ratio / (fail_ratio + pass_ratio)
}

fn barinel(c: &Counter) -> f64 {
    let covered = c.ep + c.ef;
    if covered == 0 {
        return 0.0;
    }
    1.0 - f64::from(c.ep) / f64::from(covered)
}
