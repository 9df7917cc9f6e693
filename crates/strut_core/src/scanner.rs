//! Dense sign-change bracketing over the orientation domain.
//!
//! The residual is neither smooth nor monotonic and flips sign over very
//! narrow intervals near numerically large values, so the scanner samples it
//! uniformly and densely across `[-π, π]` and records a bracket at every
//! change of the running tri-state sign. Roots narrower than the sampling
//! pitch can be missed; that is the accepted approximation, not corrected by
//! adaptive refinement.

use std::f64::consts::PI;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::traits::AngleResidual;

/// Tri-state sign with `sign(0) = Zero`, matching the scanner's exact
/// bracket-detection semantics. Floating comparison against zero would
/// collapse `Zero` into one of the other states and change which brackets
/// are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Negative,
    Zero,
    Positive,
}

impl Sign {
    pub fn of(value: f64) -> Self {
        if value > 0.0 {
            Sign::Positive
        } else if value < 0.0 {
            Sign::Negative
        } else {
            Sign::Zero
        }
    }
}

/// An angle interval whose endpoint residuals straddle (or touch) zero,
/// presumed to contain exactly one root.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub a: f64,
    pub b: f64,
}

/// Samples the residual at `samples` uniformly spaced points spanning
/// `[-π, π]` and returns the sign-change brackets in increasing angle order.
///
/// A sample whose sign differs from the running sign closes a bracket
/// against the previous sample and becomes the new running sign. An
/// exact-zero sample therefore brackets against the *next* differing-sign
/// sample as well, inflating the count by one spurious bracket whose refined
/// root lands within one pitch of the true one.
pub fn scan(f: &impl AngleResidual, samples: usize) -> Result<Vec<Bracket>> {
    if samples < 2 {
        bail!("Scanner needs at least 2 samples, got {samples}.");
    }

    let step = 2.0 * PI / (samples - 1) as f64;
    let theta_at = |k: usize| -PI + step * k as f64;

    let mut brackets = Vec::new();
    let mut running = Sign::of(f.eval(theta_at(0)));
    for k in 1..samples {
        let sign = Sign::of(f.eval(theta_at(k)));
        if sign != running {
            brackets.push(Bracket {
                a: theta_at(k - 1),
                b: theta_at(k),
            });
            running = sign;
        }
    }
    Ok(brackets)
}

/// Flattens brackets to the `[a0, b0, a1, b1, ...]` endpoint list the
/// frontend consumes. Always even-length by construction.
pub fn endpoints(brackets: &[Bracket]) -> Vec<f64> {
    brackets
        .iter()
        .flat_map(|bracket| [bracket.a, bracket.b])
        .collect()
}
