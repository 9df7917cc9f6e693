//! Bisection refinement of a scanner bracket.

use anyhow::{bail, Result};

use crate::error::SolveError;
use crate::scanner::{Bracket, Sign};
use crate::traits::AngleResidual;

/// Refines a bracket to a root with half-width tolerance `tol`.
///
/// Endpoints must straddle a sign change; a same-sign bracket is a contract
/// violation from the caller and fails with [`SolveError::InvalidBracket`]
/// rather than silently bisecting toward the wrong side. A zero-touching
/// bracket (which the scanner legitimately produces for exact-zero samples)
/// short-circuits to the zero endpoint.
///
/// The interval halves each iteration, so the loop runs at most
/// `ceil(log2((b - a) / tol))` times. The returned midpoint is within `tol`
/// of the root in angle; its residual is floating-point scale, not zero.
pub fn refine(f: &impl AngleResidual, bracket: Bracket, tol: f64) -> Result<f64> {
    if !(tol > 0.0) {
        bail!("Bisection tolerance must be positive, got {tol}.");
    }

    let Bracket { mut a, mut b } = bracket;
    let mut fa = f.eval(a);
    match (Sign::of(fa), Sign::of(f.eval(b))) {
        (Sign::Zero, _) => return Ok(a),
        (_, Sign::Zero) => return Ok(b),
        (sa, sb) if sa == sb => return Err(SolveError::InvalidBracket { a, b }.into()),
        _ => {}
    }

    while (b - a) / 2.0 > tol {
        let c = 0.5 * (a + b);
        let fc = f.eval(c);
        if fc == 0.0 {
            return Ok(c);
        }
        if fa * fc < 0.0 {
            b = c;
        } else {
            a = c;
            fa = fc;
        }
    }
    // The surviving interval is at most 2 * tol wide and still straddles the
    // root, so its midpoint is within tol.
    Ok(0.5 * (a + b))
}
