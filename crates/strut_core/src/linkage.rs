//! Linkage parameters and the trilateration residual.
//!
//! The platform is a planar triangle suspended from three base anchors by
//! struts of lengths `p1, p2, p3`. Anchor 1 sits at the origin, anchor 2 at
//! `(x1, 0)`, anchor 3 at `(x2, y2)`. The platform attachment points are
//! fixed relative to the first: the second at distance `l3` along the
//! platform orientation `theta`, the third at distance `l2` along
//! `theta + gamma`. Eliminating the platform position from the three
//! strut-length constraints leaves a single scalar residual `f(theta)` whose
//! zeros are exactly the orientations admitting a valid pose.

use std::f64::consts::PI;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::traits::AngleResidual;

/// Fixed geometry of one linkage scenario.
///
/// Constructed once per scenario (or per sweep sample) and read-only
/// thereafter; the sweep rebinds a fresh value instead of mutating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkageParameters {
    /// Platform side between attachment points 2 and 3. Fixes the triangle
    /// shape together with `l2`, `l3`, and `gamma`; the residual itself
    /// never reads it.
    pub l1: f64,
    /// Platform side from attachment point 1 toward point 3.
    pub l2: f64,
    /// Platform side from attachment point 1 toward point 2.
    pub l3: f64,
    /// Base anchor 2 x-offset.
    pub x1: f64,
    /// Base anchor 3 offset.
    pub x2: f64,
    pub y2: f64,
    /// Angular offset of attachment point 3 from the platform orientation.
    pub gamma: f64,
    /// Strut lengths.
    pub p1: f64,
    pub p2: f64,
    pub p3: f64,
}

impl LinkageParameters {
    /// Symmetric reference scenario: both poses sit at `theta = ±π/4`.
    pub fn symmetric_reference() -> Self {
        let sqrt2 = 2.0_f64.sqrt();
        let sqrt5 = 5.0_f64.sqrt();
        Self {
            l1: 2.0,
            l2: sqrt2,
            l3: sqrt2,
            x1: 4.0,
            x2: 0.0,
            y2: 4.0,
            gamma: PI / 2.0,
            p1: sqrt5,
            p2: sqrt5,
            p3: sqrt5,
        }
    }

    /// General reference scenario; four poses at `p2 = 5`, six at `p2 = 7`.
    pub fn general_reference() -> Self {
        Self {
            l1: 3.0,
            l2: 3.0 * 2.0_f64.sqrt(),
            l3: 3.0,
            x1: 5.0,
            x2: 0.0,
            y2: 6.0,
            gamma: PI / 4.0,
            p1: 5.0,
            p2: 5.0,
            p3: 3.0,
        }
    }

    /// Checks the structural invariants: every scalar finite, lengths and
    /// strut lengths non-negative, `gamma` in `(-π, π]`.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("l1", self.l1),
            ("l2", self.l2),
            ("l3", self.l3),
            ("x1", self.x1),
            ("x2", self.x2),
            ("y2", self.y2),
            ("gamma", self.gamma),
            ("p1", self.p1),
            ("p2", self.p2),
            ("p3", self.p3),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                bail!("Parameter {name} must be finite, got {value}.");
            }
        }
        for (name, value) in [
            ("l1", self.l1),
            ("l2", self.l2),
            ("l3", self.l3),
            ("p1", self.p1),
            ("p2", self.p2),
            ("p3", self.p3),
        ] {
            if value < 0.0 {
                bail!("Length {name} must be non-negative, got {value}.");
            }
        }
        if self.gamma <= -PI || self.gamma > PI {
            bail!("gamma must lie in (-pi, pi], got {}.", self.gamma);
        }
        Ok(())
    }

    /// The trilateration residual at orientation `theta`.
    pub fn residual(&self, theta: f64) -> f64 {
        Trilateration::at(self, theta).residual(self.p1)
    }
}

impl AngleResidual for LinkageParameters {
    fn eval(&self, theta: f64) -> f64 {
        self.residual(theta)
    }
}

/// Offsets of platform attachment points 2 and 3 relative to point 1, in the
/// base frame, for a candidate orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOffsets {
    pub a2: f64,
    pub b2: f64,
    pub a3: f64,
    pub b3: f64,
}

impl FrameOffsets {
    pub fn at(params: &LinkageParameters, theta: f64) -> Self {
        let (sin_t, cos_t) = theta.sin_cos();
        let (sin_g, cos_g) = params.gamma.sin_cos();
        Self {
            a2: params.l3 * cos_t - params.x1,
            b2: params.l3 * sin_t,
            a3: params.l2 * (cos_t * cos_g - sin_t * sin_g) - params.x2,
            b3: params.l2 * (cos_t * sin_g + sin_t * cos_g) - params.y2,
        }
    }
}

/// Numerators and denominator of the three-circle intersection point.
///
/// For `d != 0`, `(n1/d, n2/d)` is the unique point at distances `p2`, `p3`
/// from anchors 2 and 3 consistent with the frame offsets; the residual
/// measures whether that point also lies at distance `p1` from the origin.
/// Only `d²` enters the residual, so a singular `d` is the reconstructor's
/// concern, not this one's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trilateration {
    pub n1: f64,
    pub n2: f64,
    pub d: f64,
}

impl Trilateration {
    pub fn at(params: &LinkageParameters, theta: f64) -> Self {
        let FrameOffsets { a2, b2, a3, b3 } = FrameOffsets::at(params, theta);
        let r2 = params.p2 * params.p2 - params.p1 * params.p1 - a2 * a2 - b2 * b2;
        let r3 = params.p3 * params.p3 - params.p1 * params.p1 - a3 * a3 - b3 * b3;
        Self {
            n1: b3 * r2 - b2 * r3,
            n2: -a3 * r2 + a2 * r3,
            d: 2.0 * (a2 * b3 - b2 * a3),
        }
    }

    pub fn residual(&self, p1: f64) -> f64 {
        self.n1 * self.n1 + self.n2 * self.n2 - p1 * p1 * self.d * self.d
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameOffsets, LinkageParameters, Trilateration};
    use std::f64::consts::PI;

    fn assert_err_contains<T: std::fmt::Debug>(result: anyhow::Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn reference_scenarios_are_valid() {
        LinkageParameters::symmetric_reference()
            .validate()
            .expect("symmetric scenario should validate");
        LinkageParameters::general_reference()
            .validate()
            .expect("general scenario should validate");
    }

    #[test]
    fn validate_rejects_bad_parameters() {
        let mut params = LinkageParameters::symmetric_reference();
        params.p2 = -1.0;
        assert_err_contains(params.validate(), "p2");

        let mut params = LinkageParameters::symmetric_reference();
        params.gamma = 4.0;
        assert_err_contains(params.validate(), "gamma");

        let mut params = LinkageParameters::symmetric_reference();
        params.x1 = f64::NAN;
        assert_err_contains(params.validate(), "x1");
    }

    #[test]
    fn symmetric_scenario_offsets_at_quarter_turn() {
        let params = LinkageParameters::symmetric_reference();
        let FrameOffsets { a2, b2, a3, b3 } = FrameOffsets::at(&params, PI / 4.0);
        assert!((a2 + 3.0).abs() < 1e-12);
        assert!((b2 - 1.0).abs() < 1e-12);
        assert!((a3 + 1.0).abs() < 1e-12);
        assert!((b3 + 3.0).abs() < 1e-12);
    }

    #[test]
    fn symmetric_scenario_residual_vanishes_at_both_quarter_turns() {
        let params = LinkageParameters::symmetric_reference();
        assert!(params.residual(PI / 4.0).abs() < 1e-8);
        assert!(params.residual(-PI / 4.0).abs() < 1e-8);
    }

    #[test]
    fn symmetric_scenario_trilateration_at_quarter_turn() {
        let params = LinkageParameters::symmetric_reference();
        let tri = Trilateration::at(&params, PI / 4.0);
        assert!((tri.n1 - 40.0).abs() < 1e-9);
        assert!((tri.n2 - 20.0).abs() < 1e-9);
        assert!((tri.d - 20.0).abs() < 1e-9);
    }

    #[test]
    fn residual_is_periodic() {
        let params = LinkageParameters::general_reference();
        let theta = 0.7;
        let wrapped = params.residual(theta) - params.residual(theta - 2.0 * PI);
        assert!(wrapped.abs() < 1e-3 * params.residual(theta).abs().max(1.0));
    }
}
