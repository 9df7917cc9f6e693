//! Pose reconstruction and distance-constraint verification.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::SolveError;
use crate::linkage::{FrameOffsets, LinkageParameters, Trilateration};

/// A platform pose: orientation plus the position of attachment point 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub theta: f64,
    pub x: f64,
    pub y: f64,
}

impl Pose {
    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

/// Reconstructs the platform position for a refined root angle.
///
/// Colinear anchor geometry drives `d` to zero and makes the division
/// undefined; anything with `|d|` at or below `singular_floor` is reported
/// as [`SolveError::SingularGeometry`] instead of letting NaN/Inf leak into
/// verification or plotting.
pub fn reconstruct(
    params: &LinkageParameters,
    theta: f64,
    singular_floor: f64,
) -> Result<Pose, SolveError> {
    let Trilateration { n1, n2, d } = Trilateration::at(params, theta);
    if d.abs() <= singular_floor {
        return Err(SolveError::SingularGeometry { theta, d });
    }
    Ok(Pose {
        theta,
        x: n1 / d,
        y: n2 / d,
    })
}

/// Outcome of checking one pose against the three strut-length constraints.
///
/// Purely diagnostic: a failed verification never removes the pose from the
/// solution set, it only flags the root as insufficiently accurate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    /// Absolute squared-distance residuals of the three constraints.
    pub residuals: [f64; 3],
    pub tolerance: f64,
    pub passed: bool,
}

pub fn verify(params: &LinkageParameters, pose: &Pose, tolerance: f64) -> Verification {
    let FrameOffsets { a2, b2, a3, b3 } = FrameOffsets::at(params, pose.theta);
    let (x, y) = (pose.x, pose.y);
    let residuals = [
        (params.p1 * params.p1 - x * x - y * y).abs(),
        (params.p2 * params.p2 - (x + a2) * (x + a2) - (y + b2) * (y + b2)).abs(),
        (params.p3 * params.p3 - (x + a3) * (x + a3) - (y + b3) * (y + b3)).abs(),
    ];
    let passed = residuals.iter().all(|r| *r <= tolerance);
    Verification {
        residuals,
        tolerance,
        passed,
    }
}
