//! Per-scenario solve pipeline: scan, refine, reconstruct, verify.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::bisect;
use crate::linkage::LinkageParameters;
use crate::pose::{self, Pose, Verification};
use crate::scanner::{self, Bracket};

/// Numerical knobs for one solve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolveSettings {
    /// Scanner grid size across `[-π, π]`.
    pub samples: usize,
    /// Bisection half-width stop tolerance.
    pub tol: f64,
    /// Max allowed squared-distance residual during verification.
    pub verify_tol: f64,
    /// `|d|` at or below this is treated as singular during reconstruction.
    pub singular_floor: f64,
}

impl Default for SolveSettings {
    fn default() -> Self {
        Self {
            samples: 1000,
            tol: 0.5e-10,
            verify_tol: 0.5e-8,
            singular_floor: 1e-12,
        }
    }
}

impl SolveSettings {
    pub fn validate(&self) -> Result<()> {
        if self.samples < 2 {
            bail!("samples must be at least 2, got {}.", self.samples);
        }
        if !(self.tol > 0.0) {
            bail!("tol must be positive, got {}.", self.tol);
        }
        if !(self.verify_tol > 0.0) {
            bail!("verify_tol must be positive, got {}.", self.verify_tol);
        }
        if !self.singular_floor.is_finite() || self.singular_floor < 0.0 {
            bail!(
                "singular_floor must be finite and non-negative, got {}.",
                self.singular_floor
            );
        }
        Ok(())
    }
}

/// One refined root with its reconstruction and verification.
///
/// `pose` is absent when the reconstruction was singular; the root is still
/// reported. Verification failure never removes a solution either.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseSolution {
    pub theta: f64,
    pub pose: Option<Pose>,
    pub verification: Option<Verification>,
}

/// Full result of one scenario solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveOutcome {
    pub parameters: LinkageParameters,
    pub solutions: Vec<PoseSolution>,
}

impl SolveOutcome {
    pub fn pose_count(&self) -> usize {
        self.solutions.len()
    }

    /// Plain-text report, one line per event, for the console sink.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.solutions.len() + 1);
        lines.push(format!("{} pose(s) found", self.solutions.len()));
        for solution in &self.solutions {
            match (&solution.pose, &solution.verification) {
                (Some(pose), Some(verification)) if verification.passed => {
                    lines.push(format!(
                        "theta = {:.12} -> ({:.9}, {:.9}): verified within {:e}",
                        solution.theta, pose.x, pose.y, verification.tolerance
                    ));
                }
                (Some(pose), Some(verification)) => {
                    lines.push(format!(
                        "theta = {:.12} -> ({:.9}, {:.9}): verification FAILED (residuals {:?})",
                        solution.theta, pose.x, pose.y, verification.residuals
                    ));
                }
                _ => {
                    lines.push(format!(
                        "theta = {:.12}: singular geometry, no pose reconstructed",
                        solution.theta
                    ));
                }
            }
        }
        lines
    }
}

/// Scans the residual for sign-change brackets.
pub fn find_brackets(
    params: &LinkageParameters,
    settings: &SolveSettings,
) -> Result<Vec<Bracket>> {
    params.validate().context("Invalid linkage parameters.")?;
    settings.validate().context("Invalid solve settings.")?;
    scanner::scan(params, settings.samples)
}

/// Refines every bracket to a root, in increasing angle order.
pub fn find_roots(params: &LinkageParameters, settings: &SolveSettings) -> Result<Vec<f64>> {
    let brackets = find_brackets(params, settings)?;
    brackets
        .into_iter()
        .map(|bracket| bisect::refine(params, bracket, settings.tol))
        .collect()
}

/// Runs the whole pipeline and reports every root, posed or not.
pub fn solve_poses(params: &LinkageParameters, settings: &SolveSettings) -> Result<SolveOutcome> {
    let roots = find_roots(params, settings)?;
    let solutions = roots
        .into_iter()
        .map(|theta| match pose::reconstruct(params, theta, settings.singular_floor) {
            Ok(pose) => PoseSolution {
                theta,
                pose: Some(pose),
                verification: Some(pose::verify(params, &pose, settings.verify_tol)),
            },
            Err(_) => PoseSolution {
                theta,
                pose: None,
                verification: None,
            },
        })
        .collect();
    Ok(SolveOutcome {
        parameters: *params,
        solutions,
    })
}
