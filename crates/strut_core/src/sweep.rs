//! Strut-length sweep and pose-count classification.
//!
//! The classifier re-solves the bracket count across a range of one strut
//! length, one fresh `LinkageParameters` value per sample, and records every
//! parameter interval across which the pose count changes. Per-sample
//! failures are contained: a sample that fails validation is skipped and the
//! sweep continues.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::linkage::LinkageParameters;
use crate::scanner;
use crate::solver::SolveSettings;

/// Which strut length the sweep varies. The geometric constants stay fixed;
/// the struts are the actuated quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepParameter {
    Strut1,
    Strut2,
    Strut3,
}

impl SweepParameter {
    /// Returns a fresh parameter value with this strut rebound; the base is
    /// never mutated.
    pub fn rebind(&self, base: &LinkageParameters, value: f64) -> LinkageParameters {
        let mut params = *base;
        match self {
            SweepParameter::Strut1 => params.p1 = value,
            SweepParameter::Strut2 => params.p2 = value,
            SweepParameter::Strut3 => params.p3 = value,
        }
        params
    }

    pub fn label(&self) -> &'static str {
        match self {
            SweepParameter::Strut1 => "p1",
            SweepParameter::Strut2 => "p2",
            SweepParameter::Strut3 => "p3",
        }
    }
}

/// Range and resolution of one sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SweepSettings {
    pub parameter: SweepParameter,
    pub start: f64,
    pub end: f64,
    pub samples: usize,
}

impl SweepSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            bail!("Sweep range must be finite, got [{}, {}].", self.start, self.end);
        }
        if self.end <= self.start {
            bail!(
                "Sweep range must satisfy end > start, got [{}, {}].",
                self.start,
                self.end
            );
        }
        if self.samples < 2 {
            bail!("Sweep needs at least 2 samples, got {}.", self.samples);
        }
        Ok(())
    }
}

/// One step-plot point: parameter value and the pose count found there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepSample {
    pub value: f64,
    pub pose_count: usize,
}

/// A parameter interval across which the pose count changes, reported as
/// the pair of adjacent sample values straddling the change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionBoundary {
    pub from: f64,
    pub to: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResult {
    pub parameter: SweepParameter,
    pub samples: Vec<SweepSample>,
    pub boundaries: Vec<TransitionBoundary>,
    /// Samples dropped because the rebound parameter failed validation.
    pub skipped: usize,
}

impl SweepResult {
    /// Plain-text report, one line per event, for the console sink.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.boundaries.len() + 1);
        lines.push(format!(
            "{} transition(s) across {} sample(s) of {}",
            self.boundaries.len(),
            self.samples.len(),
            self.parameter.label()
        ));
        for boundary in &self.boundaries {
            lines.push(format!(
                "pose count changes within [{:.6}, {:.6}]",
                boundary.from, boundary.to
            ));
        }
        lines
    }
}

/// Incremental boundary bookkeeping, shared by the one-shot [`run`] and the
/// batched wasm runner so both report identical results.
#[derive(Debug, Clone, Default)]
pub struct SweepAccumulator {
    samples: Vec<SweepSample>,
    boundaries: Vec<TransitionBoundary>,
    skipped: usize,
}

impl SweepAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one counted sample; a boundary is emitted when the count
    /// differs from the previous counted sample's.
    pub fn record(&mut self, value: f64, pose_count: usize) {
        if let Some(previous) = self.samples.last() {
            if previous.pose_count != pose_count {
                self.boundaries.push(TransitionBoundary {
                    from: previous.value,
                    to: value,
                });
            }
        }
        self.samples.push(SweepSample { value, pose_count });
    }

    /// Drops one sample without disturbing the boundary bookkeeping.
    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    pub fn recorded(&self) -> usize {
        self.samples.len()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn finish(self, parameter: SweepParameter) -> SweepResult {
        SweepResult {
            parameter,
            samples: self.samples,
            boundaries: self.boundaries,
            skipped: self.skipped,
        }
    }
}

/// Sweeps the chosen strut across `[start, end]` and classifies the pose
/// count at every sample.
pub fn run(
    base: &LinkageParameters,
    sweep: &SweepSettings,
    solve: &SolveSettings,
) -> Result<SweepResult> {
    base.validate().context("Invalid linkage parameters.")?;
    sweep.validate().context("Invalid sweep settings.")?;
    solve.validate().context("Invalid solve settings.")?;

    let step = (sweep.end - sweep.start) / (sweep.samples - 1) as f64;
    let mut accumulator = SweepAccumulator::new();
    for i in 0..sweep.samples {
        let value = sweep.start + step * i as f64;
        let params = sweep.parameter.rebind(base, value);
        match params
            .validate()
            .and_then(|_| scanner::scan(&params, solve.samples))
        {
            Ok(brackets) => accumulator.record(value, brackets.len()),
            Err(_) => accumulator.skip(),
        }
    }
    Ok(accumulator.finish(sweep.parameter))
}

#[cfg(test)]
mod tests {
    use super::{run, SweepAccumulator, SweepParameter, SweepSettings, TransitionBoundary};
    use crate::linkage::LinkageParameters;
    use crate::solver::SolveSettings;

    fn reference_sweep() -> SweepSettings {
        SweepSettings {
            parameter: SweepParameter::Strut2,
            start: 0.0,
            end: 12.0,
            samples: 1000,
        }
    }

    #[test]
    fn rebind_replaces_only_the_chosen_strut() {
        let base = LinkageParameters::general_reference();
        let rebound = SweepParameter::Strut2.rebind(&base, 9.5);
        assert_eq!(rebound.p2, 9.5);
        assert_eq!(rebound.p1, base.p1);
        assert_eq!(rebound.p3, base.p3);
        assert_eq!(base.p2, 5.0, "base must not be mutated");
    }

    #[test]
    fn settings_validation_rejects_bad_ranges() {
        let mut settings = reference_sweep();
        settings.end = settings.start;
        let err = settings.validate().expect_err("expected error");
        assert!(format!("{err}").contains("end > start"));

        let mut settings = reference_sweep();
        settings.samples = 1;
        let err = settings.validate().expect_err("expected error");
        assert!(format!("{err}").contains("at least 2 samples"));
    }

    #[test]
    fn accumulator_tracks_count_changes() {
        let mut accumulator = SweepAccumulator::new();
        accumulator.record(0.0, 0);
        accumulator.record(1.0, 2);
        accumulator.skip();
        accumulator.record(2.0, 2);
        accumulator.record(3.0, 0);
        let result = accumulator.finish(SweepParameter::Strut2);
        assert_eq!(
            result.boundaries,
            vec![
                TransitionBoundary { from: 0.0, to: 1.0 },
                TransitionBoundary { from: 2.0, to: 3.0 },
            ]
        );
        assert_eq!(result.skipped, 1);
        assert_eq!(result.samples.len(), 4);
    }

    #[test]
    fn reference_sweep_counts_are_even_and_bounded() {
        let base = LinkageParameters::general_reference();
        let result = run(&base, &reference_sweep(), &SolveSettings::default())
            .expect("sweep should succeed");
        assert_eq!(result.samples.len(), 1000);
        assert_eq!(result.skipped, 0);

        let mut seen = std::collections::BTreeSet::new();
        for sample in &result.samples {
            assert!(
                matches!(sample.pose_count, 0 | 2 | 4 | 6),
                "unexpected pose count {} at p2 = {}",
                sample.pose_count,
                sample.value
            );
            seen.insert(sample.pose_count);
        }
        assert!(seen.contains(&4), "expected a four-pose band");
        assert!(seen.contains(&6), "expected a six-pose band");
        assert!(!result.boundaries.is_empty());

        let step = 12.0 / 999.0;
        for boundary in &result.boundaries {
            assert!(boundary.to > boundary.from);
            assert!((boundary.to - boundary.from - step).abs() < 1e-9);
        }
    }

    #[test]
    fn invalid_samples_are_skipped_not_fatal() {
        let base = LinkageParameters::general_reference();
        let settings = SweepSettings {
            parameter: SweepParameter::Strut2,
            start: -0.5,
            end: 0.5,
            samples: 11,
        };
        let result =
            run(&base, &settings, &SolveSettings::default()).expect("sweep should succeed");
        assert!(result.skipped >= 4, "negative strut lengths must be skipped");
        assert_eq!(result.samples.len() + result.skipped, 11);
    }

    #[test]
    fn summary_lines_mention_every_boundary() {
        let mut accumulator = SweepAccumulator::new();
        accumulator.record(0.0, 0);
        accumulator.record(1.0, 2);
        let result = accumulator.finish(SweepParameter::Strut3);
        let lines = result.summary_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("p3"));
        assert!(lines[1].contains("pose count changes"));
    }
}
