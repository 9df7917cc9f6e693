//! Residual curves and platform diagrams for the plotting frontend.
//!
//! Everything here is plain data: flat point buffers and segment index
//! pairs, serialized as-is for the frontend to draw. The frontend owns
//! styling; the core only decides what the picture contains.

use anyhow::{bail, Result};
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::SolveError;
use crate::linkage::LinkageParameters;
use crate::pose::{self, Pose};
use crate::traits::AngleResidual;

/// Residual samples over `[-π, π]`, same grid the scanner walks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualCurve {
    pub theta: Vec<f64>,
    pub value: Vec<f64>,
}

impl ResidualCurve {
    pub fn sample(f: &impl AngleResidual, samples: usize) -> Result<Self> {
        if samples < 2 {
            bail!("Curve needs at least 2 samples, got {samples}.");
        }
        let step = 2.0 * PI / (samples - 1) as f64;
        let mut theta = Vec::with_capacity(samples);
        let mut value = Vec::with_capacity(samples);
        for k in 0..samples {
            let t = -PI + step * k as f64;
            theta.push(t);
            value.push(f.eval(t));
        }
        Ok(Self { theta, value })
    }

    /// Sign-preserving log compression `sign(f)·log10(1 + |f|/10³)`, for
    /// plotting a residual whose magnitude spans many decades.
    pub fn log_compressed(&self) -> Self {
        let value = self
            .value
            .iter()
            .map(|v| v.signum() * (1.0 + v.abs() / 1e3).log10())
            .collect();
        Self {
            theta: self.theta.clone(),
            value,
        }
    }
}

/// Flat geometry buffers: `points` is `[x0, y0, x1, y1, ...]`, `segments`
/// holds index pairs into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "geometry", rename_all = "snake_case")]
pub enum DiagramGeometry {
    Points { points: Vec<f64> },
    Segments { points: Vec<f64>, segments: Vec<u32> },
}

fn flatten(points: &[Point2<f64>]) -> Vec<f64> {
    points.iter().flat_map(|p| [p.x, p.y]).collect()
}

/// The platform drawn at one pose: three base anchors, three platform
/// vertices, one strut per anchor/vertex pair, and the platform triangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseDiagram {
    pub pose: Pose,
    pub base_anchors: DiagramGeometry,
    pub struts: DiagramGeometry,
    pub platform: DiagramGeometry,
}

/// Builds the diagram for a root angle, reconstructing the pose first.
/// Singular geometry propagates; there is nothing sensible to draw.
pub fn pose_diagram(
    params: &LinkageParameters,
    theta: f64,
    singular_floor: f64,
) -> Result<PoseDiagram, SolveError> {
    let pose = pose::reconstruct(params, theta, singular_floor)?;
    Ok(diagram_at(params, pose))
}

fn diagram_at(params: &LinkageParameters, pose: Pose) -> PoseDiagram {
    let anchor1 = Point2::origin();
    let anchor2 = Point2::new(params.x1, 0.0);
    let anchor3 = Point2::new(params.x2, params.y2);

    let vertex1 = pose.position();
    let vertex2 = vertex1
        + Vector2::new(
            params.l3 * pose.theta.cos(),
            params.l3 * pose.theta.sin(),
        );
    let vertex3 = vertex1
        + Vector2::new(
            params.l2 * (pose.theta + params.gamma).cos(),
            params.l2 * (pose.theta + params.gamma).sin(),
        );

    let strut_points = [anchor1, vertex1, anchor2, vertex2, anchor3, vertex3];
    let platform_points = [vertex1, vertex2, vertex3];

    PoseDiagram {
        pose,
        base_anchors: DiagramGeometry::Points {
            points: flatten(&[anchor1, anchor2, anchor3]),
        },
        struts: DiagramGeometry::Segments {
            points: flatten(&strut_points),
            segments: vec![0, 1, 2, 3, 4, 5],
        },
        platform: DiagramGeometry::Segments {
            points: flatten(&platform_points),
            segments: vec![0, 1, 1, 2, 2, 0],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{pose_diagram, DiagramGeometry, ResidualCurve};
    use crate::linkage::LinkageParameters;
    use std::f64::consts::PI;

    struct Sine;

    impl crate::traits::AngleResidual for Sine {
        fn eval(&self, theta: f64) -> f64 {
            theta.sin()
        }
    }

    #[test]
    fn curve_sampling_spans_the_domain() {
        let curve = ResidualCurve::sample(&Sine, 101).expect("sampling should succeed");
        assert_eq!(curve.theta.len(), 101);
        assert_eq!(curve.value.len(), 101);
        assert!((curve.theta[0] + PI).abs() < 1e-15);
        assert!((curve.theta[100] - PI).abs() < 1e-15);
    }

    #[test]
    fn curve_sampling_rejects_degenerate_grids() {
        assert!(ResidualCurve::sample(&Sine, 1).is_err());
    }

    #[test]
    fn log_compression_preserves_sign_and_zero() {
        let curve = ResidualCurve {
            theta: vec![0.0, 1.0, 2.0],
            value: vec![-1e6, 0.0, 1e6],
        };
        let compressed = curve.log_compressed();
        assert!(compressed.value[0] < 0.0);
        assert_eq!(compressed.value[1], 0.0);
        assert!(compressed.value[2] > 0.0);
        assert!((compressed.value[2] - 3.0004340774793186).abs() < 1e-12);
    }

    #[test]
    fn symmetric_scenario_diagram_matches_hand_geometry() {
        let params = LinkageParameters::symmetric_reference();
        let diagram =
            pose_diagram(&params, PI / 4.0, 1e-12).expect("diagram should build");

        match &diagram.base_anchors {
            DiagramGeometry::Points { points } => {
                assert_eq!(points.len(), 6);
                assert_eq!(&points[2..4], &[4.0, 0.0]);
            }
            other => panic!("expected points geometry, got {other:?}"),
        }

        match &diagram.struts {
            DiagramGeometry::Segments { points, segments } => {
                assert_eq!(segments.len(), 6);
                // Strut 2 runs from anchor (4, 0) to platform vertex C2 = (3, 2);
                // its squared length must equal p2².
                let (ax, ay) = (points[4], points[5]);
                let (vx, vy) = (points[6], points[7]);
                assert!((vx - 3.0).abs() < 1e-9);
                assert!((vy - 2.0).abs() < 1e-9);
                let squared = (vx - ax).powi(2) + (vy - ay).powi(2);
                assert!((squared - params.p2 * params.p2).abs() < 1e-8);
            }
            other => panic!("expected segments geometry, got {other:?}"),
        }

        match &diagram.platform {
            DiagramGeometry::Segments { points, segments } => {
                assert_eq!(points.len(), 6);
                assert_eq!(segments, &vec![0, 1, 1, 2, 2, 0]);
                // C3 lands at (1, 2) for the quarter-turn pose.
                assert!((points[4] - 1.0).abs() < 1e-9);
                assert!((points[5] - 2.0).abs() < 1e-9);
            }
            other => panic!("expected segments geometry, got {other:?}"),
        }
    }
}
