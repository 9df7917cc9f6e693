//! Linkage wrapper: residual curves, poses, and diagrams for the frontend.

use js_sys::Float64Array;
use serde_wasm_bindgen::to_value;
use strut_core::diagram::{self, ResidualCurve};
use strut_core::linkage::LinkageParameters;
use strut_core::scanner;
use strut_core::solver::{self, SolveSettings};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmLinkage {
    pub(crate) params: LinkageParameters,
    pub(crate) settings: SolveSettings,
}

#[wasm_bindgen]
impl WasmLinkage {
    #[wasm_bindgen(constructor)]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        l1: f64,
        l2: f64,
        l3: f64,
        x1: f64,
        x2: f64,
        y2: f64,
        gamma: f64,
        p1: f64,
        p2: f64,
        p3: f64,
    ) -> Result<WasmLinkage, JsValue> {
        console_error_panic_hook::set_once();

        let params = LinkageParameters {
            l1,
            l2,
            l3,
            x1,
            x2,
            y2,
            gamma,
            p1,
            p2,
            p3,
        };
        params
            .validate()
            .map_err(|e| JsValue::from_str(&format!("Invalid linkage parameters: {e}")))?;

        Ok(WasmLinkage {
            params,
            settings: SolveSettings::default(),
        })
    }

    /// Symmetric demo scenario with poses at `theta = ±π/4`.
    pub fn symmetric_reference() -> WasmLinkage {
        console_error_panic_hook::set_once();
        WasmLinkage {
            params: LinkageParameters::symmetric_reference(),
            settings: SolveSettings::default(),
        }
    }

    /// General demo scenario: four poses at `p2 = 5`, six at `p2 = 7`.
    pub fn general_reference() -> WasmLinkage {
        console_error_panic_hook::set_once();
        WasmLinkage {
            params: LinkageParameters::general_reference(),
            settings: SolveSettings::default(),
        }
    }

    pub fn set_solve_settings(
        &mut self,
        samples: u32,
        tol: f64,
        verify_tol: f64,
        singular_floor: f64,
    ) -> Result<(), JsValue> {
        let settings = SolveSettings {
            samples: samples as usize,
            tol,
            verify_tol,
            singular_floor,
        };
        settings
            .validate()
            .map_err(|e| JsValue::from_str(&format!("Invalid solve settings: {e}")))?;
        self.settings = settings;
        Ok(())
    }

    /// Rebinds one strut length (1-based index) for interactive exploration.
    pub fn set_strut(&mut self, index: u32, value: f64) -> Result<(), JsValue> {
        let mut params = self.params;
        match index {
            1 => params.p1 = value,
            2 => params.p2 = value,
            3 => params.p3 = value,
            _ => return Err(JsValue::from_str("Strut index must be 1, 2 or 3.")),
        }
        params
            .validate()
            .map_err(|e| JsValue::from_str(&format!("Invalid linkage parameters: {e}")))?;
        self.params = params;
        Ok(())
    }

    pub fn parameters(&self) -> Result<JsValue, JsValue> {
        to_value(&self.params).map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    pub fn residual_at(&self, theta: f64) -> f64 {
        self.params.residual(theta)
    }

    pub fn residual_curve(&self, samples: u32) -> Result<JsValue, JsValue> {
        let curve = ResidualCurve::sample(&self.params, samples as usize)
            .map_err(|e| JsValue::from_str(&format!("Curve sampling failed: {e}")))?;
        to_value(&curve).map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    pub fn residual_curve_log(&self, samples: u32) -> Result<JsValue, JsValue> {
        let curve = ResidualCurve::sample(&self.params, samples as usize)
            .map_err(|e| JsValue::from_str(&format!("Curve sampling failed: {e}")))?;
        to_value(&curve.log_compressed())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Flattened `[a0, b0, a1, b1, ...]` bracket endpoints.
    pub fn bracket_endpoints(&self) -> Result<Float64Array, JsValue> {
        let brackets = solver::find_brackets(&self.params, &self.settings)
            .map_err(|e| JsValue::from_str(&format!("Scan failed: {e:#}")))?;
        Ok(Float64Array::from(scanner::endpoints(&brackets).as_slice()))
    }

    /// Refined root angles in increasing order.
    pub fn find_roots(&self) -> Result<Float64Array, JsValue> {
        let roots = solver::find_roots(&self.params, &self.settings)
            .map_err(|e| JsValue::from_str(&format!("Root finding failed: {e:#}")))?;
        Ok(Float64Array::from(roots.as_slice()))
    }

    /// Full solve outcome: every root with its pose and verification.
    pub fn find_poses(&self) -> Result<JsValue, JsValue> {
        let outcome = solver::solve_poses(&self.params, &self.settings)
            .map_err(|e| JsValue::from_str(&format!("Solve failed: {e:#}")))?;
        to_value(&outcome).map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// The console report, one line per event.
    pub fn report(&self) -> Result<Vec<String>, JsValue> {
        let outcome = solver::solve_poses(&self.params, &self.settings)
            .map_err(|e| JsValue::from_str(&format!("Solve failed: {e:#}")))?;
        Ok(outcome.summary_lines())
    }

    pub fn pose_diagram(&self, theta: f64) -> Result<JsValue, JsValue> {
        let diagram = diagram::pose_diagram(&self.params, theta, self.settings.singular_floor)
            .map_err(|e| JsValue::from_str(&format!("Diagram failed: {e}")))?;
        to_value(&diagram).map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }
}
