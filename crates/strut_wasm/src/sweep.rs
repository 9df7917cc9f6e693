//! Batched sweep runner.
//!
//! A full classification sweep evaluates the residual a million times, which
//! is long enough to stall a browser frame. The runner executes the sweep in
//! caller-sized batches between progress reports, mirroring the sample order
//! and boundary bookkeeping of the one-shot core sweep exactly.

use anyhow::{bail, Result};
use serde::Serialize;
use serde_wasm_bindgen::to_value;
use strut_core::linkage::LinkageParameters;
use strut_core::scanner;
use strut_core::solver::SolveSettings;
use strut_core::sweep::{SweepAccumulator, SweepParameter, SweepSettings};
use wasm_bindgen::prelude::*;

pub(crate) fn parse_parameter(name: &str) -> Result<SweepParameter> {
    match name {
        "p1" => Ok(SweepParameter::Strut1),
        "p2" => Ok(SweepParameter::Strut2),
        "p3" => Ok(SweepParameter::Strut3),
        other => bail!("Unknown sweep parameter: {other} (expected p1, p2 or p3)."),
    }
}

/// Progress payload for the stepped sweep runner.
#[derive(Serialize)]
struct SweepProgress {
    done: bool,
    completed: usize,
    total: usize,
    skipped: usize,
}

struct SweepState {
    base: LinkageParameters,
    sweep: SweepSettings,
    solve: SolveSettings,
    accumulator: SweepAccumulator,
    next_index: usize,
    done: bool,
}

impl SweepState {
    fn value_at(&self, index: usize) -> f64 {
        let step = (self.sweep.end - self.sweep.start) / (self.sweep.samples - 1) as f64;
        self.sweep.start + step * index as f64
    }

    fn progress(&self) -> SweepProgress {
        SweepProgress {
            done: self.done,
            completed: self.next_index,
            total: self.sweep.samples,
            skipped: self.accumulator.skipped(),
        }
    }
}

#[wasm_bindgen]
pub struct WasmSweepRunner {
    state: Option<SweepState>,
}

#[wasm_bindgen]
impl WasmSweepRunner {
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
        parameter: &str,
        start: f64,
        end: f64,
        sweep_samples: u32,
        scan_samples: u32,
    ) -> Result<WasmSweepRunner, JsValue> {
        console_error_panic_hook::set_once();

        let base = LinkageParameters {
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
        base.validate()
            .map_err(|e| JsValue::from_str(&format!("Invalid linkage parameters: {e}")))?;

        let parameter = parse_parameter(parameter).map_err(|e| JsValue::from_str(&format!("{e}")))?;
        let sweep = SweepSettings {
            parameter,
            start,
            end,
            samples: sweep_samples as usize,
        };
        sweep
            .validate()
            .map_err(|e| JsValue::from_str(&format!("Invalid sweep settings: {e}")))?;

        let solve = SolveSettings {
            samples: scan_samples as usize,
            ..SolveSettings::default()
        };
        solve
            .validate()
            .map_err(|e| JsValue::from_str(&format!("Invalid solve settings: {e}")))?;

        Ok(WasmSweepRunner {
            state: Some(SweepState {
                base,
                sweep,
                solve,
                accumulator: SweepAccumulator::new(),
                next_index: 0,
                done: false,
            }),
        })
    }

    pub fn is_done(&self) -> bool {
        self.state.as_ref().map_or(true, |state| state.done)
    }

    pub fn run_steps(&mut self, batch_size: u32) -> Result<JsValue, JsValue> {
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        for _ in 0..batch_size {
            if state.next_index >= state.sweep.samples {
                break;
            }
            let value = state.value_at(state.next_index);
            let params = state.sweep.parameter.rebind(&state.base, value);
            match params
                .validate()
                .and_then(|_| scanner::scan(&params, state.solve.samples))
            {
                Ok(brackets) => state.accumulator.record(value, brackets.len()),
                Err(_) => state.accumulator.skip(),
            }
            state.next_index += 1;
        }
        if state.next_index >= state.sweep.samples {
            state.done = true;
        }

        to_value(&state.progress())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    pub fn get_progress(&self) -> Result<JsValue, JsValue> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        to_value(&state.progress())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    pub fn get_result(&self) -> Result<JsValue, JsValue> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        if !state.done {
            return Err(JsValue::from_str("Sweep has not completed yet."));
        }

        let result = state.accumulator.clone().finish(state.sweep.parameter);
        to_value(&result).map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// The console report for a finished sweep, one line per event.
    pub fn report(&self) -> Result<Vec<String>, JsValue> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        if !state.done {
            return Err(JsValue::from_str("Sweep has not completed yet."));
        }

        Ok(state
            .accumulator
            .clone()
            .finish(state.sweep.parameter)
            .summary_lines())
    }
}

#[cfg(test)]
mod tests {
    use super::parse_parameter;
    use strut_core::sweep::SweepParameter;

    #[test]
    fn parse_parameter_accepts_the_three_struts() {
        assert_eq!(parse_parameter("p1").unwrap(), SweepParameter::Strut1);
        assert_eq!(parse_parameter("p2").unwrap(), SweepParameter::Strut2);
        assert_eq!(parse_parameter("p3").unwrap(), SweepParameter::Strut3);
    }

    #[test]
    fn parse_parameter_rejects_unknown_names() {
        let err = parse_parameter("gamma").expect_err("expected error");
        assert!(format!("{err}").contains("Unknown sweep parameter"));
    }
}
