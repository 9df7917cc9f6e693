//! WASM bridge exposing the Strut core library to the browser frontend.
//!
//! Every payload crossing the boundary is either a `js_sys::Float64Array`
//! (flat numeric buffers) or a `serde_wasm_bindgen` value (structured
//! results); errors are stringified into `JsValue` at the boundary.

pub mod linkage;
pub mod sweep;
