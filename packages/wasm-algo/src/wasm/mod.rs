//! WASM bindings for wasm-algo
//!
//! This module contains thin wrappers with #[wasm_bindgen] that delegate
//! to the core Rust implementations.

pub mod constants;
pub mod form;
pub mod logging;
pub mod preset;
pub mod try_into_js_value;

// Re-export WASM types
pub use form::WasmTxnForm;
pub use logging::init_logging;
pub use preset::PresetNamespace;
