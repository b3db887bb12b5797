//! WASM bindings for preset resolution
//!
//! PresetNamespace provides static methods for looking up presets without
//! a form instance.

use crate::preset::{resolve as resolve_preset, Preset};
use crate::types::TxnType;
use crate::wasm::try_into_js_value::to_js_value;
use wasm_bindgen::prelude::*;

/// Namespace for preset operations
#[wasm_bindgen]
pub struct PresetNamespace;

#[wasm_bindgen]
impl PresetNamespace {
    /// Resolve a preset for a transaction type
    ///
    /// # Arguments
    /// * `preset_id` - Preset identifier, matched ignoring case, `-`, `_` and spaces
    /// * `txn_type` - Transaction type of the form
    ///
    /// # Returns
    /// `{ preset, prefill, forceRequired, disabled }`, or `undefined` when the
    /// preset is unknown or belongs to another transaction type
    ///
    /// # Example
    /// ```json
    /// {
    ///   "preset": "RekeyAccount",
    ///   "prefill": { "amt": 0 },
    ///   "forceRequired": ["rekey"],
    ///   "disabled": ["amt"]
    /// }
    /// ```
    #[wasm_bindgen]
    pub fn resolve(preset_id: Option<String>, txn_type: &str) -> Result<JsValue, JsValue> {
        let txn_type: TxnType = txn_type.parse()?;
        match resolve_preset(preset_id.as_deref(), txn_type) {
            Some(resolved) => Ok(to_js_value(&resolved)?),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Every preset identifier
    #[wasm_bindgen(js_name = presetIds)]
    pub fn preset_ids() -> Vec<String> {
        Preset::ALL.iter().map(|p| p.to_string()).collect()
    }

    /// Transaction type a preset applies to
    #[wasm_bindgen(js_name = txnTypeOf)]
    pub fn txn_type_of(preset_id: &str) -> Option<String> {
        Preset::parse(preset_id).map(|p| p.txn_type().to_string())
    }
}
