//! WASM bindings for the composer form
//!
//! Thin wrapper around core TxnForm with #[wasm_bindgen]. Methods take
//! `&self`. The wrapper holds one core subscription that queues every
//! ChangeSet; JS listeners are called from that queue after the inner borrow
//! is released, so a listener may read or edit the form while notified.

use crate::config::NodeConfig;
use crate::error::WasmAlgoError;
use crate::form::TxnForm;
use crate::js_obj;
use crate::store::ChangeSet;
use crate::types::{Field, FieldValue, TxnType};
use crate::wasm::try_into_js_value::{to_js_value, JsConversionError};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// WASM-exposed form wrapper
#[wasm_bindgen]
pub struct WasmTxnForm {
    inner: RefCell<TxnForm>,
    pending: Rc<RefCell<Vec<ChangeSet>>>,
    listeners: RefCell<Vec<(u32, js_sys::Function)>>,
    next_listener: Cell<u32>,
}

#[wasm_bindgen]
impl WasmTxnForm {
    /// Create a form for a transaction type
    ///
    /// # Arguments
    /// * `txn_type` - `pay`, `axfer`, `acfg`, `afrz`, `appl` or `keyreg`
    /// * `node_config` - Optional `{ coinName, nodeServer, nodeToken, nodePort, nodeHeaders }`
    /// * `preset_id` - Optional preset from the URL, e.g. `AssetCreate`
    #[wasm_bindgen(constructor)]
    pub fn new(
        txn_type: &str,
        node_config: JsValue,
        preset_id: Option<String>,
    ) -> Result<WasmTxnForm, JsValue> {
        let txn_type: TxnType = txn_type.parse()?;
        let config: NodeConfig = if node_config.is_undefined() || node_config.is_null() {
            NodeConfig::default()
        } else {
            serde_wasm_bindgen::from_value(node_config)
                .map_err(|e| WasmAlgoError::InvalidInput(format!("Invalid node config: {}", e)))?
        };
        let mut inner = TxnForm::new(txn_type, config)?;
        inner.apply_preset(preset_id.as_deref())?;

        let pending: Rc<RefCell<Vec<ChangeSet>>> = Rc::default();
        let queue = pending.clone();
        inner.subscribe(Box::new(move |change: &ChangeSet| {
            queue.borrow_mut().push(change.clone())
        }));
        Ok(WasmTxnForm {
            inner: RefCell::new(inner),
            pending,
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
        })
    }

    #[wasm_bindgen(getter, js_name = txnType)]
    pub fn txn_type(&self) -> String {
        self.inner.borrow().txn_type().to_string()
    }

    /// Switch transaction type; resets the form
    #[wasm_bindgen(js_name = setTxnType)]
    pub fn set_txn_type(&self, txn_type: &str) -> Result<(), JsValue> {
        let txn_type: TxnType = txn_type.parse()?;
        self.inner.borrow_mut().set_txn_type(txn_type)?;
        self.notify()
    }

    /// Set one field; `undefined`, `null` and `""` clear it
    #[wasm_bindgen(js_name = setValue)]
    pub fn set_value(&self, field: &str, value: JsValue) -> Result<(), JsValue> {
        let field: Field = field.parse()?;
        let value = field_value(value)?;
        self.inner.borrow_mut().set_value(field, value)?;
        self.notify()
    }

    /// Set several fields as one update, e.g. `{ apgs_nui: 50, apgs_nbs: 10 }`
    #[wasm_bindgen(js_name = setValues)]
    pub fn set_values(&self, values: JsValue) -> Result<(), JsValue> {
        let values: BTreeMap<Field, Option<FieldValue>> = serde_wasm_bindgen::from_value(values)
            .map_err(|e| WasmAlgoError::InvalidInput(format!("Invalid values: {}", e)))?;
        self.inner
            .borrow_mut()
            .set_values(values.into_iter().collect())?;
        self.notify()
    }

    #[wasm_bindgen(js_name = setTouched)]
    pub fn set_touched(&self, field: &str, touched: Option<bool>) -> Result<(), JsValue> {
        let field: Field = field.parse()?;
        self.inner
            .borrow_mut()
            .set_touched(field, touched.unwrap_or(true))?;
        self.notify()
    }

    #[wasm_bindgen(js_name = resetAll)]
    pub fn reset_all(&self) -> Result<(), JsValue> {
        self.inner.borrow_mut().reset_all();
        self.notify()
    }

    /// Reveal every error, as on a submit attempt
    #[wasm_bindgen(js_name = showAllErrors)]
    pub fn show_all_errors(&self) -> Result<(), JsValue> {
        self.inner.borrow_mut().show_all_errors();
        self.notify()
    }

    /// Apply a preset; unknown or incompatible ids clear the active preset
    #[wasm_bindgen(js_name = applyPreset)]
    pub fn apply_preset(&self, preset_id: Option<String>) -> Result<(), JsValue> {
        self.inner.borrow_mut().apply_preset(preset_id.as_deref())?;
        self.notify()
    }

    /// Active preset, if any
    #[wasm_bindgen(getter)]
    pub fn preset(&self) -> Option<String> {
        self.inner.borrow().preset().map(|p| p.to_string())
    }

    /// `{ field, kind, value, touched, constraints, isValid, error? }`
    #[wasm_bindgen(js_name = fieldState)]
    pub fn field_state(&self, field: &str) -> Result<JsValue, JsValue> {
        let field: Field = field.parse()?;
        let state = self.inner.borrow().field_state(field)?;
        Ok(to_js_value(&state)?)
    }

    #[wasm_bindgen(js_name = fieldStates)]
    pub fn field_states(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(&self.inner.borrow().field_states())?)
    }

    /// `{ name, fields, isValid, error? }`, or `undefined` if the group is
    /// not part of this form
    #[wasm_bindgen(js_name = groupState)]
    pub fn group_state(&self, name: &str) -> Result<JsValue, JsValue> {
        let states = self.inner.borrow().group_states();
        match states.iter().find(|g| g.name.as_str() == name) {
            Some(state) => Ok(to_js_value(state)?),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen(js_name = groupStates)]
    pub fn group_states(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(&self.inner.borrow().group_states())?)
    }

    /// Groups a field participates in
    #[wasm_bindgen(js_name = groupsFor)]
    pub fn groups_for(&self, field: &str) -> Result<JsValue, JsValue> {
        let field: Field = field.parse()?;
        Ok(to_js_value(&self.inner.borrow().groups_for(field))?)
    }

    #[wasm_bindgen(js_name = isLocked)]
    pub fn is_locked(&self, field: &str) -> Result<bool, JsValue> {
        let field: Field = field.parse()?;
        Ok(self.inner.borrow().is_locked(field))
    }

    #[wasm_bindgen(js_name = canSubmit)]
    pub fn can_submit(&self) -> bool {
        self.inner.borrow().can_submit()
    }

    #[wasm_bindgen(js_name = rekeyWarning)]
    pub fn rekey_warning(&self) -> bool {
        self.inner.borrow().rekey_warning()
    }

    #[wasm_bindgen(js_name = closeWarning)]
    pub fn close_warning(&self) -> bool {
        self.inner.borrow().close_warning()
    }

    #[wasm_bindgen(js_name = coinLabel)]
    pub fn coin_label(&self) -> String {
        self.inner.borrow().coin_label().to_string()
    }

    /// Committed values as `{ txnType, values }`
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(self.inner.borrow().snapshot())?)
    }

    #[wasm_bindgen(getter, js_name = dataVersion)]
    pub fn data_version(&self) -> f64 {
        self.inner.borrow().data_version() as f64
    }

    /// Banner and submit state in one call
    #[wasm_bindgen]
    pub fn status(&self) -> Result<JsValue, JsValue> {
        let form = self.inner.borrow();
        let preset = form.preset().map(|p| p.to_string());
        let status = js_obj!(
            "txnType" => form.txn_type().as_str(),
            "preset" => preset,
            "dataVersion" => form.data_version(),
            "canSubmit" => form.can_submit(),
            "rekeyWarning" => form.rekey_warning(),
            "closeWarning" => form.close_warning(),
            "coinLabel" => form.coin_label(),
        )?;
        Ok(status)
    }

    /// Register a listener called with `{ changed, affectedFields,
    /// affectedGroups, dataVersion }` after every update
    #[wasm_bindgen]
    pub fn subscribe(&self, listener: js_sys::Function) -> u32 {
        let id = self.next_listener.get();
        self.next_listener.set(id.wrapping_add(1));
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    #[wasm_bindgen]
    pub fn unsubscribe(&self, id: u32) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }
}

impl WasmTxnForm {
    /// Hand queued changes to the JS listeners
    fn notify(&self) -> Result<(), JsValue> {
        let changes = std::mem::take(&mut *self.pending.borrow_mut());
        for change in changes {
            let value = to_js_value(&change)?;
            let listeners: Vec<js_sys::Function> = self
                .listeners
                .borrow()
                .iter()
                .map(|(_, f)| f.clone())
                .collect();
            for listener in listeners {
                listener.call1(&JsValue::NULL, &value)?;
            }
        }
        Ok(())
    }
}

fn field_value(value: JsValue) -> Result<Option<FieldValue>, JsConversionError> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value(value)
        .map(Some)
        .map_err(|e| JsConversionError::new(&format!("Invalid field value: {}", e)))
}

// WASM tests - only run in wasm32 target
#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_string_numbers_are_accepted() {
        let form = WasmTxnForm::new("appl", JsValue::UNDEFINED, None).unwrap();
        form.set_value("apgs_nui", JsValue::from_str("60")).unwrap();
        form.set_value("apgs_nbs", JsValue::from_f64(10.0)).unwrap();
        assert!(!form.can_submit());
        assert_eq!(form.data_version(), 2.0);
    }

    #[wasm_bindgen_test]
    fn test_unknown_field_is_error() {
        let form = WasmTxnForm::new("pay", JsValue::UNDEFINED, None).unwrap();
        assert!(form.set_value("nope", JsValue::from_f64(1.0)).is_err());
    }

    #[wasm_bindgen_test]
    fn test_preset_from_constructor() {
        let form = WasmTxnForm::new("pay", JsValue::UNDEFINED, Some("rekey_account".into())).unwrap();
        assert_eq!(form.preset(), Some("RekeyAccount".to_string()));
        assert!(form.rekey_warning());
    }

    #[wasm_bindgen_test]
    fn test_listener_sees_each_commit_and_can_read_form() {
        let form = WasmTxnForm::new("pay", JsValue::UNDEFINED, None).unwrap();
        let seen = js_sys::Array::new();
        let listener = js_sys::Function::new_with_args("change", "this.push(change.dataVersion)")
            .bind(&seen);
        let id = form.subscribe(listener);

        form.set_value("amt", JsValue::from_f64(1.0)).unwrap();
        form.set_value("amt", JsValue::from_f64(1.0)).unwrap();
        form.show_all_errors().unwrap();
        assert_eq!(seen.length(), 2);
        assert_eq!(seen.get(1).as_f64(), Some(form.data_version()));

        assert!(form.unsubscribe(id));
        form.reset_all().unwrap();
        assert_eq!(seen.length(), 2);
    }
}
