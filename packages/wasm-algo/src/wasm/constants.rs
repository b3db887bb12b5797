//! Protocol limits exported via WASM.
//!
//! These let the UI render hints ("max 64 entries") from the same numbers
//! the rules check against.

use crate::constants::{
    MAX_APP_ACCOUNTS, MAX_APP_ARGS, MAX_APP_FOREIGN_APPS, MAX_APP_FOREIGN_ASSETS,
    MAX_APP_GLOBALS, MAX_APP_LOCALS, MAX_APP_TOTAL_REFS, MAX_EXTRA_PAGES, MAX_NOTE_BYTES,
    MAX_TXN_LIFE,
};
use wasm_bindgen::prelude::*;

/// Max global state entries per application
#[wasm_bindgen(js_name = maxAppGlobals)]
pub fn max_app_globals() -> f64 {
    MAX_APP_GLOBALS
}

/// Max local state entries per application
#[wasm_bindgen(js_name = maxAppLocals)]
pub fn max_app_locals() -> f64 {
    MAX_APP_LOCALS
}

/// Max accounts, apps and assets referenced by one call
#[wasm_bindgen(js_name = maxAppTotalRefs)]
pub fn max_app_total_refs() -> u32 {
    MAX_APP_TOTAL_REFS as u32
}

#[wasm_bindgen(js_name = maxAppAccounts)]
pub fn max_app_accounts() -> u32 {
    MAX_APP_ACCOUNTS as u32
}

#[wasm_bindgen(js_name = maxAppForeignApps)]
pub fn max_app_foreign_apps() -> u32 {
    MAX_APP_FOREIGN_APPS as u32
}

#[wasm_bindgen(js_name = maxAppForeignAssets)]
pub fn max_app_foreign_assets() -> u32 {
    MAX_APP_FOREIGN_ASSETS as u32
}

#[wasm_bindgen(js_name = maxAppArgs)]
pub fn max_app_args() -> u32 {
    MAX_APP_ARGS as u32
}

#[wasm_bindgen(js_name = maxExtraPages)]
pub fn max_extra_pages() -> f64 {
    MAX_EXTRA_PAGES
}

/// Max rounds between first and last valid
#[wasm_bindgen(js_name = maxTxnLife)]
pub fn max_txn_life() -> f64 {
    MAX_TXN_LIFE
}

#[wasm_bindgen(js_name = maxNoteBytes)]
pub fn max_note_bytes() -> u32 {
    MAX_NOTE_BYTES as u32
}
