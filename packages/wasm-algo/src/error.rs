//! Error types for wasm-algo
//!
//! These are API errors (unknown names, wrong value kinds, locked fields).
//! Validation failures are not errors; they are reported as data through
//! [`crate::validation::ValidationError`].

use thiserror::Error;
use wasm_bindgen::prelude::*;

/// Main error type for wasm-algo operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WasmAlgoError {
    /// Field name not known to any transaction type
    #[error("Unknown field: {0}")]
    UnknownField(String),
    /// Transaction type identifier not recognised
    #[error("Unknown transaction type: {0}")]
    UnknownTxnType(String),
    /// Field exists but is not part of the active transaction type
    #[error("Field {field} is not part of the {txn_type} form")]
    FieldNotInForm { field: String, txn_type: String },
    /// Value kind does not match the field's declared kind
    #[error("Field {field} expects a {expected} value")]
    KindMismatch { field: String, expected: String },
    /// Field is locked by a preset or by a derived rule
    #[error("Field {0} is locked")]
    FieldLocked(String),
    /// A rule table declares a dependency loop
    #[error("Cyclic dependency through field {0}")]
    CyclicDependency(String),
    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<&str> for WasmAlgoError {
    fn from(s: &str) -> Self {
        WasmAlgoError::InvalidInput(s.to_string())
    }
}

impl From<String> for WasmAlgoError {
    fn from(s: String) -> Self {
        WasmAlgoError::InvalidInput(s)
    }
}

impl From<serde_json::Error> for WasmAlgoError {
    fn from(err: serde_json::Error) -> Self {
        WasmAlgoError::InvalidInput(err.to_string())
    }
}

// REQUIRED: Converts to JS Error with stack trace
impl From<WasmAlgoError> for JsValue {
    fn from(err: WasmAlgoError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WasmAlgoError::UnknownField("rcvr".to_string());
        assert_eq!(err.to_string(), "Unknown field: rcvr");

        let err = WasmAlgoError::KindMismatch {
            field: "amt".to_string(),
            expected: "number".to_string(),
        };
        assert_eq!(err.to_string(), "Field amt expects a number value");
    }

    #[test]
    fn test_from_str() {
        let err: WasmAlgoError = "test error".into();
        assert_eq!(err.to_string(), "Invalid input: test error");
    }
}
