//! wasm-algo: WASM module for the Algorand transaction composer form
//!
//! This crate provides:
//! - Per-transaction-type validation rules (required, range/length, format)
//! - Conditional groups for cross-field rules
//! - URL presets that prefill, force and lock fields
//! - A form store with batched commits and change notifications
//!
//! # Architecture
//!
//! The crate follows a two-layer architecture:
//! - **Core layer** (`src/*.rs`): Pure Rust logic, no WASM dependencies
//! - **WASM layer** (`src/wasm/*.rs`): Thin wrappers with `#[wasm_bindgen]`

pub mod address;
pub mod config;
pub mod constants;
pub mod constraint;
pub mod error;
pub mod form;
pub mod group;
pub mod preset;
pub mod rules;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod validation;
pub mod wasm;

// Re-export main types for convenience
pub use address::{decode_address, encode_address, validate_address};
pub use config::NodeConfig;
pub use error::WasmAlgoError;
pub use form::{FieldState, TxnForm};
pub use group::{GroupName, GroupState};
pub use preset::{resolve, Preset, ResolvedPreset};
pub use store::{ChangeSet, SubscriptionId};
pub use types::{Field, FieldKind, FieldValue, TxnType};
pub use validation::{ErrorDescriptor, ValidationError};
