//! Declarative per-field constraints
//!
//! A [`FieldSpec`] describes one field of one transaction type: its kind,
//! whether it is required, numeric bounds, length limits, format, and the
//! derived hidden/disabled state. Dynamic parts are plain functions of the
//! snapshot, and every field they read is listed in `depends_on` so the
//! rule set can check the graph and compute what to re-evaluate on change.

use crate::address::validate_address;
use crate::snapshot::Snapshot;
use crate::types::{Field, FieldKind, FieldValue};
use crate::validation::{FormatKind, LengthUnit, ValidationError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use std::fmt;

pub type Predicate = fn(&Snapshot) -> bool;
pub type BoundFn = fn(&Snapshot) -> Option<f64>;

#[derive(Clone, Copy)]
pub enum Requirement {
    Never,
    Always,
    When(Predicate),
}

impl Requirement {
    pub fn holds(&self, snapshot: &Snapshot) -> bool {
        match self {
            Requirement::Never => false,
            Requirement::Always => true,
            Requirement::When(f) => f(snapshot),
        }
    }
}

#[derive(Clone, Copy)]
pub enum Bound {
    Fixed(f64),
    /// `None` means unbounded for the current snapshot
    Derived(BoundFn),
}

impl Bound {
    pub fn resolve(&self, snapshot: &Snapshot) -> Option<f64> {
        match self {
            Bound::Fixed(v) => Some(*v),
            Bound::Derived(f) => f(snapshot),
        }
    }
}

/// Semantic check applied after range and length checks
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Format {
    Address,
    Base64 { bytes: Option<usize> },
    Url,
    Decimals(u32),
    Integer,
    MetadataHash,
    AddressList,
    IntegerList,
}

impl Format {
    pub fn check(&self, value: &FieldValue) -> Result<(), FormatKind> {
        match (self, value) {
            (Format::Address, FieldValue::Text(s)) => {
                ok_if(validate_address(s.trim()), FormatKind::Address)
            }
            (Format::Base64 { bytes }, FieldValue::Text(s)) => {
                let decoded = BASE64.decode(s.trim()).ok();
                let valid = match (decoded, bytes) {
                    (Some(d), Some(n)) => d.len() == *n,
                    (Some(_), None) => true,
                    (None, _) => false,
                };
                ok_if(valid, FormatKind::Base64 { bytes: *bytes })
            }
            (Format::Url, FieldValue::Text(s)) => {
                ok_if(url::Url::parse(s.trim()).is_ok(), FormatKind::Url)
            }
            (Format::Decimals(max), FieldValue::Number(n)) => {
                ok_if(has_at_most_decimals(*n, *max), FormatKind::Decimals { max: *max })
            }
            (Format::Integer, FieldValue::Number(n)) => {
                ok_if(n.fract() == 0.0, FormatKind::Integer)
            }
            (Format::MetadataHash, FieldValue::Text(s)) => {
                let valid = s.len() == 32
                    || BASE64
                        .decode(s.trim())
                        .map(|d| d.len() == 32)
                        .unwrap_or(false);
                ok_if(valid, FormatKind::MetadataHash)
            }
            (Format::AddressList, FieldValue::Text(s)) => {
                ok_if(list_items(s).all(validate_address), FormatKind::AddressList)
            }
            (Format::IntegerList, FieldValue::Text(s)) => ok_if(
                list_items(s).all(|item| item.parse::<u64>().is_ok()),
                FormatKind::IntegerList,
            ),
            // Kinds are enforced on write; a mismatch here is a table bug.
            _ => Ok(()),
        }
    }
}

fn ok_if(valid: bool, kind: FormatKind) -> Result<(), FormatKind> {
    if valid {
        Ok(())
    } else {
        Err(kind)
    }
}

fn has_at_most_decimals(n: f64, max: u32) -> bool {
    let scaled = n * 10f64.powi(max as i32);
    (scaled - scaled.round()).abs() <= scaled.abs().max(1.0) * f64::EPSILON * 16.0
}

/// Non-empty entries of a comma separated list
pub fn list_items(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// Constraints of one field as seen by the UI for the current snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    pub hidden: bool,
    pub disabled: bool,
}

#[derive(Clone)]
pub struct FieldSpec {
    pub field: Field,
    pub kind: FieldKind,
    pub required: Requirement,
    pub min: Option<Bound>,
    pub max: Option<Bound>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub max_items: Option<usize>,
    pub format: Option<Format>,
    pub hidden: Option<Predicate>,
    pub disabled: Option<Predicate>,
    pub initial: Option<FieldValue>,
    pub depends_on: Vec<Field>,
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("field", &self.field)
            .field("kind", &self.kind)
            .field("format", &self.format)
            .field("depends_on", &self.depends_on)
            .finish_non_exhaustive()
    }
}

impl FieldSpec {
    fn new(field: Field, kind: FieldKind) -> Self {
        FieldSpec {
            field,
            kind,
            required: Requirement::Never,
            min: None,
            max: None,
            min_length: None,
            max_length: None,
            max_items: None,
            format: None,
            hidden: None,
            disabled: None,
            initial: None,
            depends_on: Vec::new(),
        }
    }

    pub fn text(field: Field) -> Self {
        Self::new(field, FieldKind::Text)
    }

    pub fn number(field: Field) -> Self {
        Self::new(field, FieldKind::Number)
    }

    pub fn toggle(field: Field, default: bool) -> Self {
        Self::new(field, FieldKind::Toggle).initial(FieldValue::Toggle(default))
    }

    pub fn address(field: Field) -> Self {
        Self::text(field).format(Format::Address)
    }

    pub fn required(mut self) -> Self {
        self.required = Requirement::Always;
        self
    }

    pub fn required_when(mut self, predicate: Predicate) -> Self {
        self.required = Requirement::When(predicate);
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(Bound::Fixed(min));
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(Bound::Fixed(max));
        self
    }

    pub fn min_when(mut self, bound: BoundFn) -> Self {
        self.min = Some(Bound::Derived(bound));
        self
    }

    pub fn max_when(mut self, bound: BoundFn) -> Self {
        self.max = Some(Bound::Derived(bound));
        self
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = Some(n);
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn hidden_when(mut self, predicate: Predicate) -> Self {
        self.hidden = Some(predicate);
        self
    }

    pub fn disabled_when(mut self, predicate: Predicate) -> Self {
        self.disabled = Some(predicate);
        self
    }

    pub fn initial(mut self, value: FieldValue) -> Self {
        self.initial = Some(value);
        self
    }

    pub fn depends_on(mut self, fields: &[Field]) -> Self {
        self.depends_on.extend_from_slice(fields);
        self
    }

    pub fn is_hidden(&self, snapshot: &Snapshot) -> bool {
        self.hidden.is_some_and(|f| f(snapshot))
    }

    pub fn is_disabled(&self, snapshot: &Snapshot) -> bool {
        self.disabled.is_some_and(|f| f(snapshot))
    }

    /// Hidden fields are never required
    pub fn is_required(&self, snapshot: &Snapshot, forced: bool) -> bool {
        !self.is_hidden(snapshot) && (forced || self.required.holds(snapshot))
    }

    pub fn constraints(&self, snapshot: &Snapshot, forced: bool, locked: bool) -> Constraints {
        Constraints {
            required: self.is_required(snapshot, forced),
            min: self.min.and_then(|b| b.resolve(snapshot)),
            max: self.max.and_then(|b| b.resolve(snapshot)),
            max_length: self.max_length,
            max_items: self.max_items,
            hidden: self.is_hidden(snapshot),
            disabled: locked || self.is_disabled(snapshot),
        }
    }

    /// Evaluate this field against the snapshot.
    ///
    /// Checks run in a fixed order and the first failure wins:
    /// required, then range/length, then format.
    pub fn check(&self, snapshot: &Snapshot, forced: bool) -> Option<ValidationError> {
        if self.is_hidden(snapshot) {
            return None;
        }

        let Some(value) = snapshot.get(self.field).filter(|v| !v.is_blank()) else {
            return self
                .is_required(snapshot, forced)
                .then_some(ValidationError::Required);
        };

        if let Some(err) = self.check_bounds(value, snapshot) {
            return Some(err);
        }

        self.format
            .and_then(|format| format.check(value).err())
            .map(ValidationError::format)
    }

    fn check_bounds(&self, value: &FieldValue, snapshot: &Snapshot) -> Option<ValidationError> {
        match value {
            FieldValue::Number(n) => {
                if let Some(min) = self.min.and_then(|b| b.resolve(snapshot)) {
                    if *n < min {
                        return Some(ValidationError::below(min));
                    }
                }
                if let Some(max) = self.max.and_then(|b| b.resolve(snapshot)) {
                    if *n > max {
                        return Some(ValidationError::above(max));
                    }
                }
                None
            }
            FieldValue::Text(s) => {
                let len = s.len();
                if let Some(min) = self.min_length.filter(|min| len < *min) {
                    return Some(ValidationError::Length {
                        min: Some(min),
                        max: None,
                        unit: LengthUnit::Bytes,
                    });
                }
                if let Some(max) = self.max_length.filter(|max| len > *max) {
                    return Some(ValidationError::Length {
                        min: None,
                        max: Some(max),
                        unit: LengthUnit::Bytes,
                    });
                }
                let count = list_items(s).count();
                self.max_items
                    .filter(|max| count > *max)
                    .map(|max| ValidationError::Length {
                        min: None,
                        max: Some(max),
                        unit: LengthUnit::Items,
                    })
            }
            FieldValue::Toggle(_) => None,
        }
    }
}

/// A field whose value mirrors `source` while the toggle `when` is on.
///
/// Switching the toggle off clears the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Derivation {
    pub target: Field,
    pub source: Field,
    pub when: Field,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::encode_address;
    use crate::types::TxnType;
    use rstest::rstest;

    fn snapshot_with(values: &[(Field, FieldValue)]) -> Snapshot {
        let mut snapshot = Snapshot::new(TxnType::Pay);
        for (field, value) in values {
            snapshot.put(*field, Some(value.clone()));
        }
        snapshot
    }

    #[test]
    fn test_required_before_format() {
        let spec = FieldSpec::address(Field::Rcv).required();
        let empty = Snapshot::new(TxnType::Pay);
        assert_eq!(spec.check(&empty, false), Some(ValidationError::Required));

        let bad = snapshot_with(&[(Field::Rcv, FieldValue::text("nope"))]);
        assert_eq!(
            spec.check(&bad, false),
            Some(ValidationError::format(FormatKind::Address))
        );

        let addr = encode_address(&[7u8; 32]).unwrap();
        let good = snapshot_with(&[(Field::Rcv, FieldValue::text(addr))]);
        assert_eq!(spec.check(&good, false), None);
    }

    #[test]
    fn test_forced_required() {
        let spec = FieldSpec::address(Field::Close);
        let empty = Snapshot::new(TxnType::Pay);
        assert_eq!(spec.check(&empty, false), None);
        assert_eq!(spec.check(&empty, true), Some(ValidationError::Required));
    }

    #[rstest]
    #[case(0.0, None)]
    #[case(5.0, None)]
    #[case(10.0, None)]
    #[case(-0.5, Some(ValidationError::below(0.0)))]
    #[case(10.5, Some(ValidationError::above(10.0)))]
    fn test_inclusive_bounds(#[case] value: f64, #[case] expected: Option<ValidationError>) {
        let spec = FieldSpec::number(Field::Amt).min(0.0).max(10.0);
        let snapshot = snapshot_with(&[(Field::Amt, FieldValue::Number(value))]);
        assert_eq!(spec.check(&snapshot, false), expected);
    }

    #[test]
    fn test_range_before_format() {
        let spec = FieldSpec::number(Field::Apep)
            .max(3.0)
            .format(Format::Integer);
        let snapshot = snapshot_with(&[(Field::Apep, FieldValue::Number(3.5))]);
        assert_eq!(spec.check(&snapshot, false), Some(ValidationError::above(3.0)));

        let snapshot = snapshot_with(&[(Field::Apep, FieldValue::Number(2.5))]);
        assert_eq!(
            spec.check(&snapshot, false),
            Some(ValidationError::format(FormatKind::Integer))
        );
    }

    #[test]
    fn test_dynamic_max() {
        let spec = FieldSpec::number(Field::ApgsNui)
            .max_when(|s| Some(64.0 - s.number(Field::ApgsNbs).unwrap_or(0.0)))
            .depends_on(&[Field::ApgsNbs]);
        let snapshot = snapshot_with(&[
            (Field::ApgsNui, FieldValue::Number(60.0)),
            (Field::ApgsNbs, FieldValue::Number(10.0)),
        ]);
        assert_eq!(spec.check(&snapshot, false), Some(ValidationError::above(54.0)));
        assert_eq!(spec.constraints(&snapshot, false, false).max, Some(54.0));
    }

    #[test]
    fn test_max_length_in_bytes() {
        let spec = FieldSpec::text(Field::AparUn).max_length(8);
        let snapshot = snapshot_with(&[(Field::AparUn, FieldValue::text("ÄÄÄÄÄ"))]);
        assert_eq!(
            spec.check(&snapshot, false),
            Some(ValidationError::Length {
                min: None,
                max: Some(8),
                unit: LengthUnit::Bytes
            })
        );
    }

    #[test]
    fn test_max_items() {
        let spec = FieldSpec::text(Field::Apfa)
            .max_items(2)
            .format(Format::IntegerList);
        let snapshot = snapshot_with(&[(Field::Apfa, FieldValue::text("1, 2, 3"))]);
        assert!(matches!(
            spec.check(&snapshot, false),
            Some(ValidationError::Length {
                unit: LengthUnit::Items,
                ..
            })
        ));

        let snapshot = snapshot_with(&[(Field::Apfa, FieldValue::text("1,x"))]);
        assert_eq!(
            spec.check(&snapshot, false),
            Some(ValidationError::format(FormatKind::IntegerList))
        );
    }

    #[test]
    fn test_hidden_field_has_no_error() {
        let spec = FieldSpec::number(Field::Fee)
            .required()
            .hidden_when(|s| s.flag(Field::UseSugFee))
            .depends_on(&[Field::UseSugFee]);
        let snapshot = snapshot_with(&[(Field::UseSugFee, FieldValue::Toggle(true))]);
        assert_eq!(spec.check(&snapshot, true), None);
        assert!(!spec.constraints(&snapshot, false, false).required);
    }

    #[rstest]
    #[case(1.123456, true)]
    #[case(0.1, true)]
    #[case(1.1234567, false)]
    #[case(100.0, true)]
    #[case(1.12345601, false)]
    fn test_decimals(#[case] value: f64, #[case] valid: bool) {
        assert_eq!(
            Format::Decimals(6).check(&FieldValue::Number(value)).is_ok(),
            valid
        );
    }

    #[test]
    fn test_base64_byte_length() {
        let key = BASE64.encode([1u8; 32]);
        let format = Format::Base64 { bytes: Some(32) };
        assert!(format.check(&FieldValue::text(key)).is_ok());
        assert!(format
            .check(&FieldValue::text(BASE64.encode([1u8; 31])))
            .is_err());
        assert!(format.check(&FieldValue::text("not base64!")).is_err());
    }

    #[test]
    fn test_url_and_metadata_hash() {
        assert!(Format::Url
            .check(&FieldValue::text("https://example.com/asset.json"))
            .is_ok());
        assert!(Format::Url.check(&FieldValue::text("example")).is_err());

        assert!(Format::MetadataHash
            .check(&FieldValue::text("0123456789abcdef0123456789abcdef"))
            .is_ok());
        assert!(Format::MetadataHash
            .check(&FieldValue::text(BASE64.encode([9u8; 32])))
            .is_ok());
        assert!(Format::MetadataHash.check(&FieldValue::text("short")).is_err());
    }
}
