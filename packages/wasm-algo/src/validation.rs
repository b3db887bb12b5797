//! Validation outcomes as data
//!
//! The engine never formats user-facing text. Every failure maps to a message
//! key plus an interpolation dictionary, which the UI hands to its
//! translation function.

use crate::group::GroupName;
use crate::types::Field;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// What a length bound counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LengthUnit {
    /// UTF-8 bytes of a text value
    Bytes,
    /// Entries of a comma separated list
    Items,
}

/// Kind of semantic check a value failed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FormatKind {
    /// Not a checksummed Algorand address
    Address,
    /// Not base64, or decodes to the wrong number of bytes
    Base64 { bytes: Option<usize> },
    /// Not an absolute URL
    Url,
    /// More fractional digits than allowed
    Decimals { max: u32 },
    /// Not a whole number
    Integer,
    /// Neither 32 raw bytes nor base64 of 32 bytes
    MetadataHash,
    /// A list entry is not an address
    AddressList,
    /// A list entry is not a whole number
    IntegerList,
}

/// Why a field or group is invalid
///
/// `Range` and `Length` carry only the bound that was crossed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ValidationError {
    Required,
    Range {
        min: Option<f64>,
        max: Option<f64>,
    },
    Length {
        min: Option<usize>,
        max: Option<usize>,
        unit: LengthUnit,
    },
    Format {
        kind: FormatKind,
    },
    Conditional {
        group: GroupName,
        fields: Vec<Field>,
        limit: Option<f64>,
    },
}

impl ValidationError {
    pub fn below(min: f64) -> Self {
        ValidationError::Range {
            min: Some(min),
            max: None,
        }
    }

    pub fn above(max: f64) -> Self {
        ValidationError::Range {
            min: None,
            max: Some(max),
        }
    }

    pub fn format(kind: FormatKind) -> Self {
        ValidationError::Format { kind }
    }

    /// Message key and interpolation dictionary for the UI
    pub fn descriptor(&self) -> ErrorDescriptor {
        match self {
            ValidationError::Required => ErrorDescriptor::new("form.errors.required"),
            ValidationError::Range { min: Some(min), .. } => {
                ErrorDescriptor::new("form.errors.min").with("min", *min)
            }
            ValidationError::Range { max, .. } => {
                ErrorDescriptor::new("form.errors.max").with("max", max.unwrap_or(f64::MAX))
            }
            ValidationError::Length { min, max, unit } => {
                let (key, dict_key, bound) = match (min, unit) {
                    (Some(min), LengthUnit::Bytes) => ("form.errors.minLength", "min", *min),
                    (Some(min), LengthUnit::Items) => ("form.errors.minItems", "min", *min),
                    (None, LengthUnit::Bytes) => {
                        ("form.errors.maxLength", "max", max.unwrap_or(usize::MAX))
                    }
                    (None, LengthUnit::Items) => {
                        ("form.errors.maxItems", "max", max.unwrap_or(usize::MAX))
                    }
                };
                ErrorDescriptor::new(key).with(dict_key, bound)
            }
            ValidationError::Format { kind } => match kind {
                FormatKind::Address => ErrorDescriptor::new("form.errors.address"),
                FormatKind::Base64 { bytes: Some(n) } => {
                    ErrorDescriptor::new("form.errors.base64Bytes").with("bytes", *n)
                }
                FormatKind::Base64 { bytes: None } => ErrorDescriptor::new("form.errors.base64"),
                FormatKind::Url => ErrorDescriptor::new("form.errors.url"),
                FormatKind::Decimals { max } => {
                    ErrorDescriptor::new("form.errors.decimals").with("max", *max)
                }
                FormatKind::Integer => ErrorDescriptor::new("form.errors.integer"),
                FormatKind::MetadataHash => ErrorDescriptor::new("form.errors.metadataHash"),
                FormatKind::AddressList => ErrorDescriptor::new("form.errors.addressList"),
                FormatKind::IntegerList => ErrorDescriptor::new("form.errors.integerList"),
            },
            ValidationError::Conditional {
                group,
                fields,
                limit,
            } => {
                let names: Vec<&str> = fields.iter().map(|f| f.as_str()).collect();
                let mut descriptor =
                    ErrorDescriptor::new(format!("form.errors.group.{}", group.as_str()))
                        .with("fields", names.join(", "));
                if let Some(limit) = limit {
                    descriptor = descriptor.with("max", *limit);
                }
                descriptor
            }
        }
    }
}

/// `{ key, dict }` pair consumed by the UI's `t(key, dict)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDescriptor {
    pub key: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub dict: BTreeMap<String, Value>,
}

impl ErrorDescriptor {
    pub fn new(key: impl Into<String>) -> Self {
        ErrorDescriptor {
            key: key.into(),
            dict: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.dict.insert(name.to_string(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_descriptor() {
        let d = ValidationError::Required.descriptor();
        assert_eq!(d.key, "form.errors.required");
        assert!(d.dict.is_empty());
    }

    #[test]
    fn test_range_descriptor_carries_crossed_bound() {
        let d = ValidationError::above(10.0).descriptor();
        assert_eq!(d.key, "form.errors.max");
        assert_eq!(d.dict["max"], json!(10.0));

        let d = ValidationError::below(1.0).descriptor();
        assert_eq!(d.key, "form.errors.min");
        assert_eq!(d.dict["min"], json!(1.0));
    }

    #[test]
    fn test_length_descriptor() {
        let err = ValidationError::Length {
            min: None,
            max: Some(8),
            unit: LengthUnit::Bytes,
        };
        let d = err.descriptor();
        assert_eq!(d.key, "form.errors.maxLength");
        assert_eq!(d.dict["max"], json!(8));
    }

    #[test]
    fn test_conditional_descriptor() {
        let err = ValidationError::Conditional {
            group: GroupName::AppGlobalSchema,
            fields: vec![Field::ApgsNui, Field::ApgsNbs],
            limit: Some(64.0),
        };
        let d = err.descriptor();
        assert_eq!(d.key, "form.errors.group.appGlobalSchema");
        assert_eq!(d.dict["fields"], json!("apgs_nui, apgs_nbs"));
        assert_eq!(d.dict["max"], json!(64.0));
    }

    #[test]
    fn test_descriptor_serializes_without_empty_dict() {
        let value = serde_json::to_value(ValidationError::Required.descriptor()).unwrap();
        assert_eq!(value, json!({ "key": "form.errors.required" }));
    }
}
