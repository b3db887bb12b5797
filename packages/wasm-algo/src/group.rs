//! Conditional groups: cross-field rules whose outcome belongs to the group
//! rather than to any single field.

use crate::preset::Preset;
use crate::snapshot::Snapshot;
use crate::types::Field;
use crate::validation::{ErrorDescriptor, ValidationError};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupName {
    ValidityWindow,
    KeyregOnline,
    KeyregNonparticipation,
    AssetRoles,
    AppGlobalSchema,
    AppLocalSchema,
    AppReferences,
}

impl GroupName {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupName::ValidityWindow => "validityWindow",
            GroupName::KeyregOnline => "keyregOnline",
            GroupName::KeyregNonparticipation => "keyregNonparticipation",
            GroupName::AssetRoles => "assetRoles",
            GroupName::AppGlobalSchema => "appGlobalSchema",
            GroupName::AppLocalSchema => "appLocalSchema",
            GroupName::AppReferences => "appReferences",
        }
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupOutcome {
    pub is_valid: bool,
    pub error: Option<ValidationError>,
}

impl GroupOutcome {
    pub fn valid() -> Self {
        GroupOutcome {
            is_valid: true,
            error: None,
        }
    }

    pub fn invalid(error: ValidationError) -> Self {
        GroupOutcome {
            is_valid: false,
            error: Some(error),
        }
    }

    /// Invalid with a `Conditional` error naming `fields`
    pub fn conditional(group: GroupName, fields: Vec<Field>, limit: Option<f64>) -> Self {
        Self::invalid(ValidationError::Conditional {
            group,
            fields,
            limit,
        })
    }
}

pub type GroupPredicate = fn(&Snapshot, Option<Preset>) -> GroupOutcome;

/// A named cross-field rule over a fixed set of participating fields.
///
/// The predicate must be pure: same snapshot and preset, same outcome.
#[derive(Clone, Copy)]
pub struct ConditionalGroup {
    pub name: GroupName,
    pub fields: &'static [Field],
    pub predicate: GroupPredicate,
}

impl fmt::Debug for ConditionalGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalGroup")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl ConditionalGroup {
    pub fn evaluate(&self, snapshot: &Snapshot, preset: Option<Preset>) -> GroupOutcome {
        (self.predicate)(snapshot, preset)
    }

    pub fn involves(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }
}

/// Group outcome as seen by the UI
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupState {
    pub name: GroupName,
    pub fields: Vec<Field>,
    pub is_valid: bool,
    /// Present only when the error should be shown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldValue, TxnType};

    fn sum_at_most_ten(snapshot: &Snapshot, _preset: Option<Preset>) -> GroupOutcome {
        let total = snapshot.number(Field::ApgsNui).unwrap_or(0.0)
            + snapshot.number(Field::ApgsNbs).unwrap_or(0.0);
        if total <= 10.0 {
            GroupOutcome::valid()
        } else {
            GroupOutcome::conditional(
                GroupName::AppGlobalSchema,
                vec![Field::ApgsNui, Field::ApgsNbs],
                Some(10.0),
            )
        }
    }

    #[test]
    fn test_evaluate_is_pure() {
        let group = ConditionalGroup {
            name: GroupName::AppGlobalSchema,
            fields: &[Field::ApgsNui, Field::ApgsNbs],
            predicate: sum_at_most_ten,
        };
        let mut snapshot = Snapshot::new(TxnType::Appl);
        snapshot.put(Field::ApgsNui, Some(FieldValue::Number(6.0)));
        snapshot.put(Field::ApgsNbs, Some(FieldValue::Number(6.0)));

        let first = group.evaluate(&snapshot, None);
        assert!(!first.is_valid);
        assert_eq!(first, group.evaluate(&snapshot, None));
        assert!(group.involves(Field::ApgsNbs));
        assert!(!group.involves(Field::Apep));
    }
}
