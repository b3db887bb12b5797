//! Key registration fields
//!
//! The six participation fields go online together: once any of them is
//! filled all of them are required, and the nonparticipation toggle is
//! locked. While the toggle is on the participation fields are locked
//! instead.

use crate::constants::{SELECTION_KEY_BYTES, STATE_PROOF_KEY_BYTES, VOTE_KEY_BYTES};
use crate::constraint::{FieldSpec, Format};
use crate::group::{ConditionalGroup, GroupName, GroupOutcome};
use crate::preset::Preset;
use crate::snapshot::Snapshot;
use crate::types::Field;

pub(crate) const ONLINE: [Field; 6] = [
    Field::Votekey,
    Field::Selkey,
    Field::Sprfkey,
    Field::Votefst,
    Field::Votelst,
    Field::Votekd,
];

const NONPART_FIELDS: &[Field] = &[
    Field::Nonpart,
    Field::Votekey,
    Field::Selkey,
    Field::Sprfkey,
    Field::Votefst,
    Field::Votelst,
    Field::Votekd,
];

fn any_online(s: &Snapshot) -> bool {
    ONLINE.iter().any(|f| s.is_filled(*f))
}

fn nonpart_on(s: &Snapshot) -> bool {
    s.flag(Field::Nonpart)
}

fn others(field: Field) -> Vec<Field> {
    ONLINE.iter().copied().filter(|f| *f != field).collect()
}

fn participation(spec: FieldSpec) -> FieldSpec {
    let mut peers = others(spec.field);
    peers.push(Field::Nonpart);
    spec.required_when(any_online)
        .disabled_when(nonpart_on)
        .depends_on(&peers)
}

pub(super) fn specs() -> Vec<FieldSpec> {
    vec![
        participation(FieldSpec::text(Field::Votekey).format(Format::Base64 {
            bytes: Some(VOTE_KEY_BYTES),
        })),
        participation(FieldSpec::text(Field::Selkey).format(Format::Base64 {
            bytes: Some(SELECTION_KEY_BYTES),
        })),
        participation(FieldSpec::text(Field::Sprfkey).format(Format::Base64 {
            bytes: Some(STATE_PROOF_KEY_BYTES),
        })),
        participation(FieldSpec::number(Field::Votefst).min(1.0).format(Format::Integer)),
        participation(
            FieldSpec::number(Field::Votelst)
                .min_when(|s| s.number(Field::Votefst))
                .format(Format::Integer),
        ),
        participation(FieldSpec::number(Field::Votekd).min(1.0).format(Format::Integer)),
        FieldSpec::toggle(Field::Nonpart, false)
            .disabled_when(any_online)
            .depends_on(&ONLINE),
    ]
}

pub(super) fn groups() -> Vec<ConditionalGroup> {
    vec![
        ConditionalGroup {
            name: GroupName::KeyregOnline,
            fields: &ONLINE,
            predicate: online,
        },
        ConditionalGroup {
            name: GroupName::KeyregNonparticipation,
            fields: NONPART_FIELDS,
            predicate: nonparticipation,
        },
    ]
}

/// All participation fields, or none of them
fn online(s: &Snapshot, preset: Option<Preset>) -> GroupOutcome {
    if !any_online(s) && preset != Some(Preset::RegOnline) {
        return GroupOutcome::valid();
    }
    let missing: Vec<Field> = ONLINE.iter().copied().filter(|f| s.is_empty(*f)).collect();
    if missing.is_empty() {
        GroupOutcome::valid()
    } else {
        GroupOutcome::conditional(GroupName::KeyregOnline, missing, None)
    }
}

fn nonparticipation(s: &Snapshot, _preset: Option<Preset>) -> GroupOutcome {
    if s.flag(Field::Nonpart) && any_online(s) {
        let filled = ONLINE.iter().copied().filter(|f| s.is_filled(*f)).collect();
        GroupOutcome::conditional(GroupName::KeyregNonparticipation, filled, None)
    } else {
        GroupOutcome::valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldValue, TxnType};
    use crate::validation::ValidationError;
    use rstest::rstest;

    #[rstest]
    #[case(Field::Votekey, FieldValue::text("a2V5"))]
    #[case(Field::Selkey, FieldValue::text("a2V5"))]
    #[case(Field::Sprfkey, FieldValue::text("a2V5"))]
    #[case(Field::Votefst, FieldValue::Number(1.0))]
    #[case(Field::Votelst, FieldValue::Number(2.0))]
    #[case(Field::Votekd, FieldValue::Number(1.0))]
    fn test_any_participation_field_engages_all(#[case] field: Field, #[case] value: FieldValue) {
        let mut s = Snapshot::new(TxnType::Keyreg);
        s.put(field, Some(value));

        let specs = specs();
        for spec in specs.iter().filter(|spec| ONLINE.contains(&spec.field)) {
            assert!(spec.is_required(&s, false), "{} should be required", spec.field);
        }
        let nonpart = specs.iter().find(|spec| spec.field == Field::Nonpart).unwrap();
        assert!(nonpart.is_disabled(&s));

        let outcome = online(&s, None);
        match outcome.error {
            Some(ValidationError::Conditional { fields, .. }) => {
                assert_eq!(fields.len(), 5);
                assert!(!fields.contains(&field));
            }
            other => panic!("Expected Conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_all_empty_keeps_nonpart_available() {
        let s = Snapshot::new(TxnType::Keyreg);
        let specs = specs();
        assert!(specs.iter().all(|spec| !spec.is_required(&s, false)));
        let nonpart = specs.iter().find(|spec| spec.field == Field::Nonpart).unwrap();
        assert!(!nonpart.is_disabled(&s));
        assert!(online(&s, None).is_valid);
    }

    #[test]
    fn test_nonpart_locks_participation_fields() {
        let mut s = Snapshot::new(TxnType::Keyreg);
        s.put(Field::Nonpart, Some(FieldValue::Toggle(true)));
        let specs = specs();
        for spec in specs.iter().filter(|spec| ONLINE.contains(&spec.field)) {
            assert!(spec.is_disabled(&s), "{} should be disabled", spec.field);
        }
        let nonpart = specs.iter().find(|spec| spec.field == Field::Nonpart).unwrap();
        assert!(!nonpart.is_disabled(&s));
    }

    #[test]
    fn test_reg_online_preset_engages_group() {
        let s = Snapshot::new(TxnType::Keyreg);
        let outcome = online(&s, Some(Preset::RegOnline));
        assert!(!outcome.is_valid);
    }

    #[test]
    fn test_nonpart_conflicts_with_keys() {
        let mut s = Snapshot::new(TxnType::Keyreg);
        s.put(Field::Nonpart, Some(FieldValue::Toggle(true)));
        assert!(nonparticipation(&s, None).is_valid);

        s.put(Field::Votekd, Some(FieldValue::Number(10.0)));
        assert!(!nonparticipation(&s, None).is_valid);
    }
}
