//! Fields shared by every transaction type

use crate::constants::{ALGO_DECIMALS, MAX_FEE, MAX_NOTE_BYTES, MAX_TXN_LIFE, MIN_FEE};
use crate::constraint::{FieldSpec, Format};
use crate::group::{ConditionalGroup, GroupName, GroupOutcome};
use crate::preset::Preset;
use crate::snapshot::Snapshot;
use crate::types::Field;

pub(super) fn specs() -> Vec<FieldSpec> {
    vec![
        FieldSpec::address(Field::Snd).required(),
        FieldSpec::toggle(Field::UseSugFee, true),
        FieldSpec::number(Field::Fee)
            .required()
            .min(MIN_FEE)
            .max(MAX_FEE)
            .format(Format::Decimals(ALGO_DECIMALS))
            .hidden_when(|s| s.flag(Field::UseSugFee))
            .depends_on(&[Field::UseSugFee]),
        FieldSpec::toggle(Field::UseSugRounds, true),
        FieldSpec::number(Field::Fv)
            .required()
            .min(1.0)
            .format(Format::Integer)
            .hidden_when(suggested_rounds)
            .depends_on(&[Field::UseSugRounds]),
        FieldSpec::number(Field::Lv)
            .required()
            .min_when(|s| s.number(Field::Fv))
            .max_when(|s| s.number(Field::Fv).map(|fv| fv + MAX_TXN_LIFE))
            .format(Format::Integer)
            .hidden_when(suggested_rounds)
            .depends_on(&[Field::Fv, Field::UseSugRounds]),
        FieldSpec::text(Field::Note).max_length(MAX_NOTE_BYTES),
        FieldSpec::address(Field::Rekey),
    ]
}

fn suggested_rounds(s: &Snapshot) -> bool {
    s.flag(Field::UseSugRounds)
}

pub(super) fn groups() -> Vec<ConditionalGroup> {
    vec![ConditionalGroup {
        name: GroupName::ValidityWindow,
        fields: &[Field::Fv, Field::Lv, Field::UseSugRounds],
        predicate: validity_window,
    }]
}

fn validity_window(s: &Snapshot, _preset: Option<Preset>) -> GroupOutcome {
    if s.flag(Field::UseSugRounds) {
        return GroupOutcome::valid();
    }
    match (s.number(Field::Fv), s.number(Field::Lv)) {
        (Some(fv), Some(lv)) if lv < fv || lv - fv > MAX_TXN_LIFE => GroupOutcome::conditional(
            GroupName::ValidityWindow,
            vec![Field::Fv, Field::Lv],
            Some(MAX_TXN_LIFE),
        ),
        _ => GroupOutcome::valid(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldValue, TxnType};

    fn manual_rounds(fv: f64, lv: f64) -> Snapshot {
        let mut s = Snapshot::new(TxnType::Pay);
        s.put(Field::UseSugRounds, Some(FieldValue::Toggle(false)));
        s.put(Field::Fv, Some(FieldValue::Number(fv)));
        s.put(Field::Lv, Some(FieldValue::Number(lv)));
        s
    }

    #[test]
    fn test_validity_window() {
        assert!(validity_window(&manual_rounds(100.0, 1100.0), None).is_valid);
        assert!(!validity_window(&manual_rounds(100.0, 1101.0), None).is_valid);
        assert!(!validity_window(&manual_rounds(100.0, 99.0), None).is_valid);
    }

    #[test]
    fn test_suggested_rounds_skip_window() {
        let mut s = manual_rounds(100.0, 5000.0);
        s.put(Field::UseSugRounds, Some(FieldValue::Toggle(true)));
        assert!(validity_window(&s, None).is_valid);
    }
}
