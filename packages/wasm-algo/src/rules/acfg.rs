//! Asset configuration fields
//!
//! An empty `caid` means the transaction creates a new asset. Each of the
//! four role addresses (manager, freeze, clawback, reserve) has a "use
//! sender address" toggle; while it is on the address mirrors `snd` and the
//! text input is hidden.

use crate::constants::{
    MAX_ASSET_DECIMALS, MAX_ASSET_NAME_BYTES, MAX_ASSET_TOTAL, MAX_ASSET_URL_BYTES,
    MAX_UNIT_NAME_BYTES,
};
use crate::constraint::{Derivation, FieldSpec, Format};
use crate::group::{ConditionalGroup, GroupName, GroupOutcome};
use crate::preset::Preset;
use crate::snapshot::Snapshot;
use crate::types::Field;

/// (address field, "use sender address" toggle)
pub(crate) const ROLES: [(Field, Field); 4] = [
    (Field::AparM, Field::AparMUseSnd),
    (Field::AparF, Field::AparFUseSnd),
    (Field::AparC, Field::AparCUseSnd),
    (Field::AparR, Field::AparRUseSnd),
];

const ROLE_FIELDS: &[Field] = &[
    Field::AparM,
    Field::AparMUseSnd,
    Field::AparF,
    Field::AparFUseSnd,
    Field::AparC,
    Field::AparCUseSnd,
    Field::AparR,
    Field::AparRUseSnd,
];

fn creating(s: &Snapshot) -> bool {
    s.is_empty(Field::Caid)
}

pub(super) fn specs() -> Vec<FieldSpec> {
    let mut specs = vec![
        FieldSpec::number(Field::Caid).min(1.0).format(Format::Integer),
        FieldSpec::text(Field::AparUn).max_length(MAX_UNIT_NAME_BYTES),
        FieldSpec::text(Field::AparAn).max_length(MAX_ASSET_NAME_BYTES),
        FieldSpec::number(Field::AparT)
            .required_when(creating)
            .min(0.0)
            .max(MAX_ASSET_TOTAL)
            .format(Format::Integer)
            .depends_on(&[Field::Caid]),
        FieldSpec::number(Field::AparDc)
            .required_when(creating)
            .min(0.0)
            .max(MAX_ASSET_DECIMALS)
            .format(Format::Integer)
            .depends_on(&[Field::Caid]),
        FieldSpec::toggle(Field::AparDf, false),
        FieldSpec::text(Field::AparAu)
            .max_length(MAX_ASSET_URL_BYTES)
            .format(Format::Url),
        FieldSpec::text(Field::AparAm).format(Format::MetadataHash),
    ];

    specs.extend([
        role(Field::AparM, Field::AparMUseSnd, |s| s.flag(Field::AparMUseSnd)),
        role(Field::AparF, Field::AparFUseSnd, |s| s.flag(Field::AparFUseSnd)),
        role(Field::AparC, Field::AparCUseSnd, |s| s.flag(Field::AparCUseSnd)),
        role(Field::AparR, Field::AparRUseSnd, |s| s.flag(Field::AparRUseSnd)),
    ]);
    specs.extend(ROLES.iter().map(|(_, toggle)| FieldSpec::toggle(*toggle, false)));
    specs
}

fn role(address: Field, toggle: Field, uses_sender: fn(&Snapshot) -> bool) -> FieldSpec {
    FieldSpec::address(address)
        .required()
        .hidden_when(uses_sender)
        .depends_on(&[toggle])
}

pub(super) fn derivations() -> Vec<Derivation> {
    ROLES
        .iter()
        .map(|(address, toggle)| Derivation {
            target: *address,
            source: Field::Snd,
            when: *toggle,
        })
        .collect()
}

pub(super) fn groups() -> Vec<ConditionalGroup> {
    vec![ConditionalGroup {
        name: GroupName::AssetRoles,
        fields: ROLE_FIELDS,
        predicate: asset_roles,
    }]
}

/// Every role not taken from the sender needs its own address
fn asset_roles(s: &Snapshot, preset: Option<Preset>) -> GroupOutcome {
    if preset == Some(Preset::AssetDestroy) {
        return GroupOutcome::valid();
    }
    let missing: Vec<Field> = ROLES
        .iter()
        .filter(|(address, toggle)| !s.flag(*toggle) && s.is_empty(*address))
        .map(|(address, _)| *address)
        .collect();
    if missing.is_empty() {
        GroupOutcome::valid()
    } else {
        GroupOutcome::conditional(GroupName::AssetRoles, missing, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldValue, TxnType};
    use crate::validation::ValidationError;

    #[test]
    fn test_asset_roles_lists_missing() {
        let mut s = Snapshot::new(TxnType::Acfg);
        s.put(Field::AparMUseSnd, Some(FieldValue::Toggle(true)));
        s.put(Field::AparFUseSnd, Some(FieldValue::Toggle(true)));
        s.put(Field::AparC, Some(FieldValue::text("SOMEADDRESS")));

        let outcome = asset_roles(&s, None);
        assert!(!outcome.is_valid);
        match outcome.error {
            Some(ValidationError::Conditional { fields, .. }) => {
                assert_eq!(fields, vec![Field::AparR]);
            }
            other => panic!("Expected Conditional, got {:?}", other),
        }

        assert!(asset_roles(&s, Some(Preset::AssetDestroy)).is_valid);
    }

    #[test]
    fn test_role_hidden_while_using_sender() {
        let spec = role(Field::AparM, Field::AparMUseSnd, |s| s.flag(Field::AparMUseSnd));
        let mut s = Snapshot::new(TxnType::Acfg);
        s.put(Field::AparMUseSnd, Some(FieldValue::Toggle(true)));
        assert!(spec.is_hidden(&s));
        assert!(!spec.is_required(&s, false));

        s.put(Field::AparMUseSnd, Some(FieldValue::Toggle(false)));
        assert!(!spec.is_hidden(&s));
        assert!(spec.is_required(&s, false));
    }
}
