//! Presets: canned transaction scenarios selected through the URL
//!
//! A preset belongs to exactly one transaction type. Resolving it yields the
//! values to prefill, the fields to force required and the fields to lock.
//! Unknown or incompatible identifiers resolve to nothing; they are never
//! an error.

use crate::constants::ON_COMPLETE_NOOP;
use crate::rules::{ONLINE, ROLES};
use crate::types::{Field, FieldValue, TxnType};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Preset {
    AssetCreate,
    AssetReconfig,
    AssetDestroy,
    AssetOptIn,
    AssetOptOut,
    AssetSend,
    AssetClawback,
    AssetFreeze,
    AssetUnfreeze,
    CloseAccount,
    RekeyAccount,
    RegOnline,
    RegOffline,
    RegNonparticipation,
    AppCreate,
    AppCall,
    AppOptIn,
    AppCloseOut,
    AppClear,
    AppUpdate,
    AppDelete,
}

impl Preset {
    pub const ALL: [Preset; 21] = [
        Preset::AssetCreate,
        Preset::AssetReconfig,
        Preset::AssetDestroy,
        Preset::AssetOptIn,
        Preset::AssetOptOut,
        Preset::AssetSend,
        Preset::AssetClawback,
        Preset::AssetFreeze,
        Preset::AssetUnfreeze,
        Preset::CloseAccount,
        Preset::RekeyAccount,
        Preset::RegOnline,
        Preset::RegOffline,
        Preset::RegNonparticipation,
        Preset::AppCreate,
        Preset::AppCall,
        Preset::AppOptIn,
        Preset::AppCloseOut,
        Preset::AppClear,
        Preset::AppUpdate,
        Preset::AppDelete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Preset::AssetCreate => "AssetCreate",
            Preset::AssetReconfig => "AssetReconfig",
            Preset::AssetDestroy => "AssetDestroy",
            Preset::AssetOptIn => "AssetOptIn",
            Preset::AssetOptOut => "AssetOptOut",
            Preset::AssetSend => "AssetSend",
            Preset::AssetClawback => "AssetClawback",
            Preset::AssetFreeze => "AssetFreeze",
            Preset::AssetUnfreeze => "AssetUnfreeze",
            Preset::CloseAccount => "CloseAccount",
            Preset::RekeyAccount => "RekeyAccount",
            Preset::RegOnline => "RegOnline",
            Preset::RegOffline => "RegOffline",
            Preset::RegNonparticipation => "RegNonparticipation",
            Preset::AppCreate => "AppCreate",
            Preset::AppCall => "AppCall",
            Preset::AppOptIn => "AppOptIn",
            Preset::AppCloseOut => "AppCloseOut",
            Preset::AppClear => "AppClear",
            Preset::AppUpdate => "AppUpdate",
            Preset::AppDelete => "AppDelete",
        }
    }

    /// Parse an identifier, ignoring case, `-`, `_` and spaces
    pub fn parse(id: &str) -> Option<Preset> {
        let wanted = normalize(id);
        Preset::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(&wanted))
    }

    pub fn txn_type(self) -> TxnType {
        match self {
            Preset::AssetCreate | Preset::AssetReconfig | Preset::AssetDestroy => TxnType::Acfg,
            Preset::AssetOptIn | Preset::AssetOptOut | Preset::AssetSend | Preset::AssetClawback => {
                TxnType::Axfer
            }
            Preset::AssetFreeze | Preset::AssetUnfreeze => TxnType::Afrz,
            Preset::CloseAccount | Preset::RekeyAccount => TxnType::Pay,
            Preset::RegOnline | Preset::RegOffline | Preset::RegNonparticipation => {
                TxnType::Keyreg
            }
            Preset::AppCreate
            | Preset::AppCall
            | Preset::AppOptIn
            | Preset::AppCloseOut
            | Preset::AppClear
            | Preset::AppUpdate
            | Preset::AppDelete => TxnType::Appl,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(id: &str) -> String {
    id.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .collect()
}

/// What applying a preset does to the form.
///
/// A `None` prefill clears the field.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPreset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,
    pub prefill: BTreeMap<Field, Option<FieldValue>>,
    pub force_required: BTreeSet<Field>,
    pub disabled: BTreeSet<Field>,
}

impl ResolvedPreset {
    fn new(preset: Preset) -> Self {
        ResolvedPreset {
            preset: Some(preset),
            ..Default::default()
        }
    }

    fn set(mut self, field: Field, value: FieldValue) -> Self {
        self.prefill.insert(field, Some(value));
        self
    }

    fn clear(mut self, fields: &[Field]) -> Self {
        for field in fields {
            self.prefill.insert(*field, None);
        }
        self
    }

    fn force(mut self, fields: &[Field]) -> Self {
        self.force_required.extend(fields.iter().copied());
        self
    }

    fn lock(mut self, fields: &[Field]) -> Self {
        self.disabled.extend(fields.iter().copied());
        self
    }

    pub fn is_forced(&self, field: Field) -> bool {
        self.force_required.contains(&field)
    }

    pub fn is_locked(&self, field: Field) -> bool {
        self.disabled.contains(&field)
    }
}

const ASSET_PARAMS: &[Field] = &[
    Field::AparUn,
    Field::AparAn,
    Field::AparT,
    Field::AparDc,
    Field::AparDf,
    Field::AparAu,
    Field::AparAm,
];

/// Resolve `preset_id` for a form of `txn_type`.
///
/// Returns `None` when the id is absent, unknown, or belongs to another
/// transaction type.
pub fn resolve(preset_id: Option<&str>, txn_type: TxnType) -> Option<ResolvedPreset> {
    let id = preset_id.map(str::trim).filter(|id| !id.is_empty())?;
    let Some(preset) = Preset::parse(id) else {
        log::warn!("Ignoring unknown preset '{}'", id);
        return None;
    };
    if preset.txn_type() != txn_type {
        log::debug!(
            "Ignoring preset {} for {} form, it applies to {}",
            preset,
            txn_type,
            preset.txn_type()
        );
        return None;
    }
    Some(mapping(preset))
}

fn mapping(preset: Preset) -> ResolvedPreset {
    let r = ResolvedPreset::new(preset);
    let role_addresses: Vec<Field> = ROLES.iter().map(|(address, _)| *address).collect();
    let role_toggles: Vec<Field> = ROLES.iter().map(|(_, toggle)| *toggle).collect();

    match preset {
        Preset::AssetCreate => role_toggles
            .iter()
            .fold(r, |r, toggle| r.set(*toggle, FieldValue::Toggle(true)))
            .clear(&[Field::Caid])
            .force(&[Field::AparT, Field::AparDc])
            .lock(&[Field::Caid]),
        Preset::AssetReconfig => r.force(&[Field::Caid]).lock(ASSET_PARAMS),
        Preset::AssetDestroy => role_toggles
            .iter()
            .fold(r, |r, toggle| r.set(*toggle, FieldValue::Toggle(false)))
            .clear(&role_addresses)
            .clear(ASSET_PARAMS)
            .force(&[Field::Caid])
            .lock(ASSET_PARAMS)
            .lock(&role_addresses)
            .lock(&role_toggles),
        Preset::AssetOptIn => r
            .set(Field::Amt, FieldValue::Number(0.0))
            .clear(&[Field::Asnd, Field::Aclose])
            .lock(&[Field::Amt, Field::Asnd, Field::Aclose]),
        Preset::AssetOptOut => r
            .set(Field::Amt, FieldValue::Number(0.0))
            .clear(&[Field::Asnd])
            .force(&[Field::Aclose])
            .lock(&[Field::Amt, Field::Asnd]),
        Preset::AssetSend => r
            .clear(&[Field::Asnd, Field::Aclose])
            .lock(&[Field::Asnd, Field::Aclose]),
        Preset::AssetClawback => r
            .clear(&[Field::Aclose])
            .force(&[Field::Asnd])
            .lock(&[Field::Aclose]),
        Preset::AssetFreeze => r
            .set(Field::Afrz, FieldValue::Toggle(true))
            .lock(&[Field::Afrz]),
        Preset::AssetUnfreeze => r
            .set(Field::Afrz, FieldValue::Toggle(false))
            .lock(&[Field::Afrz]),
        Preset::CloseAccount => r.force(&[Field::Close]),
        Preset::RekeyAccount => r
            .set(Field::Amt, FieldValue::Number(0.0))
            .force(&[Field::Rekey])
            .lock(&[Field::Amt]),
        Preset::RegOnline => r
            .set(Field::Nonpart, FieldValue::Toggle(false))
            .force(&ONLINE)
            .lock(&[Field::Nonpart]),
        Preset::RegOffline => r
            .set(Field::Nonpart, FieldValue::Toggle(false))
            .clear(&ONLINE)
            .lock(&ONLINE)
            .lock(&[Field::Nonpart]),
        Preset::RegNonparticipation => r
            .set(Field::Nonpart, FieldValue::Toggle(true))
            .clear(&ONLINE)
            .lock(&ONLINE)
            .lock(&[Field::Nonpart]),
        Preset::AppCreate => r
            .set(Field::Apan, FieldValue::Number(ON_COMPLETE_NOOP))
            .clear(&[Field::Apid])
            .force(&[Field::Apap, Field::Apsu])
            .lock(&[Field::Apid]),
        Preset::AppCall => app_call(r, 0.0),
        Preset::AppOptIn => app_call(r, 1.0),
        Preset::AppCloseOut => app_call(r, 2.0),
        Preset::AppClear => app_call(r, 3.0),
        Preset::AppUpdate => app_call(r, 4.0).force(&[Field::Apap, Field::Apsu]),
        Preset::AppDelete => app_call(r, 5.0),
    }
}

/// Call into an existing application with a fixed on-completion code
fn app_call(r: ResolvedPreset, on_complete: f64) -> ResolvedPreset {
    r.set(Field::Apan, FieldValue::Number(on_complete))
        .force(&[Field::Apid])
        .lock(&[Field::Apan])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;
    use rstest::rstest;

    #[rstest]
    #[case("AssetCreate")]
    #[case("assetcreate")]
    #[case("asset_create")]
    #[case("asset-create")]
    #[case(" Asset Create ")]
    fn test_parse_normalizes(#[case] id: &str) {
        assert_eq!(Preset::parse(id), Some(Preset::AssetCreate));
    }

    #[test]
    fn test_unknown_and_incompatible() {
        assert_eq!(resolve(None, TxnType::Pay), None);
        assert_eq!(resolve(Some(""), TxnType::Pay), None);
        assert_eq!(resolve(Some("MoonLanding"), TxnType::Pay), None);
        assert_eq!(resolve(Some("AssetCreate"), TxnType::Pay), None);
        assert!(resolve(Some("AssetCreate"), TxnType::Acfg).is_some());
    }

    #[test]
    fn test_every_preset_references_its_own_form() {
        for preset in Preset::ALL {
            let rules = RuleSet::for_txn_type(preset.txn_type()).unwrap();
            let resolved = resolve(Some(preset.as_str()), preset.txn_type()).unwrap();
            let fields = resolved
                .prefill
                .keys()
                .chain(&resolved.force_required)
                .chain(&resolved.disabled);
            for field in fields {
                assert!(rules.contains(*field), "{} uses {}", preset, field);
            }
        }
    }

    #[test]
    fn test_asset_create_uses_sender_for_roles() {
        let resolved = resolve(Some("AssetCreate"), TxnType::Acfg).unwrap();
        for (_, toggle) in ROLES {
            assert_eq!(
                resolved.prefill.get(&toggle),
                Some(&Some(FieldValue::Toggle(true)))
            );
        }
        assert!(resolved.is_forced(Field::AparT));
        assert!(resolved.is_locked(Field::Caid));
    }

    #[test]
    fn test_rekey_account() {
        let resolved = resolve(Some("rekey-account"), TxnType::Pay).unwrap();
        assert!(resolved.is_forced(Field::Rekey));
        assert!(resolved.is_locked(Field::Amt));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        for preset in Preset::ALL {
            let first = resolve(Some(preset.as_str()), preset.txn_type());
            assert_eq!(first, resolve(Some(preset.as_str()), preset.txn_type()));
        }
    }
}
