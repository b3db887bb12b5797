//! Transaction composer form
//!
//! [`TxnForm`] ties the store, the rule set of the active transaction type,
//! the node config and the active preset together. Validation is computed
//! when state is read, from the committed snapshot only, so it never
//! lags behind a write.

use crate::config::NodeConfig;
use crate::constraint::Constraints;
use crate::error::WasmAlgoError;
use crate::group::{ConditionalGroup, GroupName, GroupState};
use crate::preset::{resolve, Preset, ResolvedPreset};
use crate::rules::RuleSet;
use crate::snapshot::Snapshot;
use crate::store::{ChangeSet, FormStore, Listener, SubscriptionId};
use crate::types::{Field, FieldKind, FieldValue, TxnType};
use crate::validation::{ErrorDescriptor, ValidationError};
use serde::Serialize;
use std::collections::BTreeSet;

/// One field as the UI renders it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldState {
    pub field: Field,
    pub kind: FieldKind,
    pub value: Option<FieldValue>,
    pub touched: bool,
    pub constraints: Constraints,
    /// Validity regardless of whether the error is displayed
    pub is_valid: bool,
    /// Present only when the error should be displayed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDescriptor>,
}

#[derive(Debug)]
pub struct TxnForm {
    store: FormStore,
    config: NodeConfig,
    preset_id: Option<String>,
    preset: Option<ResolvedPreset>,
}

impl TxnForm {
    pub fn new(txn_type: TxnType, config: NodeConfig) -> Result<Self, WasmAlgoError> {
        let rules = RuleSet::for_txn_type(txn_type)?;
        Ok(TxnForm {
            store: FormStore::new(rules),
            config,
            preset_id: None,
            preset: None,
        })
    }

    pub fn txn_type(&self) -> TxnType {
        self.store.rules().txn_type()
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleSet {
        self.store.rules()
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.store.snapshot()
    }

    pub fn preset(&self) -> Option<Preset> {
        self.preset.as_ref().and_then(|p| p.preset)
    }

    pub fn resolved_preset(&self) -> Option<&ResolvedPreset> {
        self.preset.as_ref()
    }

    pub fn data_version(&self) -> u64 {
        self.store.data_version()
    }

    /// Switch transaction type: everything resets and the stored preset id
    /// is resolved again against the new type.
    pub fn set_txn_type(&mut self, txn_type: TxnType) -> Result<ChangeSet, WasmAlgoError> {
        let rules = RuleSet::for_txn_type(txn_type)?;
        let preset = resolve(self.preset_id.as_deref(), txn_type);
        let initial = initial_snapshot(&rules, preset.as_ref());
        self.preset = preset;
        Ok(self.store.replace_rules(rules, initial))
    }

    pub fn set_value(
        &mut self,
        field: Field,
        value: Option<FieldValue>,
    ) -> Result<ChangeSet, WasmAlgoError> {
        self.set_values(vec![(field, value)])
    }

    /// Several user edits committed as one update
    pub fn set_values(
        &mut self,
        values: Vec<(Field, Option<FieldValue>)>,
    ) -> Result<ChangeSet, WasmAlgoError> {
        for (field, _) in &values {
            self.rules().require(*field)?;
            if self.is_locked(*field) && !self.released_by(*field, &values) {
                return Err(WasmAlgoError::FieldLocked(field.to_string()));
            }
        }
        self.store.batch(|b| {
            for (field, value) in values {
                b.set(field, value);
            }
            Ok(())
        })
    }

    pub fn set_touched(&mut self, field: Field, touched: bool) -> Result<ChangeSet, WasmAlgoError> {
        self.store.set_touched(field, touched)
    }

    /// Back to initial values with the active preset's prefill applied
    pub fn reset_all(&mut self) -> ChangeSet {
        let initial = initial_snapshot(self.rules(), self.preset.as_ref());
        self.store.reset_all(initial)
    }

    pub fn show_all_errors(&mut self) -> ChangeSet {
        self.store.show_all_errors()
    }

    /// Apply the preset named by `preset_id`, replacing the active one.
    ///
    /// Prefilled values overwrite whatever the fields held and never mark
    /// them touched. Applying the same preset again changes nothing.
    pub fn apply_preset(&mut self, preset_id: Option<&str>) -> Result<ChangeSet, WasmAlgoError> {
        let resolved = resolve(preset_id, self.txn_type());
        let previous = self.preset.as_ref();
        let rules_changed = previous != resolved.as_ref();

        let change = self.store.batch(|b| {
            if let Some(p) = &resolved {
                for (field, value) in &p.prefill {
                    b.set(*field, value.clone());
                }
            }
            if rules_changed {
                for p in previous.into_iter().chain(resolved.as_ref()) {
                    for field in p.force_required.iter().chain(&p.disabled) {
                        b.invalidate(*field);
                    }
                }
            }
            Ok(())
        })?;

        if let Some(p) = &resolved {
            log::debug!("Applied preset {:?} to {} form", p.preset, self.txn_type());
        }
        self.preset_id = preset_id.map(str::to_string);
        self.preset = resolved;
        Ok(change)
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.store.is_touched(field)
    }

    fn is_forced(&self, field: Field) -> bool {
        self.preset.as_ref().is_some_and(|p| p.is_forced(field))
    }

    /// Locked by the preset, by a derived rule, or because its value is
    /// currently derived from another field
    pub fn is_locked(&self, field: Field) -> bool {
        let snapshot = self.snapshot();
        self.preset.as_ref().is_some_and(|p| p.is_locked(field))
            || self
                .rules()
                .spec(field)
                .is_some_and(|spec| spec.is_disabled(snapshot))
            || self.rules().is_derived(field, snapshot)
    }

    /// A derived field whose only lock is its toggle, switched off by the
    /// same edit
    fn released_by(&self, field: Field, values: &[(Field, Option<FieldValue>)]) -> bool {
        let snapshot = self.snapshot();
        let other_lock = self.preset.as_ref().is_some_and(|p| p.is_locked(field))
            || self
                .rules()
                .spec(field)
                .is_some_and(|spec| spec.is_disabled(snapshot));
        !other_lock
            && self
                .rules()
                .derivations()
                .iter()
                .filter(|d| d.target == field && snapshot.flag(d.when))
                .all(|d| {
                    values.iter().any(|(f, v)| {
                        *f == d.when && !matches!(v, Some(FieldValue::Toggle(true)))
                    })
                })
    }

    /// Current validation outcome of `field`, displayed or not.
    ///
    /// Locked fields are not validated.
    pub fn validate(&self, field: Field) -> Result<Option<ValidationError>, WasmAlgoError> {
        let spec = self.rules().require(field)?;
        if self.is_locked(field) {
            return Ok(None);
        }
        Ok(spec.check(self.snapshot(), self.is_forced(field)))
    }

    pub fn field_state(&self, field: Field) -> Result<FieldState, WasmAlgoError> {
        let spec = self.rules().require(field)?;
        let snapshot = self.snapshot();
        let forced = self.is_forced(field);
        let locked = self.is_locked(field);
        let touched = self.is_touched(field);

        let error = self.validate(field)?;
        let displayed = touched || self.store.show_all();
        Ok(FieldState {
            field,
            kind: spec.kind,
            value: snapshot.get(field).cloned(),
            touched,
            constraints: spec.constraints(snapshot, forced, locked),
            is_valid: error.is_none(),
            error: error.filter(|_| displayed).map(|e| e.descriptor()),
        })
    }

    /// Every field in form order
    pub fn field_states(&self) -> Vec<FieldState> {
        self.rules()
            .fields()
            .filter_map(|field| self.field_state(field).ok())
            .collect()
    }

    pub fn group_state(&self, name: GroupName) -> Option<GroupState> {
        self.rules().group(name).map(|group| self.evaluate_group(group))
    }

    pub fn group_states(&self) -> Vec<GroupState> {
        self.rules()
            .groups()
            .iter()
            .map(|group| self.evaluate_group(group))
            .collect()
    }

    /// States of every group `field` participates in
    pub fn groups_for(&self, field: Field) -> Vec<GroupState> {
        self.rules()
            .groups_for(field)
            .map(|group| self.evaluate_group(group))
            .collect()
    }

    fn evaluate_group(&self, group: &ConditionalGroup) -> GroupState {
        let outcome = group.evaluate(self.snapshot(), self.preset());
        let displayed = self.store.show_all() || self.store.any_touched(group.fields);
        GroupState {
            name: group.name,
            fields: group.fields.to_vec(),
            is_valid: outcome.is_valid,
            error: outcome
                .error
                .filter(|_| displayed)
                .map(|e| e.descriptor()),
        }
    }

    /// True when no field and no group reports an error
    pub fn can_submit(&self) -> bool {
        let fields_valid = self
            .rules()
            .fields()
            .all(|field| matches!(self.validate(field), Ok(None)));
        let groups_valid = self
            .rules()
            .groups()
            .iter()
            .all(|group| group.evaluate(self.snapshot(), self.preset()).is_valid);
        fields_valid && groups_valid
    }

    /// Fields currently failing validation, in form order
    pub fn invalid_fields(&self) -> BTreeSet<Field> {
        self.rules()
            .fields()
            .filter(|field| matches!(self.validate(*field), Ok(Some(_))))
            .collect()
    }

    /// Show the rekey banner: a rekey address is set, or the preset is
    /// about rekeying
    pub fn rekey_warning(&self) -> bool {
        self.snapshot().is_filled(Field::Rekey) || self.preset() == Some(Preset::RekeyAccount)
    }

    /// Show the close-out banner: the account or asset holding is closed
    pub fn close_warning(&self) -> bool {
        let snapshot = self.snapshot();
        snapshot.is_filled(Field::Close)
            || snapshot.is_filled(Field::Aclose)
            || matches!(
                self.preset(),
                Some(Preset::CloseAccount) | Some(Preset::AssetOptOut)
            )
    }

    pub fn coin_label(&self) -> &str {
        self.config.coin_label()
    }

    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }
}

fn initial_snapshot(rules: &RuleSet, preset: Option<&ResolvedPreset>) -> Snapshot {
    let mut snapshot = rules.initial_snapshot();
    if let Some(p) = preset {
        let base = snapshot.clone();
        for (field, value) in &p.prefill {
            snapshot.put(*field, value.clone());
        }
        let prefilled: BTreeSet<Field> = p.prefill.keys().copied().collect();
        rules.apply_derivations(&mut snapshot, &base, &prefilled);
    }
    snapshot
}
