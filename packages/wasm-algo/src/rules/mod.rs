//! Validation rule tables per transaction type
//!
//! A [`RuleSet`] is the combined table for one transaction type: the common
//! fields followed by the type's own fields, its conditional groups and its
//! derivations. Building one checks that every referenced field belongs to
//! the form and that the dependency graph is acyclic.

mod acfg;
mod afrz;
mod appl;
mod axfer;
mod common;
mod graph;
mod keyreg;
mod pay;

pub(crate) use acfg::ROLES;
pub(crate) use keyreg::ONLINE;

use crate::constraint::{Derivation, FieldSpec};
use crate::error::WasmAlgoError;
use crate::group::{ConditionalGroup, GroupName};
use crate::snapshot::Snapshot;
use crate::types::{Field, TxnType};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
pub struct RuleSet {
    txn_type: TxnType,
    specs: Vec<FieldSpec>,
    index: BTreeMap<Field, usize>,
    groups: Vec<ConditionalGroup>,
    derivations: Vec<Derivation>,
    /// field -> fields whose constraints read it
    dependents: BTreeMap<Field, BTreeSet<Field>>,
}

impl RuleSet {
    pub fn for_txn_type(txn_type: TxnType) -> Result<Self, WasmAlgoError> {
        let mut specs = common::specs();
        let mut groups = common::groups();
        let mut derivations = Vec::new();

        match txn_type {
            TxnType::Pay => specs.extend(pay::specs()),
            TxnType::Axfer => specs.extend(axfer::specs()),
            TxnType::Acfg => {
                specs.extend(acfg::specs());
                groups.extend(acfg::groups());
                derivations.extend(acfg::derivations());
            }
            TxnType::Afrz => specs.extend(afrz::specs()),
            TxnType::Appl => {
                specs.extend(appl::specs());
                groups.extend(appl::groups());
            }
            TxnType::Keyreg => {
                specs.extend(keyreg::specs());
                groups.extend(keyreg::groups());
            }
        }

        Self::build(txn_type, specs, groups, derivations)
    }

    pub(crate) fn build(
        txn_type: TxnType,
        specs: Vec<FieldSpec>,
        groups: Vec<ConditionalGroup>,
        derivations: Vec<Derivation>,
    ) -> Result<Self, WasmAlgoError> {
        let index: BTreeMap<Field, usize> = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.field, i))
            .collect();

        let not_in_form = |field: Field| WasmAlgoError::FieldNotInForm {
            field: field.to_string(),
            txn_type: txn_type.to_string(),
        };
        let referenced = specs
            .iter()
            .flat_map(|spec| spec.depends_on.iter().copied())
            .chain(derivations.iter().flat_map(|d| [d.target, d.source, d.when]))
            .chain(groups.iter().flat_map(|g| g.fields.iter().copied()));
        for field in referenced {
            if !index.contains_key(&field) {
                return Err(not_in_form(field));
            }
        }

        graph::check(&specs, &derivations)?;

        let mut dependents: BTreeMap<Field, BTreeSet<Field>> = BTreeMap::new();
        for spec in &specs {
            for source in &spec.depends_on {
                dependents.entry(*source).or_default().insert(spec.field);
            }
        }

        Ok(RuleSet {
            txn_type,
            specs,
            index,
            groups,
            derivations,
            dependents,
        })
    }

    pub fn txn_type(&self) -> TxnType {
        self.txn_type
    }

    /// Fields in form order
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.specs.iter().map(|spec| spec.field)
    }

    pub fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    pub fn spec(&self, field: Field) -> Option<&FieldSpec> {
        self.index.get(&field).map(|i| &self.specs[*i])
    }

    pub fn contains(&self, field: Field) -> bool {
        self.index.contains_key(&field)
    }

    /// Like [`RuleSet::spec`], but a missing field is an error
    pub fn require(&self, field: Field) -> Result<&FieldSpec, WasmAlgoError> {
        self.spec(field).ok_or_else(|| WasmAlgoError::FieldNotInForm {
            field: field.to_string(),
            txn_type: self.txn_type.to_string(),
        })
    }

    pub fn groups(&self) -> &[ConditionalGroup] {
        &self.groups
    }

    pub fn group(&self, name: GroupName) -> Option<&ConditionalGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn groups_for(&self, field: Field) -> impl Iterator<Item = &ConditionalGroup> + '_ {
        self.groups.iter().filter(move |g| g.involves(field))
    }

    pub fn derivations(&self) -> &[Derivation] {
        &self.derivations
    }

    /// Fields whose value is currently derived from another field
    pub fn is_derived(&self, field: Field, snapshot: &Snapshot) -> bool {
        self.derivations
            .iter()
            .any(|d| d.target == field && snapshot.flag(d.when))
    }

    /// Snapshot holding every field's initial value, derivations applied
    pub fn initial_snapshot(&self) -> Snapshot {
        let blank = Snapshot::new(self.txn_type);
        let mut snapshot = blank.clone();
        for spec in &self.specs {
            snapshot.put(spec.field, spec.initial.clone());
        }
        self.apply_derivations(&mut snapshot, &blank, &BTreeSet::new());
        snapshot
    }

    /// Bring derived fields in line with their sources.
    ///
    /// While a derivation's toggle is on the target mirrors the source. A
    /// toggle that was on in `previous` and is now off clears the target,
    /// unless the target is among `written`.
    pub fn apply_derivations(
        &self,
        snapshot: &mut Snapshot,
        previous: &Snapshot,
        written: &BTreeSet<Field>,
    ) {
        for d in &self.derivations {
            if snapshot.flag(d.when) {
                let value = snapshot.get(d.source).cloned();
                snapshot.put(d.target, value);
            } else if previous.flag(d.when) && !written.contains(&d.target) {
                snapshot.put(d.target, None);
            }
        }
    }

    /// Fields and groups whose evaluation may differ after `changed` moved
    pub fn affected_by(&self, changed: &BTreeSet<Field>) -> (BTreeSet<Field>, BTreeSet<GroupName>) {
        let mut fields = changed.clone();
        for field in changed {
            if let Some(readers) = self.dependents.get(field) {
                fields.extend(readers.iter().copied());
            }
        }
        let groups = self
            .groups
            .iter()
            .filter(|g| changed.iter().any(|f| g.involves(*f)))
            .map(|g| g.name)
            .collect();
        (fields, groups)
    }
}
