//! Form state store
//!
//! Holds the committed snapshot, the touched set and the show-all-errors
//! flag for the active rule set. Every mutation goes through a commit:
//! writes are staged on a copy, derivations are applied to the copy, and the
//! copy replaces the snapshot in one step before listeners are notified.

use crate::error::WasmAlgoError;
use crate::group::GroupName;
use crate::rules::RuleSet;
use crate::snapshot::Snapshot;
use crate::types::{Field, FieldValue};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub type SubscriptionId = u32;

pub type Listener = Box<dyn FnMut(&ChangeSet)>;

/// What one commit changed
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    /// Fields whose value differs from the previous snapshot
    pub changed: BTreeSet<Field>,
    /// Fields whose state may differ (values, constraints or display)
    pub affected_fields: BTreeSet<Field>,
    pub affected_groups: BTreeSet<GroupName>,
    pub data_version: u64,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.affected_fields.is_empty() && self.affected_groups.is_empty()
    }
}

/// Writes staged for one commit
#[derive(Debug, Default)]
pub struct Batch {
    writes: BTreeMap<Field, Option<FieldValue>>,
    touched: BTreeSet<Field>,
    invalidated: BTreeSet<Field>,
}

impl Batch {
    pub fn set(&mut self, field: Field, value: Option<FieldValue>) -> &mut Self {
        self.writes.insert(field, value);
        self
    }

    pub fn touch(&mut self, field: Field) -> &mut Self {
        self.touched.insert(field);
        self
    }

    /// Report `field` as affected even if its value does not change
    pub fn invalidate(&mut self, field: Field) -> &mut Self {
        self.invalidated.insert(field);
        self
    }
}

pub struct FormStore {
    rules: RuleSet,
    snapshot: Snapshot,
    touched: BTreeSet<Field>,
    show_all_errors: bool,
    data_version: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
}

impl fmt::Debug for FormStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormStore")
            .field("txn_type", &self.rules.txn_type())
            .field("snapshot", &self.snapshot)
            .field("touched", &self.touched)
            .field("show_all_errors", &self.show_all_errors)
            .field("data_version", &self.data_version)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl FormStore {
    pub fn new(rules: RuleSet) -> Self {
        let snapshot = rules.initial_snapshot();
        FormStore {
            rules,
            snapshot,
            touched: BTreeSet::new(),
            show_all_errors: false,
            data_version: 0,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    pub fn any_touched(&self, fields: &[Field]) -> bool {
        fields.iter().any(|f| self.touched.contains(f))
    }

    pub fn show_all(&self) -> bool {
        self.show_all_errors
    }

    pub fn data_version(&self) -> u64 {
        self.data_version
    }

    /// Stage writes with `f` and commit them as one update.
    ///
    /// If `f` fails nothing is committed.
    pub fn batch<F>(&mut self, f: F) -> Result<ChangeSet, WasmAlgoError>
    where
        F: FnOnce(&mut Batch) -> Result<(), WasmAlgoError>,
    {
        let mut batch = Batch::default();
        f(&mut batch)?;
        self.commit(batch)
    }

    pub fn set_value(
        &mut self,
        field: Field,
        value: Option<FieldValue>,
    ) -> Result<ChangeSet, WasmAlgoError> {
        self.batch(|b| {
            b.set(field, value);
            Ok(())
        })
    }

    pub fn set_touched(&mut self, field: Field, touched: bool) -> Result<ChangeSet, WasmAlgoError> {
        self.rules.require(field)?;
        let flipped = if touched {
            self.touched.insert(field)
        } else {
            self.touched.remove(&field)
        };
        if !flipped {
            return Ok(ChangeSet::default());
        }
        let affected_groups = self.rules.groups_for(field).map(|g| g.name).collect();
        Ok(self.publish(ChangeSet {
            changed: BTreeSet::new(),
            affected_fields: BTreeSet::from([field]),
            affected_groups,
            data_version: 0,
        }))
    }

    /// Replace the snapshot with `initial` and clear touched and show-all
    pub fn reset_all(&mut self, initial: Snapshot) -> ChangeSet {
        let changed = diff(&self.snapshot, &initial);
        self.snapshot = initial;
        self.touched.clear();
        self.show_all_errors = false;
        log::info!(
            "Reset {} form ({} fields changed)",
            self.rules.txn_type(),
            changed.len()
        );
        let change = self.everything(changed);
        self.publish(change)
    }

    /// Swap in a different rule set and reset to `initial`
    pub fn replace_rules(&mut self, rules: RuleSet, initial: Snapshot) -> ChangeSet {
        self.rules = rules;
        self.reset_all(initial)
    }

    pub fn show_all_errors(&mut self) -> ChangeSet {
        if self.show_all_errors {
            return ChangeSet::default();
        }
        self.show_all_errors = true;
        let change = self.everything(BTreeSet::new());
        self.publish(change)
    }

    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription = self.next_subscription.wrapping_add(1);
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn commit(&mut self, batch: Batch) -> Result<ChangeSet, WasmAlgoError> {
        let mut next = self.snapshot.clone();
        for (field, value) in &batch.writes {
            let spec = self.rules.require(*field)?;
            let value = spec.kind.coerce(*field, value.clone())?;
            next.put(*field, value);
        }
        let written: BTreeSet<Field> = batch.writes.keys().copied().collect();
        self.rules
            .apply_derivations(&mut next, &self.snapshot, &written);

        let changed = diff(&self.snapshot, &next);
        let newly_touched: BTreeSet<Field> = batch
            .touched
            .iter()
            .copied()
            .filter(|f| !self.touched.contains(f))
            .collect();
        for field in &newly_touched {
            self.rules.require(*field)?;
        }

        let mut seeds = changed.clone();
        seeds.extend(newly_touched.iter().copied());
        seeds.extend(batch.invalidated.iter().copied());
        if seeds.is_empty() {
            return Ok(ChangeSet::default());
        }

        self.snapshot = next;
        self.touched.extend(newly_touched);

        let (affected_fields, affected_groups) = self.rules.affected_by(&seeds);
        log::debug!(
            "Committed {} form: changed {:?}",
            self.rules.txn_type(),
            changed
        );
        Ok(self.publish(ChangeSet {
            changed,
            affected_fields,
            affected_groups,
            data_version: 0,
        }))
    }

    fn everything(&self, changed: BTreeSet<Field>) -> ChangeSet {
        ChangeSet {
            changed,
            affected_fields: self.rules.fields().collect(),
            affected_groups: self.rules.groups().iter().map(|g| g.name).collect(),
            data_version: 0,
        }
    }

    fn publish(&mut self, mut change: ChangeSet) -> ChangeSet {
        self.data_version += 1;
        change.data_version = self.data_version;
        for (_, listener) in self.listeners.iter_mut() {
            listener(&change);
        }
        change
    }
}

fn diff(old: &Snapshot, new: &Snapshot) -> BTreeSet<Field> {
    old.values
        .keys()
        .chain(new.values.keys())
        .copied()
        .filter(|f| old.get(*f) != new.get(*f))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TxnType;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store(txn_type: TxnType) -> FormStore {
        FormStore::new(RuleSet::for_txn_type(txn_type).unwrap())
    }

    #[test]
    fn test_batch_is_one_commit() {
        let mut store = store(TxnType::Appl);
        let seen: Rc<RefCell<Vec<ChangeSet>>> = Rc::default();
        let sink = seen.clone();
        store.subscribe(Box::new(move |change: &ChangeSet| sink.borrow_mut().push(change.clone())));

        let change = store
            .batch(|b| {
                b.set(Field::ApgsNui, Some(FieldValue::Number(60.0)));
                b.set(Field::ApgsNbs, Some(FieldValue::Number(10.0)));
                Ok(())
            })
            .unwrap();

        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(
            change.changed,
            BTreeSet::from([Field::ApgsNui, Field::ApgsNbs])
        );
        assert!(change.affected_groups.contains(&GroupName::AppGlobalSchema));
        assert_eq!(store.data_version(), 1);
    }

    #[test]
    fn test_failed_batch_commits_nothing() {
        let mut store = store(TxnType::Pay);
        let result = store.batch(|b| {
            b.set(Field::Amt, Some(FieldValue::Number(5.0)));
            b.set(Field::Amt, Some(FieldValue::text("five")));
            Ok(())
        });
        assert!(matches!(result, Err(WasmAlgoError::KindMismatch { .. })));
        assert_eq!(store.snapshot().get(Field::Amt), None);

        let result = store.batch(|b| {
            b.set(Field::Rcv, Some(FieldValue::text("X")));
            b.set(Field::Xaid, Some(FieldValue::Number(1.0)));
            Ok(())
        });
        assert!(matches!(result, Err(WasmAlgoError::FieldNotInForm { .. })));
        assert_eq!(store.snapshot().get(Field::Rcv), None);
        assert_eq!(store.data_version(), 0);
    }

    #[test]
    fn test_noop_write_does_not_notify() {
        let mut store = store(TxnType::Pay);
        let count = Rc::new(RefCell::new(0));
        let counter = count.clone();
        store.subscribe(Box::new(move |_: &ChangeSet| *counter.borrow_mut() += 1));

        store
            .set_value(Field::Note, Some(FieldValue::text("hi")))
            .unwrap();
        let change = store
            .set_value(Field::Note, Some(FieldValue::text("hi")))
            .unwrap();
        assert!(change.is_empty());
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_derivation_applied_in_same_commit() {
        let mut store = store(TxnType::Acfg);
        store
            .batch(|b| {
                b.set(Field::Snd, Some(FieldValue::text("SENDER")));
                b.set(Field::AparFUseSnd, Some(FieldValue::Toggle(true)));
                Ok(())
            })
            .unwrap();
        assert_eq!(store.snapshot().text(Field::AparF), Some("SENDER"));

        let change = store
            .set_value(Field::AparFUseSnd, Some(FieldValue::Toggle(false)))
            .unwrap();
        assert!(change.changed.contains(&Field::AparF));
        assert_eq!(store.snapshot().get(Field::AparF), None);
    }

    #[test]
    fn test_repeated_toggle_off_keeps_typed_address() {
        let mut store = store(TxnType::Acfg);
        store
            .set_value(Field::AparM, Some(FieldValue::text("MANAGER")))
            .unwrap();
        let change = store
            .set_value(Field::AparMUseSnd, Some(FieldValue::Toggle(false)))
            .unwrap();
        assert!(change.is_empty());
        assert_eq!(store.snapshot().text(Field::AparM), Some("MANAGER"));
    }

    #[test]
    fn test_toggle_off_with_address_in_one_batch() {
        let mut store = store(TxnType::Acfg);
        store
            .batch(|b| {
                b.set(Field::Snd, Some(FieldValue::text("SENDER")));
                b.set(Field::AparMUseSnd, Some(FieldValue::Toggle(true)));
                Ok(())
            })
            .unwrap();
        store
            .batch(|b| {
                b.set(Field::AparMUseSnd, Some(FieldValue::Toggle(false)));
                b.set(Field::AparM, Some(FieldValue::text("MANAGER")));
                Ok(())
            })
            .unwrap();
        assert_eq!(store.snapshot().text(Field::AparM), Some("MANAGER"));

        store
            .set_value(Field::AparMUseSnd, Some(FieldValue::Toggle(false)))
            .unwrap();
        assert_eq!(store.snapshot().text(Field::AparM), Some("MANAGER"));
    }

    #[test]
    fn test_touch_and_reset() {
        let mut store = store(TxnType::Pay);
        store.set_touched(Field::Rcv, true).unwrap();
        store.show_all_errors();
        store
            .set_value(Field::Amt, Some(FieldValue::Number(1.0)))
            .unwrap();
        assert!(store.is_touched(Field::Rcv));
        assert!(store.show_all());

        let initial = store.rules().initial_snapshot();
        let change = store.reset_all(initial);
        assert!(change.changed.contains(&Field::Amt));
        assert!(!store.is_touched(Field::Rcv));
        assert!(!store.show_all());
        assert_eq!(store.snapshot().get(Field::Amt), None);
    }

    #[test]
    fn test_unsubscribe() {
        let mut store = store(TxnType::Pay);
        let count = Rc::new(RefCell::new(0));
        let counter = count.clone();
        let id = store.subscribe(Box::new(move |_: &ChangeSet| *counter.borrow_mut() += 1));
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.show_all_errors();
        assert_eq!(*count.borrow(), 0);
    }
}
