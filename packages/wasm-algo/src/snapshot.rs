//! Form snapshot: the committed values of one transaction-type form.
//!
//! Rules, groups and derived state only ever read a `Snapshot`; the store
//! replaces it wholesale on commit, so readers never see a half-applied
//! update.

use crate::types::{Field, FieldValue, TxnType};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub txn_type: TxnType,
    pub values: BTreeMap<Field, FieldValue>,
}

impl Snapshot {
    pub fn new(txn_type: TxnType) -> Self {
        Snapshot {
            txn_type,
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    /// True when the field has no value or blank text
    pub fn is_empty(&self, field: Field) -> bool {
        self.get(field).map_or(true, FieldValue::is_blank)
    }

    pub fn is_filled(&self, field: Field) -> bool {
        !self.is_empty(field)
    }

    pub fn text(&self, field: Field) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn number(&self, field: Field) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_number)
    }

    /// Toggle value; missing toggles read as off
    pub fn flag(&self, field: Field) -> bool {
        self.get(field)
            .and_then(FieldValue::as_toggle)
            .unwrap_or(false)
    }

    pub(crate) fn put(&mut self, field: Field, value: Option<FieldValue>) {
        match value {
            Some(v) => {
                self.values.insert(field, v);
            }
            None => {
                self.values.remove(&field);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let mut snapshot = Snapshot::new(TxnType::Pay);
        snapshot.put(Field::Amt, Some(FieldValue::Number(5.0)));
        snapshot.put(Field::Note, Some(FieldValue::text("  ")));
        snapshot.put(Field::UseSugFee, Some(FieldValue::Toggle(true)));

        assert_eq!(snapshot.number(Field::Amt), Some(5.0));
        assert!(snapshot.is_empty(Field::Note));
        assert!(snapshot.is_empty(Field::Rcv));
        assert!(snapshot.flag(Field::UseSugFee));
        assert!(!snapshot.flag(Field::UseSugRounds));

        snapshot.put(Field::Amt, None);
        assert!(snapshot.get(Field::Amt).is_none());
    }
}
