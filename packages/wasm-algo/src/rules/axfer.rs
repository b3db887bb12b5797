//! Asset transfer fields
//!
//! Amounts are in the asset's base units, so they must be whole numbers.

use crate::constants::MAX_ASSET_TOTAL;
use crate::constraint::{FieldSpec, Format};
use crate::types::Field;

pub(super) fn specs() -> Vec<FieldSpec> {
    vec![
        FieldSpec::number(Field::Xaid)
            .required()
            .min(1.0)
            .format(Format::Integer),
        FieldSpec::address(Field::Rcv).required(),
        FieldSpec::number(Field::Amt)
            .required()
            .min(0.0)
            .max(MAX_ASSET_TOTAL)
            .format(Format::Integer),
        FieldSpec::address(Field::Asnd),
        FieldSpec::address(Field::Aclose),
    ]
}
