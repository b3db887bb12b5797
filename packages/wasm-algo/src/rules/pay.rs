//! Payment fields

use crate::constants::{ALGO_DECIMALS, MAX_ALGO_AMOUNT};
use crate::constraint::{FieldSpec, Format};
use crate::types::Field;

pub(super) fn specs() -> Vec<FieldSpec> {
    vec![
        FieldSpec::address(Field::Rcv).required(),
        FieldSpec::number(Field::Amt)
            .required()
            .min(0.0)
            .max(MAX_ALGO_AMOUNT)
            .format(Format::Decimals(ALGO_DECIMALS)),
        FieldSpec::address(Field::Close),
    ]
}
