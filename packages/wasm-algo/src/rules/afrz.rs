//! Asset freeze fields

use crate::constraint::{FieldSpec, Format};
use crate::types::Field;

pub(super) fn specs() -> Vec<FieldSpec> {
    vec![
        FieldSpec::number(Field::Faid)
            .required()
            .min(1.0)
            .format(Format::Integer),
        FieldSpec::address(Field::Fadd).required(),
        FieldSpec::toggle(Field::Afrz, false),
    ]
}
