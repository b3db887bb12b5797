//! Application call fields
//!
//! An empty or zero `apid` creates an application: programs become
//! required and the state schema and extra pages inputs appear.

use crate::constants::{
    MAX_APP_ACCOUNTS, MAX_APP_ARGS, MAX_APP_FOREIGN_APPS, MAX_APP_FOREIGN_ASSETS,
    MAX_APP_GLOBALS, MAX_APP_LOCALS, MAX_APP_TOTAL_REFS, MAX_EXTRA_PAGES, MAX_ON_COMPLETE,
    ON_COMPLETE_NOOP, ON_COMPLETE_UPDATE,
};
use crate::constraint::{list_items, FieldSpec, Format};
use crate::group::{ConditionalGroup, GroupName, GroupOutcome};
use crate::preset::Preset;
use crate::snapshot::Snapshot;
use crate::types::Field;

const REFERENCE_FIELDS: &[Field] = &[Field::Apat, Field::Apfa, Field::Apas];

fn creating(s: &Snapshot) -> bool {
    s.number(Field::Apid).map_or(true, |id| id == 0.0)
}

fn on_complete(s: &Snapshot) -> f64 {
    s.number(Field::Apan).unwrap_or(ON_COMPLETE_NOOP)
}

fn needs_programs(s: &Snapshot) -> bool {
    creating(s) || on_complete(s) == ON_COMPLETE_UPDATE
}

fn schema_hidden(s: &Snapshot) -> bool {
    !creating(s)
}

fn remaining(limit: f64, used: Option<f64>) -> Option<f64> {
    Some((limit - used.unwrap_or(0.0)).max(0.0))
}

pub(super) fn specs() -> Vec<FieldSpec> {
    vec![
        FieldSpec::number(Field::Apid)
            .required_when(|s| on_complete(s) != ON_COMPLETE_NOOP)
            .min_when(|s| Some(if on_complete(s) != ON_COMPLETE_NOOP { 1.0 } else { 0.0 }))
            .format(Format::Integer)
            .depends_on(&[Field::Apan]),
        FieldSpec::number(Field::Apan)
            .required()
            .min(ON_COMPLETE_NOOP)
            .max(MAX_ON_COMPLETE)
            .format(Format::Integer)
            .initial(crate::types::FieldValue::Number(ON_COMPLETE_NOOP)),
        program(Field::Apap),
        program(Field::Apsu),
        schema(Field::ApgsNui, Field::ApgsNbs, |s| {
            remaining(MAX_APP_GLOBALS, s.number(Field::ApgsNbs))
        }),
        schema(Field::ApgsNbs, Field::ApgsNui, |s| {
            remaining(MAX_APP_GLOBALS, s.number(Field::ApgsNui))
        }),
        schema(Field::AplsNui, Field::AplsNbs, |s| {
            remaining(MAX_APP_LOCALS, s.number(Field::AplsNbs))
        }),
        schema(Field::AplsNbs, Field::AplsNui, |s| {
            remaining(MAX_APP_LOCALS, s.number(Field::AplsNui))
        }),
        FieldSpec::number(Field::Apep)
            .min(0.0)
            .max(MAX_EXTRA_PAGES)
            .format(Format::Integer)
            .hidden_when(schema_hidden)
            .depends_on(&[Field::Apid]),
        FieldSpec::text(Field::Apaa).max_items(MAX_APP_ARGS),
        FieldSpec::text(Field::Apat)
            .max_items(MAX_APP_ACCOUNTS)
            .format(Format::AddressList),
        FieldSpec::text(Field::Apfa)
            .max_items(MAX_APP_FOREIGN_APPS)
            .format(Format::IntegerList),
        FieldSpec::text(Field::Apas)
            .max_items(MAX_APP_FOREIGN_ASSETS)
            .format(Format::IntegerList),
    ]
}

fn program(field: Field) -> FieldSpec {
    FieldSpec::text(field)
        .required_when(needs_programs)
        .format(Format::Base64 { bytes: None })
        .hidden_when(|s| !needs_programs(s))
        .depends_on(&[Field::Apid, Field::Apan])
}

fn schema(field: Field, sibling: Field, max: fn(&Snapshot) -> Option<f64>) -> FieldSpec {
    FieldSpec::number(field)
        .min(0.0)
        .max_when(max)
        .format(Format::Integer)
        .hidden_when(schema_hidden)
        .depends_on(&[sibling, Field::Apid])
}

pub(super) fn groups() -> Vec<ConditionalGroup> {
    vec![
        ConditionalGroup {
            name: GroupName::AppGlobalSchema,
            fields: &[Field::ApgsNui, Field::ApgsNbs],
            predicate: global_schema,
        },
        ConditionalGroup {
            name: GroupName::AppLocalSchema,
            fields: &[Field::AplsNui, Field::AplsNbs],
            predicate: local_schema,
        },
        ConditionalGroup {
            name: GroupName::AppReferences,
            fields: REFERENCE_FIELDS,
            predicate: references,
        },
    ]
}

fn schema_total(
    s: &Snapshot,
    group: GroupName,
    ints: Field,
    bytes: Field,
    limit: f64,
) -> GroupOutcome {
    if !creating(s) {
        return GroupOutcome::valid();
    }
    let total = s.number(ints).unwrap_or(0.0) + s.number(bytes).unwrap_or(0.0);
    if total <= limit {
        GroupOutcome::valid()
    } else {
        GroupOutcome::conditional(group, vec![ints, bytes], Some(limit))
    }
}

fn global_schema(s: &Snapshot, _preset: Option<Preset>) -> GroupOutcome {
    schema_total(
        s,
        GroupName::AppGlobalSchema,
        Field::ApgsNui,
        Field::ApgsNbs,
        MAX_APP_GLOBALS,
    )
}

fn local_schema(s: &Snapshot, _preset: Option<Preset>) -> GroupOutcome {
    schema_total(
        s,
        GroupName::AppLocalSchema,
        Field::AplsNui,
        Field::AplsNbs,
        MAX_APP_LOCALS,
    )
}

fn references(s: &Snapshot, _preset: Option<Preset>) -> GroupOutcome {
    let total: usize = REFERENCE_FIELDS
        .iter()
        .filter_map(|f| s.text(*f))
        .map(|text| list_items(text).count())
        .sum();
    if total <= MAX_APP_TOTAL_REFS {
        GroupOutcome::valid()
    } else {
        GroupOutcome::conditional(
            GroupName::AppReferences,
            REFERENCE_FIELDS.to_vec(),
            Some(MAX_APP_TOTAL_REFS as f64),
        )
    }
}
