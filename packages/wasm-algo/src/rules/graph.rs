//! Dependency graph checks run when a rule set is built
//!
//! Two kinds of edges exist. A derivation makes its target read `source`
//! and `when`. A dynamic constraint reads the fields in its `depends_on`.
//! Derivation edges must be acyclic, and no constraint may read its own
//! field, either directly or through a chain of derivations. Constraints
//! reading each other's values are fine: values are inputs to constraints,
//! never outputs.

use crate::constraint::{Derivation, FieldSpec};
use crate::error::WasmAlgoError;
use crate::types::Field;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Done,
}

pub(super) fn check(specs: &[FieldSpec], derivations: &[Derivation]) -> Result<(), WasmAlgoError> {
    let reads = derivation_edges(derivations);
    check_derivations_acyclic(&reads)?;

    for spec in specs {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<Field> = spec.depends_on.clone();
        while let Some(field) = stack.pop() {
            if field == spec.field {
                return Err(WasmAlgoError::CyclicDependency(spec.field.to_string()));
            }
            if seen.insert(field) {
                if let Some(sources) = reads.get(&field) {
                    stack.extend(sources.iter().copied());
                }
            }
        }
    }
    Ok(())
}

/// target -> fields its derived value reads
fn derivation_edges(derivations: &[Derivation]) -> BTreeMap<Field, Vec<Field>> {
    let mut edges: BTreeMap<Field, Vec<Field>> = BTreeMap::new();
    for d in derivations {
        edges.entry(d.target).or_default().extend([d.source, d.when]);
    }
    edges
}

fn check_derivations_acyclic(edges: &BTreeMap<Field, Vec<Field>>) -> Result<(), WasmAlgoError> {
    let mut marks: BTreeMap<Field, Mark> = BTreeMap::new();
    for start in edges.keys() {
        visit(*start, edges, &mut marks)?;
    }
    Ok(())
}

fn visit(
    field: Field,
    edges: &BTreeMap<Field, Vec<Field>>,
    marks: &mut BTreeMap<Field, Mark>,
) -> Result<(), WasmAlgoError> {
    match marks.get(&field) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => return Err(WasmAlgoError::CyclicDependency(field.to_string())),
        None => {}
    }
    marks.insert(field, Mark::Visiting);
    for next in edges.get(&field).into_iter().flatten() {
        visit(*next, edges, marks)?;
    }
    marks.insert(field, Mark::Done);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive(target: Field, source: Field, when: Field) -> Derivation {
        Derivation {
            target,
            source,
            when,
        }
    }

    #[test]
    fn test_derivation_cycle() {
        let derivations = [
            derive(Field::AparM, Field::AparF, Field::AparMUseSnd),
            derive(Field::AparF, Field::AparM, Field::AparFUseSnd),
        ];
        assert!(matches!(
            check(&[], &derivations),
            Err(WasmAlgoError::CyclicDependency(_))
        ));
    }

    #[test]
    fn test_constraint_reading_itself() {
        let specs = [FieldSpec::number(Field::Amt).depends_on(&[Field::Amt])];
        assert_eq!(
            check(&specs, &[]),
            Err(WasmAlgoError::CyclicDependency("amt".to_string()))
        );
    }

    #[test]
    fn test_constraint_reading_itself_through_derivation() {
        let specs = [FieldSpec::address(Field::Snd).depends_on(&[Field::AparM])];
        let derivations = [derive(Field::AparM, Field::Snd, Field::AparMUseSnd)];
        assert_eq!(
            check(&specs, &derivations),
            Err(WasmAlgoError::CyclicDependency("snd".to_string()))
        );
    }

    #[test]
    fn test_mutual_value_reads_are_allowed() {
        let specs = [
            FieldSpec::text(Field::Votekey).depends_on(&[Field::Selkey]),
            FieldSpec::text(Field::Selkey).depends_on(&[Field::Votekey]),
        ];
        assert_eq!(check(&specs, &[]), Ok(()));
    }
}
