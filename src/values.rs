//! Glue between parsed definitions, external values and generation rules.

use std::collections::{BTreeMap, HashMap};

use rand::Rng;

use crate::convention::FieldDefinition;
use crate::foundation::core::FieldValue;
use crate::generation::{KnownFields, generate_with};

/// Copy externally supplied values onto definitions by field id. Unknown ids are ignored.
///
/// Returns how many definitions were updated.
pub fn apply_values(
    fields: &mut [FieldDefinition],
    values: &BTreeMap<String, FieldValue>,
) -> usize {
    let mut n = 0;
    for f in fields.iter_mut() {
        if let Some(v) = values.get(&f.id) {
            f.current_value = v.clone();
            n += 1;
        }
    }
    n
}

/// Current values of every field as generation input.
pub fn known_fields(fields: &[FieldDefinition]) -> KnownFields {
    fields
        .iter()
        .map(|f| (f.id.clone(), f.current_value.as_text()))
        .collect()
}

/// Evaluate generation rules for fields that are `auto` or still empty.
///
/// Fields are visited so that a `depends_on` target is generated before its dependents;
/// dependency cycles fall back to document order. Returns the number of generated fields.
#[tracing::instrument(skip_all)]
pub fn resolve_generated<R: Rng>(fields: &mut [FieldDefinition], rng: &mut R) -> usize {
    let order = generation_order(fields);
    let mut generated = 0;
    for idx in order {
        let field = &fields[idx];
        let Some(rule) = field.generation_rule.as_deref() else {
            continue;
        };
        if !field.is_auto() && !field.current_value.is_empty() {
            continue;
        }
        let known = known_fields(fields);
        let value = generate_with(rule, &known, field.max_length, rng);
        tracing::debug!(field = %fields[idx].id, %value, "generated value");
        fields[idx].current_value = FieldValue::Text(value);
        generated += 1;
    }
    generated
}

fn generation_order(fields: &[FieldDefinition]) -> Vec<usize> {
    let by_id: HashMap<&str, usize> = fields
        .iter()
        .enumerate()
        .map(|(i, f)| (f.id.as_str(), i))
        .collect();

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Visiting,
        Done,
    }

    fn visit(
        i: usize,
        fields: &[FieldDefinition],
        by_id: &HashMap<&str, usize>,
        marks: &mut [Mark],
        out: &mut Vec<usize>,
    ) {
        if marks[i] != Mark::New {
            return;
        }
        marks[i] = Mark::Visiting;
        if let Some(dep) = fields[i].depends_on.as_deref().and_then(|d| by_id.get(d)) {
            visit(*dep, fields, by_id, marks, out);
        }
        marks[i] = Mark::Done;
        out.push(i);
    }

    let mut marks = vec![Mark::New; fields.len()];
    let mut out = Vec::with_capacity(fields.len());
    for i in 0..fields.len() {
        visit(i, fields, &by_id, &mut marks, &mut out);
    }
    out
}
