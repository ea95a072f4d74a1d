use std::collections::HashMap;

use crate::convention::field::{FieldDefinition, FieldKind, SelectOption, humanize};
use crate::convention::tokens::{Extension, Identifier, split_identifier};
use crate::document::{Document, NodeId};
use crate::foundation::core::FieldValue;
use crate::patch::identity::{OccurrenceCounter, assign_identities};

/// Derive one [`FieldDefinition`] per eligible identified element, in document order.
///
/// Select-group members collapse into a single definition keyed by their base identifier.
/// Repeated base identifiers outside select groups are numbered (`name`, `name_2`, ...).
#[tracing::instrument(skip_all)]
pub fn parse_fields(doc: &Document) -> Vec<FieldDefinition> {
    let identities = assign_identities(doc);
    let mut ids = OccurrenceCounter::new();
    let mut select_groups: HashMap<String, usize> = HashMap::new();
    let mut fields: Vec<FieldDefinition> = Vec::new();

    for (node, identity) in identities.iter() {
        let Some(raw) = doc.attr(node, "id").map(str::trim).filter(|s| !s.is_empty()) else {
            continue;
        };
        let ident = split_identifier(raw);
        if ident.base.is_empty() {
            continue;
        }
        let text = doc.text(node).trim().to_owned();

        let is_select = ident
            .extensions
            .iter()
            .any(|e| matches!(e, Extension::Select(_)));
        if is_select {
            let option = SelectOption {
                value: text.clone(),
                label: text,
                source_element_id: identity.to_owned(),
            };
            if let Some(&idx) = select_groups.get(ident.base) {
                fields[idx].options.push(option);
                continue;
            }
            let mut field = build_field(doc, node, raw, identity, &ident, ids.next_key(ident.base));
            field.default_value = FieldValue::Text(option.value.clone());
            field.current_value = field.default_value.clone();
            field.options.push(option);
            select_groups.insert(ident.base.to_owned(), fields.len());
            fields.push(field);
            continue;
        }

        let field = build_field(doc, node, raw, identity, &ident, ids.next_key(ident.base));
        fields.push(field);
    }

    tracing::debug!(fields = fields.len(), "parsed field definitions");
    fields
}

fn build_field(
    doc: &Document,
    node: NodeId,
    raw: &str,
    identity: &str,
    ident: &Identifier<'_>,
    id: String,
) -> FieldDefinition {
    let is_static = ident.extensions.is_empty();
    let kind = if is_static {
        FieldKind::Static
    } else if ident
        .extensions
        .iter()
        .any(|e| matches!(e, Extension::Select(_)))
    {
        FieldKind::Select
    } else {
        ident.kind().unwrap_or(FieldKind::Text)
    };

    let mut field = FieldDefinition {
        name: humanize(&id),
        id,
        kind,
        svg_element_id: raw.to_owned(),
        element_identity: identity.to_owned(),
        default_value: FieldValue::default(),
        current_value: FieldValue::default(),
        max_length: None,
        min_length: None,
        date_format: None,
        generation_rule: None,
        generation_mode: None,
        depends_on: None,
        editable: !is_static,
        rotatable: false,
        options: Vec::new(),
    };

    for ext in &ident.extensions {
        match ext {
            Extension::MaxLength(n) => field.max_length = Some(*n),
            Extension::MinLength(n) => field.min_length = Some(*n),
            Extension::Generate(rule) => field.generation_rule = Some((*rule).to_owned()),
            Extension::Mode(m) => field.generation_mode = Some((*m).to_owned()),
            Extension::DependsOn(d) => field.depends_on = Some((*d).to_owned()),
            Extension::DateFormat(f) => field.date_format = Some((*f).to_owned()),
            Extension::NotEditable => field.editable = false,
            Extension::Rotate => field.rotatable = true,
            Extension::Kind(_) | Extension::Select(_) | Extension::Unknown(_) => {}
        }
    }

    field.default_value = default_value(doc, node, kind);
    field.current_value = field.default_value.clone();
    field
}

fn default_value(doc: &Document, node: NodeId, kind: FieldKind) -> FieldValue {
    match kind {
        FieldKind::Checkbox => FieldValue::Bool(!is_hidden(doc, node)),
        FieldKind::Upload | FieldKind::File => FieldValue::Text(
            doc.attr(node, "href")
                .or_else(|| doc.attr(node, "xlink:href"))
                .unwrap_or_default()
                .to_owned(),
        ),
        FieldKind::Number | FieldKind::Range => {
            let text = doc.text(node);
            match text.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => FieldValue::Number(n),
                _ => FieldValue::Text(text.trim().to_owned()),
            }
        }
        _ => FieldValue::Text(doc.text(node).trim().to_owned()),
    }
}

fn is_hidden(doc: &Document, node: NodeId) -> bool {
    doc.style_property(node, "visibility").as_deref() == Some("hidden")
        || doc.style_property(node, "display").as_deref() == Some("none")
}
