use serde::{Deserialize, Serialize};

use crate::foundation::core::FieldValue;

/// Input kind of a template field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Checkbox,
    Date,
    Upload,
    Number,
    Email,
    Tel,
    Url,
    Password,
    Range,
    Color,
    File,
    Select,
    Static,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::Upload => "upload",
            Self::Number => "number",
            Self::Email => "email",
            Self::Tel => "tel",
            Self::Url => "url",
            Self::Password => "password",
            Self::Range => "range",
            Self::Color => "color",
            Self::File => "file",
            Self::Select => "select",
            Self::Static => "static",
        }
    }

    /// Kinds whose value is written into the element's text content.
    pub fn is_textual(self) -> bool {
        !matches!(
            self,
            Self::Checkbox | Self::Upload | Self::File | Self::Select | Self::Static
        )
    }

    pub fn is_image(self) -> bool {
        matches!(self, Self::Upload | Self::File)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    /// Identity of the element that contributed this option.
    pub source_element_id: String,
}

/// Typed field metadata derived from one element identifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: String,
    pub name: String,
    pub kind: FieldKind,
    /// Full original identifier of the element.
    pub svg_element_id: String,
    /// Identity assigned to the element by the patch engine's identity pass.
    pub element_identity: String,
    pub default_value: FieldValue,
    pub current_value: FieldValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    pub editable: bool,
    /// Numeric value is a rotation in degrees applied to the element.
    #[serde(default)]
    pub rotatable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

impl FieldDefinition {
    /// Computed without user input.
    pub fn is_auto(&self) -> bool {
        self.generation_rule.is_some()
            && self
                .generation_mode
                .as_deref()
                .is_some_and(|m| m.eq_ignore_ascii_case("auto"))
    }
}

/// Human label for a base identifier: `first_name` and `firstName` both become `First Name`.
pub fn humanize(id: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut cur = String::new();
    let mut prev_lower = false;
    for ch in id.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !cur.is_empty() {
                words.push(std::mem::take(&mut cur));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !cur.is_empty() {
            words.push(std::mem::take(&mut cur));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        cur.push(ch);
    }
    if !cur.is_empty() {
        words.push(cur);
    }

    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
