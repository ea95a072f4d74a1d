use serde::{Deserialize, Serialize};

/// Attribute sentinel that replaces an element's text content.
pub const INNER_TEXT: &str = "innerText";
/// Attribute sentinel that moves an element next to a sibling.
pub const REORDER: &str = "reorder";

/// One recorded, replayable mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    /// Identity (or `id` / alternate lookup value) of the target element.
    pub id: String,
    /// Literal attribute name, [`INNER_TEXT`] or [`REORDER`].
    pub attribute: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderTarget {
    #[serde(default, alias = "afterId", skip_serializing_if = "Option::is_none")]
    pub after_id: Option<String>,
    #[serde(default, alias = "beforeId", skip_serializing_if = "Option::is_none")]
    pub before_id: Option<String>,
}

/// Typed view of a [`Patch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatchOp {
    InnerText(String),
    Reorder(ReorderTarget),
    SetAttribute { name: String, value: String },
    RemoveAttribute { name: String },
}

impl Patch {
    pub fn inner_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attribute: INNER_TEXT.to_owned(),
            value: serde_json::Value::String(text.into()),
        }
    }

    pub fn set_attr(
        id: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            attribute: name.into(),
            value: serde_json::Value::String(value.into()),
        }
    }

    pub fn remove_attr(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attribute: name.into(),
            value: serde_json::Value::Null,
        }
    }

    pub fn reorder(id: impl Into<String>, target: ReorderTarget) -> Self {
        Self {
            id: id.into(),
            attribute: REORDER.to_owned(),
            value: serde_json::to_value(target).unwrap_or_default(),
        }
    }

    /// Interpret the wire form. `None` means the value cannot drive this kind of patch.
    pub fn op(&self) -> Option<PatchOp> {
        match self.attribute.as_str() {
            INNER_TEXT => Some(PatchOp::InnerText(
                scalar_text(&self.value).unwrap_or_default(),
            )),
            REORDER => serde_json::from_value::<ReorderTarget>(self.value.clone())
                .ok()
                .map(PatchOp::Reorder),
            name if is_removal(&self.value) => Some(PatchOp::RemoveAttribute {
                name: name.to_owned(),
            }),
            name => scalar_text(&self.value).map(|value| PatchOp::SetAttribute {
                name: name.to_owned(),
                value,
            }),
        }
    }
}

fn is_removal(v: &serde_json::Value) -> bool {
    match v {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn scalar_text(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            None
        }
    }
}
