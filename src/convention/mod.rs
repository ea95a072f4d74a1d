//! Identifier conventions: element ids such as `surname.text.max_20` become typed fields.

pub mod field;
pub mod parser;
pub mod tokens;

pub use field::{FieldDefinition, FieldKind, SelectOption, humanize};
pub use parser::parse_fields;
pub use tokens::{Extension, Identifier, split_identifier};
