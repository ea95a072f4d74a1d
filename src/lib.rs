#![forbid(unsafe_code)]
//! Template field engine for SVG documents.
//!
//! Element identifiers such as `surname.text.max_20` or `code.gen_(ru[2])(rn[6]).mode[auto]`
//! describe typed form fields. This crate parses those conventions, evaluates generation rules,
//! replays recorded edit patches against a base document, writes values back into the markup,
//! and detects crop geometry from colour markers painted onto reference images.

pub mod annotation;
pub mod convention;
pub mod document;
pub mod foundation;
pub mod generation;
pub mod patch;
pub mod render;
pub mod values;

pub use annotation::{AnnotationResult, DetectorConfig, detect, detect_image, detect_with};
pub use convention::{FieldDefinition, FieldKind, SelectOption, parse_fields};
pub use document::{Document, NodeId};
pub use foundation::core::FieldValue;
pub use foundation::error::{SvgformError, SvgformResult};
pub use generation::{KnownFields, generate, generate_with};
pub use patch::{ApplyReport, Patch, apply_patches, assign_identities, replay};
pub use render::{
    FontMetrics, ParleyFontMetrics, ProportionalMetrics, RenderOptions, RenderReport, render,
    render_with,
};
pub use values::{apply_values, known_fields, resolve_generated};
