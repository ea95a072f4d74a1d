//! Arena document model used by every stage of the engine.
//!
//! The markup is parsed once with `roxmltree` into owned [`Element`] records addressed by
//! [`NodeId`] handles; all mutation (attributes, text, reordering) happens on the arena and the
//! result is serialized back with `quick-xml`.

mod parse;
mod tree;
mod write;

pub use tree::{Attribute, Document, Element, NodeId, NodeKind};
