//! Deterministic identity assignment and ordered patch replay.

pub mod apply;
pub mod identity;
pub mod model;

pub use apply::{ApplyReport, SkipReason, SkippedPatch, apply_patches, locate, replay};
pub use identity::{IDENTITY_ATTR, IdentityMap, OccurrenceCounter, assign_identities};
pub use model::{INNER_TEXT, Patch, PatchOp, REORDER, ReorderTarget};
