//! Writes field values back into a template document.
//!
//! Text layout needs vertical font metrics for the element's actual family and size. Those come
//! from an injected [`FontMetrics`] implementation: [`ParleyFontMetrics`] measures fonts the caller
//! registers, and [`ProportionalMetrics`] is the fallback when nothing can be measured.

pub mod date;
pub mod metrics;
pub mod pipeline;
pub mod text;
pub mod transform;

pub use date::format_date;
pub use metrics::{FontMeasure, FontMetrics, ParleyFontMetrics, ProportionalMetrics};
pub use pipeline::{RenderOptions, RenderReport, render, render_with};
pub use transform::{BASE_TRANSFORM_ATTR, apply_rotation, element_box};
