use crate::document::{Document, NodeId};
use crate::foundation::core::Rect;
use crate::render::text::{first_coordinate, fmt_num};

/// Remembers the author's own `transform` so rotation can be re-applied idempotently.
pub const BASE_TRANSFORM_ATTR: &str = "data-base-transform";

/// Geometric box of an element from its own position and size attributes.
///
/// Supports `x/y/width/height` elements (rect, image, use, text with size hints) as well as
/// `circle` and `ellipse`. Missing position defaults to 0; a missing size yields a zero-size box.
pub fn element_box(doc: &Document, node: NodeId) -> Rect {
    let num = |name: &str| doc.attr(node, name).and_then(first_coordinate);
    match doc.tag(node) {
        "circle" => {
            let (cx, cy) = (num("cx").unwrap_or(0.0), num("cy").unwrap_or(0.0));
            let r = num("r").unwrap_or(0.0);
            Rect::new(cx - r, cy - r, cx + r, cy + r)
        }
        "ellipse" => {
            let (cx, cy) = (num("cx").unwrap_or(0.0), num("cy").unwrap_or(0.0));
            let (rx, ry) = (num("rx").unwrap_or(0.0), num("ry").unwrap_or(0.0));
            Rect::new(cx - rx, cy - ry, cx + rx, cy + ry)
        }
        _ => {
            let x = num("x").unwrap_or(0.0);
            let y = num("y").unwrap_or(0.0);
            let w = num("width").unwrap_or(0.0).max(0.0);
            let h = num("height").unwrap_or(0.0).max(0.0);
            Rect::new(x, y, x + w, y + h)
        }
    }
}

/// Rotate `node` about its own center, keeping any transform the author already set.
///
/// The first call stores the original `transform` in [`BASE_TRANSFORM_ATTR`]; later calls start
/// from that stored value, so rendering the same angle twice gives the same markup.
pub fn apply_rotation(doc: &mut Document, node: NodeId, degrees: f64) {
    let base = match doc.attr(node, BASE_TRANSFORM_ATTR) {
        Some(b) => b.to_owned(),
        None => {
            let original = doc.attr(node, "transform").unwrap_or_default().to_owned();
            doc.set_attr(node, BASE_TRANSFORM_ATTR, original.clone());
            original
        }
    };

    if degrees == 0.0 {
        if base.is_empty() {
            doc.remove_attr(node, "transform");
        } else {
            doc.set_attr(node, "transform", base);
        }
        return;
    }

    let center = element_box(doc, node).center();
    let rotate = format!(
        "rotate({} {} {})",
        fmt_num(degrees),
        fmt_num(center.x),
        fmt_num(center.y)
    );
    let value = if base.trim().is_empty() {
        rotate
    } else {
        format!("{} {rotate}", base.trim())
    };
    doc.set_attr(node, "transform", value);
}
