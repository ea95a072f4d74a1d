use crate::document::{Attribute, Document, NodeId};
use crate::patch::identity::IDENTITY_ATTR;
use crate::render::RenderOptions;
use crate::render::metrics::{FontMetrics, ProportionalMetrics};

/// Font family list and pixel size in effect for an element.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub family: String,
    pub size_px: f32,
}

pub fn resolve_text_style(doc: &Document, node: NodeId, opts: &RenderOptions) -> TextStyle {
    let first_span = doc.child_elements(node).find(|c| doc.tag(*c) == "tspan");
    let lookup = |name: &str| {
        first_span
            .and_then(|s| doc.style_property(s, name))
            .or_else(|| doc.inherited_style_property(node, name))
    };

    let family = lookup("font-family")
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| opts.default_font_family.clone());
    let size_px = lookup("font-size")
        .and_then(|s| parse_font_size(&s, opts.default_font_size))
        .unwrap_or(opts.default_font_size);
    TextStyle { family, size_px }
}

/// `12`, `12px`, `9pt`, `1.5em`; `em` is relative to `base_px`.
pub fn parse_font_size(s: &str, base_px: f32) -> Option<f32> {
    let s = s.trim();
    let (num, scale) = if let Some(n) = s.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = s.strip_suffix("pt") {
        (n, 4.0 / 3.0)
    } else if let Some(n) = s.strip_suffix("em") {
        (n, base_px)
    } else {
        (s, 1.0)
    };
    let v: f32 = num.trim().parse().ok()?;
    (v.is_finite() && v > 0.0).then_some(v * scale)
}

/// First number of a coordinate attribute (`x="10 20 30"` yields 10).
pub fn first_coordinate(v: &str) -> Option<f64> {
    v.split(|c: char| c.is_whitespace() || c == ',')
        .find(|s| !s.is_empty())
        .and_then(|s| s.trim_end_matches("px").parse().ok())
}

/// Split a value into display lines on explicit newlines.
pub fn split_lines(value: &str) -> Vec<&str> {
    value.split('\n').map(|l| l.trim_end_matches('\r')).collect()
}

/// Baseline-to-baseline distance for `style`, measured through `metrics`.
pub fn line_height(metrics: &mut dyn FontMetrics, style: &TextStyle, opts: &RenderOptions) -> f64 {
    let measure = metrics.measure(&style.family, style.size_px).or_else(|| {
        tracing::warn!(
            family = %style.family,
            size = style.size_px,
            "font metrics unavailable, using proportional fallback"
        );
        ProportionalMetrics::default().measure(&style.family, style.size_px)
    });
    match measure {
        Some(m) => f64::from(m.line_height(style.size_px, opts.line_gap_ratio)),
        None => f64::from(style.size_px) * 1.2,
    }
}

/// Write `value` into a text element, one `<tspan>` per line when it spans several lines.
///
/// Lines share the element's horizontal anchor; line `i` sits at `y + i * line_height`.
pub fn write_text(
    doc: &mut Document,
    node: NodeId,
    value: &str,
    metrics: &mut dyn FontMetrics,
    opts: &RenderOptions,
) {
    let lines = split_lines(value);
    let first_span = doc.child_elements(node).find(|c| doc.tag(*c) == "tspan");
    if lines.len() <= 1 && first_span.is_none() {
        doc.set_text(node, value);
        return;
    }

    let coord = |name: &str| {
        doc.attr(node, name)
            .and_then(first_coordinate)
            .or_else(|| first_span.and_then(|s| doc.attr(s, name)).and_then(first_coordinate))
            .unwrap_or(0.0)
    };
    let x = coord("x");
    let y = coord("y");

    let style = resolve_text_style(doc, node, opts);
    let step = line_height(metrics, &style, opts);

    let template: Vec<Attribute> = first_span
        .and_then(|s| doc.element(s))
        .map(|el| {
            el.attrs
                .iter()
                .filter(|a| {
                    !matches!(
                        a.name.as_str(),
                        "id" | "x" | "y" | "dx" | "dy" | IDENTITY_ATTR
                    )
                })
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    doc.clear_children(node);
    for (i, line) in lines.iter().enumerate() {
        let mut attrs = template.clone();
        attrs.push(Attribute {
            name: "x".to_owned(),
            value: fmt_num(x),
        });
        attrs.push(Attribute {
            name: "y".to_owned(),
            value: fmt_num(y + step * i as f64),
        });
        let span = doc.create_element("tspan", attrs);
        doc.set_text(span, line);
        doc.append_child(node, span);
    }
}

/// Compact decimal form for attribute values.
pub fn fmt_num(v: f64) -> String {
    let rounded = (v * 10_000.0).round() / 10_000.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        let s = format!("{rounded:.4}");
        s.trim_end_matches('0').to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_size_units() {
        assert_eq!(parse_font_size("12", 16.0), Some(12.0));
        assert_eq!(parse_font_size("12px", 16.0), Some(12.0));
        assert_eq!(parse_font_size("9pt", 16.0), Some(12.0));
        assert_eq!(parse_font_size("1.5em", 16.0), Some(24.0));
        assert_eq!(parse_font_size("-1", 16.0), None);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(fmt_num(10.0), "10");
        assert_eq!(fmt_num(10.25), "10.25");
        assert_eq!(fmt_num(1.0 / 3.0), "0.3333");
    }

    #[test]
    fn coordinates_take_first_entry() {
        assert_eq!(first_coordinate("10 20"), Some(10.0));
        assert_eq!(first_coordinate("4.5px"), Some(4.5));
        assert_eq!(first_coordinate(""), None);
    }

    #[test]
    fn style_inherits_from_ancestors() {
        let doc = Document::parse(
            r#"<svg><g style="font-family:Roboto;font-size:20px"><text id="t">x</text></g></svg>"#,
        )
        .unwrap();
        let t = doc.find_by_attr("id", "t").unwrap();
        let s = resolve_text_style(&doc, t, &RenderOptions::default());
        assert_eq!(s.family, "Roboto");
        assert_eq!(s.size_px, 20.0);
    }

    #[test]
    fn single_line_without_spans_sets_text() {
        let mut doc = Document::parse(r#"<svg><text id="t" x="5" y="9">old</text></svg>"#).unwrap();
        let t = doc.find_by_attr("id", "t").unwrap();
        write_text(
            &mut doc,
            t,
            "new",
            &mut ProportionalMetrics::default(),
            &RenderOptions::default(),
        );
        assert_eq!(doc.text(t), "new");
        assert_eq!(doc.child_elements(t).count(), 0);
    }
}
