use serde::{Deserialize, Serialize};

use crate::convention::{FieldDefinition, FieldKind};
use crate::document::{Document, NodeId};
use crate::patch::identity::{IdentityMap, assign_identities};
use crate::render::date::format_date;
use crate::render::metrics::FontMetrics;
use crate::render::text::write_text;
use crate::render::transform::apply_rotation;

/// Defaults applied when the document does not specify font properties.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub default_font_family: String,
    pub default_font_size: f32,
    /// Extra gap between lines as a fraction of the font size.
    pub line_gap_ratio: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            default_font_family: "sans-serif".to_owned(),
            default_font_size: 16.0,
            line_gap_ratio: 0.2,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderReport {
    /// Fields whose value was written.
    pub rendered: usize,
    /// Field ids whose target element could not be found.
    pub missing: Vec<String>,
}

/// Write every field's current value into a copy of `doc`.
///
/// Equivalent to [`render_with`] using [`RenderOptions::default`].
pub fn render(
    doc: &Document,
    fields: &[FieldDefinition],
    metrics: &mut dyn FontMetrics,
) -> (Document, RenderReport) {
    render_with(doc, fields, metrics, &RenderOptions::default())
}

/// Write every field's current value into a copy of `doc`.
///
/// Static fields are left untouched. Fields whose element is missing are listed in the report
/// and otherwise ignored.
#[tracing::instrument(skip_all, fields(fields = fields.len()))]
pub fn render_with(
    doc: &Document,
    fields: &[FieldDefinition],
    metrics: &mut dyn FontMetrics,
    opts: &RenderOptions,
) -> (Document, RenderReport) {
    let mut out = doc.clone();
    let identities = assign_identities(&out);
    let mut report = RenderReport::default();

    for field in fields {
        if field.kind == FieldKind::Static {
            continue;
        }
        let Some(node) = target(&out, &identities, field) else {
            tracing::debug!(field = %field.id, "render target not found");
            report.missing.push(field.id.clone());
            continue;
        };
        if write_field(&mut out, &identities, node, field, metrics, opts) {
            report.rendered += 1;
        }
    }

    tracing::debug!(
        rendered = report.rendered,
        missing = report.missing.len(),
        "render complete"
    );
    (out, report)
}

fn target(doc: &Document, identities: &IdentityMap, field: &FieldDefinition) -> Option<NodeId> {
    identities
        .find(&field.element_identity)
        .or_else(|| doc.find_by_attr("id", &field.svg_element_id))
}

fn write_field(
    doc: &mut Document,
    identities: &IdentityMap,
    node: NodeId,
    field: &FieldDefinition,
    metrics: &mut dyn FontMetrics,
    opts: &RenderOptions,
) -> bool {
    let value = &field.current_value;

    if field.rotatable {
        let Some(degrees) = value.as_f64() else {
            tracing::warn!(field = %field.id, %value, "rotation value is not numeric");
            return false;
        };
        apply_rotation(doc, node, degrees);
        return true;
    }

    match field.kind {
        FieldKind::Checkbox => {
            let checked = value.is_truthy();
            if checked {
                clear_display_none(doc, node);
            }
            doc.remove_style_property(node, "visibility");
            doc.set_attr(node, "visibility", if checked { "visible" } else { "hidden" });
            true
        }
        kind if kind.is_image() => {
            let attr = if doc.attr(node, "xlink:href").is_some() {
                "xlink:href"
            } else {
                "href"
            };
            doc.set_attr(node, attr, value.as_text());
            true
        }
        FieldKind::Select => {
            let selected = value.as_text();
            for option in &field.options {
                let Some(el) = identities.find(&option.source_element_id) else {
                    continue;
                };
                if option.value == selected {
                    clear_display_none(doc, el);
                } else {
                    doc.remove_style_property(el, "display");
                    doc.set_attr(el, "display", "none");
                }
            }
            true
        }
        FieldKind::Date => {
            let raw = value.as_text();
            let text = match field.date_format.as_deref() {
                Some(fmt) => format_date(&raw, fmt),
                None => raw,
            };
            write_text(doc, node, &text, metrics, opts);
            true
        }
        kind if kind.is_textual() => {
            write_text(doc, node, &value.as_text(), metrics, opts);
            true
        }
        _ => false,
    }
}

/// Remove `display:none` from both the attribute and the `style` declarations.
fn clear_display_none(doc: &mut Document, node: NodeId) {
    if doc.attr(node, "display").map(str::trim) == Some("none") {
        doc.remove_attr(node, "display");
    }
    if doc.style_property(node, "display").as_deref() == Some("none") {
        doc.remove_style_property(node, "display");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convention::parse_fields;
    use crate::foundation::core::FieldValue;
    use crate::render::metrics::{FontMeasure, ProportionalMetrics};

    struct Fixed(FontMeasure);

    impl FontMetrics for Fixed {
        fn measure(&mut self, _family: &str, _size_px: f32) -> Option<FontMeasure> {
            Some(self.0)
        }
    }

    struct NoFonts;

    impl FontMetrics for NoFonts {
        fn measure(&mut self, _family: &str, _size_px: f32) -> Option<FontMeasure> {
            None
        }
    }

    fn setup(src: &str) -> (Document, Vec<FieldDefinition>) {
        let doc = Document::parse(src).unwrap();
        let fields = parse_fields(&doc);
        (doc, fields)
    }

    fn field<'a>(fields: &'a mut [FieldDefinition], id: &str) -> &'a mut FieldDefinition {
        fields.iter_mut().find(|f| f.id == id).unwrap()
    }

    #[test]
    fn multiline_uses_measured_line_height() {
        let (doc, mut fields) = setup(
            r#"<svg><text id="addr.textarea" x="10" y="20" font-size="10" font-family="Tight"><tspan fill="red">x</tspan></text></svg>"#,
        );
        field(&mut fields, "addr").current_value = FieldValue::text("one\ntwo\nthree");
        let mut metrics = Fixed(FontMeasure {
            ascent: 7.0,
            descent: 1.0,
        });
        let (out, report) = render(&doc, &fields, &mut metrics);
        assert_eq!(report.rendered, 1);

        let t = out.find_by_attr("id", "addr.textarea").unwrap();
        let spans: Vec<NodeId> = out.child_elements(t).collect();
        assert_eq!(spans.len(), 3);
        let ys: Vec<&str> = spans.iter().map(|s| out.attr(*s, "y").unwrap()).collect();
        assert_eq!(ys, ["20", "30", "40"]);
        assert!(spans.iter().all(|s| out.attr(*s, "x") == Some("10")));
        assert!(spans.iter().all(|s| out.attr(*s, "fill") == Some("red")));
        assert_eq!(out.text(spans[2]), "three");
    }

    #[test]
    fn taller_fonts_get_wider_spacing() {
        let src = r#"<svg><text id="a.textarea" y="0" font-size="20">x</text></svg>"#;
        let (doc, mut fields) = setup(src);
        field(&mut fields, "a").current_value = FieldValue::text("1\n2");

        let y2 = |m: FontMeasure| {
            let (out, _) = render(&doc, &fields, &mut Fixed(m));
            let t = out.find_by_attr("id", "a.textarea").unwrap();
            let second = out.child_elements(t).nth(1).unwrap();
            out.attr(second, "y").unwrap().parse::<f64>().unwrap()
        };
        let condensed = y2(FontMeasure {
            ascent: 14.0,
            descent: 3.0,
        });
        let tall = y2(FontMeasure {
            ascent: 22.0,
            descent: 6.0,
        });
        assert_eq!(condensed, 21.0);
        assert_eq!(tall, 32.0);
    }

    #[test]
    fn missing_metrics_fall_back_to_proportional() {
        let (doc, mut fields) =
            setup(r#"<svg><text id="a.textarea" y="0" font-size="10">x</text></svg>"#);
        field(&mut fields, "a").current_value = FieldValue::text("1\n2");
        let (a, _) = render(&doc, &fields, &mut NoFonts);
        let (b, _) = render(&doc, &fields, &mut ProportionalMetrics::default());
        assert_eq!(a.to_xml_string().unwrap(), b.to_xml_string().unwrap());
    }

    #[test]
    fn checkbox_upload_and_static() {
        let (doc, mut fields) = setup(
            r#"<svg xmlns:xlink="http://www.w3.org/1999/xlink">
                <path id="agree.checkbox" d="M0 0"/>
                <image id="photo.upload" xlink:href="old.png" width="10" height="10"/>
                <text id="title">Fixed</text>
            </svg>"#,
        );
        field(&mut fields, "agree").current_value = FieldValue::Bool(false);
        field(&mut fields, "photo").current_value =
            FieldValue::text("data:image/png;base64,AAAA");
        field(&mut fields, "title").current_value = FieldValue::text("changed");

        let (out, report) = render(&doc, &fields, &mut ProportionalMetrics::default());
        assert_eq!(report.rendered, 2);
        let cb = out.find_by_attr("id", "agree.checkbox").unwrap();
        assert_eq!(out.attr(cb, "visibility"), Some("hidden"));
        let img = out.find_by_attr("id", "photo.upload").unwrap();
        assert_eq!(out.attr(img, "xlink:href"), Some("data:image/png;base64,AAAA"));
        let title = out.find_by_attr("id", "title").unwrap();
        assert_eq!(out.text(title), "Fixed");
    }

    #[test]
    fn hidden_checkboxes_can_be_checked_and_unchecked() {
        let (doc, mut fields) = setup(
            r#"<svg>
                <path id="agree.checkbox" d="M0 0" display="none"/>
                <path id="consent.checkbox" d="M0 0" style="fill:red;visibility:hidden"/>
            </svg>"#,
        );
        assert!(fields.iter().all(|f| f.current_value == FieldValue::Bool(false)));
        for f in &mut fields {
            f.current_value = FieldValue::Bool(true);
        }
        let (checked, report) = render(&doc, &fields, &mut ProportionalMetrics::default());
        assert_eq!(report.rendered, 2);
        let reparsed = parse_fields(&checked);
        assert!(reparsed.iter().all(|f| f.default_value == FieldValue::Bool(true)));
        let consent = checked.find_by_attr("id", "consent.checkbox").unwrap();
        assert_eq!(checked.attr(consent, "style"), Some("fill:red"));

        let mut fields = reparsed;
        for f in &mut fields {
            f.current_value = FieldValue::Bool(false);
        }
        let (unchecked, _) = render(&checked, &fields, &mut ProportionalMetrics::default());
        let reparsed = parse_fields(&unchecked);
        assert!(reparsed.iter().all(|f| f.default_value == FieldValue::Bool(false)));
    }

    #[test]
    fn rotation_field_rotates_about_center() {
        let (doc, mut fields) = setup(
            r#"<svg><rect id="stamp.number.rotate" x="100" y="40" width="20" height="10"/></svg>"#,
        );
        field(&mut fields, "stamp").current_value = FieldValue::Number(-12.5);
        let (out, _) = render(&doc, &fields, &mut ProportionalMetrics::default());
        let r = out.find_by_attr("id", "stamp.number.rotate").unwrap();
        assert_eq!(out.attr(r, "transform"), Some("rotate(-12.5 110 45)"));
    }

    #[test]
    fn select_shows_only_chosen_option() {
        let (doc, mut fields) = setup(
            r#"<svg>
                <text id="size.select_a">Small</text>
                <text id="size.select_b">Large</text>
            </svg>"#,
        );
        field(&mut fields, "size").current_value = FieldValue::text("Large");
        let (out, _) = render(&doc, &fields, &mut ProportionalMetrics::default());
        let small = out.find_by_attr("id", "size.select_a").unwrap();
        let large = out.find_by_attr("id", "size.select_b").unwrap();
        assert_eq!(out.attr(small, "display"), Some("none"));
        assert_eq!(out.attr(large, "display"), None);
    }

    #[test]
    fn select_reveals_option_hidden_by_style() {
        let (doc, mut fields) = setup(
            r#"<svg>
                <text id="size.select_a" style="display:inline">Small</text>
                <text id="size.select_b" style="display: none">Large</text>
            </svg>"#,
        );
        field(&mut fields, "size").current_value = FieldValue::text("Large");
        let (out, _) = render(&doc, &fields, &mut ProportionalMetrics::default());
        let small = out.find_by_attr("id", "size.select_a").unwrap();
        let large = out.find_by_attr("id", "size.select_b").unwrap();
        assert_eq!(out.style_property(small, "display").as_deref(), Some("none"));
        assert_eq!(out.style_property(large, "display"), None);
        assert_eq!(out.attr(large, "style"), None);
    }

    #[test]
    fn date_values_are_formatted() {
        let (doc, mut fields) =
            setup(r#"<svg><text id="dob.date.date_format[DD.MM.YYYY]">x</text></svg>"#);
        field(&mut fields, "dob").current_value = FieldValue::text("1990-12-31");
        let (out, _) = render(&doc, &fields, &mut ProportionalMetrics::default());
        let t = out.elements().into_iter().find(|n| out.tag(*n) == "text").unwrap();
        assert_eq!(out.text(t), "31.12.1990");
    }

    #[test]
    fn unknown_targets_are_reported() {
        let (doc, mut fields) = setup(r#"<svg><text id="a.text">x</text></svg>"#);
        let mut ghost = fields[0].clone();
        ghost.id = "ghost".into();
        ghost.svg_element_id = "ghost.text".into();
        ghost.element_identity = "ghost.text".into();
        fields.push(ghost);
        let (_, report) = render(&doc, &fields, &mut ProportionalMetrics::default());
        assert_eq!(report.rendered, 1);
        assert_eq!(report.missing, ["ghost"]);
    }
}
