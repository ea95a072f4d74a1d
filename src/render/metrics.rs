use std::borrow::Cow;
use std::collections::HashMap;

use crate::foundation::error::{SvgformError, SvgformResult};

/// Vertical font metrics in pixels for one family at one size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontMeasure {
    pub ascent: f32,
    /// Distance below the baseline, positive.
    pub descent: f32,
}

impl FontMeasure {
    /// Baseline-to-baseline distance: `ascent + descent + gap_ratio * size`.
    pub fn line_height(self, size_px: f32, gap_ratio: f32) -> f32 {
        self.ascent + self.descent + gap_ratio * size_px
    }
}

/// Capability supplied by the caller's environment for measuring fonts.
pub trait FontMetrics {
    /// `None` when the family cannot be measured.
    fn measure(&mut self, family: &str, size_px: f32) -> Option<FontMeasure>;
}

/// Fixed ascent/descent ratios; used when no measured metrics are available.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProportionalMetrics {
    pub ascent_ratio: f32,
    pub descent_ratio: f32,
}

impl Default for ProportionalMetrics {
    fn default() -> Self {
        Self {
            ascent_ratio: 0.8,
            descent_ratio: 0.2,
        }
    }
}

impl FontMetrics for ProportionalMetrics {
    fn measure(&mut self, _family: &str, size_px: f32) -> Option<FontMeasure> {
        (size_px.is_finite() && size_px > 0.0).then(|| FontMeasure {
            ascent: self.ascent_ratio * size_px,
            descent: self.descent_ratio * size_px,
        })
    }
}

/// Measures fonts registered from raw bytes through a Parley text layout.
pub struct ParleyFontMetrics {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    families: Vec<String>,
    cache: HashMap<(String, u32), FontMeasure>,
}

impl Default for ParleyFontMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ParleyFontMetrics {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: Vec::new(),
            cache: HashMap::new(),
        }
    }

    /// Register a font file; returns the family names it provides.
    pub fn register_font(&mut self, font_bytes: &[u8]) -> SvgformResult<Vec<String>> {
        let registered = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        if registered.is_empty() {
            return Err(SvgformError::validation(
                "no font families registered from font bytes",
            ));
        }

        let mut names = Vec::new();
        for (family_id, _) in registered {
            if let Some(name) = self.font_ctx.collection.family_name(family_id) {
                names.push(name.to_owned());
            }
        }
        for name in &names {
            if !self.families.iter().any(|f| f.eq_ignore_ascii_case(name)) {
                self.families.push(name.clone());
            }
        }
        self.cache.clear();
        Ok(names)
    }

    pub fn families(&self) -> &[String] {
        &self.families
    }

    /// First entry of a CSS family list that has been registered.
    fn resolve_family(&self, family_list: &str) -> Option<String> {
        family_list
            .split(',')
            .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\''))
            .find_map(|want| {
                self.families
                    .iter()
                    .find(|have| have.eq_ignore_ascii_case(want))
                    .cloned()
            })
    }
}

impl FontMetrics for ParleyFontMetrics {
    fn measure(&mut self, family: &str, size_px: f32) -> Option<FontMeasure> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return None;
        }
        let family = self.resolve_family(family)?;
        let key = (family.to_ascii_lowercase(), size_px.to_bits());
        if let Some(m) = self.cache.get(&key) {
            return Some(*m);
        }

        let sample = "Hg";
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, sample, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        let mut layout: parley::Layout<()> = builder.build(sample);
        layout.break_all_lines(None);

        let line = layout.lines().next()?;
        let lm = line.metrics();
        let measure = FontMeasure {
            ascent: lm.ascent,
            descent: lm.descent.abs(),
        };
        if measure.ascent + measure.descent <= 0.0 {
            return None;
        }
        self.cache.insert(key, measure);
        Some(measure)
    }
}
