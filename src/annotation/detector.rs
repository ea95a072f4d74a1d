use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::annotation::palette::{DetectorConfig, Marker};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Border {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentSize {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Center {
    pub x: f64,
    pub y: f64,
}

/// Geometry inferred from marker pixels in one image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationResult {
    pub image_width: u32,
    pub image_height: u32,
    /// Distance from the blue box to each image edge.
    pub border: Border,
    pub content: ContentSize,
    pub center: Center,
    pub rotation_degrees: f64,
    /// Smallest of the four border distances.
    pub border_thickness: u32,
    /// Number of blue pixels.
    pub marker_pixel_count: u64,
    /// Blue pixel density heuristic in `[0, 1]`.
    pub confidence: f64,
}

#[derive(Clone, Debug, Default)]
struct Accum {
    blue: u64,
    blue_box: Option<(u32, u32, u32, u32)>,
    red: u64,
    red_sum: (u64, u64),
    green: Vec<(u32, u32)>,
}

impl Accum {
    fn add(&mut self, marker: Marker, x: u32, y: u32) {
        match marker {
            Marker::Blue => {
                self.blue += 1;
                self.blue_box = Some(match self.blue_box {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
            Marker::Red => {
                self.red += 1;
                self.red_sum.0 += u64::from(x);
                self.red_sum.1 += u64::from(y);
            }
            Marker::Green => self.green.push((x, y)),
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.blue += other.blue;
        self.blue_box = match (self.blue_box, other.blue_box) {
            (Some(a), Some(b)) => Some((a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3))),
            (a, b) => a.or(b),
        };
        self.red += other.red;
        self.red_sum.0 += other.red_sum.0;
        self.red_sum.1 += other.red_sum.1;
        self.green.extend(other.green);
        self
    }

    fn scan_row(mut self, config: &DetectorConfig, y: u32, row: &[u8]) -> Self {
        for (x, px) in row.chunks_exact(4).enumerate() {
            if let Some(m) = config.classify([px[0], px[1], px[2], px[3]]) {
                self.add(m, x as u32, y);
            }
        }
        self
    }
}

/// Detect marker geometry with [`DetectorConfig::default`].
pub fn detect(pixels: &[u8], width: u32, height: u32) -> Option<AnnotationResult> {
    detect_with(pixels, width, height, &DetectorConfig::default())
}

/// Detect marker geometry in a decoded image.
pub fn detect_image(img: &image::RgbaImage, config: &DetectorConfig) -> Option<AnnotationResult> {
    let (w, h) = img.dimensions();
    detect_with(img.as_raw(), w, h, config)
}

/// Detect marker geometry in row-major RGBA8 pixels.
///
/// Returns `None` when no blue pixel is present or the buffer does not hold
/// `width * height` pixels.
#[tracing::instrument(skip(pixels, config))]
pub fn detect_with(
    pixels: &[u8],
    width: u32,
    height: u32,
    config: &DetectorConfig,
) -> Option<AnnotationResult> {
    let row_bytes = width as usize * 4;
    let needed = row_bytes * height as usize;
    if width == 0 || height == 0 || pixels.len() < needed {
        tracing::warn!(
            len = pixels.len(),
            needed,
            "pixel buffer does not match image dimensions"
        );
        return None;
    }
    let pixels = &pixels[..needed];

    let mut acc = if config.parallel {
        pixels
            .par_chunks_exact(row_bytes)
            .enumerate()
            .fold(Accum::default, |acc, (y, row)| acc.scan_row(config, y as u32, row))
            .reduce(Accum::default, Accum::merge)
    } else {
        pixels
            .chunks_exact(row_bytes)
            .enumerate()
            .fold(Accum::default(), |acc, (y, row)| acc.scan_row(config, y as u32, row))
    };

    let Some((min_x, min_y, max_x, max_y)) = acc.blue_box else {
        tracing::debug!("no blue marker pixels");
        return None;
    };

    let border = Border {
        left: min_x,
        right: width - 1 - max_x,
        top: min_y,
        bottom: height - 1 - max_y,
    };
    let content_w = max_x - min_x + 1;
    let content_h = max_y - min_y + 1;

    let center = if acc.red > 0 {
        Center {
            x: acc.red_sum.0 as f64 / acc.red as f64,
            y: acc.red_sum.1 as f64 / acc.red as f64,
        }
    } else {
        Center {
            x: f64::from(width) / 2.0,
            y: f64::from(height) / 2.0,
        }
    };

    acc.green.sort_unstable();
    let rotation_degrees = if acc.green.len() > config.min_green_pixels {
        line_angle(&acc.green)
    } else {
        0.0
    };

    let area = f64::from(width) * f64::from(height);
    let confidence = (acc.blue as f64 / (area * 0.01)).min(1.0);

    Some(AnnotationResult {
        image_width: width,
        image_height: height,
        border,
        content: ContentSize {
            width: content_w,
            height: content_h,
            aspect_ratio: f64::from(content_w) / f64::from(content_h),
        },
        center,
        rotation_degrees,
        border_thickness: border.left.min(border.right).min(border.top).min(border.bottom),
        marker_pixel_count: acc.blue,
        confidence,
    })
}

/// Angle in degrees between the mean of the leftmost and rightmost tenth of `points`.
///
/// `points` must be sorted by x.
fn line_angle(points: &[(u32, u32)]) -> f64 {
    let k = (points.len() / 10).max(1);
    let mean = |pts: &[(u32, u32)]| {
        let n = pts.len() as f64;
        let (sx, sy) = pts.iter().fold((0.0, 0.0), |(sx, sy), &(x, y)| {
            (sx + f64::from(x), sy + f64::from(y))
        });
        (sx / n, sy / n)
    };
    let (x0, y0) = mean(&points[..k]);
    let (x1, y1) = mean(&points[points.len() - k..]);
    (y1 - y0).atan2(x1 - x0).to_degrees()
}
