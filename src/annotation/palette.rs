use serde::{Deserialize, Serialize};

pub type Rgb = [u8; 3];

/// Marker category a pixel was classified into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    /// Outlines the content area.
    Blue,
    /// Marks the center.
    Red,
    /// Traces a line whose slope gives the rotation.
    Green,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub blue: Vec<Rgb>,
    pub red: Vec<Rgb>,
    pub green: Vec<Rgb>,
    /// Maximum per-channel absolute difference to a palette entry.
    pub tolerance: u8,
    /// Pixels with lower alpha are ignored.
    pub min_alpha: u8,
    /// Rotation is computed only with more green pixels than this.
    pub min_green_pixels: usize,
    /// Scan rows in parallel.
    pub parallel: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            blue: vec![[0, 0, 255], [0, 120, 255], [30, 144, 255]],
            red: vec![[255, 0, 0], [220, 20, 60]],
            green: vec![[0, 255, 0], [0, 200, 0], [50, 205, 50]],
            tolerance: 40,
            min_alpha: 128,
            min_green_pixels: 10,
            parallel: true,
        }
    }
}

impl DetectorConfig {
    /// Classify one RGBA pixel. Blue is checked first, then red, then green.
    pub fn classify(&self, px: [u8; 4]) -> Option<Marker> {
        if px[3] < self.min_alpha {
            return None;
        }
        let rgb = [px[0], px[1], px[2]];
        if self.matches(&self.blue, rgb) {
            Some(Marker::Blue)
        } else if self.matches(&self.red, rgb) {
            Some(Marker::Red)
        } else if self.matches(&self.green, rgb) {
            Some(Marker::Green)
        } else {
            None
        }
    }

    fn matches(&self, palette: &[Rgb], rgb: Rgb) -> bool {
        palette.iter().any(|entry| {
            entry
                .iter()
                .zip(rgb)
                .all(|(a, b)| a.abs_diff(b) <= self.tolerance)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_with_tolerance() {
        let c = DetectorConfig::default();
        assert_eq!(c.classify([10, 30, 230, 255]), Some(Marker::Blue));
        assert_eq!(c.classify([240, 10, 10, 255]), Some(Marker::Red));
        assert_eq!(c.classify([20, 220, 20, 255]), Some(Marker::Green));
        assert_eq!(c.classify([0, 0, 0, 255]), None);
        assert_eq!(c.classify([128, 128, 128, 255]), None);
    }

    #[test]
    fn low_alpha_is_ignored() {
        let c = DetectorConfig::default();
        assert_eq!(c.classify([0, 0, 255, 127]), None);
        assert_eq!(c.classify([0, 0, 255, 128]), Some(Marker::Blue));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let c: DetectorConfig = serde_json::from_str(r#"{"tolerance": 5}"#).unwrap();
        assert_eq!(c.tolerance, 5);
        assert_eq!(c.min_alpha, 128);
        assert_eq!(c.classify([10, 30, 230, 255]), None);
    }
}
