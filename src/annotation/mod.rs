//! Marker detection on reference images.
//!
//! Blue pixels outline the content box, red pixels mark the center and a green stroke gives the
//! rotation. Input is already-decoded RGBA8; decoding image files is left to callers.

pub mod detector;
pub mod palette;

pub use detector::{
    AnnotationResult, Border, Center, ContentSize, detect, detect_image, detect_with,
};
pub use palette::{DetectorConfig, Marker, Rgb};
