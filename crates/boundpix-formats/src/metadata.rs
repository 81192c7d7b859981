use boundpix_common::MediaFormat;
use image::metadata::Orientation;
use std::collections::BTreeMap;

/// Header-level image metadata, read without decoding pixels
#[derive(Debug, Clone)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub format: MediaFormat,
    pub color_type: image::ColorType,
    pub has_alpha: bool,
    pub orientation: Orientation,
}

impl ImageMetadata {
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub fn estimated_memory_mb(&self) -> f32 {
        let bytes = self.pixel_count() * self.color_type.bytes_per_pixel() as usize;
        bytes as f32 / (1024.0 * 1024.0)
    }

    /// Dimensions after the embedded orientation is applied
    pub fn oriented_dimensions(&self) -> (u32, u32) {
        match self.orientation {
            Orientation::Rotate90
            | Orientation::Rotate270
            | Orientation::Rotate90FlipH
            | Orientation::Rotate270FlipH => (self.height, self.width),
            _ => (self.width, self.height),
        }
    }
}

/// A single container property value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Integer(u64),
    Text(String),
    Flag(bool),
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
            Self::Flag(v) => write!(f, "{v}"),
        }
    }
}

/// Container properties of the primary frame, keyed by property name
pub type ContainerProperties = BTreeMap<String, PropertyValue>;
