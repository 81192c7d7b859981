pub mod decoder;
pub mod encoder;
pub mod metadata;
pub mod raster;
pub mod resize;
pub mod scaled;
pub mod source;

pub use decoder::{Codec, ImageCodec, SourceHandle, SourceOptions, ThumbnailOptions};
pub use encoder::ImageEncoder;
pub use image::imageops::FilterType;
pub use metadata::{ContainerProperties, ImageMetadata, PropertyValue};
pub use raster::Raster;
pub use source::SourceBytes;
