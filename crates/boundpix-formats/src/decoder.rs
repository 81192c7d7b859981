use crate::metadata::{ContainerProperties, ImageMetadata, PropertyValue};
use crate::raster::Raster;
use crate::{resize, scaled};
use boundpix_common::{Error, MediaFormat, Result};
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder as _, ImageReader};
use std::io::Cursor;
use std::sync::{Arc, OnceLock};

const ONE_GB_IN_BYTES: u64 = 1024 * 1024 * 1024;

/// Options for opening a metadata handle
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceOptions {
    /// Keep parsed header metadata on the handle between queries
    pub cache: bool,
}

/// What to produce from a source handle
#[derive(Debug, Clone, Copy)]
pub struct ThumbnailOptions {
    /// Larger output dimension. Sources already within it are not upscaled.
    pub max_pixel_size: u32,
    /// Hard cap on `width * height` of the output
    pub pixel_budget: Option<u64>,
    /// Apply the embedded EXIF orientation so the output is upright
    pub apply_orientation: bool,
    /// Decode before returning instead of on first pixel access
    pub cache_immediately: bool,
}

impl ThumbnailOptions {
    pub fn new(max_pixel_size: u32) -> Self {
        Self {
            max_pixel_size,
            pixel_budget: None,
            apply_orientation: true,
            cache_immediately: false,
        }
    }
}

/// Two-phase image codec: a cheap metadata handle, then bounded raster output.
///
/// Thumbnails are always generated from the full image data; embedded
/// low-resolution previews are never reused.
pub trait Codec: Send + Sync {
    type Handle<'a>;

    /// Open `bytes` for metadata queries. Must not decode pixels.
    fn open_metadata<'a>(&self, bytes: &'a [u8], options: SourceOptions)
        -> Result<Self::Handle<'a>>;

    /// Intrinsic pixel dimensions of the primary frame
    fn read_dimensions(&self, handle: &Self::Handle<'_>) -> Result<(u32, u32)>;

    fn create_thumbnail(
        &self,
        handle: &Self::Handle<'_>,
        options: &ThumbnailOptions,
    ) -> Result<Raster>;

    /// Diagnostic properties of the primary frame; empty when unreadable
    fn read_container_properties(&self, bytes: &[u8]) -> ContainerProperties;
}

/// Metadata handle over borrowed compressed bytes
pub struct SourceHandle<'a> {
    bytes: &'a [u8],
    format: MediaFormat,
    cache: bool,
    header: OnceLock<ImageMetadata>,
}

impl SourceHandle<'_> {
    pub fn format(&self) -> MediaFormat {
        self.format
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

/// [`Codec`] backed by the `image` crate.
///
/// JPEG and PNG sources are decoded at reduced resolution (see
/// [`crate::scaled`]). Other formats, and layouts the reduced paths skip, are
/// decoded at native resolution and then downscaled. `max_decode_alloc`
/// bounds that full-resolution buffer; sources needing more are rejected.
#[derive(Debug, Clone)]
pub struct ImageCodec {
    filter: FilterType,
    max_decode_alloc: Option<u64>,
}

impl ImageCodec {
    pub fn new() -> Self {
        Self {
            filter: FilterType::CatmullRom,
            max_decode_alloc: Some(ONE_GB_IN_BYTES),
        }
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Ceiling on bytes allocated while decoding the source frame. `None` lifts it.
    pub fn with_max_decode_alloc(mut self, bytes: Option<u64>) -> Self {
        self.max_decode_alloc = bytes;
        self
    }

    /// Reader over `bytes`. Header-only readers run without limits; the
    /// allocation ceiling only concerns pixel decoding.
    fn reader<'a>(
        &self,
        bytes: &'a [u8],
        format: MediaFormat,
        decode_pixels: bool,
    ) -> ImageReader<Cursor<&'a [u8]>> {
        let mut reader = ImageReader::with_format(Cursor::new(bytes), format.to_image_format());
        match self.max_decode_alloc.filter(|_| decode_pixels) {
            Some(max_alloc) => {
                let mut limits = image::Limits::default();
                limits.max_alloc = Some(max_alloc);
                reader.limits(limits);
            }
            None => reader.no_limits(),
        }
        reader
    }

    fn header(&self, handle: &SourceHandle<'_>) -> Result<ImageMetadata> {
        if let Some(cached) = handle.header.get() {
            return Ok(cached.clone());
        }

        let mut decoder = self
            .reader(handle.bytes, handle.format, false)
            .into_decoder()
            .map_err(|e| Error::MissingMetadata(e.to_string()))?;

        let (width, height) = decoder.dimensions();
        let color_type = decoder.color_type();
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);

        let header = ImageMetadata {
            width,
            height,
            format: handle.format,
            color_type,
            has_alpha: color_type.has_alpha(),
            orientation,
        };

        if handle.cache {
            let _ = handle.header.set(header.clone());
        }

        Ok(header)
    }

    /// Decode `bytes` to exactly `target`, oriented upright
    fn render(
        &self,
        bytes: &[u8],
        format: MediaFormat,
        target: (u32, u32),
        orientation: Orientation,
    ) -> Result<DynamicImage> {
        let (target_width, target_height) = target;
        let reduced = match format {
            MediaFormat::Jpeg => {
                scaled::decode_jpeg(bytes, target_width, target_height, self.max_decode_alloc)?
            }
            MediaFormat::Png => scaled::decode_png(bytes, target_width, target_height)?,
            _ => None,
        };
        let source = match reduced {
            Some(image) => image,
            None => self.decode_full(bytes, format)?,
        };
        let (width, height) = (source.width(), source.height());

        let mut image = if (width, height) == target {
            source
        } else {
            let resized = resize::downscale(&source, target_width, target_height, self.filter);
            drop(source);
            resized
        };
        image.apply_orientation(orientation);

        tracing::debug!(
            "Thumbnail {}x{} -> {}x{} ({:?})",
            width,
            height,
            image.width(),
            image.height(),
            orientation
        );

        Ok(image)
    }

    /// Full-resolution decode, refused above the allocation ceiling
    fn decode_full(&self, bytes: &[u8], format: MediaFormat) -> Result<DynamicImage> {
        let decoder = self
            .reader(bytes, format, true)
            .into_decoder()
            .map_err(|e| Error::DecodeFailure(e.to_string()))?;

        if let Some(max_alloc) = self.max_decode_alloc {
            let needed = decoder.total_bytes();
            if needed > max_alloc {
                let (width, height) = decoder.dimensions();
                return Err(Error::DecodeFailure(format!(
                    "decoding {}x{} needs {} bytes, ceiling is {}",
                    width, height, needed, max_alloc
                )));
            }
        }

        DynamicImage::from_decoder(decoder).map_err(|e| Error::DecodeFailure(e.to_string()))
    }
}

/// Whether applying `orientation` exchanges width and height
fn swaps_axes(orientation: Orientation) -> bool {
    matches!(
        orientation,
        Orientation::Rotate90
            | Orientation::Rotate270
            | Orientation::Rotate90FlipH
            | Orientation::Rotate270FlipH
    )
}

impl Default for ImageCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for ImageCodec {
    type Handle<'a> = SourceHandle<'a>;

    fn open_metadata<'a>(
        &self,
        bytes: &'a [u8],
        options: SourceOptions,
    ) -> Result<SourceHandle<'a>> {
        let format = MediaFormat::from_bytes(bytes).ok_or_else(|| {
            Error::UnrecognizedContainer(format!("{} bytes with no known signature", bytes.len()))
        })?;

        tracing::debug!("Opened {} source ({} bytes)", format, bytes.len());

        Ok(SourceHandle {
            bytes,
            format,
            cache: options.cache,
            header: OnceLock::new(),
        })
    }

    fn read_dimensions(&self, handle: &SourceHandle<'_>) -> Result<(u32, u32)> {
        let header = self.header(handle)?;
        if header.width == 0 || header.height == 0 {
            return Err(Error::MissingMetadata(format!(
                "{} header reports {}x{}",
                header.format, header.width, header.height
            )));
        }
        Ok((header.width, header.height))
    }

    fn create_thumbnail(
        &self,
        handle: &SourceHandle<'_>,
        options: &ThumbnailOptions,
    ) -> Result<Raster> {
        let header = self.header(handle)?;

        let orientation = if options.apply_orientation {
            header.orientation
        } else {
            Orientation::NoTransforms
        };

        let target = thumbnail_dimensions(header.width, header.height, options).ok_or_else(|| {
            Error::DecodeFailure(format!(
                "{}x{} cannot be reduced to {} px",
                header.width, header.height, options.max_pixel_size
            ))
        })?;

        if options.cache_immediately {
            let image = self.render(handle.bytes, handle.format, target, orientation)?;
            return Ok(Raster::new(image));
        }

        let (width, height) = if swaps_axes(orientation) {
            (target.1, target.0)
        } else {
            target
        };
        let codec = self.clone();
        let bytes: Arc<[u8]> = Arc::from(handle.bytes);
        let format = handle.format;

        Ok(Raster::deferred(width, height, move || {
            codec.render(&bytes, format, target, orientation)
        }))
    }

    fn read_container_properties(&self, bytes: &[u8]) -> ContainerProperties {
        let mut properties = ContainerProperties::new();

        let Some(format) = MediaFormat::from_bytes(bytes) else {
            return properties;
        };
        let Ok(mut decoder) = self.reader(bytes, format, false).into_decoder() else {
            return properties;
        };

        let (width, height) = decoder.dimensions();
        let color_type = decoder.color_type();
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        let has_icc_profile = decoder.icc_profile().ok().flatten().is_some();

        let mut insert = |key: &str, value: PropertyValue| {
            properties.insert(key.to_string(), value);
        };
        insert("Format", PropertyValue::Text(format.to_string()));
        insert("MimeType", PropertyValue::Text(format.mime_type().to_string()));
        insert("PixelWidth", PropertyValue::Integer(width as u64));
        insert("PixelHeight", PropertyValue::Integer(height as u64));
        insert("ColorType", PropertyValue::Text(format!("{color_type:?}")));
        insert(
            "BitsPerPixel",
            PropertyValue::Integer(color_type.bits_per_pixel() as u64),
        );
        insert("HasAlpha", PropertyValue::Flag(color_type.has_alpha()));
        insert(
            "Orientation",
            PropertyValue::Integer(orientation.to_exif() as u64),
        );
        insert("HasIccProfile", PropertyValue::Flag(has_icc_profile));
        insert("ByteCount", PropertyValue::Integer(bytes.len() as u64));

        properties
    }
}

/// Output dimensions for a thumbnail whose larger side is `max_pixel_size`.
///
/// The smaller side is rounded, then cut down to fit `pixel_budget`.
/// `None` when either side would be zero.
fn thumbnail_dimensions(width: u32, height: u32, options: &ThumbnailOptions) -> Option<(u32, u32)> {
    if options.max_pixel_size == 0 || width == 0 || height == 0 {
        return None;
    }

    let major = width.max(height) as u64;
    let minor = width.min(height) as u64;
    let max = options.max_pixel_size as u64;

    let (major_out, mut minor_out) = if max >= major {
        (major, minor)
    } else {
        let rounded = (minor as u128 * max as u128 * 2 + major as u128) / (2 * major as u128);
        (max, rounded as u64)
    };

    if let Some(budget) = options.pixel_budget {
        if major_out * minor_out > budget {
            minor_out = budget / major_out;
        }
    }

    if minor_out == 0 {
        return None;
    }

    Some(if width >= height {
        (major_out as u32, minor_out as u32)
    } else {
        (minor_out as u32, major_out as u32)
    })
}
