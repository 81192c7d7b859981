use crate::size_calculator::bounded_target_size;
use boundpix_common::{EdgeConstraint, PixelSize, Result, TotalPixelLimit};
use boundpix_formats::{
    Codec, ContainerProperties, ImageCodec, Raster, SourceOptions, ThumbnailOptions,
};

/// One bounded decode: compressed bytes plus the size policy to apply
#[derive(Debug, Clone, Copy)]
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    constraint: EdgeConstraint,
    limit: TotalPixelLimit,
    eager: bool,
}

impl<'a> DecodeRequest<'a> {
    /// Unconstrained edges, default pixel limit, pixels decoded on first access
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            constraint: EdgeConstraint::none(),
            limit: TotalPixelLimit::default(),
            eager: false,
        }
    }

    pub fn with_constraint(mut self, constraint: EdgeConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    pub fn with_edges(self, short_edge: Option<f64>, long_edge: Option<f64>) -> Self {
        self.with_constraint(EdgeConstraint::new(short_edge, long_edge))
    }

    pub fn with_pixel_limit(mut self, limit: TotalPixelLimit) -> Self {
        self.limit = limit;
        self
    }

    /// Decode pixels inside the decode call rather than on first access
    pub fn eager(mut self, eager: bool) -> Self {
        self.eager = eager;
        self
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn constraint(&self) -> EdgeConstraint {
        self.constraint
    }

    pub fn pixel_limit(&self) -> TotalPixelLimit {
        self.limit
    }

    pub fn is_eager(&self) -> bool {
        self.eager
    }
}

/// Successful bounded decode
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub raster: Raster,
    /// Intrinsic dimensions read from the container
    pub original_size: PixelSize,
    /// Size chosen by the edge caps and pixel limit
    pub target_size: PixelSize,
}

/// Decodes compressed images straight to a bounded size.
///
/// Failure of any kind (unknown container, unreadable header, codec error)
/// yields `None`; the cause is only logged.
#[derive(Debug, Clone, Default)]
pub struct BoundedDecoder<C = ImageCodec> {
    codec: C,
}

impl BoundedDecoder<ImageCodec> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Codec> BoundedDecoder<C> {
    pub fn with_codec(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn decode(&self, request: &DecodeRequest<'_>) -> Option<DecodedImage> {
        match self.try_decode(request) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::debug!("Bounded decode of {} bytes failed: {}", request.data.len(), e);
                None
            }
        }
    }

    /// Container properties for diagnostics; never used on the decode path
    pub fn container_properties(&self, data: &[u8]) -> ContainerProperties {
        self.codec.read_container_properties(data)
    }

    fn try_decode(&self, request: &DecodeRequest<'_>) -> Result<DecodedImage> {
        let handle = self
            .codec
            .open_metadata(request.data, SourceOptions { cache: false })?;

        let original_size = PixelSize::from(self.codec.read_dimensions(&handle)?);
        let target_size = bounded_target_size(original_size, request.constraint, request.limit);

        let options = ThumbnailOptions {
            max_pixel_size: target_size.long_edge() as u32,
            pixel_budget: Some(request.limit.get().floor() as u64),
            apply_orientation: true,
            cache_immediately: request.eager,
        };
        let raster = self.codec.create_thumbnail(&handle, &options)?;

        tracing::info!(
            "Decoded {} → {} (target {}, eager={})",
            original_size,
            raster.size(),
            target_size,
            request.eager
        );

        Ok(DecodedImage {
            raster,
            original_size,
            target_size,
        })
    }
}
