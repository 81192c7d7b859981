use boundpix_common::{Error, PixelSize, Result};
use image::DynamicImage;
use std::fmt;
use std::sync::{Arc, OnceLock};

type Producer = Arc<dyn Fn() -> Result<DynamicImage> + Send + Sync>;

/// A downsampled frame, decoded now or on first access.
///
/// Dimensions are known up front. A deferred raster runs its decode the first
/// time [`Raster::image`] is called and keeps the result; decode errors
/// surface there.
#[derive(Clone)]
pub struct Raster {
    width: u32,
    height: u32,
    image: OnceLock<DynamicImage>,
    deferred: Option<Producer>,
}

impl Raster {
    /// Raster over an already decoded frame
    pub fn new(image: DynamicImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            image: OnceLock::from(image),
            deferred: None,
        }
    }

    /// Raster whose pixels come from `produce` on first access.
    /// `produce` must yield a `width` x `height` frame.
    pub fn deferred<F>(width: u32, height: u32, produce: F) -> Self
    where
        F: Fn() -> Result<DynamicImage> + Send + Sync + 'static,
    {
        Self {
            width,
            height,
            image: OnceLock::new(),
            deferred: Some(Arc::new(produce)),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::from_dimensions(self.width, self.height)
    }

    /// Whether the pixels have been decoded
    pub fn is_materialized(&self) -> bool {
        self.image.get().is_some()
    }

    /// Decoded frame, running the deferred decode on first call
    pub fn image(&self) -> Result<&DynamicImage> {
        if let Some(image) = self.image.get() {
            return Ok(image);
        }

        let produce = self
            .deferred
            .as_ref()
            .ok_or_else(|| Error::DecodeFailure("raster has no pixel source".into()))?;
        tracing::debug!("Materializing {}x{} raster", self.width, self.height);

        let image = produce()?;
        if (image.width(), image.height()) != (self.width, self.height) {
            return Err(Error::DecodeFailure(format!(
                "deferred decode produced {}x{}, expected {}x{}",
                image.width(),
                image.height(),
                self.width,
                self.height
            )));
        }

        // A racing thread may have stored its frame first; either is valid.
        let _ = self.image.set(image);
        self.image
            .get()
            .ok_or_else(|| Error::DecodeFailure("raster pixels were not stored".into()))
    }

    pub fn into_image(self) -> Result<DynamicImage> {
        self.image()?;
        self.image
            .into_inner()
            .ok_or_else(|| Error::DecodeFailure("raster pixels were not stored".into()))
    }
}

impl fmt::Debug for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("materialized", &self.is_materialized())
            .finish()
    }
}
