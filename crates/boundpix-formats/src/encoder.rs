use boundpix_common::{MediaFormat, Result};
use image::{DynamicImage, ImageEncoder as _};
use std::borrow::Cow;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const ONE_MB_IN_BYTES: usize = 1024 * 1024;
const PREVIEW_JPEG_QUALITY: u8 = 90;

/// Writes downsampled previews to disk
pub struct ImageEncoder;

impl ImageEncoder {
    /// Encode image to specified format at given path
    pub fn encode(img: &DynamicImage, output_path: &Path, format: MediaFormat) -> Result<()> {
        tracing::debug!("Encoding to {:?} at {:?}", format, output_path);

        let file = File::create(output_path)?;
        let mut writer = BufWriter::with_capacity(ONE_MB_IN_BYTES, file);

        match format {
            MediaFormat::Png => {
                let encoder = image::codecs::png::PngEncoder::new(writer);
                encoder.write_image(
                    img.as_bytes(),
                    img.width(),
                    img.height(),
                    img.color().into(),
                )?;
            }
            MediaFormat::Jpeg => {
                // JPEG has no alpha channel
                let img: Cow<'_, DynamicImage> = if img.color().has_alpha() {
                    Cow::Owned(DynamicImage::ImageRgb8(img.to_rgb8()))
                } else {
                    Cow::Borrowed(img)
                };
                let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                    writer,
                    PREVIEW_JPEG_QUALITY,
                );
                encoder.write_image(
                    img.as_bytes(),
                    img.width(),
                    img.height(),
                    img.color().into(),
                )?;
            }
            _ => {
                img.write_to(&mut writer, format.to_image_format())?;
            }
        }

        tracing::info!("Wrote {}x{} preview to {:?}", img.width(), img.height(), output_path);
        Ok(())
    }
}
