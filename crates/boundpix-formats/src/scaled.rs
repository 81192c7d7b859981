//! Reduced-resolution decoding.
//!
//! JPEG sources are decoded through the DCT scaler at the smallest factor
//! that still covers the target. PNG rows are averaged into the target grid
//! as they stream out of the inflater, so no full-resolution frame is held.
//! Both return `Ok(None)` for layouts they do not handle and the caller falls
//! back to a full decode.

use boundpix_common::{Error, Result};
use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};

/// Decode a JPEG at 1/8, 1/4, 1/2 or full scale, whichever is the smallest
/// that is at least `width` x `height`.
pub fn decode_jpeg(
    bytes: &[u8],
    width: u32,
    height: u32,
    max_alloc: Option<u64>,
) -> Result<Option<DynamicImage>> {
    let (Ok(width), Ok(height)) = (u16::try_from(width), u16::try_from(height)) else {
        return Ok(None);
    };

    let mut decoder = jpeg_decoder::Decoder::new(bytes);
    if let Err(e) = decoder.read_info() {
        tracing::debug!("jpeg header rejected by scaler: {}", e);
        return Ok(None);
    }
    let Some(info) = decoder.info() else {
        return Ok(None);
    };
    let channels: u64 = match info.pixel_format {
        jpeg_decoder::PixelFormat::L8 => 1,
        jpeg_decoder::PixelFormat::RGB24 => 3,
        other => {
            tracing::debug!("jpeg {:?} not scaled, using full decode", other);
            return Ok(None);
        }
    };

    let (scaled_width, scaled_height) = match decoder.scale(width, height) {
        Ok(dims) => dims,
        Err(e) => {
            tracing::debug!("jpeg scaler refused {}x{}: {}", width, height, e);
            return Ok(None);
        }
    };

    let needed = scaled_width as u64 * scaled_height as u64 * channels;
    if let Some(max_alloc) = max_alloc {
        if needed > max_alloc {
            return Err(Error::DecodeFailure(format!(
                "decoding jpeg at {}x{} needs {} bytes, ceiling is {}",
                scaled_width, scaled_height, needed, max_alloc
            )));
        }
    }

    let pixels = decoder
        .decode()
        .map_err(|e| Error::DecodeFailure(e.to_string()))?;

    tracing::debug!(
        "jpeg {}x{} decoded at {}x{}",
        info.width,
        info.height,
        scaled_width,
        scaled_height
    );

    let (w, h) = (scaled_width as u32, scaled_height as u32);
    let image = match channels {
        1 => GrayImage::from_raw(w, h, pixels).map(DynamicImage::ImageLuma8),
        _ => RgbImage::from_raw(w, h, pixels).map(DynamicImage::ImageRgb8),
    };
    image.map(Some).ok_or_else(|| {
        Error::DecodeFailure(format!("jpeg scaler returned a short {}x{} buffer", w, h))
    })
}

/// Stream a non-interlaced PNG and box-average it down to exactly
/// `width` x `height`.
pub fn decode_png(bytes: &[u8], width: u32, height: u32) -> Result<Option<DynamicImage>> {
    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = match decoder.read_info() {
        Ok(reader) => reader,
        Err(e) => {
            tracing::debug!("png header rejected by row reader: {}", e);
            return Ok(None);
        }
    };

    let info = reader.info();
    let (source_width, source_height) = (info.width, info.height);
    if info.interlaced
        || source_width == 0
        || source_height == 0
        || width == 0
        || height == 0
        || width > source_width
        || height > source_height
    {
        return Ok(None);
    }

    let channels = match reader.output_color_type() {
        (png::ColorType::Grayscale, png::BitDepth::Eight) => 1,
        (png::ColorType::GrayscaleAlpha, png::BitDepth::Eight) => 2,
        (png::ColorType::Rgb, png::BitDepth::Eight) => 3,
        (png::ColorType::Rgba, png::BitDepth::Eight) => 4,
        other => {
            tracing::debug!("png output {:?} not streamed, using full decode", other);
            return Ok(None);
        }
    };

    let mut reducer = BoxReducer::new(channels, (source_width, source_height), (width, height));
    for y in 0..source_height {
        let row = reader
            .next_row()
            .map_err(|e| Error::DecodeFailure(e.to_string()))?
            .ok_or_else(|| Error::DecodeFailure(format!("png ended at row {}", y)))?;
        reducer.push_row(y, row.data())?;
    }
    let pixels = reducer.finish();

    tracing::debug!(
        "png {}x{} streamed down to {}x{}",
        source_width,
        source_height,
        width,
        height
    );

    let image = match channels {
        1 => GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8),
        2 => GrayAlphaImage::from_raw(width, height, pixels).map(DynamicImage::ImageLumaA8),
        3 => RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
        _ => RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8),
    };
    image.map(Some).ok_or_else(|| {
        Error::DecodeFailure(format!("png reduction produced a short {}x{} buffer", width, height))
    })
}

/// Averages source rows into a smaller grid, one output row at a time.
///
/// Source column `x` lands in target column `x * dst_w / src_w`, source row
/// `y` in target row `y * dst_h / src_h`. Requires `dst <= src` on both axes
/// so every target cell receives at least one source pixel.
struct BoxReducer {
    channels: usize,
    source_width: u32,
    source_height: u32,
    target_height: u32,
    column_bins: Vec<usize>,
    column_counts: Vec<u64>,
    sums: Vec<u64>,
    current_bin: u32,
    rows_in_bin: u64,
    out: Vec<u8>,
}

impl BoxReducer {
    fn new(channels: usize, source: (u32, u32), target: (u32, u32)) -> Self {
        let (source_width, source_height) = source;
        let (target_width, target_height) = target;

        let column_bins: Vec<usize> = (0..source_width as u64)
            .map(|x| (x * target_width as u64 / source_width as u64) as usize)
            .collect();
        let mut column_counts = vec![0u64; target_width as usize];
        for &bin in &column_bins {
            column_counts[bin] += 1;
        }

        Self {
            channels,
            source_width,
            source_height,
            target_height,
            column_bins,
            column_counts,
            sums: vec![0; target_width as usize * channels],
            current_bin: 0,
            rows_in_bin: 0,
            out: Vec::with_capacity(target_width as usize * target_height as usize * channels),
        }
    }

    fn push_row(&mut self, y: u32, row: &[u8]) -> Result<()> {
        let row_len = self.source_width as usize * self.channels;
        if row.len() < row_len {
            return Err(Error::DecodeFailure(format!(
                "row {} has {} bytes, expected {}",
                y,
                row.len(),
                row_len
            )));
        }

        let bin = (y as u64 * self.target_height as u64 / self.source_height as u64) as u32;
        if bin != self.current_bin {
            self.flush();
            self.current_bin = bin;
        }

        for (pixel, &column) in row[..row_len]
            .chunks_exact(self.channels)
            .zip(&self.column_bins)
        {
            let base = column * self.channels;
            for (sum, &value) in self.sums[base..base + self.channels].iter_mut().zip(pixel) {
                *sum += value as u64;
            }
        }
        self.rows_in_bin += 1;
        Ok(())
    }

    fn flush(&mut self) {
        if self.rows_in_bin == 0 {
            return;
        }
        for (i, sum) in self.sums.iter_mut().enumerate() {
            let count = self.column_counts[i / self.channels] * self.rows_in_bin;
            self.out.push(((*sum + count / 2) / count) as u8);
            *sum = 0;
        }
        self.rows_in_bin = 0;
    }

    fn finish(mut self) -> Vec<u8> {
        self.flush();
        self.out
    }
}
