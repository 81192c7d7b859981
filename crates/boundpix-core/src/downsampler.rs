use crate::bounded_decoder::{BoundedDecoder, DecodeRequest};
use boundpix_common::{
    ByteSize, EdgeConstraint, Error, MediaFormat, PathManager, PixelSize, Result, TotalPixelLimit,
};
use boundpix_formats::{ContainerProperties, ImageCodec, ImageEncoder, SourceBytes};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Size policy and output settings for a file downsample
#[derive(Debug, Clone, Copy, Default)]
pub struct DownsampleOptions {
    pub constraint: EdgeConstraint,
    pub limit: TotalPixelLimit,
    pub eager: bool,
    /// Preview format; defaults to the input's own format, then PNG
    pub output_format: Option<MediaFormat>,
}

/// Result of writing one bounded preview
#[derive(Debug, Clone)]
pub struct DownsampleOutcome {
    pub output_path: PathBuf,
    pub original_size: PixelSize,
    pub target_size: PixelSize,
    pub output_dimensions: (u32, u32),
}

/// Container diagnostics for one file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub properties: ContainerProperties,
    pub size_in_kb: usize,
    pub size_in_mb: f64,
}

/// Bounded decode engine for image files on disk
pub struct Downsampler {
    path_manager: PathManager,
    decoder: BoundedDecoder<ImageCodec>,
}

impl Downsampler {
    pub fn with_parts(path_manager: PathManager, decoder: BoundedDecoder<ImageCodec>) -> Self {
        Self {
            path_manager,
            decoder,
        }
    }

    pub fn path_manager(&self) -> &PathManager {
        &self.path_manager
    }

    /// Decode `input` to a bounded size and write it as a preview
    pub fn downsample_file(
        &self,
        input: &Path,
        options: &DownsampleOptions,
        output: Option<PathBuf>,
    ) -> Result<DownsampleOutcome> {
        self.path_manager.validate_input(input)?;

        let bytes = SourceBytes::open(input)?;
        let request = DecodeRequest::new(&bytes)
            .with_constraint(options.constraint)
            .with_pixel_limit(options.limit)
            .eager(options.eager);

        let decoded = self.decoder.decode(&request).ok_or_else(|| {
            Error::DecodeFailure(format!("Could not produce a bounded image from {:?}", input))
        })?;

        let format = options
            .output_format
            .or_else(|| MediaFormat::from_path(input))
            .unwrap_or(MediaFormat::Png);

        let image = decoded.raster.image()?;
        let output_dimensions = decoded.raster.dimensions();
        let output_path = self.path_manager.generate_unique_path(
            input,
            output_dimensions,
            format.extension(),
            output,
        )?;

        ImageEncoder::encode(image, &output_path, format)?;

        tracing::info!(
            "Downsampled {:?} {} → {}x{}",
            input,
            decoded.original_size,
            output_dimensions.0,
            output_dimensions.1
        );

        Ok(DownsampleOutcome {
            output_path,
            original_size: decoded.original_size,
            target_size: decoded.target_size,
            output_dimensions,
        })
    }

    /// Downsample a batch of files in parallel
    pub fn downsample_batch(
        &self,
        inputs: Vec<PathBuf>,
        options: &DownsampleOptions,
        output_dir: Option<PathBuf>,
    ) -> Vec<Result<DownsampleOutcome>> {
        inputs
            .par_iter()
            .map(|input| self.downsample_file(input, options, output_dir.clone()))
            .collect()
    }

    /// Container properties and byte sizes of `input`
    pub fn inspect(&self, input: &Path) -> Result<FileReport> {
        self.path_manager.validate_input(input)?;

        let bytes = SourceBytes::open(input)?;
        Ok(FileReport {
            properties: self.decoder.container_properties(&bytes),
            size_in_kb: bytes.size_in_kb(),
            size_in_mb: bytes.size_in_mb(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boundpix_formats::PropertyValue;
    use image::DynamicImage;

    fn downsampler(dir: &Path) -> Downsampler {
        Downsampler::with_parts(
            PathManager::with_output_dir(dir).unwrap(),
            BoundedDecoder::new(),
        )
    }

    #[test]
    fn test_downsample_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input_path = temp_dir.path().join("photo.png");
        DynamicImage::new_rgb8(400, 200).save(&input_path).unwrap();

        let options = DownsampleOptions {
            constraint: EdgeConstraint::long_edge(100.0),
            ..Default::default()
        };
        let outcome = downsampler(temp_dir.path())
            .downsample_file(&input_path, &options, None)
            .unwrap();

        assert!(outcome.output_path.exists());
        assert_eq!(outcome.output_dimensions, (100, 50));
        assert_eq!(outcome.original_size, PixelSize::new(400.0, 200.0));
        assert_eq!(outcome.output_path.extension().unwrap(), "png");
    }

    #[test]
    fn test_non_image_file_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input_path = temp_dir.path().join("notes.png");
        std::fs::write(&input_path, b"just text").unwrap();

        let result = downsampler(temp_dir.path()).downsample_file(
            &input_path,
            &DownsampleOptions::default(),
            None,
        );
        assert!(matches!(result, Err(Error::DecodeFailure(_))));
    }

    #[test]
    fn test_batch_downsample() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut inputs = Vec::new();

        for i in 0..3 {
            let path = temp_dir.path().join(format!("test{}.png", i));
            DynamicImage::new_rgb8(50, 50).save(&path).unwrap();
            inputs.push(path);
        }

        let options = DownsampleOptions {
            output_format: Some(MediaFormat::Jpeg),
            ..Default::default()
        };
        let results = downsampler(temp_dir.path()).downsample_batch(inputs, &options, None);

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.is_ok()));
    }

    #[test]
    fn test_inspect() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input_path = temp_dir.path().join("photo.png");
        DynamicImage::new_rgb8(30, 20).save(&input_path).unwrap();

        let report = downsampler(temp_dir.path()).inspect(&input_path).unwrap();
        assert_eq!(report.properties["PixelWidth"], PropertyValue::Integer(30));
        assert_eq!(report.size_in_kb, 0);
        assert!(report.size_in_mb > 0.0);
    }
}
