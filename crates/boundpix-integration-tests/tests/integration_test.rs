use boundpix_common::{EdgeConstraint, MediaFormat, PathManager, PixelSize, TotalPixelLimit};
use boundpix_core::{
    bounded_target_size, BatchJob, BatchProcessor, BoundedDecoder, DecodeJob, DecodeRequest,
    DownsampleOptions, Downsampler, ProcessingQueue,
};
use boundpix_formats::{ImageCodec, PropertyValue};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tempfile::TempDir;

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut bytes, format)
        .unwrap();
    bytes.into_inner()
}

fn downsampler(temp_dir: &TempDir) -> Downsampler {
    Downsampler::with_parts(
        PathManager::with_output_dir(temp_dir.path()).unwrap(),
        BoundedDecoder::new(),
    )
}

#[test]
fn test_short_edge_cap_end_to_end() {
    let bytes = encode(4000, 3000, ImageFormat::Png);
    let request = DecodeRequest::new(&bytes)
        .with_edges(Some(1000.0), None)
        .eager(true);

    let decoded = BoundedDecoder::new().decode(&request).unwrap();
    assert_eq!(decoded.original_size, PixelSize::new(4000.0, 3000.0));
    assert_eq!(decoded.target_size, PixelSize::new(1333.0, 1000.0));
    assert_eq!(decoded.raster.dimensions(), (1333, 1000));
}

#[test]
fn test_pixel_limit_end_to_end() {
    let bytes = encode(4000, 3000, ImageFormat::Jpeg);
    let request = DecodeRequest::new(&bytes)
        .with_pixel_limit(TotalPixelLimit::new(9_000_000.0).unwrap())
        .eager(true);

    let decoded = BoundedDecoder::new().decode(&request).unwrap();
    assert_eq!(decoded.target_size, PixelSize::new(3464.0, 2598.0));
    assert_eq!(decoded.raster.dimensions(), (3464, 2598));
    assert!(decoded.raster.size().area() <= 9_000_000.0);
}

#[test]
fn test_upscale_request_is_ignored() {
    let bytes = encode(100, 100, ImageFormat::Png);
    let request = DecodeRequest::new(&bytes).with_edges(Some(500.0), None);

    let decoded = BoundedDecoder::new().decode(&request).unwrap();
    assert_eq!(decoded.target_size, PixelSize::new(100.0, 100.0));
    assert_eq!(decoded.raster.dimensions(), (100, 100));
}

#[test]
fn test_unrecognized_bytes_yield_none() {
    let decoder = BoundedDecoder::new();
    assert!(decoder.decode(&DecodeRequest::new(&[])).is_none());
    assert!(decoder
        .decode(&DecodeRequest::new(b"%PDF-1.7 definitely not pixels"))
        .is_none());

    // Valid signature, truncated header chunks
    let mut truncated = encode(64, 64, ImageFormat::Png);
    truncated.truncate(40);
    assert!(decoder.decode(&DecodeRequest::new(&truncated)).is_none());
}

#[test]
fn test_truncated_pixel_data() {
    let mut truncated = encode(64, 64, ImageFormat::Png);
    let idat = truncated.windows(4).position(|w| w == b"IDAT").unwrap();
    truncated.truncate(idat + 8);
    let decoder = BoundedDecoder::new();

    // Eager decoding reports the broken body as no image
    let request = DecodeRequest::new(&truncated).with_edges(None, Some(32.0));
    assert!(decoder.decode(&request.eager(true)).is_none());

    // A lazy raster knows its size from the header and fails on first access
    let lazy = decoder.decode(&request).unwrap();
    assert_eq!(lazy.raster.dimensions(), (32, 32));
    assert!(lazy.raster.image().is_err());
}

#[test]
fn test_large_sources_decode_below_allocation_ceiling() {
    let codec = ImageCodec::new().with_max_decode_alloc(Some(1024 * 1024));
    let decoder = BoundedDecoder::with_codec(codec);

    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::new_luma8(4000, 4000)
        .write_to(&mut bytes, ImageFormat::Png)
        .unwrap();
    let png = bytes.into_inner();
    let request = DecodeRequest::new(&png)
        .with_edges(None, Some(512.0))
        .eager(true);
    let decoded = decoder.decode(&request).unwrap();
    assert_eq!(decoded.raster.dimensions(), (512, 512));

    let jpeg = encode(2048, 1536, ImageFormat::Jpeg);
    let request = DecodeRequest::new(&jpeg)
        .with_edges(None, Some(256.0))
        .eager(true);
    let decoded = decoder.decode(&request).unwrap();
    assert_eq!(decoded.raster.dimensions(), (256, 192));
}

#[test]
fn test_long_edge_pass_after_skipped_short_edge() {
    let target = bounded_target_size(
        PixelSize::new(4000.0, 500.0),
        EdgeConstraint::new(Some(1000.0), Some(1500.0)),
        TotalPixelLimit::default(),
    );
    assert_eq!(target, PixelSize::new(1500.0, 187.0));

    let bytes = encode(4000, 500, ImageFormat::Png);
    let request = DecodeRequest::new(&bytes).with_edges(Some(1000.0), Some(1500.0));
    let decoded = BoundedDecoder::new().decode(&request).unwrap();

    let (width, height) = decoded.raster.dimensions();
    assert_eq!(width, 1500);
    assert!(height.abs_diff(187) <= 1);
}

#[test]
fn test_file_workflow() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("scan.tiff");
    DynamicImage::new_rgba8(1200, 900).save(&input).unwrap();

    let downsampler = downsampler(&temp_dir);

    let report = downsampler.inspect(&input).unwrap();
    assert_eq!(
        report.properties["Format"],
        PropertyValue::Text("TIFF".into())
    );
    assert_eq!(report.properties["HasAlpha"], PropertyValue::Flag(true));

    let options = DownsampleOptions {
        constraint: EdgeConstraint::short_edge(300.0),
        output_format: Some(MediaFormat::Jpeg),
        eager: true,
        ..Default::default()
    };
    let outcome = downsampler.downsample_file(&input, &options, None).unwrap();

    assert_eq!(outcome.output_dimensions, (400, 300));
    assert_eq!(MediaFormat::from_path(&outcome.output_path), Some(MediaFormat::Jpeg));

    let written = image::open(&outcome.output_path).unwrap();
    assert_eq!((written.width(), written.height()), (400, 300));
}

#[tokio::test]
async fn test_large_batch_processing() {
    let temp_dir = TempDir::new().unwrap();

    let mut jobs = Vec::new();
    for i in 0..40 {
        let input = temp_dir.path().join(format!("img_{:03}.png", i));
        DynamicImage::new_rgb8(256, 128).save(&input).unwrap();
        jobs.push(BatchJob {
            input,
            options: DownsampleOptions {
                constraint: EdgeConstraint::long_edge(64.0),
                ..Default::default()
            },
            output_path: Some(temp_dir.path().join("out")),
        });
    }

    let processor = BatchProcessor::new(downsampler(&temp_dir), 0);
    let results = processor.process_batch_sync(jobs).await;

    assert_eq!(results.len(), 40);
    for result in &results {
        let outcome = result.as_ref().unwrap();
        assert_eq!(outcome.output_dimensions, (64, 32));
        assert!(outcome.output_path.starts_with(temp_dir.path().join("out")));
    }
}

#[tokio::test]
async fn test_queue_preserves_submission_order() {
    let queue = ProcessingQueue::new(BoundedDecoder::new()).unwrap();

    let sizes = [(80, 40), (40, 80), (300, 300)];
    let jobs: Vec<_> = sizes
        .iter()
        .map(|&(w, h)| {
            DecodeJob::new(encode(w, h, ImageFormat::Png))
                .with_constraint(EdgeConstraint::long_edge(60.0))
        })
        .collect();

    let mut dimensions = Vec::new();
    for job in jobs {
        dimensions.push(queue.submit(job).await.unwrap().raster.dimensions());
    }

    assert_eq!(dimensions, vec![(60, 30), (30, 60), (60, 60)]);
}
