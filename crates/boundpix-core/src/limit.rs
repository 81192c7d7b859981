use crate::size_calculator::calculate_pixel_size;
use boundpix_common::{EdgeConstraint, PixelSize};
use boundpix_formats::{resize, FilterType};
use image::DynamicImage;

/// Shrink an already decoded image to satisfy `constraint`.
///
/// Returns the input untouched when the caps leave its size unchanged or
/// when it has no pixels.
pub fn limit(image: DynamicImage, constraint: EdgeConstraint, filter: FilterType) -> DynamicImage {
    if image.width() == 0 || image.height() == 0 {
        return image;
    }

    let original = PixelSize::from_dimensions(image.width(), image.height());
    let scaled = calculate_pixel_size(original, constraint).floor();

    let width = (scaled.width as u32).max(1);
    let height = (scaled.height as u32).max(1);

    if (width, height) == (image.width(), image.height()) {
        return image;
    }

    tracing::debug!(
        "Limiting {}x{} → {}x{}",
        image.width(),
        image.height(),
        width,
        height
    );
    resize::downscale(&image, width, height, filter)
}

/// [`limit`] with caps in display points, converted by the screen `scale`
pub fn limit_in_points(
    image: DynamicImage,
    short_edge_points: Option<f64>,
    long_edge_points: Option<f64>,
    scale: f64,
    filter: FilterType,
) -> DynamicImage {
    let constraint = EdgeConstraint::from_points(short_edge_points, long_edge_points, scale);
    limit(image, constraint, filter)
}
