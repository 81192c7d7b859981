use fast_image_resize as fr;
use image::imageops::FilterType;
use image::DynamicImage;

/// Downscale a decoded frame to exactly `width` x `height`.
///
/// Uses the SIMD resizer and falls back to `image::resize_exact` for pixel
/// layouts it rejects.
pub fn downscale(image: &DynamicImage, width: u32, height: u32, filter: FilterType) -> DynamicImage {
    match resize_with_fast_image_resize(image, width, height, filter) {
        Ok(resized) => resized,
        Err(err) => {
            tracing::warn!(
                "fast_image_resize failed ({}), falling back to resize_exact",
                err
            );
            image.resize_exact(width, height, filter)
        }
    }
}

fn resize_with_fast_image_resize(
    image: &DynamicImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DynamicImage, fr::ResizeError> {
    let mut dst = DynamicImage::new(width, height, image.color());

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new().resize_alg(to_resize_alg(filter));
    resizer.resize(image, &mut dst, Some(&options))?;

    Ok(dst)
}

fn to_resize_alg(filter: FilterType) -> fr::ResizeAlg {
    match filter {
        FilterType::Nearest => fr::ResizeAlg::Nearest,
        FilterType::Triangle => fr::ResizeAlg::Convolution(fr::FilterType::Bilinear),
        FilterType::CatmullRom => fr::ResizeAlg::Convolution(fr::FilterType::CatmullRom),
        FilterType::Gaussian => fr::ResizeAlg::Convolution(fr::FilterType::Mitchell),
        FilterType::Lanczos3 => fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3),
    }
}

/// Parse a filter name as used in config files
pub fn parse_filter(name: &str) -> Option<FilterType> {
    match name.to_lowercase().as_str() {
        "nearest" => Some(FilterType::Nearest),
        "triangle" | "bilinear" => Some(FilterType::Triangle),
        "catmullrom" | "catmull-rom" => Some(FilterType::CatmullRom),
        "gaussian" => Some(FilterType::Gaussian),
        "lanczos3" | "lanczos" => Some(FilterType::Lanczos3),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downscale_dimensions() {
        let img = DynamicImage::new_rgb8(400, 300);
        let resized = downscale(&img, 200, 150, FilterType::Lanczos3);
        assert_eq!((resized.width(), resized.height()), (200, 150));
        assert_eq!(resized.color(), img.color());
    }

    #[test]
    fn test_downscale_keeps_alpha() {
        let img = DynamicImage::new_rgba8(64, 64);
        let resized = downscale(&img, 16, 16, FilterType::Triangle);
        assert!(resized.color().has_alpha());
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter("Lanczos3"), Some(FilterType::Lanczos3));
        assert_eq!(parse_filter("bilinear"), Some(FilterType::Triangle));
        assert_eq!(parse_filter("bogus"), None);
    }
}
