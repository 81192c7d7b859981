//! Target pixel size computation.
//!
//! Edge caps are applied as two sequential downscale passes, short edge
//! first, then long edge on the already adjusted size. The passes are not a
//! joint fit: a long-edge cap is compared against the short-edge result, not
//! against the original.

use boundpix_common::{EdgeConstraint, PixelSize, TotalPixelLimit};

/// Apply the edge caps in `constraint` to `original`.
///
/// Caps only ever shrink the size, and every step preserves aspect ratio.
pub fn calculate_pixel_size(original: PixelSize, constraint: EdgeConstraint) -> PixelSize {
    if constraint.is_unconstrained() {
        return original;
    }

    let size = match constraint.short() {
        Some(short_edge) => fit_short_edge(original, short_edge),
        None => original,
    };

    match constraint.long() {
        Some(long_edge) => fit_long_edge(size, long_edge),
        None => size,
    }
}

/// Shrink `size` so its short edge is at most `short_edge`
pub fn fit_short_edge(size: PixelSize, short_edge: f64) -> PixelSize {
    let current = size.short_edge();
    if short_edge < current {
        size.rescaled(current, short_edge)
    } else {
        size
    }
}

/// Shrink `size` so its long edge is at most `long_edge`
pub fn fit_long_edge(size: PixelSize, long_edge: f64) -> PixelSize {
    let current = size.long_edge();
    if long_edge < current {
        size.rescaled(current, long_edge)
    } else {
        size
    }
}

/// Bring `size` within `limit` total pixels, flooring each dimension.
///
/// A size already within the limit is only floored. Flooring never rounds
/// up, so the result stays within the limit.
pub fn clamp_total_pixels(size: PixelSize, limit: TotalPixelLimit) -> PixelSize {
    let limit = limit.get();

    let scaled = if size.area() > limit {
        // sqrt(area / limit) without forming an area that can overflow
        let scale = size.width.sqrt() * size.height.sqrt() / limit.sqrt();
        PixelSize::new(size.width / scale, size.height / scale)
    } else {
        size
    };

    let mut clamped = scaled.floor();

    // Float error in the shared scale can leave the product a hair over.
    // Refit the larger side against the other one, then step it down.
    if clamped.area() > limit {
        let (larger, other) = if clamped.width >= clamped.height {
            (&mut clamped.width, clamped.height)
        } else {
            (&mut clamped.height, clamped.width)
        };
        *larger = (limit / other).floor().min(*larger);
        while *larger * other > limit {
            *larger = step_down(*larger);
        }
    }

    clamped
}

/// Next whole value below `value`, also where `value - 1.0` rounds back to it
fn step_down(value: f64) -> f64 {
    let below = value - 1.0;
    if below < value {
        below
    } else {
        f64::from_bits(value.to_bits() - 1).floor()
    }
}

/// Edge caps followed by the total-pixel clamp: the size a bounded decode targets
pub fn bounded_target_size(
    original: PixelSize,
    constraint: EdgeConstraint,
    limit: TotalPixelLimit,
) -> PixelSize {
    clamp_total_pixels(calculate_pixel_size(original, constraint), limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(width: f64, height: f64) -> PixelSize {
        PixelSize::new(width, height)
    }

    fn limit(value: f64) -> TotalPixelLimit {
        TotalPixelLimit::new(value).unwrap()
    }

    #[test]
    fn test_unconstrained_returns_original() {
        let original = size(4000.0, 3000.0);
        assert_eq!(calculate_pixel_size(original, EdgeConstraint::none()), original);
    }

    #[test]
    fn test_non_positive_constraint_is_ignored() {
        let original = size(4000.0, 3000.0);
        let with_bad_short = EdgeConstraint::new(Some(-5.0), Some(2000.0));
        assert_eq!(
            calculate_pixel_size(original, with_bad_short),
            calculate_pixel_size(original, EdgeConstraint::long_edge(2000.0))
        );

        let all_bad = EdgeConstraint::new(Some(0.0), Some(0.0));
        assert_eq!(calculate_pixel_size(original, all_bad), original);
    }

    #[test]
    fn test_short_edge_downscale() {
        // 3000 → 1000 is a factor of 1/3
        let result = calculate_pixel_size(size(4000.0, 3000.0), EdgeConstraint::short_edge(1000.0));
        assert_eq!(result.height, 1000.0);
        assert!((result.width - 4000.0 / 3.0).abs() < 1e-9);

        let target = bounded_target_size(
            size(4000.0, 3000.0),
            EdgeConstraint::short_edge(1000.0),
            limit(15_000_000.0),
        );
        assert_eq!(target, size(1333.0, 1000.0));
    }

    #[test]
    fn test_pixel_limit_clamp() {
        let target = bounded_target_size(
            size(4000.0, 3000.0),
            EdgeConstraint::none(),
            limit(9_000_000.0),
        );
        assert_eq!(target, size(3464.0, 2598.0));
        assert!(target.area() <= 9_000_000.0);
    }

    #[test]
    fn test_never_upscales() {
        let original = size(100.0, 100.0);
        assert_eq!(
            calculate_pixel_size(original, EdgeConstraint::short_edge(500.0)),
            original
        );
        assert_eq!(
            calculate_pixel_size(original, EdgeConstraint::new(Some(500.0), Some(800.0))),
            original
        );
    }

    #[test]
    fn test_long_edge_applies_after_short_edge() {
        // Short edge 500 is already under 1000, only the long-edge pass fires
        let constraint = EdgeConstraint::new(Some(1000.0), Some(1500.0));
        let result = calculate_pixel_size(size(4000.0, 500.0), constraint);
        assert_eq!(result, size(1500.0, 187.5));

        let target = bounded_target_size(size(4000.0, 500.0), constraint, limit(15_000_000.0));
        assert_eq!(target, size(1500.0, 187.0));
    }

    #[test]
    fn test_sequential_differs_from_joint_fit() {
        // 6000x2000, short 1000 then long 2000:
        // short pass → 3000x1000, long pass → 2000x666.67.
        let constraint = EdgeConstraint::new(Some(1000.0), Some(2000.0));
        let result = calculate_pixel_size(size(6000.0, 2000.0), constraint);
        assert_eq!(result.width, 2000.0);
        assert!((result.height - 2000.0 / 3.0).abs() < 1e-9);

        // The long pass compares against the short-pass result (3000), not 6000
        let after_short = fit_short_edge(size(6000.0, 2000.0), 1000.0);
        assert_eq!(after_short, size(3000.0, 1000.0));
        assert_eq!(fit_long_edge(after_short, 3500.0), after_short);
    }

    #[test]
    fn test_portrait_orientation() {
        let result = calculate_pixel_size(size(3000.0, 4000.0), EdgeConstraint::long_edge(2000.0));
        assert_eq!(result, size(1500.0, 2000.0));
    }

    #[test]
    fn test_degenerate_size() {
        let zero = PixelSize::default();
        assert_eq!(calculate_pixel_size(zero, EdgeConstraint::short_edge(10.0)), zero);
        assert_eq!(clamp_total_pixels(zero, limit(1.0)), zero);
    }

    #[test]
    fn test_clamp_terminates_for_huge_sides() {
        let limit_value = 2f64.powi(60);
        let clamped = clamp_total_pixels(size(limit_value + 256.0, 1.0), limit(limit_value));
        assert!(clamped.area() <= limit_value);
        assert_eq!(clamped.height, 1.0);
        assert!(clamped.width > 0.0);

        let clamped = clamp_total_pixels(size(1e200, 1e200), limit(15_000_000.0));
        assert!(clamped.area() <= 15_000_000.0);
        assert!(clamped.width >= 3872.0);

        let clamped = clamp_total_pixels(size(3.0, 2f64.powi(55) + 8.0), limit(2f64.powi(55)));
        assert!(clamped.area() <= 2f64.powi(55));
    }

    #[test]
    fn test_tiny_limit_still_holds() {
        let target = clamp_total_pixels(size(100_000.0, 1.0), limit(50.0));
        assert!(target.area() <= 50.0);
    }
}
