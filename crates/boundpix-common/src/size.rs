/// Default bound on `width * height` for a produced raster.
pub const DEFAULT_TOTAL_PIXEL_LIMIT: f64 = 15_000_000.0;

/// Image dimensions in (possibly fractional) pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelSize {
    pub width: f64,
    pub height: f64,
}

impl PixelSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn from_dimensions(width: u32, height: u32) -> Self {
        Self::new(width as f64, height as f64)
    }

    pub fn short_edge(&self) -> f64 {
        self.width.min(self.height)
    }

    pub fn long_edge(&self) -> f64 {
        self.width.max(self.height)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// True when either side is zero (usually a failed metadata read)
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Uniformly rescale so that `from` maps onto `to`.
    ///
    /// Multiplying before dividing keeps the edge that equals `from` landing
    /// exactly on `to`.
    pub fn rescaled(&self, from: f64, to: f64) -> Self {
        Self::new(self.width * to / from, self.height * to / from)
    }

    /// Width over height, `None` for a degenerate size
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.height > 0.0).then(|| self.width / self.height)
    }

    pub fn floor(&self) -> Self {
        Self::new(self.width.floor(), self.height.floor())
    }

    /// Whole-pixel dimensions, truncating any fraction
    pub fn to_dimensions(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }
}

impl From<(u32, u32)> for PixelSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self::from_dimensions(width, height)
    }
}

impl std::fmt::Display for PixelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Optional caps on an image's short and long edge, in pixels.
///
/// Non-positive and non-finite values count as "unconstrained".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeConstraint {
    short_edge: Option<f64>,
    long_edge: Option<f64>,
}

impl EdgeConstraint {
    pub fn new(short_edge: Option<f64>, long_edge: Option<f64>) -> Self {
        Self {
            short_edge: short_edge.filter(|v| v.is_finite() && *v > 0.0),
            long_edge: long_edge.filter(|v| v.is_finite() && *v > 0.0),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn short_edge(value: f64) -> Self {
        Self::new(Some(value), None)
    }

    pub fn long_edge(value: f64) -> Self {
        Self::new(None, Some(value))
    }

    /// Caps given in display points, converted with the screen scale factor
    pub fn from_points(short_edge: Option<f64>, long_edge: Option<f64>, scale: f64) -> Self {
        Self::new(short_edge.map(|v| v * scale), long_edge.map(|v| v * scale))
    }

    pub fn short(&self) -> Option<f64> {
        self.short_edge
    }

    pub fn long(&self) -> Option<f64> {
        self.long_edge
    }

    pub fn is_unconstrained(&self) -> bool {
        self.short_edge.is_none() && self.long_edge.is_none()
    }
}

/// Upper bound on `width * height` of a produced raster
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TotalPixelLimit(f64);

impl TotalPixelLimit {
    /// `None` unless `limit` is positive and finite
    pub fn new(limit: f64) -> Option<Self> {
        (limit.is_finite() && limit > 0.0).then_some(Self(limit))
    }

    pub fn get(&self) -> f64 {
        self.0
    }
}

impl Default for TotalPixelLimit {
    fn default() -> Self {
        Self(DEFAULT_TOTAL_PIXEL_LIMIT)
    }
}
