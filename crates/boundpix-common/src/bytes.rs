const KB: usize = 1024;
const MB: f64 = 1024.0 * 1024.0;

/// Size conversions for compressed byte buffers
pub trait ByteSize {
    /// Whole kilobytes, truncated
    fn size_in_kb(&self) -> usize;

    /// Megabytes, rounded up to 4 decimal places
    fn size_in_mb(&self) -> f64;
}

impl ByteSize for [u8] {
    fn size_in_kb(&self) -> usize {
        self.len() / KB
    }

    fn size_in_mb(&self) -> f64 {
        ((self.len() as f64 / MB) * 10_000.0).ceil() / 10_000.0
    }
}
