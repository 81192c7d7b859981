pub mod batch;
pub mod bounded_decoder;
pub mod downsampler;
pub mod limit;
pub mod queue;
pub mod size_calculator;

pub use batch::{BatchJob, BatchProcessor, BatchProgress};
pub use bounded_decoder::{BoundedDecoder, DecodeRequest, DecodedImage};
pub use downsampler::{DownsampleOptions, DownsampleOutcome, Downsampler, FileReport};
pub use limit::{limit, limit_in_points};
pub use queue::{DecodeJob, ProcessingQueue};
pub use size_calculator::{
    bounded_target_size, calculate_pixel_size, clamp_total_pixels, fit_long_edge, fit_short_edge,
};
