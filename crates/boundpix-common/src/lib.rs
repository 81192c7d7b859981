pub mod bytes;
pub mod error;
pub mod format;
pub mod path;
pub mod size;

pub use bytes::ByteSize;
pub use error::{Error, Result};
pub use format::MediaFormat;
pub use path::PathManager;
pub use size::{EdgeConstraint, PixelSize, TotalPixelLimit};
