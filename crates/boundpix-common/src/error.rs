use std::path::PathBuf;

/// Unified error type for all boundpix operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unrecognized image container: {0}")]
    UnrecognizedContainer(String),

    #[error("Missing image metadata: {0}")]
    MissingMetadata(String),

    #[error("Decode failed: {0}")]
    DecodeFailure(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid file path: {0}")]
    InvalidPath(PathBuf),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
