//! Error types shared by every quill crate.

use thiserror::Error;

/// Result type for quill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or drawing a scene.
#[derive(Error, Debug)]
pub enum Error {
    /// Unrecognized keyword, wrong arity or out-of-domain value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Drawing or flushing after the surface was finished.
    #[error("surface has been finished")]
    SurfaceFinished,

    /// A surface cannot be created with these dimensions.
    #[error("invalid surface dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// No installed font matches the requested face.
    #[error("font not found: {0}")]
    FontNotFound(String),

    /// The backend cannot paint with this kind of source.
    #[error("unsupported source: {0}")]
    UnsupportedSource(String),

    /// PNG or PDF encoding failed.
    #[error("encoding failed: {0}")]
    Encode(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or conversion error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
