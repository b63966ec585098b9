//! Error types for codec and dispatch operations.

use std::io;
use thiserror::Error;

/// Result type for I/O operations.
pub type IoResult<T> = std::result::Result<T, IoError>;

/// Errors raised by the file codecs and the load/save dispatch layer.
///
/// Recoverable container quirks (zero mip counts, stated sizes that
/// disagree with computed ones, faces dropped by single-image containers)
/// are warnings on the `tracing` sink, not errors; decoding fails only
/// when the stream cannot be interpreted at all. On failure no partial
/// image is handed to the caller.
#[derive(Debug, Error)]
pub enum IoError {
    /// File or stream I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream does not start with a recognized container magic.
    #[error("unrecognized container (bad magic)")]
    BadMagic,

    /// A header field violates the container specification.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// The container was recognized but the pixel layout is not in the
    /// container's supported set.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// An in-memory image operation failed during decode or encode.
    #[error(transparent)]
    Image(#[from] envmap_core::Error),
}
