//! Error types for in-memory image operations.

use thiserror::Error;

use crate::format::TextureFormat;

/// Result type alias for core image operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by buffer construction, pixel access and remap operations.
///
/// Recoverable oddities (a mip count of zero in a file header, a stated face
/// size that disagrees with the computed one) are not errors; they are
/// reported through `tracing::warn!` and the operation proceeds.
#[derive(Debug, Error)]
pub enum Error {
    /// Pixel coordinate outside the addressed mip level or face range.
    #[error("pixel ({x}, {y}) mip {mip} face {face} out of bounds for {width}x{height}, {num_mips} mips, {num_faces} faces")]
    OutOfBounds {
        /// Requested column.
        x: u32,
        /// Requested row.
        y: u32,
        /// Requested mip level.
        mip: u8,
        /// Requested face index.
        face: u8,
        /// Width of the addressed mip level.
        width: u32,
        /// Height of the addressed mip level.
        height: u32,
        /// Mip levels present.
        num_mips: u8,
        /// Faces present.
        num_faces: u8,
    },

    /// A buffer was supplied whose length disagrees with the image metadata.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch {
        /// Size implied by width/height/format/mips/faces.
        expected: usize,
        /// Size of the supplied buffer.
        actual: usize,
    },

    /// An image does not have the shape a remap requires.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Required shape, e.g. "cubemap" or "6:1 horizontal strip".
        expected: String,
        /// Observed shape.
        actual: String,
    },

    /// The format is not usable for the attempted operation.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(TextureFormat),

    /// The operation's precondition does not hold and it was not applied.
    #[error("operation refused: {0}")]
    OperationRefused(String),
}

impl Error {
    /// Builds a [`Error::ShapeMismatch`] from display-able shape descriptions.
    pub fn shape(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Error::ShapeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
