//! Reader and writer traits shared by the format codecs.
//!
//! Every container module provides a reader struct and a writer struct
//! implementing [`FormatReader`] and [`FormatWriter`], plus free
//! `read`/`write` convenience functions for the default options:
//!
//! ```text
//! +-----------------+     +------------------+
//! | FormatReader<O> |     | FormatWriter<O>  |
//! +-----------------+     +------------------+
//!         ^                       ^
//!         |                       |
//! +-------+-------+       +-------+-------+
//! | DdsReader     |       | DdsWriter     |
//! | KtxReader     |       | KtxWriter     |
//! | HdrReader     |       | HdrWriter     |
//! | TgaReader     |       | TgaWriter     |
//! +---------------+       +---------------+
//! ```
//!
//! Readers parse from files or memory; writers emit to files or memory.
//! Codecs acquire their file handle on entry and release it on every exit
//! path, error paths included, through RAII.

use crate::IoResult;
use envmap_core::{Image, TextureFormat};
use std::io::{Read, Seek, Write};
use std::path::Path;

/// Combined bound for seekable input streams.
///
/// Automatically implemented for any `Read + Seek` type.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// Combined bound for seekable output streams.
pub trait WriteSeek: Write + Seek {}
impl<T: Write + Seek> WriteSeek for T {}

/// Format reader trait.
///
/// # Type Parameter
///
/// * `O` - Reader options type; `()` when the format has none.
pub trait FormatReader<O: Default = ()>: Send + Sync {
    /// Format name for error messages, e.g. `"DDS"`.
    fn format_name(&self) -> &'static str;

    /// File extensions this container uses (lowercase, without dot).
    fn extensions(&self) -> &'static [&'static str];

    /// Fast magic-byte check over the first bytes of a file.
    fn can_read(&self, header: &[u8]) -> bool;

    /// Reads an image from a file path.
    fn read<P: AsRef<Path>>(&self, path: P) -> IoResult<Image>;

    /// Reads an image from a complete in-memory file.
    fn read_from_memory(&self, data: &[u8]) -> IoResult<Image>;

    /// Creates a reader with specific options.
    fn with_options(options: O) -> Self
    where
        Self: Sized;
}

/// Format writer trait.
///
/// # Type Parameter
///
/// * `O` - Writer options type; `()` when the format has none.
pub trait FormatWriter<O: Default = ()>: Send + Sync {
    /// Format name for error messages.
    fn format_name(&self) -> &'static str;

    /// File extensions this container uses.
    fn extensions(&self) -> &'static [&'static str];

    /// Pixel formats this container can hold without conversion.
    fn valid_formats(&self) -> &'static [TextureFormat];

    /// Writes an image to a file path.
    fn write<P: AsRef<Path>>(&self, path: P, image: &Image) -> IoResult<()>;

    /// Writes an image to a byte vector.
    fn write_to_memory(&self, image: &Image) -> IoResult<Vec<u8>>;

    /// Creates a writer with specific options.
    fn with_options(options: O) -> Self
    where
        Self: Sized;
}
