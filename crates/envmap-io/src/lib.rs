//! # envmap-io
//!
//! File I/O for cube-map textures.
//!
//! This crate reads and writes the four containers commonly used to ship
//! image-based-lighting textures, preserving mip chains and cube faces
//! wherever the container can express them:
//!
//! | Format | Read | Write | Faces | Mips | Pixel formats |
//! |--------|------|-------|-------|------|---------------|
//! | DDS | Yes | Yes | 1 or 6 | Yes | BGR8, BGRA8, RGBA16, RGBA16F, RGBA32F |
//! | KTX | Yes | Yes | 1 or 6 | Yes | RGB8/16/16F/32F, RGBA8/16/16F/32F |
//! | HDR | Yes | Yes | 1 | No | RGBE |
//! | TGA | Yes | Yes | 1 | No | BGR8, BGRA8 |
//!
//! # Architecture
//!
//! Each format module provides a reader and writer struct implementing
//! [`FormatReader`] / [`FormatWriter`], stream-level `decode` / `encode`
//! functions, and `read` / `write` convenience wrappers. The top-level
//! [`load`] and [`save`] functions dispatch on container magic (see
//! [`FileFormat`]) and handle optional pixel-format conversion around the
//! codec call.
//!
//! # Quick start
//!
//! ```ignore
//! use envmap_io::{load, save, FileFormat};
//! use envmap_core::TextureFormat;
//!
//! // Container chosen by magic number, not extension.
//! let image = load("environment.hdr")?;
//!
//! // Convert and save; ".dds" is appended to the stem.
//! save(&image, "environment", FileFormat::Dds, Some(TextureFormat::Rgba16F))?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod detect;
mod error;
mod traits;

pub mod dds;
pub mod hdr;
pub mod ktx;
pub mod tga;

pub use detect::FileFormat;
pub use error::{IoError, IoResult};
pub use traits::{FormatReader, FormatWriter, ReadSeek, WriteSeek};

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use envmap_core::{convert, Image, TextureFormat};

/// Loads an image, detecting the container from its magic bytes.
///
/// # Errors
///
/// [`IoError::BadMagic`] when no container claims the file; otherwise
/// whatever the chosen codec reports.
pub fn load<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 4];
    let n = reader.read(&mut magic)?;
    reader.seek(SeekFrom::Start(0))?;

    let format = FileFormat::from_bytes(&magic[..n]).ok_or(IoError::BadMagic)?;
    debug!(path = %path.display(), container = format.name(), "loading image");

    match format {
        FileFormat::Dds => dds::decode(&mut reader),
        FileFormat::Ktx => ktx::decode(&mut reader),
        FileFormat::Hdr => hdr::decode(&mut reader),
        FileFormat::Tga => tga::decode(&mut reader),
    }
}

/// Loads an image and converts it to `convert_to` when it arrives in a
/// different pixel format.
pub fn load_as<P: AsRef<Path>>(path: P, convert_to: TextureFormat) -> IoResult<Image> {
    let mut image = load(path)?;
    convert::convert_in_place(&mut image, convert_to);
    Ok(image)
}

/// Saves an image, appending the container's extension to `path_stem`.
///
/// With `convert_to` the image is first converted to that pixel format.
/// The (possibly converted) format must be in the container's legal set;
/// otherwise the save is refused. Returns the full path written.
///
/// # Errors
///
/// [`IoError::UnsupportedFormat`] when the pixel format is not legal for
/// the container; otherwise whatever the codec reports.
pub fn save<P: AsRef<Path>>(
    image: &Image,
    path_stem: P,
    file_type: FileFormat,
    convert_to: Option<TextureFormat>,
) -> IoResult<PathBuf> {
    let to_write = match convert_to {
        Some(format) => convert::image_ref_or_convert(image, format),
        None => convert::RefOrOwned::Borrowed(image),
    };

    if !file_type.valid_formats().contains(&to_write.format) {
        let valid: Vec<&str> = file_type.valid_formats().iter().map(|f| f.name()).collect();
        warn!(
            format = %to_write.format,
            container = file_type.name(),
            valid = valid.join(" "),
            "refusing to save: pixel format not supported by container"
        );
        return Err(IoError::UnsupportedFormat(format!(
            "{} cannot be stored in {}; valid formats: {}",
            to_write.format,
            file_type.name(),
            valid.join(" ")
        )));
    }

    let mut path = path_stem.as_ref().as_os_str().to_owned();
    path.push(".");
    path.push(file_type.extension());
    let path = PathBuf::from(path);
    debug!(path = %path.display(), container = file_type.name(), "saving image");

    match file_type {
        FileFormat::Dds => dds::write(&path, &to_write)?,
        FileFormat::Ktx => ktx::write(&path, &to_write)?,
        FileFormat::Hdr => hdr::write(&path, &to_write)?,
        FileFormat::Tga => tga::write(&path, &to_write)?,
    }

    Ok(path)
}
