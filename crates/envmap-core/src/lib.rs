//! # envmap-core
//!
//! Core image model for cube-map texture processing.
//!
//! This crate provides the foundational types used throughout the
//! envmap-rs workspace:
//!
//! - [`TextureFormat`] - the eleven supported pixel layouts plus a sentinel
//! - [`Image`] - an owned pixel buffer carrying a mip-chain and face-stack
//! - [`convert`] - pixel and whole-image conversion through the canonical
//!   linear RGBA32F representation
//!
//! ## Data model
//!
//! An [`Image`] is either planar (one face) or a cube map (six faces,
//! square). Faces are stored back to back, each with its full mip chain,
//! rows top-first. The canonical format for all processing is
//! [`TextureFormat::Rgba32F`]: operations that need arithmetic convert to
//! it, work, and convert back, so each format only has to implement two
//! pixel codecs.
//!
//! ## Crate structure
//!
//! ```text
//! envmap-core (this crate)
//!    ^
//!    |
//!    +-- envmap-ops (transforms, resize, mips, cube-map remaps)
//!    +-- envmap-io  (DDS / KTX / HDR / TGA codecs and dispatch)
//! ```
//!
//! ## Thread safety
//!
//! All operations are synchronous and run on the caller's thread. Distinct
//! [`Image`] values can be used from different threads without
//! coordination; shared read-only access needs no locking, and anything
//! that mutates a buffer takes `&mut`.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod convert;
pub mod error;
pub mod format;
pub mod image;

pub use convert::{
    from_rgba32f, image_convert, image_from_rgba32f, image_ref_or_convert, image_to_rgba32f,
    to_rgba32f, RefOrOwned,
};
pub use error::{Error, Result};
pub use format::{PixelDataType, TextureFormat};
pub use image::{data_size, Image, MipOffsets, CUBE_FACE_NUM, MAX_MIP_NUM};
