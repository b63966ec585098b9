//! # envmap-ops
//!
//! Image operations for cube-map textures.
//!
//! This crate provides the processing layer on top of
//! [`envmap-core`](envmap_core): in-place geometric transforms, box
//! resizing, mip-chain generation, scalar color adjustments, cube-map
//! geometry math, and conversions between the common cube-map storage
//! layouts (face stack, cross, horizontal strip, face list, lat-long).
//!
//! # Modules
//!
//! - [`transform`] - per-face in-place flips and quarter-turn rotations
//! - [`resize`] - box-average downsampling
//! - [`mip`] - mip-chain generation
//! - [`color`] - gamma and clamping
//! - [`geometry`] - face/direction/lat-long coordinate math
//! - [`remap`] - cube-map layout conversions
//!
//! # Example
//!
//! ```
//! use envmap_core::{Image, TextureFormat};
//! use envmap_ops::{mip, remap};
//!
//! // Build a tiny cube map, give it a mip chain, unfold it to a strip.
//! let mut cube = Image::new(8, 8, TextureFormat::Rgba8, 1, 6);
//! mip::generate_mip_chain(&mut cube, 4);
//! let strip = remap::hstrip_from_cubemap(&cube).unwrap();
//! assert_eq!(strip.width, 48);
//! ```
//!
//! All operations are synchronous and run on the caller's thread; nothing
//! here spawns workers. Operations that need pixel arithmetic route
//! through the canonical RGBA32F format internally and convert back, so
//! they accept any supported [`TextureFormat`](envmap_core::TextureFormat).

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod color;
pub mod geometry;
pub mod mip;
pub mod remap;
pub mod resize;
pub mod transform;

pub use color::{apply_gamma, clamp};
pub use mip::generate_mip_chain;
pub use resize::resize;
pub use transform::{transform, TransformOp, FACE_ALL};
