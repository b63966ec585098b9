//! The image buffer: pixel bytes plus mip-chain and face-stack structure.
//!
//! An [`Image`] owns a single contiguous byte buffer holding every face and
//! every mip level. Layout is face-major, mip-minor, row-major with the top
//! row first:
//!
//! ```text
//! face 0: mip 0, mip 1, ... mip N-1
//! face 1: mip 0, mip 1, ... mip N-1
//! ...
//! ```
//!
//! Mip level `m` of a `W`x`H` image is `max(1, W>>m)` x `max(1, H>>m)`
//! pixels. Byte offsets into the buffer are recomputed deterministically
//! from the metadata by [`Image::mip_offsets`]; they must never be cached
//! across an operation that replaces the buffer.

use crate::convert;
use crate::error::{Error, Result};
use crate::format::TextureFormat;

/// Number of faces in a cube map.
pub const CUBE_FACE_NUM: usize = 6;

/// Maximum number of mip levels an image can carry.
pub const MAX_MIP_NUM: usize = 16;

/// Byte-offset table addressed as `[face][mip]`.
pub type MipOffsets = [[usize; MAX_MIP_NUM]; CUBE_FACE_NUM];

/// A texture image: planar (one face) or cube map (six faces), with
/// 1..=[`MAX_MIP_NUM`] mip levels, in one of the supported
/// [`TextureFormat`]s.
///
/// The struct exclusively owns its pixel bytes; dropping it frees them and
/// assignment moves them. Use [`crate::convert::image_ref_or_convert`] when
/// a routine only conditionally needs a converted copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Width of mip 0 in pixels.
    pub width: u32,
    /// Height of mip 0 in pixels.
    pub height: u32,
    /// Pixel layout of `data`.
    pub format: TextureFormat,
    /// Mip levels stored per face (>= 1).
    pub num_mips: u8,
    /// Faces stored: 1 for planar images, 6 for cube maps.
    pub num_faces: u8,
    /// Pixel bytes, laid out as described in the module docs.
    pub data: Vec<u8>,
}

/// Total byte size of an image with the given metadata.
pub fn data_size(
    width: u32,
    height: u32,
    format: TextureFormat,
    num_mips: u8,
    num_faces: u8,
) -> usize {
    let bytes_per_pixel = format.bytes_per_pixel();
    let mut face_size = 0usize;
    for mip in 0..num_mips as u32 {
        let mip_width = (width >> mip).max(1) as usize;
        let mip_height = (height >> mip).max(1) as usize;
        face_size += mip_width * mip_height * bytes_per_pixel;
    }
    face_size * num_faces as usize
}

impl Image {
    /// Creates a zero-filled image.
    pub fn new(
        width: u32,
        height: u32,
        format: TextureFormat,
        num_mips: u8,
        num_faces: u8,
    ) -> Self {
        let size = data_size(width, height, format, num_mips, num_faces);
        Self {
            width,
            height,
            format,
            num_mips,
            num_faces,
            data: vec![0u8; size],
        }
    }

    /// Wraps an existing byte buffer, validating its length against the
    /// metadata.
    pub fn from_data(
        width: u32,
        height: u32,
        format: TextureFormat,
        num_mips: u8,
        num_faces: u8,
        data: Vec<u8>,
    ) -> Result<Self> {
        let expected = data_size(width, height, format, num_mips, num_faces);
        if data.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            num_mips,
            num_faces,
            data,
        })
    }

    /// Total byte size implied by the metadata (equals `self.data.len()`).
    #[inline]
    pub fn data_size(&self) -> usize {
        data_size(self.width, self.height, self.format, self.num_mips, self.num_faces)
    }

    /// Total number of pixels across all faces and mip levels.
    pub fn pixel_count(&self) -> usize {
        let mut count = 0usize;
        for mip in 0..self.num_mips as u32 {
            let mip_width = (self.width >> mip).max(1) as usize;
            let mip_height = (self.height >> mip).max(1) as usize;
            count += mip_width * mip_height;
        }
        count * self.num_faces as usize
    }

    /// Byte offset of every `[face][mip]` sub-image.
    pub fn mip_offsets(&self) -> MipOffsets {
        let bytes_per_pixel = self.format.bytes_per_pixel();
        let mut offsets = [[0usize; MAX_MIP_NUM]; CUBE_FACE_NUM];
        let mut offset = 0usize;
        for face in 0..self.num_faces as usize {
            for mip in 0..self.num_mips as u32 {
                offsets[face][mip as usize] = offset;
                let mip_width = (self.width >> mip).max(1) as usize;
                let mip_height = (self.height >> mip).max(1) as usize;
                offset += mip_width * mip_height * bytes_per_pixel;
            }
        }
        offsets
    }

    /// Pixel-offset variant of [`mip_offsets`](Self::mip_offsets):
    /// offsets counted in pixels instead of bytes, independent of the
    /// format's pixel size.
    pub fn mip_offsets_px(&self) -> MipOffsets {
        let bytes_per_pixel = self.format.bytes_per_pixel();
        let mut offsets = self.mip_offsets();
        for face in offsets.iter_mut() {
            for offset in face.iter_mut() {
                *offset /= bytes_per_pixel;
            }
        }
        offsets
    }

    /// Byte offset of the start of every face.
    pub fn face_offsets(&self) -> [usize; CUBE_FACE_NUM] {
        let face_size = self.data_size() / self.num_faces as usize;
        let mut offsets = [0usize; CUBE_FACE_NUM];
        for (face, offset) in offsets.iter_mut().enumerate() {
            *offset = face * face_size;
        }
        offsets
    }

    /// Dimensions of a mip level.
    #[inline]
    pub fn mip_dimensions(&self, mip: u8) -> (u32, u32) {
        ((self.width >> mip).max(1), (self.height >> mip).max(1))
    }

    /// True for a six-face image with square faces.
    #[inline]
    pub fn is_cubemap(&self) -> bool {
        self.num_faces as usize == CUBE_FACE_NUM && self.width == self.height
    }

    /// True for a 2:1 equirectangular projection (within 1e-5).
    #[inline]
    pub fn is_latlong(&self) -> bool {
        let aspect = self.width as f32 / self.height as f32;
        (aspect - 2.0).abs() < 1e-5
    }

    /// True for a 6:1 horizontal strip of faces.
    #[inline]
    pub fn is_hstrip(&self) -> bool {
        self.width == 6 * self.height
    }

    /// Reads one pixel, converting to the requested format if it differs
    /// from the stored one. All four coordinates are bounds-checked; `x`
    /// and `y` are checked against the addressed mip level's dimensions.
    ///
    /// This is the only random-access read path; bulk work should convert
    /// whole images instead.
    pub fn get_pixel(
        &self,
        format: TextureFormat,
        x: u32,
        y: u32,
        mip: u8,
        face: u8,
    ) -> Result<Vec<u8>> {
        let (mip_width, mip_height) = self.mip_dimensions(mip);
        if face >= self.num_faces || mip >= self.num_mips || x >= mip_width || y >= mip_height {
            return Err(Error::OutOfBounds {
                x,
                y,
                mip,
                face,
                width: mip_width,
                height: mip_height,
                num_mips: self.num_mips,
                num_faces: self.num_faces,
            });
        }

        let bytes_per_pixel = self.format.bytes_per_pixel();
        let pitch = mip_width as usize * bytes_per_pixel;
        let offsets = self.mip_offsets();
        let start = offsets[face as usize][mip as usize]
            + y as usize * pitch
            + x as usize * bytes_per_pixel;
        let src = &self.data[start..start + bytes_per_pixel];

        if self.format == format {
            return Ok(src.to_vec());
        }

        let rgba = convert::to_rgba32f(self.format, src);
        let mut out = vec![0u8; format.bytes_per_pixel()];
        convert::from_rgba32f(&mut out, format, &rgba);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_size_with_mips() {
        // 4x4 RGBA8 with full chain: 16 + 4 + 1 pixels, 4 bytes each.
        assert_eq!(data_size(4, 4, TextureFormat::Rgba8, 3, 1), (16 + 4 + 1) * 4);
        // Six faces multiply the per-face total.
        assert_eq!(data_size(4, 4, TextureFormat::Rgba8, 3, 6), (16 + 4 + 1) * 4 * 6);
    }

    #[test]
    fn test_mip_dimensions_clamp_to_one() {
        let image = Image::new(8, 2, TextureFormat::Rgb8, 4, 1);
        assert_eq!(image.mip_dimensions(0), (8, 2));
        assert_eq!(image.mip_dimensions(1), (4, 1));
        assert_eq!(image.mip_dimensions(2), (2, 1));
        assert_eq!(image.mip_dimensions(3), (1, 1));
    }

    #[test]
    fn test_mip_offsets_layout() {
        let image = Image::new(4, 4, TextureFormat::Rgba8, 2, 6);
        let offsets = image.mip_offsets();
        let face_size = (16 + 4) * 4;
        assert_eq!(offsets[0][0], 0);
        assert_eq!(offsets[0][1], 16 * 4);
        assert_eq!(offsets[1][0], face_size);
        assert_eq!(offsets[5][1], 5 * face_size + 16 * 4);
        assert_eq!(image.face_offsets()[3], 3 * face_size);
    }

    #[test]
    fn test_shape_predicates() {
        let cube = Image::new(64, 64, TextureFormat::Rgba8, 1, 6);
        assert!(cube.is_cubemap());
        assert!(!cube.is_latlong());

        let latlong = Image::new(512, 256, TextureFormat::Rgbe, 1, 1);
        assert!(latlong.is_latlong());
        assert!(!latlong.is_cubemap());

        let strip = Image::new(768, 128, TextureFormat::Rgba8, 1, 1);
        assert!(strip.is_hstrip());
    }

    #[test]
    fn test_from_data_validates_size() {
        let err = Image::from_data(2, 2, TextureFormat::Rgb8, 1, 1, vec![0u8; 5]);
        assert!(matches!(err, Err(Error::BufferSizeMismatch { expected: 12, actual: 5 })));
    }

    #[test]
    fn test_get_pixel_bounds() {
        let image = Image::new(4, 4, TextureFormat::Rgba8, 2, 1);
        assert!(image.get_pixel(TextureFormat::Rgba8, 3, 3, 0, 0).is_ok());
        // Mip 1 is 2x2; (3, 3) no longer exists there.
        assert!(image.get_pixel(TextureFormat::Rgba8, 3, 3, 1, 0).is_err());
        assert!(image.get_pixel(TextureFormat::Rgba8, 0, 0, 2, 0).is_err());
        assert!(image.get_pixel(TextureFormat::Rgba8, 0, 0, 0, 1).is_err());
    }

    #[test]
    fn test_get_pixel_converts() {
        let mut image = Image::new(1, 1, TextureFormat::Rgb8, 1, 1);
        image.data.copy_from_slice(&[255, 0, 128]);
        let px = image.get_pixel(TextureFormat::Bgr8, 0, 0, 0, 0).unwrap();
        assert_eq!(px, vec![128, 0, 255]);
    }
}
