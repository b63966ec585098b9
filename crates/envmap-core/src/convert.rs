//! Pixel-format conversion through the canonical RGBA32F representation.
//!
//! The N-by-N conversion matrix between the supported formats collapses to
//! 2N codecs: every format can decode one pixel to linear RGBA32F
//! ([`to_rgba32f`]) and encode one pixel from it ([`from_rgba32f`]). The
//! bulk routines walk a whole buffer with those codecs, and
//! [`image_convert`] composes them, skipping the intermediate when either
//! endpoint already is canonical.
//!
//! Conversion rules:
//!
//! - Normalized integer formats read as `value / MAX` and write as
//!   `round(clamp(v, 0, 1) * MAX)` with `MAX = 2^bits - 1`.
//! - Half floats are IEEE binary16, round-to-nearest-even (the `half`
//!   crate's conversion).
//! - RGBE decodes to `mantissa * 2^(exponent - 136)` with a zero exponent
//!   meaning black; it encodes with the shared exponent
//!   `ceil(log2(max(r, g, b)))` biased by 128.
//! - Formats without alpha decode with alpha = 1.
//!
//! Passing [`TextureFormat::Unknown`] to any codec here is a programming
//! error and panics; codecs resolve formats before pixels flow.

use half::f16;
use std::ops::Deref;

use crate::format::TextureFormat;
use crate::image::Image;

/// Decodes one pixel into linear RGBA32F.
///
/// `src` must hold at least `format.bytes_per_pixel()` bytes.
///
/// # Panics
///
/// Panics on [`TextureFormat::Unknown`].
#[inline]
pub fn to_rgba32f(format: TextureFormat, src: &[u8]) -> [f32; 4] {
    match format {
        TextureFormat::Bgr8 => [
            src[2] as f32 / 255.0,
            src[1] as f32 / 255.0,
            src[0] as f32 / 255.0,
            1.0,
        ],
        TextureFormat::Rgb8 => [
            src[0] as f32 / 255.0,
            src[1] as f32 / 255.0,
            src[2] as f32 / 255.0,
            1.0,
        ],
        TextureFormat::Rgb16 => [
            u16_at(src, 0) as f32 / 65535.0,
            u16_at(src, 1) as f32 / 65535.0,
            u16_at(src, 2) as f32 / 65535.0,
            1.0,
        ],
        TextureFormat::Rgb16F => [
            f16::from_bits(u16_at(src, 0)).to_f32(),
            f16::from_bits(u16_at(src, 1)).to_f32(),
            f16::from_bits(u16_at(src, 2)).to_f32(),
            1.0,
        ],
        TextureFormat::Rgb32F => [f32_at(src, 0), f32_at(src, 1), f32_at(src, 2), 1.0],
        TextureFormat::Rgbe => {
            if src[3] == 0 {
                [0.0, 0.0, 0.0, 1.0]
            } else {
                let exp = 2.0f32.powi(src[3] as i32 - 136);
                [src[0] as f32 * exp, src[1] as f32 * exp, src[2] as f32 * exp, 1.0]
            }
        }
        TextureFormat::Bgra8 => [
            src[2] as f32 / 255.0,
            src[1] as f32 / 255.0,
            src[0] as f32 / 255.0,
            src[3] as f32 / 255.0,
        ],
        TextureFormat::Rgba8 => [
            src[0] as f32 / 255.0,
            src[1] as f32 / 255.0,
            src[2] as f32 / 255.0,
            src[3] as f32 / 255.0,
        ],
        TextureFormat::Rgba16 => [
            u16_at(src, 0) as f32 / 65535.0,
            u16_at(src, 1) as f32 / 65535.0,
            u16_at(src, 2) as f32 / 65535.0,
            u16_at(src, 3) as f32 / 65535.0,
        ],
        TextureFormat::Rgba16F => [
            f16::from_bits(u16_at(src, 0)).to_f32(),
            f16::from_bits(u16_at(src, 1)).to_f32(),
            f16::from_bits(u16_at(src, 2)).to_f32(),
            f16::from_bits(u16_at(src, 3)).to_f32(),
        ],
        TextureFormat::Rgba32F => {
            [f32_at(src, 0), f32_at(src, 1), f32_at(src, 2), f32_at(src, 3)]
        }
        TextureFormat::Unknown => unreachable!("pixel codec invoked with unknown format"),
    }
}

/// Encodes one canonical RGBA32F pixel into `format`.
///
/// `dst` must hold at least `format.bytes_per_pixel()` bytes.
///
/// # Panics
///
/// Panics on [`TextureFormat::Unknown`].
#[inline]
pub fn from_rgba32f(dst: &mut [u8], format: TextureFormat, rgba: &[f32; 4]) {
    match format {
        TextureFormat::Bgr8 => {
            dst[2] = unorm8(rgba[0]);
            dst[1] = unorm8(rgba[1]);
            dst[0] = unorm8(rgba[2]);
        }
        TextureFormat::Rgb8 => {
            dst[0] = unorm8(rgba[0]);
            dst[1] = unorm8(rgba[1]);
            dst[2] = unorm8(rgba[2]);
        }
        TextureFormat::Rgb16 => {
            put_u16(dst, 0, unorm16(rgba[0]));
            put_u16(dst, 1, unorm16(rgba[1]));
            put_u16(dst, 2, unorm16(rgba[2]));
        }
        TextureFormat::Rgb16F => {
            put_u16(dst, 0, f16::from_f32(rgba[0]).to_bits());
            put_u16(dst, 1, f16::from_f32(rgba[1]).to_bits());
            put_u16(dst, 2, f16::from_f32(rgba[2]).to_bits());
        }
        TextureFormat::Rgb32F => {
            put_f32(dst, 0, rgba[0]);
            put_f32(dst, 1, rgba[1]);
            put_f32(dst, 2, rgba[2]);
        }
        TextureFormat::Rgbe => {
            let max = rgba[0].max(rgba[1]).max(rgba[2]);
            if max <= 1e-32 {
                dst[..4].fill(0);
            } else {
                let exp = max.log2().ceil();
                let scale = 255.0 / exp.exp2();
                dst[0] = (rgba[0] * scale).round() as u8;
                dst[1] = (rgba[1] * scale).round() as u8;
                dst[2] = (rgba[2] * scale).round() as u8;
                dst[3] = (exp + 128.0) as u8;
            }
        }
        TextureFormat::Bgra8 => {
            dst[2] = unorm8(rgba[0]);
            dst[1] = unorm8(rgba[1]);
            dst[0] = unorm8(rgba[2]);
            dst[3] = unorm8(rgba[3]);
        }
        TextureFormat::Rgba8 => {
            dst[0] = unorm8(rgba[0]);
            dst[1] = unorm8(rgba[1]);
            dst[2] = unorm8(rgba[2]);
            dst[3] = unorm8(rgba[3]);
        }
        TextureFormat::Rgba16 => {
            put_u16(dst, 0, unorm16(rgba[0]));
            put_u16(dst, 1, unorm16(rgba[1]));
            put_u16(dst, 2, unorm16(rgba[2]));
            put_u16(dst, 3, unorm16(rgba[3]));
        }
        TextureFormat::Rgba16F => {
            put_u16(dst, 0, f16::from_f32(rgba[0]).to_bits());
            put_u16(dst, 1, f16::from_f32(rgba[1]).to_bits());
            put_u16(dst, 2, f16::from_f32(rgba[2]).to_bits());
            put_u16(dst, 3, f16::from_f32(rgba[3]).to_bits());
        }
        TextureFormat::Rgba32F => {
            put_f32(dst, 0, rgba[0]);
            put_f32(dst, 1, rgba[1]);
            put_f32(dst, 2, rgba[2]);
            put_f32(dst, 3, rgba[3]);
        }
        TextureFormat::Unknown => unreachable!("pixel codec invoked with unknown format"),
    }
}

#[inline]
fn unorm8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline]
fn unorm16(v: f32) -> u16 {
    (v.clamp(0.0, 1.0) * 65535.0).round() as u16
}

#[inline]
fn u16_at(src: &[u8], index: usize) -> u16 {
    u16::from_le_bytes([src[index * 2], src[index * 2 + 1]])
}

#[inline]
fn put_u16(dst: &mut [u8], index: usize, value: u16) {
    dst[index * 2..index * 2 + 2].copy_from_slice(&value.to_le_bytes());
}

#[inline]
fn f32_at(src: &[u8], index: usize) -> f32 {
    f32::from_le_bytes([
        src[index * 4],
        src[index * 4 + 1],
        src[index * 4 + 2],
        src[index * 4 + 3],
    ])
}

#[inline]
fn put_f32(dst: &mut [u8], index: usize, value: f32) {
    dst[index * 4..index * 4 + 4].copy_from_slice(&value.to_le_bytes());
}

/// Decodes a whole image into a flat canonical pixel vector
/// (`pixel_count() * 4` floats, buffer order preserved).
pub fn to_f32_pixels(src: &Image) -> Vec<f32> {
    let bytes_per_pixel = src.format.bytes_per_pixel();
    let mut pixels = Vec::with_capacity(src.pixel_count() * 4);
    for chunk in src.data.chunks_exact(bytes_per_pixel) {
        pixels.extend_from_slice(&to_rgba32f(src.format, chunk));
    }
    pixels
}

/// Encodes a flat canonical pixel vector into a new image buffer with the
/// given metadata and format. `pixels.len()` must be four times the pixel
/// count implied by the metadata.
pub fn from_f32_pixels(
    width: u32,
    height: u32,
    num_mips: u8,
    num_faces: u8,
    format: TextureFormat,
    pixels: &[f32],
) -> Image {
    let bytes_per_pixel = format.bytes_per_pixel();
    let mut data = vec![0u8; pixels.len() / 4 * bytes_per_pixel];
    for (src, dst) in pixels.chunks_exact(4).zip(data.chunks_exact_mut(bytes_per_pixel)) {
        from_rgba32f(dst, format, &[src[0], src[1], src[2], src[3]]);
    }
    Image {
        width,
        height,
        format,
        num_mips,
        num_faces,
        data,
    }
}

/// Converts a whole image to the canonical RGBA32F format.
pub fn image_to_rgba32f(src: &Image) -> Image {
    let mut data = Vec::with_capacity(src.pixel_count() * 16);
    let bytes_per_pixel = src.format.bytes_per_pixel();
    for chunk in src.data.chunks_exact(bytes_per_pixel) {
        for channel in to_rgba32f(src.format, chunk) {
            data.extend_from_slice(&channel.to_le_bytes());
        }
    }
    Image {
        width: src.width,
        height: src.height,
        format: TextureFormat::Rgba32F,
        num_mips: src.num_mips,
        num_faces: src.num_faces,
        data,
    }
}

/// Converts a canonical RGBA32F image into `format`.
///
/// # Panics
///
/// Debug-asserts that `src` is RGBA32F; feeding anything else here is a
/// programming error.
pub fn image_from_rgba32f(src: &Image, format: TextureFormat) -> Image {
    debug_assert_eq!(src.format, TextureFormat::Rgba32F, "source must be canonical");
    let bytes_per_pixel = format.bytes_per_pixel();
    let mut data = vec![0u8; src.pixel_count() * bytes_per_pixel];
    for (chunk, dst) in src.data.chunks_exact(16).zip(data.chunks_exact_mut(bytes_per_pixel)) {
        let rgba = [f32_at(chunk, 0), f32_at(chunk, 1), f32_at(chunk, 2), f32_at(chunk, 3)];
        from_rgba32f(dst, format, &rgba);
    }
    Image {
        width: src.width,
        height: src.height,
        format,
        num_mips: src.num_mips,
        num_faces: src.num_faces,
        data,
    }
}

/// Converts an image to an arbitrary format, factoring through the
/// canonical representation unless one endpoint already is canonical.
/// Converting to the format the image already has returns a copy.
pub fn image_convert(src: &Image, format: TextureFormat) -> Image {
    if src.format == format {
        return src.clone();
    }
    if src.format == TextureFormat::Rgba32F {
        return image_from_rgba32f(src, format);
    }
    if format == TextureFormat::Rgba32F {
        return image_to_rgba32f(src);
    }
    image_from_rgba32f(&image_to_rgba32f(src), format)
}

/// In-place variant of [`image_convert`]; no-op when the format already
/// matches.
pub fn convert_in_place(image: &mut Image, format: TextureFormat) {
    if image.format != format {
        *image = image_convert(image, format);
    }
}

/// Either a borrow of an image that already has the right format, or an
/// owned converted copy. `Deref` makes the two interchangeable for readers;
/// the borrow checker rules out freeing a borrowed buffer.
#[derive(Debug)]
pub enum RefOrOwned<'a> {
    /// The source image already had the requested format.
    Borrowed(&'a Image),
    /// A freshly converted copy.
    Owned(Image),
}

impl RefOrOwned<'_> {
    /// True when no conversion was necessary.
    #[inline]
    pub fn is_borrowed(&self) -> bool {
        matches!(self, RefOrOwned::Borrowed(_))
    }
}

impl Deref for RefOrOwned<'_> {
    type Target = Image;

    fn deref(&self) -> &Image {
        match self {
            RefOrOwned::Borrowed(image) => image,
            RefOrOwned::Owned(image) => image,
        }
    }
}

/// No-copy fast path: borrows `src` when it already has `format`,
/// otherwise converts into an owned temporary.
pub fn image_ref_or_convert(src: &Image, format: TextureFormat) -> RefOrOwned<'_> {
    if src.format == format {
        RefOrOwned::Borrowed(src)
    } else {
        RefOrOwned::Owned(image_convert(src, format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Exercises the decode/encode pair for every format on a value that
    /// quantizes exactly at 8 bits.
    #[test]
    fn test_scalar_roundtrip_all_formats() {
        let rgba = [1.0f32, 0.5019608, 0.2509804, 1.0];
        for format in TextureFormat::ALL {
            let mut encoded = vec![0u8; format.bytes_per_pixel()];
            from_rgba32f(&mut encoded, format, &rgba);
            let decoded = to_rgba32f(format, &encoded);

            let tolerance = match format.pixel_type() {
                crate::format::PixelDataType::Uint8 => 1.0 / 255.0,
                crate::format::PixelDataType::Uint16 => 1.0 / 65535.0,
                crate::format::PixelDataType::HalfFloat => 1.0 / 1024.0,
                crate::format::PixelDataType::Float => 0.0,
            };
            for channel in 0..3 {
                assert!(
                    (decoded[channel] - rgba[channel]).abs() <= tolerance,
                    "{format}: channel {channel}: {} vs {}",
                    decoded[channel],
                    rgba[channel],
                );
            }
        }
    }

    #[test]
    fn test_alpha_injection() {
        let pixel = [10u8, 20, 30];
        assert_eq!(to_rgba32f(TextureFormat::Rgb8, &pixel)[3], 1.0);
        assert_eq!(to_rgba32f(TextureFormat::Bgr8, &pixel)[3], 1.0);
        let rgbe = [128u8, 128, 128, 128];
        assert_eq!(to_rgba32f(TextureFormat::Rgbe, &rgbe)[3], 1.0);
    }

    #[test]
    fn test_channel_swap() {
        let mut bgr = [0u8; 3];
        from_rgba32f(&mut bgr, TextureFormat::Bgr8, &[1.0, 0.0, 0.0, 1.0]);
        assert_eq!(bgr, [0, 0, 255]);
        let back = to_rgba32f(TextureFormat::Bgr8, &bgr);
        assert_eq!(back[0], 1.0);
        assert_eq!(back[2], 0.0);
    }

    #[test]
    fn test_rgbe_decode() {
        // Exponent byte 128 scales mantissas by 2^-8.
        let decoded = to_rgba32f(TextureFormat::Rgbe, &[128, 128, 128, 128]);
        assert_relative_eq!(decoded[0], 0.5, epsilon = 1.0 / 128.0);
        // Zero exponent is black regardless of mantissas.
        let black = to_rgba32f(TextureFormat::Rgbe, &[200, 200, 200, 0]);
        assert_eq!(&black[..3], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_rgbe_encode_hdr_value() {
        let mut rgbe = [0u8; 4];
        from_rgba32f(&mut rgbe, TextureFormat::Rgbe, &[4.0, 2.0, 1.0, 1.0]);
        let decoded = to_rgba32f(TextureFormat::Rgbe, &rgbe);
        assert_relative_eq!(decoded[0], 4.0, max_relative = 0.02);
        assert_relative_eq!(decoded[1], 2.0, max_relative = 0.02);
        assert_relative_eq!(decoded[2], 1.0, max_relative = 0.02);

        from_rgba32f(&mut rgbe, TextureFormat::Rgbe, &[0.0, 0.0, 0.0, 1.0]);
        assert_eq!(rgbe, [0, 0, 0, 0]);
    }

    #[test]
    fn test_image_convert_same_format_is_copy() {
        let mut image = Image::new(2, 2, TextureFormat::Rgb8, 1, 1);
        image.data.copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        let copy = image_convert(&image, TextureFormat::Rgb8);
        assert_eq!(copy, image);
    }

    #[test]
    fn test_image_convert_via_canonical() {
        let mut image = Image::new(1, 1, TextureFormat::Rgb8, 1, 1);
        image.data.copy_from_slice(&[255, 128, 0]);
        let bgra = image_convert(&image, TextureFormat::Bgra8);
        assert_eq!(bgra.format, TextureFormat::Bgra8);
        assert_eq!(bgra.data, vec![0, 128, 255, 255]);
    }

    #[test]
    fn test_ref_or_convert() {
        let image = Image::new(2, 2, TextureFormat::Rgba32F, 1, 1);
        assert!(image_ref_or_convert(&image, TextureFormat::Rgba32F).is_borrowed());
        let converted = image_ref_or_convert(&image, TextureFormat::Rgba8);
        assert!(!converted.is_borrowed());
        assert_eq!(converted.format, TextureFormat::Rgba8);
    }

    #[test]
    fn test_f32_pixel_vector_roundtrip() {
        let mut image = Image::new(2, 1, TextureFormat::Rgba32F, 1, 1);
        let values = [0.25f32, 0.5, 0.75, 1.0, 2.0, 3.0, 4.0, 1.0];
        for (i, v) in values.iter().enumerate() {
            image.data[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
        }
        let pixels = to_f32_pixels(&image);
        assert_eq!(pixels, values);
        let back = from_f32_pixels(2, 1, 1, 1, TextureFormat::Rgba32F, &pixels);
        assert_eq!(back.data, image.data);
    }
}
