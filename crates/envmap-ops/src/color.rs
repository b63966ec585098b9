//! Scalar color adjustments: gamma and range clamping.

use envmap_core::{convert, Image};

/// Raises R, G and B of every pixel to the power `gamma`, leaving alpha
/// untouched. Values within 1e-4 of 1.0 make this a bit-exact no-op.
///
/// Work happens in canonical RGBA32F space; the image keeps its format.
pub fn apply_gamma(image: &mut Image, gamma: f32) {
    if (gamma - 1.0).abs() < 1e-4 {
        return;
    }

    let mut pixels = convert::to_f32_pixels(image);
    for px in pixels.chunks_exact_mut(4) {
        px[0] = px[0].powf(gamma);
        px[1] = px[1].powf(gamma);
        px[2] = px[2].powf(gamma);
    }
    *image = convert::from_f32_pixels(
        image.width,
        image.height,
        image.num_mips,
        image.num_faces,
        image.format,
        &pixels,
    );
}

/// Saturates all four channels of every pixel to [0, 1] in canonical
/// space, then converts back to the image's format.
pub fn clamp(image: &mut Image) {
    let mut pixels = convert::to_f32_pixels(image);
    for v in pixels.iter_mut() {
        *v = v.clamp(0.0, 1.0);
    }
    *image = convert::from_f32_pixels(
        image.width,
        image.height,
        image.num_mips,
        image.num_faces,
        image.format,
        &pixels,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use envmap_core::TextureFormat;

    fn canonical_1px(rgba: [f32; 4]) -> Image {
        let mut image = Image::new(1, 1, TextureFormat::Rgba32F, 1, 1);
        for (i, v) in rgba.iter().enumerate() {
            image.data[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
        }
        image
    }

    fn read_1px(image: &Image) -> [f32; 4] {
        let mut out = [0.0f32; 4];
        for (i, v) in out.iter_mut().enumerate() {
            *v = f32::from_le_bytes(image.data[i * 4..i * 4 + 4].try_into().unwrap());
        }
        out
    }

    #[test]
    fn test_gamma_identity_is_noop() {
        let mut image = canonical_1px([0.25, 0.5, 2.0, 0.75]);
        let before = image.data.clone();
        apply_gamma(&mut image, 1.0);
        assert_eq!(image.data, before);
        apply_gamma(&mut image, 1.00005);
        assert_eq!(image.data, before);
    }

    #[test]
    fn test_gamma_leaves_alpha() {
        let mut image = canonical_1px([0.25, 0.5, 1.0, 0.75]);
        apply_gamma(&mut image, 2.0);
        let px = read_1px(&image);
        assert_relative_eq!(px[0], 0.0625);
        assert_relative_eq!(px[1], 0.25);
        assert_relative_eq!(px[2], 1.0);
        assert_relative_eq!(px[3], 0.75);
    }

    #[test]
    fn test_clamp_saturates_all_channels() {
        let mut image = canonical_1px([-0.5, 0.5, 3.0, 2.0]);
        clamp(&mut image);
        assert_eq!(read_1px(&image), [0.0, 0.5, 1.0, 1.0]);
    }
}
