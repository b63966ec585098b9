//! Mip-chain generation.
//!
//! Extends (or truncates) an image's mip chain. Levels already present in
//! the source are copied; missing levels are produced by a 2x2 box filter
//! over the level just written into the destination, so every synthesized
//! level downsamples its own synthesized parent rather than the base
//! image. All arithmetic happens in canonical RGBA32F space and the result
//! is converted back to the source format.

use envmap_core::{convert, Image, CUBE_FACE_NUM, MAX_MIP_NUM};

/// Rebuilds `image` with `desired_mip_count` mip levels (clamped to
/// [`MAX_MIP_NUM`] and to the chain's natural length, which ends once a
/// dimension has reached 1).
pub fn generate_mip_chain(image: &mut Image, desired_mip_count: u8) {
    let pixels = convert::to_f32_pixels(image);
    let src_offsets = image.mip_offsets_px();

    // Destination chain length and per-face/mip offsets (in pixels).
    let max_mips = desired_mip_count.clamp(1, MAX_MIP_NUM as u8);
    let mut dst_offsets = [[0usize; MAX_MIP_NUM]; CUBE_FACE_NUM];
    let mut dst_pixel_count = 0usize;
    let mut mip_count = 0u8;
    for face in 0..image.num_faces as usize {
        let mut width = 0u32;
        let mut height = 0u32;
        mip_count = 0;
        while mip_count < max_mips && width != 1 && height != 1 {
            dst_offsets[face][mip_count as usize] = dst_pixel_count;
            width = (image.width >> mip_count).max(1);
            height = (image.height >> mip_count).max(1);
            dst_pixel_count += (width * height) as usize;
            mip_count += 1;
        }
    }

    let mut dst = vec![0.0f32; dst_pixel_count * 4];

    for face in 0..image.num_faces as usize {
        for mip in 0..mip_count {
            let (width, height) = image.mip_dimensions(mip);
            let (width, height) = (width as usize, height as usize);
            let dst_base = dst_offsets[face][mip as usize] * 4;

            if mip < image.num_mips {
                // Level exists in the source; copy it.
                let src_base = src_offsets[face][mip as usize] * 4;
                let len = width * height * 4;
                dst[dst_base..dst_base + len]
                    .copy_from_slice(&pixels[src_base..src_base + len]);
            } else {
                // Synthesize from the destination level above this one.
                let parent_width = (image.width >> (mip - 1)).max(1) as usize;
                let parent_base = dst_offsets[face][mip as usize - 1] * 4;

                for y in 0..height {
                    for x in 0..width {
                        let mut color = [0.0f32; 4];
                        for y_parent in (y * 2)..(y * 2 + 2) {
                            for x_parent in (x * 2)..(x * 2 + 2) {
                                let i = parent_base + (y_parent * parent_width + x_parent) * 4;
                                color[0] += dst[i];
                                color[1] += dst[i + 1];
                                color[2] += dst[i + 2];
                                color[3] += dst[i + 3];
                            }
                        }
                        let o = dst_base + (y * width + x) * 4;
                        dst[o] = color[0] * 0.25;
                        dst[o + 1] = color[1] * 0.25;
                        dst[o + 2] = color[2] * 0.25;
                        dst[o + 3] = color[3] * 0.25;
                    }
                }
            }
        }
    }

    *image = convert::from_f32_pixels(
        image.width,
        image.height,
        mip_count,
        image.num_faces,
        image.format,
        &dst,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use envmap_core::TextureFormat;

    fn red_at(image: &Image, offset_px: usize) -> f32 {
        let i = offset_px * 16;
        f32::from_le_bytes(image.data[i..i + 4].try_into().unwrap())
    }

    #[test]
    fn test_chain_length_clamps_to_natural() {
        let mut image = Image::new(8, 8, TextureFormat::Rgba32F, 1, 1);
        generate_mip_chain(&mut image, 16);
        // 8 -> 4 -> 2 -> 1.
        assert_eq!(image.num_mips, 4);
        assert_eq!(image.data.len(), (64 + 16 + 4 + 1) * 16);
    }

    #[test]
    fn test_chain_length_respects_request() {
        let mut image = Image::new(16, 16, TextureFormat::Rgba8, 1, 1);
        generate_mip_chain(&mut image, 2);
        assert_eq!(image.num_mips, 2);
    }

    #[test]
    fn test_synthesized_level_averages_parent() {
        let mut image = Image::new(4, 4, TextureFormat::Rgba32F, 1, 1);
        for px in 0..16 {
            let i = px * 16;
            image.data[i..i + 4].copy_from_slice(&(px as f32).to_le_bytes());
            image.data[i + 12..i + 16].copy_from_slice(&1.0f32.to_le_bytes());
        }
        generate_mip_chain(&mut image, 3);
        assert_eq!(image.num_mips, 3);

        // Mip 1 (offset 16 px): top-left quadrant of the base.
        assert_eq!(red_at(&image, 16), (0.0 + 1.0 + 4.0 + 5.0) / 4.0);
        // Mip 2 (offset 20 px): average of mip 1, i.e. of all base pixels.
        let mip1: [f32; 4] = [
            red_at(&image, 16),
            red_at(&image, 17),
            red_at(&image, 18),
            red_at(&image, 19),
        ];
        assert_eq!(red_at(&image, 20), mip1.iter().sum::<f32>() / 4.0);
    }

    #[test]
    fn test_existing_mips_are_copied() {
        let mut image = Image::new(2, 2, TextureFormat::Rgba32F, 2, 1);
        // Put a marker in the existing mip 1 that a 2x2 average of mip 0
        // would not produce.
        let mip1_offset = 4 * 16;
        image.data[mip1_offset..mip1_offset + 4].copy_from_slice(&9.5f32.to_le_bytes());
        generate_mip_chain(&mut image, 2);
        assert_eq!(red_at(&image, 4), 9.5);
    }

    #[test]
    fn test_cube_faces_keep_independent_chains() {
        let mut image = Image::new(2, 2, TextureFormat::Rgba32F, 1, 6);
        // Face 3's pixels all 3.0.
        let face_size = 2 * 2 * 16;
        for px in 0..4 {
            let i = 3 * face_size + px * 16;
            image.data[i..i + 4].copy_from_slice(&3.0f32.to_le_bytes());
        }
        generate_mip_chain(&mut image, 2);
        assert_eq!(image.num_mips, 2);
        let offsets = image.mip_offsets_px();
        assert_eq!(red_at(&image, offsets[3][1]), 3.0);
        assert_eq!(red_at(&image, offsets[0][1]), 0.0);
    }
}
