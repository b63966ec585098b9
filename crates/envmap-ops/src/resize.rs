//! Box-average resize.
//!
//! Downsampling path used before filtering and when normalizing input
//! sizes. For every destination pixel the matching source rectangle
//! `[x*rx, x*rx + max(1, floor(rx))) x [y*ry, y*ry + max(1, floor(ry)))`
//! is averaged. Work happens in the canonical RGBA32F space on RGB only;
//! alpha is forced to 1.
//!
//! The result carries a single mip level; callers regenerate the chain
//! with [`crate::mip::generate_mip_chain`] if they need one.

use envmap_core::{convert, Image};

/// Resizes every face of `src` to `width` x `height` with a box filter,
/// returning a single-mip image in the source format.
pub fn resize(src: &Image, width: u32, height: u32) -> Image {
    let pixels = convert::to_f32_pixels(src);
    let src_offsets = src.mip_offsets_px();

    let src_width = src.width as usize;
    let dst_width = width as usize;
    let dst_height = height as usize;
    let num_faces = src.num_faces as usize;

    let ratio_x = src.width as f32 / width as f32;
    let ratio_y = src.height as f32 / height as f32;
    let span_x = (ratio_x as usize).max(1);
    let span_y = (ratio_y as usize).max(1);

    let mut dst = vec![0.0f32; dst_width * dst_height * 4 * num_faces];

    for face in 0..num_faces {
        let src_base = src_offsets[face][0] * 4;
        let dst_base = face * dst_width * dst_height * 4;

        for y_dst in 0..dst_height {
            for x_dst in 0..dst_width {
                let mut color = [0.0f32; 3];
                let mut weight = 0u32;

                let y_src = (y_dst as f32 * ratio_y) as usize;
                for y in y_src..(y_src + span_y).min(src.height as usize) {
                    let x_src = (x_dst as f32 * ratio_x) as usize;
                    for x in x_src..(x_src + span_x).min(src_width) {
                        let i = src_base + (y * src_width + x) * 4;
                        color[0] += pixels[i];
                        color[1] += pixels[i + 1];
                        color[2] += pixels[i + 2];
                        weight += 1;
                    }
                }

                let inv_weight = 1.0 / weight.max(1) as f32;
                let o = dst_base + (y_dst * dst_width + x_dst) * 4;
                dst[o] = color[0] * inv_weight;
                dst[o + 1] = color[1] * inv_weight;
                dst[o + 2] = color[2] * inv_weight;
                dst[o + 3] = 1.0;
            }
        }
    }

    convert::from_f32_pixels(width, height, 1, src.num_faces, src.format, &dst)
}

/// In-place variant of [`resize`].
pub fn resize_in_place(image: &mut Image, width: u32, height: u32) {
    *image = resize(image, width, height);
}
