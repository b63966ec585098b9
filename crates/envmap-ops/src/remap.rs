//! Conversions between cube-map storage layouts.
//!
//! A cube map can live on disk or in memory as:
//!
//! - a six-face stack (the [`Image`] cube-map form),
//! - a vertical (3:4) or horizontal (4:3) cross,
//! - a 6:1 horizontal strip,
//! - six separate face images,
//! - a 2:1 lat-long (equirectangular) projection.
//!
//! The cross, strip and face-list remaps are pure byte rearrangements and
//! therefore bit-exact round trips. The lat-long remaps resample through
//! [`crate::geometry`] in canonical RGBA32F space, with either nearest or
//! four-tap bilinear lookups, and convert back to the source format.
//!
//! Cross layouts place the faces as:
//!
//! ```text
//!  vertical (3:4)        horizontal (4:3)
//!       ___                    ___
//!      |+Y |                  |+Y |
//!   ___|___|___            ___|___|___ ___
//!  |-X |+Z |+X |          |-X |+Z |+X |-Z |
//!  |___|___|___|          |___|___|___|___|
//!      |-Y |                  |-Y |
//!      |___|                  |___|
//!      |-Z |
//!      |___|
//! ```
//!
//! The vertical cross stores its -Z tile rotated a half turn relative to
//! cube-map convention, so that face gets a flip_x + flip_y fixup on the
//! way in and out.

use envmap_core::{convert, Error, Image, Result, CUBE_FACE_NUM, MAX_MIP_NUM};

use crate::geometry::{self, FACE_NEG_Z};
use crate::transform::{face_bit, transform, TransformOp};

/// Tile origin of each face in a cross, in face-size units, `(x, y)`.
fn cross_face_origins(vertical: bool) -> [(u32, u32); CUBE_FACE_NUM] {
    if vertical {
        [(2, 1), (0, 1), (1, 0), (1, 2), (1, 1), (1, 3)]
    } else {
        [(2, 1), (0, 1), (1, 0), (1, 2), (1, 1), (3, 1)]
    }
}

fn shape_of(image: &Image) -> String {
    format!(
        "{}x{}, {} faces, {} mips",
        image.width, image.height, image.num_faces, image.num_mips
    )
}

/// Folds a single-face cross image into a six-face cube map.
///
/// Accepts a 3:4 vertical or 4:3 horizontal cross; the face size is
/// `ceil(W/3)` resp. `ceil(W/4)`. Output carries a single mip level.
///
/// # Errors
///
/// [`Error::ShapeMismatch`] when the image is not single-face with a
/// cross aspect.
pub fn cubemap_from_cross(src: &Image) -> Result<Image> {
    let aspect = src.width as f32 / src.height as f32;
    let vertical = (aspect - 3.0 / 4.0).abs() < 1e-4;
    let horizontal = (aspect - 4.0 / 3.0).abs() < 1e-4;
    if src.num_faces != 1 || (!vertical && !horizontal) {
        return Err(Error::shape("single-face 3:4 or 4:3 cross", shape_of(src)));
    }

    let face_size = if vertical {
        (src.width + 2) / 3
    } else {
        (src.width + 3) / 4
    };

    let bytes_per_pixel = src.format.bytes_per_pixel();
    let src_pitch = src.width as usize * bytes_per_pixel;
    let face_pitch = face_size as usize * bytes_per_pixel;

    let mut dst = Image::new(face_size, face_size, src.format, 1, 6);
    let face_data_size = face_pitch * face_size as usize;

    for (face, (tile_x, tile_y)) in cross_face_origins(vertical).iter().enumerate() {
        let x0 = (tile_x * face_size) as usize;
        let y0 = (tile_y * face_size) as usize;
        let copy_w = face_pitch.min(src_pitch.saturating_sub(x0 * bytes_per_pixel));
        let copy_h = (face_size as usize).min((src.height as usize).saturating_sub(y0));
        for row in 0..copy_h {
            let s = (y0 + row) * src_pitch + x0 * bytes_per_pixel;
            let d = face * face_data_size + row * face_pitch;
            dst.data[d..d + copy_w].copy_from_slice(&src.data[s..s + copy_w]);
        }
    }

    if vertical {
        transform(
            &mut dst,
            face_bit(FACE_NEG_Z),
            &[TransformOp::FlipX, TransformOp::FlipY],
        )?;
    }

    Ok(dst)
}

/// Unfolds a cube map into a single-face cross image, preserving the mip
/// chain. The margin is filled with opaque black encoded in the source
/// format.
pub fn cross_from_cubemap(src: &Image, vertical: bool) -> Result<Image> {
    if !src.is_cubemap() {
        return Err(Error::shape("cubemap (6 square faces)", shape_of(src)));
    }

    let mut faces = src.clone();
    if vertical {
        transform(
            &mut faces,
            face_bit(FACE_NEG_Z),
            &[TransformOp::FlipX, TransformOp::FlipY],
        )?;
    }

    let bytes_per_pixel = src.format.bytes_per_pixel();
    let dst_width = if vertical { 3 } else { 4 } * src.width;
    let dst_height = if vertical { 4 } else { 3 } * src.width;
    let mut dst = Image::new(dst_width, dst_height, src.format, src.num_mips, 1);

    let mut black = [0u8; 16];
    convert::from_rgba32f(&mut black, src.format, &[0.0, 0.0, 0.0, 1.0]);
    for px in dst.data.chunks_exact_mut(bytes_per_pixel) {
        px.copy_from_slice(&black[..bytes_per_pixel]);
    }

    let src_offsets = faces.mip_offsets();
    let dst_offsets = dst.mip_offsets();
    let origins = cross_face_origins(vertical);

    for mip in 0..src.num_mips {
        let (src_mip_size, _) = faces.mip_dimensions(mip);
        let src_pitch = src_mip_size as usize * bytes_per_pixel;

        let (dst_mip_width, _) = dst.mip_dimensions(mip);
        let dst_pitch = dst_mip_width as usize * bytes_per_pixel;
        let face_size = dst_mip_width / if vertical { 3 } else { 4 };
        let face_pitch = face_size as usize * bytes_per_pixel;

        for (face, (tile_x, tile_y)) in origins.iter().enumerate() {
            let x0 = (tile_x * face_size) as usize * bytes_per_pixel;
            let y0 = (tile_y * face_size) as usize;
            let copy = face_pitch.min(src_pitch);
            for row in 0..face_size.min(src_mip_size) as usize {
                let s = src_offsets[face][mip as usize] + row * src_pitch;
                let d = dst_offsets[0][mip as usize] + (y0 + row) * dst_pitch + x0;
                dst.data[d..d + copy].copy_from_slice(&faces.data[s..s + copy]);
            }
        }
    }

    Ok(dst)
}

/// Lays a cube map out as a 6:1 horizontal strip, faces in
/// +X, -X, +Y, -Y, +Z, -Z order, preserving the mip chain. Pure byte
/// copies; no face is geometrically transformed.
pub fn hstrip_from_cubemap(src: &Image) -> Result<Image> {
    if !src.is_cubemap() {
        return Err(Error::shape("cubemap (6 square faces)", shape_of(src)));
    }

    let bytes_per_pixel = src.format.bytes_per_pixel();
    let mut dst = Image::new(src.width * 6, src.width, src.format, src.num_mips, 1);

    let src_offsets = src.mip_offsets();
    let dst_offsets = dst.mip_offsets();

    for face in 0..CUBE_FACE_NUM {
        for mip in 0..src.num_mips {
            let (src_mip_size, _) = src.mip_dimensions(mip);
            let src_pitch = src_mip_size as usize * bytes_per_pixel;
            let (dst_mip_width, _) = dst.mip_dimensions(mip);
            let dst_pitch = dst_mip_width as usize * bytes_per_pixel;

            let x_offset = src_pitch * face;
            for row in 0..src_mip_size as usize {
                let s = src_offsets[face][mip as usize] + row * src_pitch;
                let d = dst_offsets[0][mip as usize] + row * dst_pitch + x_offset;
                dst.data[d..d + src_pitch].copy_from_slice(&src.data[s..s + src_pitch]);
            }
        }
    }

    Ok(dst)
}

/// Folds a 6:1 horizontal strip back into a six-face cube map; inverse of
/// [`hstrip_from_cubemap`], bit-exact.
pub fn cubemap_from_hstrip(src: &Image) -> Result<Image> {
    if !src.is_hstrip() {
        return Err(Error::shape("6:1 horizontal strip", shape_of(src)));
    }

    let bytes_per_pixel = src.format.bytes_per_pixel();
    let size = src.height;
    let mut dst = Image::new(size, size, src.format, src.num_mips, 6);

    let src_offsets = src.mip_offsets();
    let dst_offsets = dst.mip_offsets();

    for face in 0..CUBE_FACE_NUM {
        for mip in 0..src.num_mips {
            let (dst_mip_size, _) = dst.mip_dimensions(mip);
            let dst_pitch = dst_mip_size as usize * bytes_per_pixel;
            let (src_mip_width, _) = src.mip_dimensions(mip);
            let src_pitch = src_mip_width as usize * bytes_per_pixel;

            let x_offset = dst_pitch * face;
            for row in 0..dst_mip_size as usize {
                let s = src_offsets[0][mip as usize] + row * src_pitch + x_offset;
                let d = dst_offsets[face][mip as usize] + row * dst_pitch;
                dst.data[d..d + dst_pitch].copy_from_slice(&src.data[s..s + dst_pitch]);
            }
        }
    }

    Ok(dst)
}

/// Splits a cube map into six independent single-face images sharing size,
/// format and mip count.
pub fn face_list_from_cubemap(src: &Image) -> Result<[Image; 6]> {
    if !src.is_cubemap() {
        return Err(Error::shape("cubemap (6 square faces)", shape_of(src)));
    }

    let face_size = src.data_size() / CUBE_FACE_NUM;
    let faces = std::array::from_fn(|face| Image {
        width: src.width,
        height: src.height,
        format: src.format,
        num_mips: src.num_mips,
        num_faces: 1,
        data: src.data[face * face_size..(face + 1) * face_size].to_vec(),
    });
    Ok(faces)
}

/// Merges six face images into a cube map; inverse of
/// [`face_list_from_cubemap`], bit-exact.
///
/// # Errors
///
/// [`Error::ShapeMismatch`] unless every face is square and all six agree
/// on size, format and mip count.
pub fn cubemap_from_face_list(faces: &[Image; 6]) -> Result<Image> {
    let first = &faces[0];
    for face in faces.iter() {
        if face.width != face.height
            || face.width != first.width
            || face.num_mips != first.num_mips
            || face.format != first.format
            || face.num_faces != 1
        {
            return Err(Error::shape(
                format!("six single-face square images of {}", shape_of(first)),
                shape_of(face),
            ));
        }
    }

    let mut data = Vec::with_capacity(first.data.len() * CUBE_FACE_NUM);
    for face in faces.iter() {
        data.extend_from_slice(&face.data);
    }

    Ok(Image {
        width: first.width,
        height: first.height,
        format: first.format,
        num_mips: first.num_mips,
        num_faces: 6,
        data,
    })
}

/// Projects a 2:1 lat-long image onto the six faces of a cube map.
///
/// The face size is `ceil(H/2)`. Source mips beyond the base are ignored
/// and the output carries a single mip level. Sampling is nearest by
/// default; with `bilinear` a four-tap weighted lookup is used on RGB
/// (alpha is forced to 1 either way). The result is converted back to the
/// source format.
pub fn cubemap_from_latlong(src: &Image, bilinear: bool) -> Result<Image> {
    if !src.is_latlong() {
        return Err(Error::shape("2:1 lat-long", shape_of(src)));
    }

    let pixels = convert::to_f32_pixels(src);
    let src_width = src.width as usize;
    let src_height = src.height as usize;
    let max_x = (src.width - 1) as f32;
    let max_y = (src.height - 1) as f32;

    let face_size = (src.height + 1) / 2;
    let inv_face_size = 1.0 / face_size as f32;
    let face_px = (face_size * face_size) as usize;
    let mut dst = vec![0.0f32; face_px * 4 * CUBE_FACE_NUM];

    for face in 0..CUBE_FACE_NUM as u8 {
        let face_base = face as usize * face_px * 4;
        for yy in 0..face_size {
            for xx in 0..face_size {
                let u = 2.0 * xx as f32 * inv_face_size - 1.0;
                let v = 2.0 * yy as f32 * inv_face_size - 1.0;
                let vec = geometry::texel_uv_to_vec(u, v, face);
                let (sx, sy) = geometry::latlong_from_vec(vec);
                let sx = sx * max_x;
                let sy = sy * max_y;

                let o = face_base + (yy * face_size + xx) as usize * 4;
                if bilinear {
                    let x0 = sx as usize;
                    let y0 = sy as usize;
                    let x1 = (x0 + 1).min(src_width - 1);
                    let y1 = (y0 + 1).min(src_height - 1);
                    let tx = sx - x0 as f32;
                    let ty = sy - y0 as f32;

                    let p0 = (y0 * src_width + x0) * 4;
                    let p1 = (y0 * src_width + x1) * 4;
                    let p2 = (y1 * src_width + x0) * 4;
                    let p3 = (y1 * src_width + x1) * 4;
                    let w0 = (1.0 - tx) * (1.0 - ty);
                    let w1 = tx * (1.0 - ty);
                    let w2 = (1.0 - tx) * ty;
                    let w3 = tx * ty;

                    for c in 0..3 {
                        dst[o + c] = pixels[p0 + c] * w0
                            + pixels[p1 + c] * w1
                            + pixels[p2 + c] * w2
                            + pixels[p3 + c] * w3;
                    }
                } else {
                    let x = (sx as usize).min(src_width - 1);
                    let y = (sy as usize).min(src_height - 1);
                    let p = (y * src_width + x) * 4;
                    dst[o..o + 3].copy_from_slice(&pixels[p..p + 3]);
                }
                dst[o + 3] = 1.0;
            }
        }
    }

    Ok(convert::from_f32_pixels(face_size, face_size, 1, 6, src.format, &dst))
}

/// Projects a cube map into a 2:1 lat-long image of `4H x 2H`, carrying
/// the source mip chain across (each source mip renders the same-index
/// destination mip). Sampling rules match [`cubemap_from_latlong`].
pub fn latlong_from_cubemap(src: &Image, bilinear: bool) -> Result<Image> {
    if !src.is_cubemap() {
        return Err(Error::shape("cubemap (6 square faces)", shape_of(src)));
    }

    let pixels = convert::to_f32_pixels(src);
    let src_offsets = src.mip_offsets_px();

    let dst_width = src.height * 4;
    let dst_height = src.height * 2;

    let mut dst_offsets = [0usize; MAX_MIP_NUM];
    let mut dst_pixel_count = 0usize;
    for mip in 0..src.num_mips as u32 {
        dst_offsets[mip as usize] = dst_pixel_count;
        let w = (dst_width >> mip).max(1) as usize;
        let h = (dst_height >> mip).max(1) as usize;
        dst_pixel_count += w * h;
    }
    let mut dst = vec![0.0f32; dst_pixel_count * 4];

    for mip in 0..src.num_mips {
        let (src_mip_w, src_mip_h) = src.mip_dimensions(mip);
        let (src_mip_w, src_mip_h) = (src_mip_w as usize, src_mip_h as usize);

        let dst_mip_w = (dst_width >> mip).max(1) as usize;
        let dst_mip_h = (dst_height >> mip).max(1) as usize;
        let inv_w = 1.0 / (dst_mip_w - 1).max(1) as f32;
        let inv_h = 1.0 / (dst_mip_h - 1).max(1) as f32;

        let mip_base = dst_offsets[mip as usize] * 4;
        for yy in 0..dst_mip_h {
            for xx in 0..dst_mip_w {
                let vec = geometry::vec_from_latlong(xx as f32 * inv_w, yy as f32 * inv_h);
                let (su, sv, face) = geometry::vec_to_texel_uv(vec);
                let sx = su * src_mip_w as f32;
                let sy = sv * src_mip_h as f32;

                let face_base = src_offsets[face as usize][mip as usize] * 4;
                let o = mip_base + (yy * dst_mip_w + xx) * 4;
                if bilinear {
                    let x0 = (sx as usize).min(src_mip_w - 1);
                    let y0 = (sy as usize).min(src_mip_h - 1);
                    let x1 = (x0 + 1).min(src_mip_w - 1);
                    let y1 = (y0 + 1).min(src_mip_h - 1);
                    let tx = sx - x0 as f32;
                    let ty = sy - y0 as f32;

                    let p0 = face_base + (y0 * src_mip_w + x0) * 4;
                    let p1 = face_base + (y0 * src_mip_w + x1) * 4;
                    let p2 = face_base + (y1 * src_mip_w + x0) * 4;
                    let p3 = face_base + (y1 * src_mip_w + x1) * 4;
                    let w0 = (1.0 - tx) * (1.0 - ty);
                    let w1 = tx * (1.0 - ty);
                    let w2 = (1.0 - tx) * ty;
                    let w3 = tx * ty;

                    for c in 0..3 {
                        dst[o + c] = pixels[p0 + c] * w0
                            + pixels[p1 + c] * w1
                            + pixels[p2 + c] * w2
                            + pixels[p3 + c] * w3;
                    }
                } else {
                    let x = (sx as usize).min(src_mip_w - 1);
                    let y = (sy as usize).min(src_mip_h - 1);
                    let p = face_base + (y * src_mip_w + x) * 4;
                    dst[o..o + 3].copy_from_slice(&pixels[p..p + 3]);
                }
                dst[o + 3] = 1.0;
            }
        }
    }

    Ok(convert::from_f32_pixels(
        dst_width,
        dst_height,
        src.num_mips,
        1,
        src.format,
        &dst,
    ))
}
