//! Cube-map geometry: directions, face coordinates and the lat-long
//! projection.
//!
//! The face index convention is the single source of truth shared by every
//! layout remap: `0..=5` is `+X, -X, +Y, -Y, +Z, -Z`. Each face carries a
//! fixed (u, v) basis so that `(u, v) in [-1, 1]^2` spans the face with u
//! growing rightwards and v growing downwards in face storage order:
//!
//! | Face | u axis | v axis |
//! |------|--------|--------|
//! | +X   | -Z     | -Y     |
//! | -X   | +Z     | -Y     |
//! | +Y   | +X     | +Z     |
//! | -Y   | +X     | -Z     |
//! | +Z   | +X     | -Y     |
//! | -Z   | -X     | -Y     |
//!
//! The lat-long mapping puts azimuth on the horizontal axis
//! (`u = 0.5 + atan2(x, z) / 2pi`) and inclination on the vertical
//! (`v = acos(y) / pi`); [`vec_from_latlong`] is its inverse, which is what
//! the cube-to-lat-long round trip in the tests pins down.

use envmap_core::{Image, PixelDataType, TextureFormat};

/// Face index of +X.
pub const FACE_POS_X: u8 = 0;
/// Face index of -X.
pub const FACE_NEG_X: u8 = 1;
/// Face index of +Y.
pub const FACE_POS_Y: u8 = 2;
/// Face index of -Y.
pub const FACE_NEG_Y: u8 = 3;
/// Face index of +Z.
pub const FACE_POS_Z: u8 = 4;
/// Face index of -Z.
pub const FACE_NEG_Z: u8 = 5;

/// Per-face (u, v, normal) basis vectors; rows are u axis, v axis, face
/// normal.
const FACE_UV_VECTORS: [[[f32; 3]; 3]; 6] = [
    // +X
    [[0.0, 0.0, -1.0], [0.0, -1.0, 0.0], [1.0, 0.0, 0.0]],
    // -X
    [[0.0, 0.0, 1.0], [0.0, -1.0, 0.0], [-1.0, 0.0, 0.0]],
    // +Y
    [[1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]],
    // -Y
    [[1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, -1.0, 0.0]],
    // +Z
    [[1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 1.0]],
    // -Z
    [[-1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, -1.0]],
];

/// Maps `(u, v) in [-1, 1]^2` on a face to the unit direction through that
/// texel.
pub fn texel_uv_to_vec(u: f32, v: f32, face: u8) -> [f32; 3] {
    let basis = &FACE_UV_VECTORS[face as usize];
    let vec = [
        basis[0][0] * u + basis[1][0] * v + basis[2][0],
        basis[0][1] * u + basis[1][1] * v + basis[2][1],
        basis[0][2] * u + basis[1][2] * v + basis[2][2],
    ];
    let inv_len = 1.0 / (vec[0] * vec[0] + vec[1] * vec[1] + vec[2] * vec[2]).sqrt();
    [vec[0] * inv_len, vec[1] * inv_len, vec[2] * inv_len]
}

/// Projects a direction onto its dominant-axis face. Returns
/// `(u, v, face)` with `u, v in [0, 1]`.
pub fn vec_to_texel_uv(vec: [f32; 3]) -> (f32, f32, u8) {
    let abs = [vec[0].abs(), vec[1].abs(), vec[2].abs()];
    let max = abs[0].max(abs[1]).max(abs[2]);

    let face = if max == abs[0] {
        if vec[0] >= 0.0 { FACE_POS_X } else { FACE_NEG_X }
    } else if max == abs[1] {
        if vec[1] >= 0.0 { FACE_POS_Y } else { FACE_NEG_Y }
    } else if vec[2] >= 0.0 {
        FACE_POS_Z
    } else {
        FACE_NEG_Z
    };

    let inv_max = 1.0 / max;
    let on_face = [vec[0] * inv_max, vec[1] * inv_max, vec[2] * inv_max];
    let basis = &FACE_UV_VECTORS[face as usize];
    let u = (dot(basis[0], on_face) + 1.0) * 0.5;
    let v = (dot(basis[1], on_face) + 1.0) * 0.5;
    (u, v, face)
}

/// Maps a direction to lat-long `(u, v) in [0, 1]^2`.
pub fn latlong_from_vec(vec: [f32; 3]) -> (f32, f32) {
    let phi = vec[0].atan2(vec[2]);
    let theta = vec[1].clamp(-1.0, 1.0).acos();
    (
        (std::f32::consts::PI + phi) * std::f32::consts::FRAC_1_PI * 0.5,
        theta * std::f32::consts::FRAC_1_PI,
    )
}

/// Maps lat-long `(u, v) in [0, 1]^2` to a unit direction; inverse of
/// [`latlong_from_vec`].
pub fn vec_from_latlong(u: f32, v: f32) -> [f32; 3] {
    let phi = u * 2.0 * std::f32::consts::PI;
    let theta = v * std::f32::consts::PI;
    let sin_theta = theta.sin();
    [
        -sin_theta * phi.sin(),
        theta.cos(),
        -sin_theta * phi.cos(),
    ]
}

#[inline]
fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Heuristically decides whether a single-face image is a cube cross.
///
/// Checks the 3:4 or 4:3 aspect, then samples the six "key points" that in
/// a well-formed cross sit in the background margin around the faces, and
/// requires each to be near black (under 2/255 for 8-bit data, 2/65535 for
/// 16-bit, 0.01 for float and RGBE data).
///
/// Best-effort only: crosses painted on a non-black background are
/// misclassified, and a black-cornered non-cross can pass.
pub fn is_cube_cross(image: &Image) -> bool {
    if image.num_faces != 1 || image.format == TextureFormat::Unknown {
        return false;
    }

    let aspect = image.width as f32 / image.height as f32;
    let vertical = (aspect - 3.0 / 4.0).abs() < 1e-4;
    let horizontal = (aspect - 4.0 / 3.0).abs() < 1e-4;
    if !vertical && !horizontal {
        return false;
    }

    let face_size = image.width / if vertical { 3 } else { 4 };
    let half = face_size / 2;

    // Key points in the margin, (x, y) pixel coordinates.
    let keys: [(u32, u32); 6] = if vertical {
        [
            (half, half),
            (2 * face_size + half, half),
            (half, 2 * face_size + half),
            (2 * face_size + half, 2 * face_size + half),
            (half, 3 * face_size + half),
            (2 * face_size + half, 3 * face_size + half),
        ]
    } else {
        [
            (half, half),
            (2 * face_size + half, half),
            (3 * face_size + half, half),
            (half, 2 * face_size + half),
            (2 * face_size + half, 2 * face_size + half),
            (3 * face_size + half, 2 * face_size + half),
        ]
    };

    let threshold = match image.format.pixel_type() {
        PixelDataType::Uint8 if image.format != TextureFormat::Rgbe => 2.0 / 255.0,
        PixelDataType::Uint16 => 2.0 / 65535.0,
        _ => 0.01,
    };

    let bytes_per_pixel = image.format.bytes_per_pixel();
    let pitch = image.width as usize * bytes_per_pixel;
    for (x, y) in keys {
        let offset = y as usize * pitch + x as usize * bytes_per_pixel;
        let rgba = envmap_core::convert::to_rgba32f(
            image.format,
            &image.data[offset..offset + bytes_per_pixel],
        );
        if rgba[0] >= threshold || rgba[1] >= threshold || rgba[2] >= threshold {
            return false;
        }
    }

    true
}
