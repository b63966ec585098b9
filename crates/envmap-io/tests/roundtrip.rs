//! End-to-end container round trips across the save/load dispatch layer.

use approx::assert_relative_eq;
use half::f16;

use envmap_core::{convert, Image, TextureFormat};
use envmap_io::{load, load_as, save, FileFormat, FormatReader, FormatWriter};
use envmap_ops::remap;

fn temp_stem(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("envmap_io_test_{name}"))
}

/// A 64x64 RGBA16F cube map where face `k` is solid `(k/5, 0, 0, 1)`.
fn half_float_cube() -> Image {
    let mut cube = Image::new(64, 64, TextureFormat::Rgba16F, 1, 6);
    for face in 0..6usize {
        let red = f16::from_f32(face as f32 / 5.0).to_bits().to_le_bytes();
        let one = f16::from_f32(1.0).to_bits().to_le_bytes();
        let base = face * 64 * 64 * 8;
        for px in 0..64 * 64 {
            let at = base + px * 8;
            cube.data[at..at + 2].copy_from_slice(&red);
            cube.data[at + 6..at + 8].copy_from_slice(&one);
        }
    }
    cube
}

#[test]
fn dds_cubemap_roundtrip() {
    let cube = half_float_cube();
    let path = save(&cube, temp_stem("dds_cube"), FileFormat::Dds, None).expect("save dds");
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("dds"));

    let loaded = load(&path).expect("load dds");
    assert!(loaded.is_cubemap());
    assert_eq!(loaded.num_faces, 6);
    assert_eq!(loaded.num_mips, 1);
    assert_eq!(loaded.format, TextureFormat::Rgba16F);
    assert_eq!(loaded.data, cube.data);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn dds_refuses_illegal_format() {
    let image = Image::new(4, 4, TextureFormat::Rgbe, 1, 1);
    assert!(save(&image, temp_stem("dds_rgbe"), FileFormat::Dds, None).is_err());

    // But converting on the way out is fine.
    let path = save(
        &image,
        temp_stem("dds_rgbe_conv"),
        FileFormat::Dds,
        Some(TextureFormat::Rgba32F),
    )
    .expect("save with conversion");
    let loaded = load(&path).expect("load");
    assert_eq!(loaded.format, TextureFormat::Rgba32F);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn hdr_decode_4x2_literal() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"#?RADIANCE\n");
    bytes.extend_from_slice(b"FORMAT=32-bit_rle_rgbe\n\n-Y 2 +X 4\n");
    for _ in 0..8 {
        bytes.extend_from_slice(&[128, 128, 128, 128]);
    }

    let image = envmap_io::hdr::HdrReader
        .read_from_memory(&bytes)
        .expect("decode hdr");
    assert_eq!(image.format, TextureFormat::Rgbe);
    assert_eq!((image.width, image.height), (4, 2));
    assert_eq!((image.num_faces, image.num_mips), (1, 1));

    let px = convert::to_rgba32f(TextureFormat::Rgbe, &image.data[..4]);
    assert_relative_eq!(px[0], 0.5, epsilon = 1.0 / 128.0);
    assert_relative_eq!(px[1], 0.5, epsilon = 1.0 / 128.0);
    assert_relative_eq!(px[2], 0.5, epsilon = 1.0 / 128.0);
    assert_eq!(px[3], 1.0);
}

#[test]
fn hdr_file_roundtrip_via_dispatch() {
    let mut image = Image::new(16, 8, TextureFormat::Rgbe, 1, 1);
    for (i, b) in image.data.iter_mut().enumerate() {
        *b = ((i * 7) % 251) as u8;
    }
    let path = save(&image, temp_stem("hdr_rt"), FileFormat::Hdr, None).expect("save hdr");
    let loaded = load(&path).expect("load hdr");
    assert_eq!(loaded, image);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn ktx_row_padding_3x1() {
    let mut image = Image::new(3, 1, TextureFormat::Rgb8, 1, 1);
    image.data.copy_from_slice(&[10, 20, 30, 40, 50, 60, 70, 80, 90]);

    let bytes = envmap_io::ktx::KtxWriter
        .write_to_memory(&image)
        .expect("encode ktx");
    // Magic + header + image-size word + one padded row.
    assert_eq!(bytes.len(), 12 + 52 + 4 + 12);
    assert_eq!(&bytes[64..68], &12u32.to_le_bytes());
    assert_eq!(&bytes[68..77], &image.data[..]);
    assert_eq!(&bytes[77..80], &[0, 0, 0]);

    let loaded = envmap_io::ktx::KtxReader
        .read_from_memory(&bytes)
        .expect("decode ktx");
    assert_eq!(loaded, image);
}

#[test]
fn ktx_cubemap_mip_chain_roundtrip() {
    // 5-wide rows exercise padding on every mip level.
    let mut image = Image::new(5, 5, TextureFormat::Rgb8, 3, 6);
    for (i, b) in image.data.iter_mut().enumerate() {
        *b = ((i * 31) % 251) as u8;
    }
    let path = save(&image, temp_stem("ktx_cube"), FileFormat::Ktx, None).expect("save ktx");
    let loaded = load(&path).expect("load ktx");
    assert_eq!(loaded, image);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn tga_roundtrip_via_dispatch() {
    let mut image = Image::new(7, 5, TextureFormat::Bgra8, 1, 1);
    for (i, b) in image.data.iter_mut().enumerate() {
        *b = ((i * 11) % 251) as u8;
    }
    let path = save(&image, temp_stem("tga_rt"), FileFormat::Tga, None).expect("save tga");
    // TGA has no magic; dispatch must still pick it up by plausibility.
    let loaded = load(&path).expect("load tga");
    assert_eq!(loaded, image);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn load_as_converts_on_ingest() {
    let image = half_float_cube();
    let path = save(&image, temp_stem("load_as"), FileFormat::Dds, None).expect("save");
    let loaded = load_as(&path, TextureFormat::Rgba32F).expect("load_as");
    assert_eq!(loaded.format, TextureFormat::Rgba32F);

    let px = convert::to_rgba32f(
        TextureFormat::Rgba32F,
        &loaded.get_pixel(TextureFormat::Rgba32F, 0, 0, 0, 3).unwrap(),
    );
    assert_relative_eq!(px[0], 3.0 / 5.0, epsilon = 1e-3);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn unknown_container_rejected() {
    let path = temp_stem("garbage").with_extension("bin");
    std::fs::write(&path, [0xDEu8, 0xAD, 0xBE, 0xEF, 0, 0, 0, 0]).unwrap();
    assert!(matches!(load(&path), Err(envmap_io::IoError::BadMagic)));
    let _ = std::fs::remove_file(&path);
}

/// A cube map survives the full pipeline: strip remap, DDS save/load,
/// strip restore.
#[test]
fn strip_remap_through_dds() {
    let cube = half_float_cube();
    let strip = remap::hstrip_from_cubemap(&cube).expect("to strip");

    let path = save(&strip, temp_stem("strip_dds"), FileFormat::Dds, None).expect("save");
    let loaded = load(&path).expect("load");
    assert!(loaded.is_hstrip());

    let restored = remap::cubemap_from_hstrip(&loaded).expect("to cube");
    assert_eq!(restored, cube);
    let _ = std::fs::remove_file(&path);
}
