//! Container detection.
//!
//! Load dispatch sniffs the first four bytes of a file: DDS, KTX and
//! Radiance HDR have unambiguous magic numbers; TGA has none, so it is
//! accepted last through a header-plausibility check on the image-type
//! and color-map-type bytes.

use crate::IoResult;
use envmap_core::TextureFormat;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Supported container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// DirectDraw Surface.
    Dds,
    /// Khronos Texture (KTX 1.1).
    Ktx,
    /// Truevision TGA.
    Tga,
    /// Radiance HDR (RGBE).
    Hdr,
}

impl FileFormat {
    /// The extension appended when saving, without dot.
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Dds => "dds",
            FileFormat::Ktx => "ktx",
            FileFormat::Tga => "tga",
            FileFormat::Hdr => "hdr",
        }
    }

    /// Format name for messages.
    pub fn name(&self) -> &'static str {
        match self {
            FileFormat::Dds => "DDS",
            FileFormat::Ktx => "KTX",
            FileFormat::Tga => "TGA",
            FileFormat::Hdr => "HDR",
        }
    }

    /// Pixel formats the container can hold without conversion.
    pub fn valid_formats(&self) -> &'static [TextureFormat] {
        match self {
            FileFormat::Dds => &[
                TextureFormat::Bgr8,
                TextureFormat::Bgra8,
                TextureFormat::Rgba16,
                TextureFormat::Rgba16F,
                TextureFormat::Rgba32F,
            ],
            FileFormat::Ktx => &[
                TextureFormat::Rgb8,
                TextureFormat::Rgb16,
                TextureFormat::Rgb16F,
                TextureFormat::Rgb32F,
                TextureFormat::Rgba8,
                TextureFormat::Rgba16,
                TextureFormat::Rgba16F,
                TextureFormat::Rgba32F,
            ],
            FileFormat::Tga => &[TextureFormat::Bgr8, TextureFormat::Bgra8],
            FileFormat::Hdr => &[TextureFormat::Rgbe],
        }
    }

    /// Identifies a container from the first bytes of a file.
    ///
    /// Needs at least 4 bytes. TGA, having no magic, is reported only
    /// when its header bytes look plausible; `None` means no container
    /// claimed the data.
    pub fn from_bytes(bytes: &[u8]) -> Option<FileFormat> {
        if bytes.len() < 4 {
            return None;
        }
        if &bytes[..4] == b"DDS " {
            return Some(FileFormat::Dds);
        }
        if &bytes[..4] == b"#?RA" {
            return Some(FileFormat::Hdr);
        }
        if bytes[..4] == [0xAB, 0x4B, 0x54, 0x58] {
            return Some(FileFormat::Ktx);
        }
        if tga_plausible(bytes) {
            return Some(FileFormat::Tga);
        }
        None
    }

    /// Reads the first bytes of `path` and identifies the container.
    pub fn detect<P: AsRef<Path>>(path: P) -> IoResult<Option<FileFormat>> {
        let mut file = File::open(path)?;
        let mut header = [0u8; 4];
        let n = file.read(&mut header)?;
        Ok(Self::from_bytes(&header[..n]))
    }
}

/// TGA plausibility: byte 2 is the image type and must be one of
/// 1, 2, 3, 9, 10, 11; byte 1 is the color-map type and must be 1 exactly
/// when the image type is color-mapped (1 or 9), 0 otherwise.
fn tga_plausible(bytes: &[u8]) -> bool {
    let color_map_type = bytes[1];
    let image_type = bytes[2];
    match image_type {
        1 | 9 => color_map_type == 1,
        2 | 3 | 10 | 11 => color_map_type == 0,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_detection() {
        assert_eq!(FileFormat::from_bytes(b"DDS |...."), Some(FileFormat::Dds));
        assert_eq!(FileFormat::from_bytes(b"#?RADIANCE"), Some(FileFormat::Hdr));
        assert_eq!(
            FileFormat::from_bytes(&[0xAB, 0x4B, 0x54, 0x58, 0x20, 0x31, 0x31, 0xBB]),
            Some(FileFormat::Ktx)
        );
    }

    #[test]
    fn test_tga_plausibility() {
        // Uncompressed true-color, no color map.
        assert_eq!(FileFormat::from_bytes(&[0, 0, 2, 0]), Some(FileFormat::Tga));
        // RLE true-color.
        assert_eq!(FileFormat::from_bytes(&[0, 0, 10, 0]), Some(FileFormat::Tga));
        // Color-mapped types need a color map.
        assert_eq!(FileFormat::from_bytes(&[0, 1, 1, 0]), Some(FileFormat::Tga));
        assert_eq!(FileFormat::from_bytes(&[0, 0, 1, 0]), None);
        // Color map on a true-color type is implausible.
        assert_eq!(FileFormat::from_bytes(&[0, 1, 2, 0]), None);
        // Unknown image type.
        assert_eq!(FileFormat::from_bytes(&[0, 0, 7, 0]), None);
    }

    #[test]
    fn test_valid_format_tables() {
        assert!(FileFormat::Dds.valid_formats().contains(&TextureFormat::Bgra8));
        assert!(!FileFormat::Dds.valid_formats().contains(&TextureFormat::Rgb8));
        assert!(FileFormat::Ktx.valid_formats().contains(&TextureFormat::Rgb8));
        assert!(!FileFormat::Ktx.valid_formats().contains(&TextureFormat::Bgr8));
        assert_eq!(FileFormat::Hdr.valid_formats(), &[TextureFormat::Rgbe]);
    }
}
