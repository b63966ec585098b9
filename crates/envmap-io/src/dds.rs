//! DirectDraw Surface (DDS) support.
//!
//! DDS is the container used for GPU-ready textures on Direct3D
//! pipelines: 2D images and cube maps with mip chains. This module reads
//! and writes the uncompressed layouts used for image-based lighting;
//! block-compressed surfaces (DXT/BC) are out of scope.
//!
//! # Layout
//!
//! A file is the fourcc magic `"DDS "`, a 124-byte little-endian header,
//! an optional 20-byte DX10 extension header, then raw pixel data
//! face-major, mip-minor, unpadded. Modern formats (RGBA16, RGBA16F,
//! RGBA32F) are declared through the DX10 extension's DXGI format;
//! legacy 8-bit layouts use the D3D pixel-format record directly.
//!
//! Two real-world quirks are handled on read:
//!
//! - Files with a mip-map count of zero are treated as single-mip.
//! - Some encoders set the DX10 fourcc but write pixel data where the
//!   extension header belongs. When the remaining payload is exactly 20
//!   bytes short, the reader backs up over the "extension" and decodes it
//!   as pixels.
//!
//! # Example
//!
//! ```no_run
//! use envmap_io::dds;
//!
//! let image = dds::read("cubemap.dds")?;
//! dds::write("copy.dds", &image)?;
//! # Ok::<(), envmap_io::IoError>(())
//! ```

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::warn;

use crate::{FormatReader, FormatWriter, IoError, IoResult};
use envmap_core::{data_size, Image, TextureFormat, MAX_MIP_NUM};

const DDS_MAGIC: u32 = 0x2053_4444; // "DDS "
const DDS_HEADER_SIZE: u32 = 124;
const DDS_PIXELFORMAT_SIZE: u32 = 32;
const DDS_DX10_HEADER_SIZE: u64 = 20;

const DDSD_CAPS: u32 = 0x0000_0001;
const DDSD_HEIGHT: u32 = 0x0000_0002;
const DDSD_WIDTH: u32 = 0x0000_0004;
const DDSD_PITCH: u32 = 0x0000_0008;
const DDSD_PIXELFORMAT: u32 = 0x0000_1000;
const DDSD_MIPMAPCOUNT: u32 = 0x0002_0000;

const DDPF_ALPHAPIXELS: u32 = 0x0000_0001;
const DDPF_FOURCC: u32 = 0x0000_0004;
const DDPF_RGB: u32 = 0x0000_0040;
const DDPF_RGBA: u32 = DDPF_RGB | DDPF_ALPHAPIXELS;

// Synthetic flags mixed into the legacy lookup key from the bit count.
const DDS_PF_BC_24: u32 = 0x0010_0000;
const DDS_PF_BC_32: u32 = 0x0020_0000;
const DDS_PF_BC_48: u32 = 0x0040_0000;

const DDSCAPS_COMPLEX: u32 = 0x0000_0008;
const DDSCAPS_TEXTURE: u32 = 0x0000_1000;
const DDSCAPS_MIPMAP: u32 = 0x0040_0000;

const DDSCAPS2_CUBEMAP: u32 = 0x0000_0200;
const DDS_CUBEMAP_ALLFACES: u32 = 0x0000_FC00;

const DDS_DX10: u32 = 0x3031_5844; // "DX10"

const D3DFMT_R8G8B8: u32 = 20;
const D3DFMT_A8R8G8B8: u32 = 21;
const D3DFMT_A8B8G8R8: u32 = 32;
const D3DFMT_A16B16G16R16: u32 = 36;
const D3DFMT_A16B16G16R16F: u32 = 113;
const D3DFMT_A32B32G32R32F: u32 = 116;

const DXGI_FORMAT_R32G32B32A32_FLOAT: u32 = 2;
const DXGI_FORMAT_R16G16B16A16_FLOAT: u32 = 10;
const DXGI_FORMAT_R16G16B16A16_UINT: u32 = 12;

const DDS_DIMENSION_TEXTURE2D: u32 = 3;
const D3D10_RESOURCE_MISC_TEXTURECUBE: u32 = 0x4;

/// Pixel formats a DDS file can hold without conversion.
pub const VALID_FORMATS: [TextureFormat; 5] = [
    TextureFormat::Bgr8,
    TextureFormat::Bgra8,
    TextureFormat::Rgba16,
    TextureFormat::Rgba16F,
    TextureFormat::Rgba32F,
];

/// Legacy D3D format and synthetic bit-count keys to texture formats.
const TRANSLATE_D3D_FORMAT: [(u32, TextureFormat); 8] = [
    (D3DFMT_R8G8B8, TextureFormat::Bgr8),
    (D3DFMT_A8R8G8B8, TextureFormat::Bgra8),
    (D3DFMT_A16B16G16R16, TextureFormat::Rgba16),
    (D3DFMT_A16B16G16R16F, TextureFormat::Rgba16F),
    (D3DFMT_A32B32G32R32F, TextureFormat::Rgba32F),
    (DDS_PF_BC_24 | DDPF_RGB, TextureFormat::Bgr8),
    (DDS_PF_BC_32 | DDPF_RGBA, TextureFormat::Bgra8),
    (DDS_PF_BC_48 | DDPF_RGB, TextureFormat::Rgb16),
];

/// DXGI formats to texture formats (DX10 extension path).
const TRANSLATE_DXGI_FORMAT: [(u32, TextureFormat); 3] = [
    (DXGI_FORMAT_R16G16B16A16_UINT, TextureFormat::Rgba16),
    (DXGI_FORMAT_R16G16B16A16_FLOAT, TextureFormat::Rgba16F),
    (DXGI_FORMAT_R32G32B32A32_FLOAT, TextureFormat::Rgba32F),
];

#[derive(Debug, Clone, Copy, Default)]
struct DdsPixelFormat {
    size: u32,
    flags: u32,
    fourcc: u32,
    rgb_bit_count: u32,
    r_bit_mask: u32,
    g_bit_mask: u32,
    b_bit_mask: u32,
    a_bit_mask: u32,
}

#[derive(Debug, Clone, Default)]
struct DdsHeader {
    size: u32,
    flags: u32,
    height: u32,
    width: u32,
    pitch_or_linear_size: u32,
    depth: u32,
    mip_map_count: u32,
    reserved1: [u32; 11],
    pixel_format: DdsPixelFormat,
    caps: u32,
    caps2: u32,
    caps3: u32,
    caps4: u32,
    reserved2: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct DdsHeaderDx10 {
    dxgi_format: u32,
    resource_dimension: u32,
    misc_flags: u32,
    array_size: u32,
    misc_flags2: u32,
}

impl DdsHeader {
    fn read<R: Read>(reader: &mut R) -> IoResult<Self> {
        let mut header = DdsHeader {
            size: reader.read_u32::<LittleEndian>()?,
            flags: reader.read_u32::<LittleEndian>()?,
            height: reader.read_u32::<LittleEndian>()?,
            width: reader.read_u32::<LittleEndian>()?,
            pitch_or_linear_size: reader.read_u32::<LittleEndian>()?,
            depth: reader.read_u32::<LittleEndian>()?,
            mip_map_count: reader.read_u32::<LittleEndian>()?,
            ..Default::default()
        };
        for slot in header.reserved1.iter_mut() {
            *slot = reader.read_u32::<LittleEndian>()?;
        }
        header.pixel_format = DdsPixelFormat {
            size: reader.read_u32::<LittleEndian>()?,
            flags: reader.read_u32::<LittleEndian>()?,
            fourcc: reader.read_u32::<LittleEndian>()?,
            rgb_bit_count: reader.read_u32::<LittleEndian>()?,
            r_bit_mask: reader.read_u32::<LittleEndian>()?,
            g_bit_mask: reader.read_u32::<LittleEndian>()?,
            b_bit_mask: reader.read_u32::<LittleEndian>()?,
            a_bit_mask: reader.read_u32::<LittleEndian>()?,
        };
        header.caps = reader.read_u32::<LittleEndian>()?;
        header.caps2 = reader.read_u32::<LittleEndian>()?;
        header.caps3 = reader.read_u32::<LittleEndian>()?;
        header.caps4 = reader.read_u32::<LittleEndian>()?;
        header.reserved2 = reader.read_u32::<LittleEndian>()?;
        Ok(header)
    }

    fn write<W: Write>(&self, writer: &mut W) -> IoResult<()> {
        writer.write_u32::<LittleEndian>(self.size)?;
        writer.write_u32::<LittleEndian>(self.flags)?;
        writer.write_u32::<LittleEndian>(self.height)?;
        writer.write_u32::<LittleEndian>(self.width)?;
        writer.write_u32::<LittleEndian>(self.pitch_or_linear_size)?;
        writer.write_u32::<LittleEndian>(self.depth)?;
        writer.write_u32::<LittleEndian>(self.mip_map_count)?;
        for slot in self.reserved1 {
            writer.write_u32::<LittleEndian>(slot)?;
        }
        writer.write_u32::<LittleEndian>(self.pixel_format.size)?;
        writer.write_u32::<LittleEndian>(self.pixel_format.flags)?;
        writer.write_u32::<LittleEndian>(self.pixel_format.fourcc)?;
        writer.write_u32::<LittleEndian>(self.pixel_format.rgb_bit_count)?;
        writer.write_u32::<LittleEndian>(self.pixel_format.r_bit_mask)?;
        writer.write_u32::<LittleEndian>(self.pixel_format.g_bit_mask)?;
        writer.write_u32::<LittleEndian>(self.pixel_format.b_bit_mask)?;
        writer.write_u32::<LittleEndian>(self.pixel_format.a_bit_mask)?;
        writer.write_u32::<LittleEndian>(self.caps)?;
        writer.write_u32::<LittleEndian>(self.caps2)?;
        writer.write_u32::<LittleEndian>(self.caps3)?;
        writer.write_u32::<LittleEndian>(self.caps4)?;
        writer.write_u32::<LittleEndian>(self.reserved2)?;
        Ok(())
    }
}

/// Pixel-format record emitted for a texture format. Only defined for the
/// formats in [`VALID_FORMATS`].
fn dds_pixel_format(format: TextureFormat) -> Option<DdsPixelFormat> {
    let record = match format {
        TextureFormat::Bgr8 => DdsPixelFormat {
            size: DDS_PIXELFORMAT_SIZE,
            flags: DDPF_RGB,
            fourcc: D3DFMT_R8G8B8,
            rgb_bit_count: 24,
            r_bit_mask: 0x00ff_0000,
            g_bit_mask: 0x0000_ff00,
            b_bit_mask: 0x0000_00ff,
            a_bit_mask: 0,
        },
        TextureFormat::Bgra8 => DdsPixelFormat {
            size: DDS_PIXELFORMAT_SIZE,
            flags: DDPF_RGBA,
            fourcc: D3DFMT_A8B8G8R8,
            rgb_bit_count: 32,
            r_bit_mask: 0x00ff_0000,
            g_bit_mask: 0x0000_ff00,
            b_bit_mask: 0x0000_00ff,
            a_bit_mask: 0xff00_0000,
        },
        TextureFormat::Rgba16 | TextureFormat::Rgba16F => DdsPixelFormat {
            size: DDS_PIXELFORMAT_SIZE,
            flags: DDPF_FOURCC,
            fourcc: DDS_DX10,
            rgb_bit_count: 64,
            r_bit_mask: 0x00ff_0000,
            g_bit_mask: 0x0000_ff00,
            b_bit_mask: 0x0000_00ff,
            a_bit_mask: 0xff00_0000,
        },
        TextureFormat::Rgba32F => DdsPixelFormat {
            size: DDS_PIXELFORMAT_SIZE,
            flags: DDPF_FOURCC,
            fourcc: DDS_DX10,
            rgb_bit_count: 128,
            r_bit_mask: 0x00ff_0000,
            g_bit_mask: 0x0000_ff00,
            b_bit_mask: 0x0000_00ff,
            a_bit_mask: 0xff00_0000,
        },
        _ => return None,
    };
    Some(record)
}

fn dxgi_format(format: TextureFormat) -> u32 {
    match format {
        TextureFormat::Rgba16 => DXGI_FORMAT_R16G16B16A16_UINT,
        TextureFormat::Rgba16F => DXGI_FORMAT_R16G16B16A16_FLOAT,
        TextureFormat::Rgba32F => DXGI_FORMAT_R32G32B32A32_FLOAT,
        _ => 0,
    }
}

/// Decodes a DDS stream into an image.
pub fn decode<R: Read + Seek>(reader: &mut R) -> IoResult<Image> {
    let magic = reader.read_u32::<LittleEndian>()?;
    if magic != DDS_MAGIC {
        return Err(IoError::BadMagic);
    }

    let mut header = DdsHeader::read(reader)?;

    let has_dx10 = header.pixel_format.fourcc == DDS_DX10
        && (header.pixel_format.flags & DDPF_FOURCC) != 0;
    let dx10 = if has_dx10 {
        Some(DdsHeaderDx10 {
            dxgi_format: reader.read_u32::<LittleEndian>()?,
            resource_dimension: reader.read_u32::<LittleEndian>()?,
            misc_flags: reader.read_u32::<LittleEndian>()?,
            array_size: reader.read_u32::<LittleEndian>()?,
            misc_flags2: reader.read_u32::<LittleEndian>()?,
        })
    } else {
        None
    };

    if header.size != DDS_HEADER_SIZE {
        return Err(IoError::MalformedHeader(format!(
            "DDS header size {} (expected {DDS_HEADER_SIZE})",
            header.size
        )));
    }
    let required = DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PIXELFORMAT;
    if header.flags & required != required {
        return Err(IoError::MalformedHeader(format!(
            "DDS header flags {:#x} missing required bits",
            header.flags
        )));
    }
    if header.caps & DDSCAPS_TEXTURE == 0 {
        return Err(IoError::MalformedHeader("DDS caps missing TEXTURE".into()));
    }

    if header.mip_map_count == 0 {
        warn!("DDS mip-map count is 0, treating as 1");
        header.mip_map_count = 1;
    }
    if header.mip_map_count > MAX_MIP_NUM as u32 {
        return Err(IoError::MalformedHeader(format!(
            "DDS mip-map count {} exceeds {MAX_MIP_NUM}",
            header.mip_map_count
        )));
    }

    let is_cubemap = header.caps2 & DDSCAPS2_CUBEMAP != 0;
    if is_cubemap && header.caps2 & DDS_CUBEMAP_ALLFACES != DDS_CUBEMAP_ALLFACES {
        return Err(IoError::MalformedHeader(
            "partial DDS cubemap not supported".into(),
        ));
    }

    // Format resolution: DXGI table, then the legacy fourcc/bit-count
    // table, then a bytes-per-pixel guess as a last resort.
    let mut format = TextureFormat::Unknown;
    if let Some(dx10) = dx10 {
        if let Some(&(_, f)) = TRANSLATE_DXGI_FORMAT
            .iter()
            .find(|(dxgi, _)| *dxgi == dx10.dxgi_format)
        {
            format = f;
        }
    } else {
        let bit_count_flag = match header.pixel_format.rgb_bit_count {
            24 => DDS_PF_BC_24,
            32 => DDS_PF_BC_32,
            48 => DDS_PF_BC_48,
            _ => 0,
        };
        let key = if header.pixel_format.flags & DDPF_FOURCC != 0 {
            header.pixel_format.fourcc
        } else {
            header.pixel_format.flags | bit_count_flag
        };
        if let Some(&(_, f)) = TRANSLATE_D3D_FORMAT.iter().find(|(k, _)| *k == key) {
            format = f;
        }
    }

    if format == TextureFormat::Unknown {
        let bytes_per_pixel = header.pixel_format.rgb_bit_count as usize / 8;
        if let Some(&f) = VALID_FORMATS
            .iter()
            .find(|f| f.bytes_per_pixel() == bytes_per_pixel)
        {
            format = f;
            warn!(guessed = %format, "DDS pixel format unknown, guessing from bit count");
        } else {
            return Err(IoError::UnsupportedFormat(format!(
                "DDS pixel format (fourcc {:#x}, {} bpp)",
                header.pixel_format.fourcc, header.pixel_format.rgb_bit_count
            )));
        }
    }

    let num_faces: u8 = if is_cubemap { 6 } else { 1 };
    let num_mips = header.mip_map_count as u8;
    let total = data_size(header.width, header.height, format, num_mips, num_faces);

    // Phantom DX10 header: flags claim an extension but the pixel data
    // starts where it should be. Detected by the payload being exactly
    // one extension header short.
    let current = reader.stream_position()?;
    let end = reader.seek(SeekFrom::End(0))?;
    let remaining = end.saturating_sub(current);
    if remaining as i64 == total as i64 - DDS_DX10_HEADER_SIZE as i64 {
        warn!("DDS claims a DX10 header but the payload overlaps it; rewinding");
        reader.seek(SeekFrom::Start(current - DDS_DX10_HEADER_SIZE))?;
    } else {
        reader.seek(SeekFrom::Start(current))?;
    }

    let mut data = vec![0u8; total];
    reader.read_exact(&mut data)?;

    Ok(Image::from_data(
        header.width,
        header.height,
        format,
        num_mips,
        num_faces,
        data,
    )?)
}

/// Encodes an image into a DDS stream.
///
/// # Errors
///
/// [`IoError::UnsupportedFormat`] unless the image format is one of
/// [`VALID_FORMATS`].
pub fn encode<W: Write>(writer: &mut W, image: &Image) -> IoResult<()> {
    let pixel_format = dds_pixel_format(image.format).ok_or_else(|| {
        IoError::UnsupportedFormat(format!("{} cannot be stored in DDS", image.format))
    })?;

    let has_mips = image.num_mips > 1;
    let is_cubemap = image.num_faces == 6;
    let complex = has_mips || image.num_faces > 1;

    let header = DdsHeader {
        size: DDS_HEADER_SIZE,
        flags: DDSD_CAPS
            | DDSD_HEIGHT
            | DDSD_WIDTH
            | DDSD_PIXELFORMAT
            | DDSD_PITCH
            | if has_mips { DDSD_MIPMAPCOUNT } else { 0 },
        height: image.height,
        width: image.width,
        pitch_or_linear_size: image.width * image.format.bytes_per_pixel() as u32,
        mip_map_count: image.num_mips as u32,
        pixel_format,
        caps: DDSCAPS_TEXTURE
            | if has_mips { DDSCAPS_MIPMAP } else { 0 }
            | if complex { DDSCAPS_COMPLEX } else { 0 },
        caps2: if is_cubemap {
            DDSCAPS2_CUBEMAP | DDS_CUBEMAP_ALLFACES
        } else {
            0
        },
        ..Default::default()
    };

    writer.write_u32::<LittleEndian>(DDS_MAGIC)?;
    header.write(writer)?;

    if pixel_format.fourcc == DDS_DX10 {
        let dx10 = DdsHeaderDx10 {
            dxgi_format: dxgi_format(image.format),
            resource_dimension: DDS_DIMENSION_TEXTURE2D,
            misc_flags: if is_cubemap { D3D10_RESOURCE_MISC_TEXTURECUBE } else { 0 },
            array_size: 1,
            misc_flags2: 0,
        };
        writer.write_u32::<LittleEndian>(dx10.dxgi_format)?;
        writer.write_u32::<LittleEndian>(dx10.resource_dimension)?;
        writer.write_u32::<LittleEndian>(dx10.misc_flags)?;
        writer.write_u32::<LittleEndian>(dx10.array_size)?;
        writer.write_u32::<LittleEndian>(dx10.misc_flags2)?;
    }

    writer.write_all(&image.data)?;
    Ok(())
}

/// DDS file reader.
#[derive(Debug, Clone, Default)]
pub struct DdsReader;

impl FormatReader for DdsReader {
    fn format_name(&self) -> &'static str {
        "DDS"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["dds"]
    }

    fn can_read(&self, header: &[u8]) -> bool {
        header.len() >= 4 && &header[..4] == b"DDS "
    }

    fn read<P: AsRef<Path>>(&self, path: P) -> IoResult<Image> {
        let file = File::open(path.as_ref())?;
        decode(&mut BufReader::new(file))
    }

    fn read_from_memory(&self, data: &[u8]) -> IoResult<Image> {
        decode(&mut Cursor::new(data))
    }

    fn with_options(_options: ()) -> Self {
        DdsReader
    }
}

/// DDS file writer.
#[derive(Debug, Clone, Default)]
pub struct DdsWriter;

impl FormatWriter for DdsWriter {
    fn format_name(&self) -> &'static str {
        "DDS"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["dds"]
    }

    fn valid_formats(&self) -> &'static [TextureFormat] {
        &VALID_FORMATS
    }

    fn write<P: AsRef<Path>>(&self, path: P, image: &Image) -> IoResult<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        encode(&mut writer, image)?;
        writer.flush()?;
        Ok(())
    }

    fn write_to_memory(&self, image: &Image) -> IoResult<Vec<u8>> {
        let mut buffer = Vec::new();
        encode(&mut buffer, image)?;
        Ok(buffer)
    }

    fn with_options(_options: ()) -> Self {
        DdsWriter
    }
}

/// Reads a DDS file with default options.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    DdsReader.read(path)
}

/// Writes a DDS file with default options.
pub fn write<P: AsRef<Path>>(path: P, image: &Image) -> IoResult<()> {
    DdsWriter.write(path, image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_constant() {
        assert_eq!(&DDS_MAGIC.to_le_bytes(), b"DDS ");
        assert_eq!(&DDS_DX10.to_le_bytes(), b"DX10");
    }

    #[test]
    fn test_legacy_roundtrip_header_fields() {
        let mut image = Image::new(4, 2, TextureFormat::Bgra8, 1, 1);
        for (i, b) in image.data.iter_mut().enumerate() {
            *b = i as u8;
        }
        let bytes = DdsWriter.write_to_memory(&image).unwrap();
        assert_eq!(bytes.len(), 4 + 124 + 4 * 2 * 4);

        let loaded = DdsReader.read_from_memory(&bytes).unwrap();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_dx10_formats_emit_extension() {
        let image = Image::new(2, 2, TextureFormat::Rgba16F, 1, 1);
        let bytes = DdsWriter.write_to_memory(&image).unwrap();
        assert_eq!(bytes.len(), 4 + 124 + 20 + 2 * 2 * 8);
        // fourcc field sits at magic + 76 bytes into the header + 8.
        assert_eq!(&bytes[4 + 80..4 + 84], b"DX10");

        let loaded = DdsReader.read_from_memory(&bytes).unwrap();
        assert_eq!(loaded.format, TextureFormat::Rgba16F);
    }

    #[test]
    fn test_zero_mip_count_coerced() {
        let image = Image::new(2, 2, TextureFormat::Bgr8, 1, 1);
        let mut bytes = DdsWriter.write_to_memory(&image).unwrap();
        // mipMapCount is the 7th u32 of the header (offset 4 + 24).
        bytes[28..32].copy_from_slice(&0u32.to_le_bytes());
        let loaded = DdsReader.read_from_memory(&bytes).unwrap();
        assert_eq!(loaded.num_mips, 1);
    }

    #[test]
    fn test_partial_cubemap_rejected() {
        let image = Image::new(2, 2, TextureFormat::Bgra8, 1, 6);
        let mut bytes = DdsWriter.write_to_memory(&image).unwrap();
        // caps2 at offset 4 + 108: keep CUBEMAP, drop one face bit.
        let caps2 = DDSCAPS2_CUBEMAP | (DDS_CUBEMAP_ALLFACES & !0x400);
        bytes[112..116].copy_from_slice(&caps2.to_le_bytes());
        assert!(matches!(
            DdsReader.read_from_memory(&bytes),
            Err(IoError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_phantom_dx10_header() {
        let mut image = Image::new(2, 2, TextureFormat::Rgba32F, 1, 1);
        for (i, b) in image.data.iter_mut().enumerate() {
            *b = (i * 3) as u8;
        }
        let bytes = DdsWriter.write_to_memory(&image).unwrap();
        // Drop the DX10 extension, leaving the payload where it was.
        let mut phantom = bytes[..128].to_vec();
        phantom.extend_from_slice(&bytes[148..]);
        let loaded = DdsReader.read_from_memory(&phantom).unwrap();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_bad_magic() {
        assert!(matches!(
            DdsReader.read_from_memory(b"NOPE....."),
            Err(IoError::BadMagic)
        ));
    }
}
