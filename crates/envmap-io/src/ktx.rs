//! KTX (Khronos Texture 1.1) support.
//!
//! KTX wraps GL-style texture data: 2D images and cube maps with mip
//! chains, described by GL type/format enums. This module reads and
//! writes the uncompressed formats used for image-based lighting.
//!
//! # Layout
//!
//! A file is the 12-byte identifier, a 52-byte header (thirteen `u32`
//! fields starting with an endianness marker), an optional key/value
//! block, then for each mip level a `u32` image size followed by the
//! faces. Rows, faces and mip payloads are each zero-padded to the
//! 4-byte unpack alignment; the written image size is the padded
//! row pitch times the height.
//!
//! Only the reference endianness marker `0x04030201` is emitted; files
//! with the reversed marker are accepted on read by byte-swapping the
//! header fields.
//!
//! # Example
//!
//! ```no_run
//! use envmap_io::ktx;
//!
//! let image = ktx::read("cubemap.ktx")?;
//! ktx::write("copy.ktx", &image)?;
//! # Ok::<(), envmap_io::IoError>(())
//! ```

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::warn;

use crate::{FormatReader, FormatWriter, IoError, IoResult};
use envmap_core::{Image, PixelDataType, TextureFormat, MAX_MIP_NUM};

const KTX_MAGIC: [u8; 12] = [
    0xAB, 0x4B, 0x54, 0x58, 0x20, 0x31, 0x31, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
];
const KTX_ENDIAN_REF: u32 = 0x0403_0201;
const KTX_ENDIAN_REF_REV: u32 = 0x0102_0304;
const KTX_UNPACK_ALIGNMENT: usize = 4;

// GL data types.
const GL_UNSIGNED_BYTE: u32 = 0x1401;
const GL_UNSIGNED_SHORT: u32 = 0x1403;
const GL_FLOAT: u32 = 0x1406;
const GL_HALF_FLOAT: u32 = 0x140B;

// GL base formats.
const GL_RGB: u32 = 0x1907;
const GL_RGBA: u32 = 0x1908;

// GL sized internal formats.
const GL_RGBA32F: u32 = 0x8814;
const GL_RGB32F: u32 = 0x8815;
const GL_RGBA16F: u32 = 0x881A;
const GL_RGB16F: u32 = 0x881B;
const GL_RGBA16UI: u32 = 0x8D76;
const GL_RGB16UI: u32 = 0x8D77;
const GL_RGBA8UI: u32 = 0x8D7C;
const GL_RGB8UI: u32 = 0x8D7D;

/// Pixel formats a KTX file can hold without conversion.
pub const VALID_FORMATS: [TextureFormat; 8] = [
    TextureFormat::Rgb8,
    TextureFormat::Rgb16,
    TextureFormat::Rgb16F,
    TextureFormat::Rgb32F,
    TextureFormat::Rgba8,
    TextureFormat::Rgba16,
    TextureFormat::Rgba16F,
    TextureFormat::Rgba32F,
];

/// `glInternalFormat` values accepted on read.
const TRANSLATE_GL_FORMAT: [(u32, TextureFormat); 10] = [
    (GL_RGB, TextureFormat::Rgb8),
    (GL_RGB8UI, TextureFormat::Rgb8),
    (GL_RGB16UI, TextureFormat::Rgb16),
    (GL_RGB16F, TextureFormat::Rgb16F),
    (GL_RGB32F, TextureFormat::Rgb32F),
    (GL_RGBA, TextureFormat::Rgba8),
    (GL_RGBA8UI, TextureFormat::Rgba8),
    (GL_RGBA16UI, TextureFormat::Rgba16),
    (GL_RGBA16F, TextureFormat::Rgba16F),
    (GL_RGBA32F, TextureFormat::Rgba32F),
];

/// Sized internal format and base format written for a texture format.
fn gl_internal_format(format: TextureFormat) -> Option<(u32, u32)> {
    let pair = match format {
        TextureFormat::Rgb8 => (GL_RGB8UI, GL_RGB),
        TextureFormat::Rgb16 => (GL_RGB16UI, GL_RGB),
        TextureFormat::Rgb16F => (GL_RGB16F, GL_RGB),
        TextureFormat::Rgb32F => (GL_RGB32F, GL_RGB),
        TextureFormat::Rgba8 => (GL_RGBA8UI, GL_RGBA),
        TextureFormat::Rgba16 => (GL_RGBA16UI, GL_RGBA),
        TextureFormat::Rgba16F => (GL_RGBA16F, GL_RGBA),
        TextureFormat::Rgba32F => (GL_RGBA32F, GL_RGBA),
        _ => return None,
    };
    Some(pair)
}

fn gl_type(data_type: PixelDataType) -> u32 {
    match data_type {
        PixelDataType::Uint8 => GL_UNSIGNED_BYTE,
        PixelDataType::Uint16 => GL_UNSIGNED_SHORT,
        PixelDataType::HalfFloat => GL_HALF_FLOAT,
        PixelDataType::Float => GL_FLOAT,
    }
}

/// Zero bytes needed to bring `size` to the unpack alignment.
#[inline]
fn pad4(size: usize) -> usize {
    (KTX_UNPACK_ALIGNMENT - size % KTX_UNPACK_ALIGNMENT) & (KTX_UNPACK_ALIGNMENT - 1)
}

#[derive(Debug, Clone, Copy, Default)]
#[allow(dead_code)]
struct KtxHeader {
    endianness: u32,
    gl_type: u32,
    gl_type_size: u32,
    gl_format: u32,
    gl_internal_format: u32,
    gl_base_internal_format: u32,
    pixel_width: u32,
    pixel_height: u32,
    pixel_depth: u32,
    num_array_elements: u32,
    num_faces: u32,
    num_mips: u32,
    bytes_key_value: u32,
}

/// Decodes a KTX stream into an image.
pub fn decode<R: Read + Seek>(reader: &mut R) -> IoResult<Image> {
    let mut magic = [0u8; 12];
    reader.read_exact(&mut magic)?;
    if magic != KTX_MAGIC {
        return Err(IoError::BadMagic);
    }

    let endianness = reader.read_u32::<LittleEndian>()?;
    let swapped = match endianness {
        KTX_ENDIAN_REF => false,
        KTX_ENDIAN_REF_REV => true,
        other => {
            return Err(IoError::MalformedHeader(format!(
                "KTX endianness marker {other:#010x}"
            )));
        }
    };
    let field = |reader: &mut R| -> IoResult<u32> {
        let value = reader.read_u32::<LittleEndian>()?;
        Ok(if swapped { value.swap_bytes() } else { value })
    };

    let mut header = KtxHeader {
        endianness,
        gl_type: field(reader)?,
        gl_type_size: field(reader)?,
        gl_format: field(reader)?,
        gl_internal_format: field(reader)?,
        gl_base_internal_format: field(reader)?,
        pixel_width: field(reader)?,
        pixel_height: field(reader)?,
        pixel_depth: field(reader)?,
        num_array_elements: field(reader)?,
        num_faces: field(reader)?,
        num_mips: field(reader)?,
        bytes_key_value: field(reader)?,
    };

    if header.num_mips == 0 {
        warn!("KTX mip count is 0, treating as 1");
        header.num_mips = 1;
    }
    if header.num_mips > MAX_MIP_NUM as u32 {
        return Err(IoError::MalformedHeader(format!(
            "KTX mip count {} exceeds {MAX_MIP_NUM}",
            header.num_mips
        )));
    }
    if header.num_faces != 1 && header.num_faces != 6 {
        return Err(IoError::MalformedHeader(format!(
            "KTX face count {} (expected 1 or 6)",
            header.num_faces
        )));
    }

    let format = TRANSLATE_GL_FORMAT
        .iter()
        .find(|(gl, _)| *gl == header.gl_internal_format)
        .map(|&(_, f)| f)
        .ok_or_else(|| {
            IoError::UnsupportedFormat(format!(
                "KTX glInternalFormat {:#06x}",
                header.gl_internal_format
            ))
        })?;

    // Skip the key/value block.
    reader.seek(SeekFrom::Current(header.bytes_key_value as i64))?;

    let bytes_per_pixel = format.bytes_per_pixel();
    let num_mips = header.num_mips as u8;
    let num_faces = header.num_faces as u8;
    let mut image = Image::new(header.pixel_width, header.pixel_height, format, num_mips, num_faces);
    let offsets = image.mip_offsets();

    for mip in 0..num_mips {
        let (mip_width, mip_height) = image.mip_dimensions(mip);
        let pitch = mip_width as usize * bytes_per_pixel;
        let pitch_pad = pad4(pitch);

        let stated_face_size = if swapped {
            reader.read_u32::<LittleEndian>()?.swap_bytes()
        } else {
            reader.read_u32::<LittleEndian>()?
        } as usize;
        let computed_face_size = (pitch + pitch_pad) * mip_height as usize;
        if stated_face_size != computed_face_size {
            warn!(
                stated = stated_face_size,
                computed = computed_face_size,
                mip,
                "KTX image size disagrees with computed face size"
            );
        }

        let face_pad = pad4(stated_face_size);
        let mip_pad = pad4(stated_face_size * num_faces as usize);

        for face in 0..num_faces {
            let start = offsets[face as usize][mip as usize];
            if pitch_pad == 0 {
                let face_bytes = pitch * mip_height as usize;
                reader.read_exact(&mut image.data[start..start + face_bytes])?;
            } else {
                let mut skip = [0u8; KTX_UNPACK_ALIGNMENT];
                for row in 0..mip_height as usize {
                    let row_start = start + row * pitch;
                    reader.read_exact(&mut image.data[row_start..row_start + pitch])?;
                    reader.read_exact(&mut skip[..pitch_pad])?;
                }
            }
            reader.seek(SeekFrom::Current(face_pad as i64))?;
        }
        reader.seek(SeekFrom::Current(mip_pad as i64))?;
    }

    Ok(image)
}

/// Encodes an image into a KTX stream.
///
/// # Errors
///
/// [`IoError::UnsupportedFormat`] unless the image format is one of
/// [`VALID_FORMATS`].
pub fn encode<W: Write>(writer: &mut W, image: &Image) -> IoResult<()> {
    let (internal_format, base_format) = gl_internal_format(image.format).ok_or_else(|| {
        IoError::UnsupportedFormat(format!("{} cannot be stored in KTX", image.format))
    })?;

    let bytes_per_pixel = image.format.bytes_per_pixel();
    let num_channels = image.format.num_channels();

    writer.write_all(&KTX_MAGIC)?;
    for field in [
        KTX_ENDIAN_REF,
        gl_type(image.format.pixel_type()),
        (bytes_per_pixel / num_channels) as u32,
        base_format,
        internal_format,
        base_format,
        image.width,
        image.height,
        0, // pixelDepth
        0, // numberOfArrayElements
        image.num_faces as u32,
        image.num_mips as u32,
        0, // bytesOfKeyValueData
    ] {
        writer.write_u32::<LittleEndian>(field)?;
    }

    let offsets = image.mip_offsets();
    let pad = [0u8; KTX_UNPACK_ALIGNMENT];

    for mip in 0..image.num_mips {
        let (mip_width, mip_height) = image.mip_dimensions(mip);
        let pitch = mip_width as usize * bytes_per_pixel;
        let pitch_pad = pad4(pitch);
        let face_size = (pitch + pitch_pad) * mip_height as usize;
        let face_pad = pad4(face_size);
        let mip_pad = pad4(face_size * image.num_faces as usize);

        writer.write_u32::<LittleEndian>(face_size as u32)?;

        for face in 0..image.num_faces {
            let start = offsets[face as usize][mip as usize];
            if pitch_pad == 0 {
                writer.write_all(&image.data[start..start + pitch * mip_height as usize])?;
            } else {
                for row in 0..mip_height as usize {
                    let row_start = start + row * pitch;
                    writer.write_all(&image.data[row_start..row_start + pitch])?;
                    writer.write_all(&pad[..pitch_pad])?;
                }
            }
            writer.write_all(&pad[..face_pad])?;
        }
        writer.write_all(&pad[..mip_pad])?;
    }

    Ok(())
}

/// KTX file reader.
#[derive(Debug, Clone, Default)]
pub struct KtxReader;

impl FormatReader for KtxReader {
    fn format_name(&self) -> &'static str {
        "KTX"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["ktx"]
    }

    fn can_read(&self, header: &[u8]) -> bool {
        header.len() >= 4 && header[..4] == KTX_MAGIC[..4]
    }

    fn read<P: AsRef<Path>>(&self, path: P) -> IoResult<Image> {
        let file = File::open(path.as_ref())?;
        decode(&mut BufReader::new(file))
    }

    fn read_from_memory(&self, data: &[u8]) -> IoResult<Image> {
        decode(&mut Cursor::new(data))
    }

    fn with_options(_options: ()) -> Self {
        KtxReader
    }
}

/// KTX file writer.
#[derive(Debug, Clone, Default)]
pub struct KtxWriter;

impl FormatWriter for KtxWriter {
    fn format_name(&self) -> &'static str {
        "KTX"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["ktx"]
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
        KtxWriter
    }
}

/// Reads a KTX file with default options.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    KtxReader.read(path)
}

/// Writes a KTX file with default options.
pub fn write<P: AsRef<Path>>(path: P, image: &Image) -> IoResult<()> {
    KtxWriter.write(path, image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad4() {
        assert_eq!(pad4(0), 0);
        assert_eq!(pad4(9), 3);
        assert_eq!(pad4(10), 2);
        assert_eq!(pad4(11), 1);
        assert_eq!(pad4(12), 0);
    }

    #[test]
    fn test_row_padding_layout() {
        // 3x1 RGB8: 9-byte rows padded to 12.
        let mut image = Image::new(3, 1, TextureFormat::Rgb8, 1, 1);
        image.data.copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let bytes = KtxWriter.write_to_memory(&image).unwrap();

        assert_eq!(bytes.len(), 12 + 52 + 4 + 12);
        // Stated image size covers the padded rows.
        assert_eq!(&bytes[64..68], &12u32.to_le_bytes());
        assert_eq!(&bytes[68..77], &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(&bytes[77..80], &[0, 0, 0]);

        let loaded = KtxReader.read_from_memory(&bytes).unwrap();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_aligned_rows_have_no_padding() {
        let image = Image::new(4, 4, TextureFormat::Rgba8, 1, 1);
        let bytes = KtxWriter.write_to_memory(&image).unwrap();
        assert_eq!(bytes.len(), 12 + 52 + 4 + 4 * 4 * 4);
    }

    #[test]
    fn test_cubemap_mips_roundtrip() {
        let mut image = Image::new(4, 4, TextureFormat::Rgb8, 3, 6);
        for (i, b) in image.data.iter_mut().enumerate() {
            *b = (i % 251) as u8;
        }
        let bytes = KtxWriter.write_to_memory(&image).unwrap();
        let loaded = KtxReader.read_from_memory(&bytes).unwrap();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_zero_mip_count_coerced() {
        let image = Image::new(2, 2, TextureFormat::Rgba8, 1, 1);
        let mut bytes = KtxWriter.write_to_memory(&image).unwrap();
        // numberOfMipmapLevels is the 12th header field: 12 + 11 * 4.
        bytes[56..60].copy_from_slice(&0u32.to_le_bytes());
        let loaded = KtxReader.read_from_memory(&bytes).unwrap();
        assert_eq!(loaded.num_mips, 1);
    }

    #[test]
    fn test_reversed_endianness_accepted() {
        let mut image = Image::new(2, 2, TextureFormat::Rgba8, 1, 1);
        for (i, b) in image.data.iter_mut().enumerate() {
            *b = i as u8;
        }
        let mut bytes = KtxWriter.write_to_memory(&image).unwrap();
        // Flip the marker and byte-swap every header field after it.
        bytes[12..16].copy_from_slice(&KTX_ENDIAN_REF_REV.to_le_bytes());
        for field in 1..13 {
            let at = 12 + field * 4;
            let value = u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap());
            bytes[at..at + 4].copy_from_slice(&value.swap_bytes().to_le_bytes());
        }
        // The per-mip size field needs swapping too.
        let value = u32::from_le_bytes(bytes[64..68].try_into().unwrap());
        bytes[64..68].copy_from_slice(&value.swap_bytes().to_le_bytes());

        let loaded = KtxReader.read_from_memory(&bytes).unwrap();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_unknown_internal_format_rejected() {
        let image = Image::new(2, 2, TextureFormat::Rgba8, 1, 1);
        let mut bytes = KtxWriter.write_to_memory(&image).unwrap();
        // glInternalFormat is the 5th header field: 12 + 4 * 4.
        bytes[28..32].copy_from_slice(&0x8058u32.to_le_bytes());
        assert!(matches!(
            KtxReader.read_from_memory(&bytes),
            Err(IoError::UnsupportedFormat(_))
        ));
    }
}
