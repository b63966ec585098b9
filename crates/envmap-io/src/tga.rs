//! Truevision TGA support.
//!
//! TGA is the simplest of the supported containers: an 18-byte header,
//! optional id/color-map blocks, bottom-up or top-down pixel rows, and an
//! optional 26-byte footer. Only true-color images are handled: 24-bit
//! (BGR8) and 32-bit (BGRA8), raw or run-length encoded.
//!
//! RLE packets carry a count byte `N`: the packet spans `(N & 0x7f) + 1`
//! pixels, either one pixel repeated (high bit set) or that many literal
//! pixels.
//!
//! On read, the image-descriptor orientation bits are folded away with
//! in-place flips so pixels always come out top-down, left-to-right. On
//! write, rows go out bottom-up by default (the common TGA convention),
//! controllable through [`TgaWriterOptions::y_flip`].
//!
//! # Example
//!
//! ```no_run
//! use envmap_io::tga;
//!
//! let image = tga::read("preview.tga")?;
//! tga::write("copy.tga", &image)?;
//! # Ok::<(), envmap_io::IoError>(())
//! ```

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::warn;

use crate::{FormatReader, FormatWriter, IoError, IoResult};
use envmap_core::{Image, TextureFormat};
use envmap_ops::transform::{face_bit, transform, TransformOp};

const TGA_IT_RGB: u8 = 0x2;
const TGA_IT_RLE: u8 = 0x8;

/// Descriptor bit: rows are stored right-to-left.
const TGA_DESC_HORIZONTAL: u8 = 0x10;
/// Descriptor bit: rows are stored top-down.
const TGA_DESC_VERTICAL: u8 = 0x20;

const TGA_FOOTER_SIGNATURE: &[u8; 18] = b"TRUEVISION-XFILE.\0";

/// Pixel formats a TGA file can hold without conversion.
pub const VALID_FORMATS: [TextureFormat; 2] = [TextureFormat::Bgr8, TextureFormat::Bgra8];

/// Options for writing TGA files.
#[derive(Debug, Clone)]
pub struct TgaWriterOptions {
    /// Write rows bottom-up (the TGA default orientation). Default: true.
    pub y_flip: bool,
}

impl Default for TgaWriterOptions {
    fn default() -> Self {
        Self { y_flip: true }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct TgaHeader {
    id_length: u8,
    color_map_type: u8,
    image_type: u8,
    color_map_origin: u16,
    color_map_length: u16,
    color_map_depth: u8,
    x_origin: i16,
    y_origin: i16,
    width: u16,
    height: u16,
    bits_per_pixel: u8,
    image_descriptor: u8,
}

impl TgaHeader {
    fn read<R: Read>(reader: &mut R) -> IoResult<Self> {
        Ok(TgaHeader {
            id_length: reader.read_u8()?,
            color_map_type: reader.read_u8()?,
            image_type: reader.read_u8()?,
            color_map_origin: reader.read_u16::<LittleEndian>()?,
            color_map_length: reader.read_u16::<LittleEndian>()?,
            color_map_depth: reader.read_u8()?,
            x_origin: reader.read_i16::<LittleEndian>()?,
            y_origin: reader.read_i16::<LittleEndian>()?,
            width: reader.read_u16::<LittleEndian>()?,
            height: reader.read_u16::<LittleEndian>()?,
            bits_per_pixel: reader.read_u8()?,
            image_descriptor: reader.read_u8()?,
        })
    }

    fn write<W: Write>(&self, writer: &mut W) -> IoResult<()> {
        writer.write_u8(self.id_length)?;
        writer.write_u8(self.color_map_type)?;
        writer.write_u8(self.image_type)?;
        writer.write_u16::<LittleEndian>(self.color_map_origin)?;
        writer.write_u16::<LittleEndian>(self.color_map_length)?;
        writer.write_u8(self.color_map_depth)?;
        writer.write_i16::<LittleEndian>(self.x_origin)?;
        writer.write_i16::<LittleEndian>(self.y_origin)?;
        writer.write_u16::<LittleEndian>(self.width)?;
        writer.write_u16::<LittleEndian>(self.height)?;
        writer.write_u8(self.bits_per_pixel)?;
        writer.write_u8(self.image_descriptor)?;
        Ok(())
    }
}

/// Decodes a TGA stream into an image.
pub fn decode<R: Read + Seek>(reader: &mut R) -> IoResult<Image> {
    let header = TgaHeader::read(reader)?;

    if header.image_type & 0x3 != TGA_IT_RGB {
        return Err(IoError::UnsupportedFormat(format!(
            "TGA image type {} is not true-color",
            header.image_type
        )));
    }

    let format = match header.bits_per_pixel {
        24 => {
            if header.image_descriptor & 0xf != 0 {
                warn!("TGA 24-bit image declares alpha bits in its descriptor");
            }
            TextureFormat::Bgr8
        }
        32 => {
            if header.image_descriptor & 0xf != 0x8 {
                warn!("TGA 32-bit image does not declare 8 alpha bits");
            }
            TextureFormat::Bgra8
        }
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "TGA pixel depth {other}"
            )));
        }
    };

    // Skip the image id and any color map.
    let color_map_entry = header.color_map_depth as i64 / 8;
    let skip = header.id_length as i64
        + (header.color_map_type & 1) as i64 * header.color_map_length as i64 * color_map_entry;
    reader.seek(SeekFrom::Current(skip))?;

    let bytes_per_pixel = format.bytes_per_pixel();
    let num_pixels = header.width as usize * header.height as usize;
    let mut data = vec![0u8; num_pixels * bytes_per_pixel];

    if header.image_type & TGA_IT_RLE != 0 {
        let mut written = 0usize;
        let mut packet = [0u8; 5];
        while written < num_pixels {
            reader.read_exact(&mut packet[..1 + bytes_per_pixel])?;
            let count = (packet[0] & 0x7f) as usize;

            let at = written * bytes_per_pixel;
            data[at..at + bytes_per_pixel].copy_from_slice(&packet[1..1 + bytes_per_pixel]);
            written += 1;

            if packet[0] & 0x80 != 0 {
                for _ in 0..count {
                    if written >= num_pixels {
                        return Err(IoError::MalformedHeader("TGA RLE run overflow".into()));
                    }
                    let at = written * bytes_per_pixel;
                    data.copy_within(
                        (written - 1) * bytes_per_pixel..written * bytes_per_pixel,
                        at,
                    );
                    written += 1;
                }
            } else {
                for _ in 0..count {
                    if written >= num_pixels {
                        return Err(IoError::MalformedHeader("TGA RLE literal overflow".into()));
                    }
                    let at = written * bytes_per_pixel;
                    reader.read_exact(&mut data[at..at + bytes_per_pixel])?;
                    written += 1;
                }
            }
        }
    } else {
        reader.read_exact(&mut data)?;
    }

    let mut image = Image::from_data(
        header.width as u32,
        header.height as u32,
        format,
        1,
        1,
        data,
    )?;

    // Fold the stored orientation into top-down, left-to-right pixels.
    let mut ops = Vec::new();
    if header.image_descriptor & TGA_DESC_VERTICAL == 0 {
        ops.push(TransformOp::FlipX);
    }
    if header.image_descriptor & TGA_DESC_HORIZONTAL != 0 {
        ops.push(TransformOp::FlipY);
    }
    if !ops.is_empty() {
        transform(&mut image, face_bit(0), &ops)?;
    }

    Ok(image)
}

/// Encodes an image into a TGA stream (uncompressed, with footer).
///
/// Only the first face and the base mip level are written; extras produce
/// warnings. Rows go out bottom-up when `options.y_flip` is set.
///
/// # Errors
///
/// [`IoError::UnsupportedFormat`] unless the image format is one of
/// [`VALID_FORMATS`]; [`IoError::MalformedHeader`] when a dimension
/// exceeds the 16-bit header fields.
pub fn encode<W: Write>(writer: &mut W, image: &Image, options: &TgaWriterOptions) -> IoResult<()> {
    if !VALID_FORMATS.contains(&image.format) {
        return Err(IoError::UnsupportedFormat(format!(
            "{} cannot be stored in TGA",
            image.format
        )));
    }
    if image.width > u16::MAX as u32 || image.height > u16::MAX as u32 {
        return Err(IoError::MalformedHeader(format!(
            "{}x{} exceeds TGA's 16-bit dimensions",
            image.width, image.height
        )));
    }

    if image.num_faces != 1 {
        warn!(
            faces = image.num_faces,
            "TGA stores a single image; only the first face is saved"
        );
    }
    if image.num_mips != 1 {
        warn!(
            mips = image.num_mips,
            "TGA stores a single image; only the base mip level is saved"
        );
    }

    let header = TgaHeader {
        image_type: TGA_IT_RGB,
        width: image.width as u16,
        height: image.height as u16,
        bits_per_pixel: (image.format.bytes_per_pixel() * 8) as u8,
        image_descriptor: if image.format.has_alpha() { 0x8 } else { 0x0 },
        ..Default::default()
    };
    header.write(writer)?;

    let pitch = image.width as usize * image.format.bytes_per_pixel();
    if options.y_flip {
        for y in (0..image.height as usize).rev() {
            writer.write_all(&image.data[y * pitch..(y + 1) * pitch])?;
        }
    } else {
        for y in 0..image.height as usize {
            writer.write_all(&image.data[y * pitch..(y + 1) * pitch])?;
        }
    }

    writer.write_u32::<LittleEndian>(0)?; // extension area offset
    writer.write_u32::<LittleEndian>(0)?; // developer directory offset
    writer.write_all(TGA_FOOTER_SIGNATURE)?;

    Ok(())
}

/// TGA file reader.
#[derive(Debug, Clone, Default)]
pub struct TgaReader;

impl FormatReader for TgaReader {
    fn format_name(&self) -> &'static str {
        "TGA"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["tga"]
    }

    fn can_read(&self, header: &[u8]) -> bool {
        crate::FileFormat::from_bytes(header) == Some(crate::FileFormat::Tga)
    }

    fn read<P: AsRef<Path>>(&self, path: P) -> IoResult<Image> {
        let file = File::open(path.as_ref())?;
        decode(&mut BufReader::new(file))
    }

    fn read_from_memory(&self, data: &[u8]) -> IoResult<Image> {
        decode(&mut Cursor::new(data))
    }

    fn with_options(_options: ()) -> Self {
        TgaReader
    }
}

/// TGA file writer.
#[derive(Debug, Clone, Default)]
pub struct TgaWriter {
    options: TgaWriterOptions,
}

impl FormatWriter<TgaWriterOptions> for TgaWriter {
    fn format_name(&self) -> &'static str {
        "TGA"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["tga"]
    }

    fn valid_formats(&self) -> &'static [TextureFormat] {
        &VALID_FORMATS
    }

    fn write<P: AsRef<Path>>(&self, path: P, image: &Image) -> IoResult<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        encode(&mut writer, image, &self.options)?;
        writer.flush()?;
        Ok(())
    }

    fn write_to_memory(&self, image: &Image) -> IoResult<Vec<u8>> {
        let mut buffer = Vec::new();
        encode(&mut buffer, image, &self.options)?;
        Ok(buffer)
    }

    fn with_options(options: TgaWriterOptions) -> Self {
        Self { options }
    }
}

/// Reads a TGA file with default options.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    TgaReader.read(path)
}

/// Writes a TGA file with default options (bottom-up rows).
pub fn write<P: AsRef<Path>>(path: P, image: &Image) -> IoResult<()> {
    TgaWriter::default().write(path, image)
}
