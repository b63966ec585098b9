//! Radiance HDR (RGBE) support.
//!
//! The classic container for high-dynamic-range environment maps. Pixels
//! are stored as RGBE: three 8-bit mantissas sharing an 8-bit exponent,
//! giving a wide dynamic range at one byte per channel.
//!
//! # Layout
//!
//! A text header (`#?RADIANCE`, `KEY=value` lines, blank-line terminator,
//! then the resolution line `-Y <h> +X <w>`) followed by the pixel
//! stream. Scanlines are either raw RGBE quads or adaptively
//! run-length encoded: an RLE scanline starts with `2 2 <len-hi> <len-lo>`
//! and stores its four channel planes sequentially, each as a series of
//! run (`op > 128`) and literal (`op <= 128`) packets.
//!
//! The container holds a single face and a single mip level; anything
//! more is dropped with a warning on save.
//!
//! # Example
//!
//! ```no_run
//! use envmap_io::hdr;
//!
//! let image = hdr::read("environment.hdr")?;
//! hdr::write("copy.hdr", &image)?;
//! # Ok::<(), envmap_io::IoError>(())
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;
use tracing::warn;

use crate::{FormatReader, FormatWriter, IoError, IoResult};
use envmap_core::{convert, Image, TextureFormat};

const HDR_MAGIC: &str = "#?RADIANCE";
const HDR_FORMAT_LINE: &str = "FORMAT=32-bit_rle_rgbe";
/// Header lines scanned before the blank terminator is required.
const HDR_MAX_HEADER_LINES: usize = 20;

/// Pixel formats an HDR file can hold without conversion.
pub const VALID_FORMATS: [TextureFormat; 1] = [TextureFormat::Rgbe];

/// Options for writing HDR files.
#[derive(Debug, Clone)]
pub struct HdrWriterOptions {
    /// Value of the `EXPOSURE=` header line. Default: 1.0.
    pub exposure: f32,
    /// Value of the `GAMMA=` header line; omitted when `None`. Default:
    /// omitted.
    pub gamma: Option<f32>,
}

impl Default for HdrWriterOptions {
    fn default() -> Self {
        Self {
            exposure: 1.0,
            gamma: None,
        }
    }
}

fn read_line<R: BufRead>(reader: &mut R) -> IoResult<String> {
    let mut line = String::new();
    let n = reader.read_line(&mut line)?;
    if n == 0 {
        return Err(IoError::MalformedHeader("HDR header truncated".into()));
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

/// Decodes a Radiance HDR stream into an RGBE image.
pub fn decode<R: BufRead>(reader: &mut R) -> IoResult<Image> {
    let magic_line = read_line(reader)?;
    if !magic_line.starts_with(HDR_MAGIC) {
        return Err(IoError::BadMagic);
    }

    let mut format_defined = false;
    let mut _gamma = 1.0f32;
    let mut _exposure = 1.0f32;
    for _ in 0..HDR_MAX_HEADER_LINES {
        let line = read_line(reader)?;
        if line.is_empty() {
            break;
        }
        if line == HDR_FORMAT_LINE {
            format_defined = true;
        } else if let Some(value) = line.strip_prefix("GAMMA=") {
            if let Ok(v) = value.trim().parse() {
                _gamma = v;
            }
        } else if let Some(value) = line.strip_prefix("EXPOSURE=") {
            if let Ok(v) = value.trim().parse() {
                _exposure = v;
            }
        }
    }
    if !format_defined {
        warn!("HDR header has no FORMAT=32-bit_rle_rgbe line");
    }

    // Resolution line: only the standard -Y <h> +X <w> orientation.
    let resolution = read_line(reader)?;
    let tokens: Vec<&str> = resolution.split_whitespace().collect();
    let (height, width) = match tokens.as_slice() {
        ["-Y", h, "+X", w] => (
            h.parse::<u32>()
                .map_err(|_| IoError::MalformedHeader(format!("HDR resolution {resolution:?}")))?,
            w.parse::<u32>()
                .map_err(|_| IoError::MalformedHeader(format!("HDR resolution {resolution:?}")))?,
        ),
        _ => {
            return Err(IoError::MalformedHeader(format!(
                "HDR resolution {resolution:?}"
            )));
        }
    };
    if width == 0 || height == 0 {
        return Err(IoError::MalformedHeader("HDR resolution is zero".into()));
    }

    let mut data = vec![0u8; width as usize * height as usize * 4];

    let mut first = [0u8; 4];
    reader.read_exact(&mut first)?;

    let rle = width >= 8 && width <= 0x7fff && first[0] == 2 && first[1] == 2 && first[2] & 0x80 == 0;
    if !rle {
        // Raw stream; the probed bytes are the first pixel.
        data[..4].copy_from_slice(&first);
        reader.read_exact(&mut data[4..])?;
    } else {
        let pitch = width as usize * 4;
        decode_rle_scanline(reader, width, first, &mut data[..pitch])?;
        for y in 1..height as usize {
            let mut header = [0u8; 4];
            reader.read_exact(&mut header)?;
            decode_rle_scanline(reader, width, header, &mut data[y * pitch..(y + 1) * pitch])?;
        }
    }

    Ok(Image::from_data(width, height, TextureFormat::Rgbe, 1, 1, data)?)
}

/// Decodes one adaptively RLE-compressed scanline into interleaved RGBE.
fn decode_rle_scanline<R: Read>(
    reader: &mut R,
    width: u32,
    header: [u8; 4],
    out: &mut [u8],
) -> IoResult<()> {
    if header[0] != 2 || header[1] != 2 {
        return Err(IoError::MalformedHeader("HDR RLE scanline header".into()));
    }
    let encoded_width = (header[2] as u32) << 8 | header[3] as u32;
    if encoded_width != width {
        return Err(IoError::MalformedHeader(format!(
            "HDR RLE scanline width {encoded_width} (expected {width})"
        )));
    }

    let width = width as usize;
    let mut plane = vec![0u8; width];
    for channel in 0..4 {
        let mut index = 0usize;
        while index < width {
            let mut op = [0u8; 1];
            reader.read_exact(&mut op)?;
            let count = op[0] as usize;
            if count > 128 {
                let run = count - 128;
                if run > width - index {
                    return Err(IoError::MalformedHeader("HDR RLE run overflow".into()));
                }
                let mut value = [0u8; 1];
                reader.read_exact(&mut value)?;
                plane[index..index + run].fill(value[0]);
                index += run;
            } else {
                if count == 0 || count > width - index {
                    return Err(IoError::MalformedHeader("HDR RLE literal overflow".into()));
                }
                reader.read_exact(&mut plane[index..index + count])?;
                index += count;
            }
        }
        for x in 0..width {
            out[x * 4 + channel] = plane[x];
        }
    }

    Ok(())
}

/// Encodes an image into a Radiance HDR stream.
///
/// The image is converted to RGBE if needed. Only the first face and the
/// base mip level are written; extra faces or mips produce warnings.
/// Scanlines are written raw (no RLE).
pub fn encode<W: Write>(writer: &mut W, image: &Image, options: &HdrWriterOptions) -> IoResult<()> {
    let rgbe = convert::image_ref_or_convert(image, TextureFormat::Rgbe);

    if rgbe.num_faces != 1 {
        warn!(
            faces = rgbe.num_faces,
            "HDR stores a single image; only the first face is saved"
        );
    }
    if rgbe.num_mips != 1 {
        warn!(
            mips = rgbe.num_mips,
            "HDR stores a single image; only the base mip level is saved"
        );
    }

    writeln!(writer, "{HDR_MAGIC}")?;
    writeln!(writer, "# Output from envmap.")?;
    writeln!(writer, "{HDR_FORMAT_LINE}")?;
    if let Some(gamma) = options.gamma {
        writeln!(writer, "GAMMA={gamma}")?;
    }
    writeln!(writer, "EXPOSURE={}", options.exposure)?;
    writeln!(writer)?;
    writeln!(writer, "-Y {} +X {}", rgbe.height, rgbe.width)?;

    let pitch = rgbe.width as usize * 4;
    for y in 0..rgbe.height as usize {
        writer.write_all(&rgbe.data[y * pitch..(y + 1) * pitch])?;
    }

    Ok(())
}

/// Radiance HDR file reader.
#[derive(Debug, Clone, Default)]
pub struct HdrReader;

impl FormatReader for HdrReader {
    fn format_name(&self) -> &'static str {
        "HDR"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["hdr", "pic"]
    }

    fn can_read(&self, header: &[u8]) -> bool {
        header.len() >= 4 && &header[..4] == b"#?RA"
    }

    fn read<P: AsRef<Path>>(&self, path: P) -> IoResult<Image> {
        let file = File::open(path.as_ref())?;
        decode(&mut BufReader::new(file))
    }

    fn read_from_memory(&self, data: &[u8]) -> IoResult<Image> {
        decode(&mut BufReader::new(Cursor::new(data)))
    }

    fn with_options(_options: ()) -> Self {
        HdrReader
    }
}

/// Radiance HDR file writer.
#[derive(Debug, Clone, Default)]
pub struct HdrWriter {
    options: HdrWriterOptions,
}

impl FormatWriter<HdrWriterOptions> for HdrWriter {
    fn format_name(&self) -> &'static str {
        "HDR"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["hdr", "pic"]
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

    fn with_options(options: HdrWriterOptions) -> Self {
        Self { options }
    }
}

/// Reads an HDR file with default options.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    HdrReader.read(path)
}

/// Writes an HDR file with default options.
pub fn write<P: AsRef<Path>>(path: P, image: &Image) -> IoResult<()> {
    HdrWriter::default().write(path, image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_decode_raw_4x2() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"#?RADIANCE\n");
        bytes.extend_from_slice(b"FORMAT=32-bit_rle_rgbe\n\n-Y 2 +X 4\n");
        for _ in 0..8 {
            bytes.extend_from_slice(&[128, 128, 128, 128]);
        }

        let image = HdrReader.read_from_memory(&bytes).unwrap();
        assert_eq!(image.format, TextureFormat::Rgbe);
        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!((image.num_faces, image.num_mips), (1, 1));

        let rgba = convert::to_rgba32f(TextureFormat::Rgbe, &image.data[..4]);
        assert_relative_eq!(rgba[0], 0.5, epsilon = 1.0 / 128.0);
        assert_relative_eq!(rgba[1], 0.5, epsilon = 1.0 / 128.0);
        assert_relative_eq!(rgba[2], 0.5, epsilon = 1.0 / 128.0);
        assert_eq!(rgba[3], 1.0);
    }

    #[test]
    fn test_decode_rle_scanlines() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 1 +X 8\n");
        // Scanline header, then the four planes.
        bytes.extend_from_slice(&[2, 2, 0, 8]);
        bytes.extend_from_slice(&[128 + 8, 10]); // R: run of 8
        bytes.extend_from_slice(&[8, 1, 2, 3, 4, 5, 6, 7, 8]); // G: literals
        bytes.extend_from_slice(&[128 + 4, 20, 4, 9, 9, 9, 9]); // B: run + literals
        bytes.extend_from_slice(&[128 + 8, 130]); // E: run of 8

        let image = HdrReader.read_from_memory(&bytes).unwrap();
        assert_eq!((image.width, image.height), (8, 1));
        let px = |x: usize| &image.data[x * 4..x * 4 + 4];
        assert_eq!(px(0), &[10, 1, 20, 130]);
        assert_eq!(px(3), &[10, 4, 20, 130]);
        assert_eq!(px(7), &[10, 8, 9, 130]);
    }

    #[test]
    fn test_rle_width_mismatch_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 1 +X 8\n");
        bytes.extend_from_slice(&[2, 2, 0, 9]);
        bytes.extend_from_slice(&[0u8; 64]);
        assert!(matches!(
            HdrReader.read_from_memory(&bytes),
            Err(IoError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_missing_magic() {
        assert!(matches!(
            HdrReader.read_from_memory(b"#?NOTRADIANCE\n\n-Y 1 +X 1\n...."),
            Err(IoError::BadMagic)
        ));
    }

    #[test]
    fn test_roundtrip_memory() {
        let mut image = Image::new(4, 2, TextureFormat::Rgbe, 1, 1);
        for (i, b) in image.data.iter_mut().enumerate() {
            *b = ((i * 13) % 251) as u8;
        }
        let bytes = HdrWriter::default().write_to_memory(&image).unwrap();
        let loaded = HdrReader.read_from_memory(&bytes).unwrap();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_encode_converts_and_drops_extras() {
        // A 2-mip float cube map collapses to one RGBE face.
        let cube = Image::new(8, 8, TextureFormat::Rgba32F, 2, 6);
        let bytes = HdrWriter::default().write_to_memory(&cube).unwrap();
        let loaded = HdrReader.read_from_memory(&bytes).unwrap();
        assert_eq!(loaded.format, TextureFormat::Rgbe);
        assert_eq!((loaded.width, loaded.height), (8, 8));
        assert_eq!((loaded.num_faces, loaded.num_mips), (1, 1));
    }
}
