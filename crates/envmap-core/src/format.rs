//! Texture formats and per-format pixel layout information.
//!
//! Every [`Image`](crate::Image) buffer carries a [`TextureFormat`] tag that
//! fixes channel order, channel count, bit depth and numeric encoding of its
//! pixels. [`TextureFormat::Rgba32F`] is the canonical intermediate: all
//! many-to-many conversions factor through it (see [`crate::convert`]).

use std::fmt;

/// Numeric encoding of a single pixel component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelDataType {
    /// Normalized 8-bit unsigned integer (0-255 maps to 0.0-1.0).
    Uint8,
    /// Normalized 16-bit unsigned integer (0-65535 maps to 0.0-1.0).
    Uint16,
    /// IEEE binary16 half float.
    HalfFloat,
    /// IEEE binary32 float.
    Float,
}

/// Pixel format of an image buffer.
///
/// Eleven concrete layouts plus an [`Unknown`](TextureFormat::Unknown)
/// sentinel used during format resolution in the codecs. `Rgbe` is Greg
/// Ward's shared-exponent HDR encoding: three 8-bit mantissas and an 8-bit
/// exponent biased by 128.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit B, G, R.
    Bgr8,
    /// 8-bit R, G, B.
    Rgb8,
    /// 16-bit R, G, B.
    Rgb16,
    /// Half-float R, G, B.
    Rgb16F,
    /// Float R, G, B.
    Rgb32F,
    /// Shared-exponent R, G, B, E.
    Rgbe,
    /// 8-bit B, G, R, A.
    Bgra8,
    /// 8-bit R, G, B, A.
    Rgba8,
    /// 16-bit R, G, B, A.
    Rgba16,
    /// Half-float R, G, B, A.
    Rgba16F,
    /// Float R, G, B, A. The canonical intermediate format.
    Rgba32F,
    /// Not a real layout; placeholder while a codec resolves the format.
    Unknown,
}

impl TextureFormat {
    /// All concrete formats, in declaration order.
    pub const ALL: [TextureFormat; 11] = [
        TextureFormat::Bgr8,
        TextureFormat::Rgb8,
        TextureFormat::Rgb16,
        TextureFormat::Rgb16F,
        TextureFormat::Rgb32F,
        TextureFormat::Rgbe,
        TextureFormat::Bgra8,
        TextureFormat::Rgba8,
        TextureFormat::Rgba16,
        TextureFormat::Rgba16F,
        TextureFormat::Rgba32F,
    ];

    /// Bytes occupied by one pixel. Zero for [`Unknown`](Self::Unknown).
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::Bgr8 | TextureFormat::Rgb8 => 3,
            TextureFormat::Rgb16 | TextureFormat::Rgb16F => 6,
            TextureFormat::Rgb32F => 12,
            TextureFormat::Rgbe
            | TextureFormat::Bgra8
            | TextureFormat::Rgba8 => 4,
            TextureFormat::Rgba16 | TextureFormat::Rgba16F => 8,
            TextureFormat::Rgba32F => 16,
            TextureFormat::Unknown => 0,
        }
    }

    /// Number of stored components per pixel (RGBE counts its exponent).
    #[inline]
    pub fn num_channels(self) -> usize {
        match self {
            TextureFormat::Bgr8
            | TextureFormat::Rgb8
            | TextureFormat::Rgb16
            | TextureFormat::Rgb16F
            | TextureFormat::Rgb32F => 3,
            TextureFormat::Rgbe
            | TextureFormat::Bgra8
            | TextureFormat::Rgba8
            | TextureFormat::Rgba16
            | TextureFormat::Rgba16F
            | TextureFormat::Rgba32F => 4,
            TextureFormat::Unknown => 0,
        }
    }

    /// Whether the format stores an alpha channel.
    #[inline]
    pub fn has_alpha(self) -> bool {
        matches!(
            self,
            TextureFormat::Bgra8
                | TextureFormat::Rgba8
                | TextureFormat::Rgba16
                | TextureFormat::Rgba16F
                | TextureFormat::Rgba32F
        )
    }

    /// Component encoding.
    ///
    /// RGBE components are raw bytes; the shared exponent is applied by the
    /// pixel codec, not by the component type.
    #[inline]
    pub fn pixel_type(self) -> PixelDataType {
        match self {
            TextureFormat::Bgr8
            | TextureFormat::Rgb8
            | TextureFormat::Rgbe
            | TextureFormat::Bgra8
            | TextureFormat::Rgba8 => PixelDataType::Uint8,
            TextureFormat::Rgb16 | TextureFormat::Rgba16 => PixelDataType::Uint16,
            TextureFormat::Rgb16F | TextureFormat::Rgba16F => PixelDataType::HalfFloat,
            TextureFormat::Rgb32F | TextureFormat::Rgba32F | TextureFormat::Unknown => {
                PixelDataType::Float
            }
        }
    }

    /// Short display name, e.g. `"RGBA16F"`.
    pub fn name(self) -> &'static str {
        match self {
            TextureFormat::Bgr8 => "BGR8",
            TextureFormat::Rgb8 => "RGB8",
            TextureFormat::Rgb16 => "RGB16",
            TextureFormat::Rgb16F => "RGB16F",
            TextureFormat::Rgb32F => "RGB32F",
            TextureFormat::Rgbe => "RGBE",
            TextureFormat::Bgra8 => "BGRA8",
            TextureFormat::Rgba8 => "RGBA8",
            TextureFormat::Rgba16 => "RGBA16",
            TextureFormat::Rgba16F => "RGBA16F",
            TextureFormat::Rgba32F => "RGBA32F",
            TextureFormat::Unknown => "<unknown>",
        }
    }

    /// Parses a short name as produced by [`name`](Self::name).
    /// Case-insensitive. Returns `None` for unrecognized names.
    pub fn from_name(name: &str) -> Option<TextureFormat> {
        let upper = name.to_ascii_uppercase();
        Self::ALL.iter().copied().find(|f| f.name() == upper)
    }
}

impl fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
