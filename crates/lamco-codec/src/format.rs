//! Source pixel formats
//!
//! The remote display pipeline hands encoders packed RGB-family buffers. The
//! format name is significant: encoders derive alpha handling and the
//! advertised bit depth from the letters it contains.

use std::fmt;
use std::str::FromStr;

use crate::error::CodecError;

/// Packed pixel layouts an encoder adapter may receive
///
/// Each variant's name lists its bytes in memory order. `X` marks a padding
/// byte that carries no data, `A` an alpha channel.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 32-bit RGB with padding byte
    RGBX,
    /// 32-bit RGB with alpha
    RGBA,
    /// 32-bit BGR with padding byte (most compositors)
    BGRX,
    /// 32-bit BGR with alpha
    BGRA,
    /// 24-bit packed RGB
    RGB,
    /// 24-bit packed BGR
    BGR,
}

impl PixelFormat {
    /// Every supported format, 32-bit layouts first
    pub const ALL: [PixelFormat; 6] = [
        PixelFormat::BGRX,
        PixelFormat::BGRA,
        PixelFormat::RGBX,
        PixelFormat::RGBA,
        PixelFormat::RGB,
        PixelFormat::BGR,
    ];

    /// Format name as used on the wire
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RGBX => "RGBX",
            Self::RGBA => "RGBA",
            Self::BGRX => "BGRX",
            Self::BGRA => "BGRA",
            Self::RGB => "RGB",
            Self::BGR => "BGR",
        }
    }

    /// Whether the format name carries an alpha marker
    #[must_use]
    pub fn has_alpha(self) -> bool {
        self.as_str().contains('A')
    }

    /// Bytes occupied by one pixel in memory
    #[must_use]
    pub fn bytes_per_pixel(self) -> usize {
        self.as_str().len()
    }

    /// Number of colour channels, ignoring alpha and padding
    #[must_use]
    pub fn color_channels(self) -> u8 {
        let count = self
            .as_str()
            .chars()
            .filter(|c| matches!(c, 'R' | 'G' | 'B'))
            .count();
        // At most 3 colour letters per name
        u8::try_from(count).unwrap_or(u8::MAX)
    }

    /// Bits of colour information per pixel, alpha excluded
    #[must_use]
    pub fn bits_per_pixel(self) -> u8 {
        self.color_channels().saturating_mul(8)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PixelFormat {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| CodecError::unsupported_format(s))
    }
}
