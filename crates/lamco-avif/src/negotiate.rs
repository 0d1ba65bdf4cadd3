//! Pixel format negotiation
//!
//! Derives how the codec should read the pinned buffer. The conversion step
//! always reads 4-byte samples in BGRA order; the source format only decides
//! whether the fourth byte is alpha or ignored padding.

use lamco_codec::PixelFormat;

use crate::guard::PinnedPixels;

/// Byte order of a 4-byte RGB sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RgbLayout {
    Rgba,
    Bgra,
}

impl RgbLayout {
    /// Index of (red, green, blue, alpha) within a sample
    pub fn channel_offsets(self) -> (usize, usize, usize, usize) {
        match self {
            Self::Rgba => (0, 1, 2, 3),
            Self::Bgra => (2, 1, 0, 3),
        }
    }
}

/// Chroma reconstruction used when the codec needs RGB from subsampled YUV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromaUpsampling {
    Automatic,
    Fastest,
    BestQuality,
    Nearest,
    Bilinear,
}

/// How to read a pinned buffer as RGB samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbDescriptor {
    pub layout: RgbLayout,
    /// Bits per channel
    pub depth: u32,
    /// Bytes between rows
    pub row_bytes: u32,
    /// Fourth byte of each sample is padding
    pub ignore_alpha: bool,
    /// Colour channels are already scaled by alpha
    pub alpha_premultiplied: bool,
    pub chroma_upsampling: ChromaUpsampling,
}

impl RgbDescriptor {
    /// Bytes per sample
    pub fn sample_bytes(&self) -> usize {
        4
    }
}

/// A descriptor paired with the bytes it describes
#[derive(Debug, Clone, Copy)]
pub struct RgbView<'a> {
    pub descriptor: RgbDescriptor,
    pub width: u32,
    pub height: u32,
    pub pixels: &'a [u8],
}

impl<'a> RgbView<'a> {
    /// Bytes of row `y`, `width * 4` long
    ///
    /// Returns `None` past the last row or when the buffer is shorter than
    /// the descriptor claims.
    pub fn row(&self, y: u32) -> Option<&'a [u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.descriptor.row_bytes as usize;
        let len = self.width as usize * self.descriptor.sample_bytes();
        self.pixels.get(start..start.checked_add(len)?)
    }
}

/// Build the RGB descriptor for a source format
pub fn describe(pixel_format: PixelFormat, row_stride: u32) -> RgbDescriptor {
    RgbDescriptor {
        layout: RgbLayout::Bgra,
        depth: 8,
        row_bytes: row_stride,
        ignore_alpha: !pixel_format.has_alpha(),
        alpha_premultiplied: true,
        chroma_upsampling: ChromaUpsampling::Fastest,
    }
}

/// Pair the descriptor for `pixel_format` with the pinned bytes
///
/// The view borrows `pinned` and cannot outlive it.
pub fn negotiate<'p>(
    pixel_format: PixelFormat,
    row_stride: u32,
    pinned: &'p PinnedPixels<'_>,
) -> RgbView<'p> {
    RgbView {
        descriptor: describe(pixel_format, row_stride),
        width: pinned.width(),
        height: pinned.height(),
        pixels: pinned.as_slice(),
    }
}

#[cfg(test)]
mod tests {
    use lamco_codec::PixelImage;

    use super::*;
    use crate::guard;

    #[test]
    fn test_alpha_follows_format_name() {
        for format in PixelFormat::ALL {
            let descriptor = describe(format, 64);
            assert_eq!(descriptor.ignore_alpha, !format.has_alpha(), "{format}");
            assert!(descriptor.alpha_premultiplied);
        }
    }

    #[test]
    fn test_layout_is_always_bgra() {
        for format in PixelFormat::ALL {
            let descriptor = describe(format, 96);
            assert_eq!(descriptor.layout, RgbLayout::Bgra);
            assert_eq!(descriptor.depth, 8);
            assert_eq!(descriptor.row_bytes, 96);
            assert_eq!(descriptor.chroma_upsampling, ChromaUpsampling::Fastest);
        }
    }

    #[test]
    fn test_negotiate_uses_pinned_bytes() {
        let image = PixelImage::new(2, 2, 12, PixelFormat::BGRX, (0..24).collect()).unwrap();
        let pinned = guard::acquire(&image).unwrap();
        let view = negotiate(PixelFormat::BGRX, 12, &pinned);

        assert!(view.descriptor.ignore_alpha);
        assert_eq!(view.row(0), Some(&[0, 1, 2, 3, 4, 5, 6, 7][..]));
        // Row padding is skipped
        assert_eq!(view.row(1), Some(&[12, 13, 14, 15, 16, 17, 18, 19][..]));
        assert_eq!(view.row(2), None);
    }

    #[test]
    fn test_channel_offsets() {
        assert_eq!(RgbLayout::Bgra.channel_offsets(), (2, 1, 0, 3));
        assert_eq!(RgbLayout::Rgba.channel_offsets(), (0, 1, 2, 3));
    }
}
