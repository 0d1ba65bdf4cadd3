//! Pixel buffers handed to encoders
//!
//! [`PixelSource`] is the read-only view an encoder sees. Capture code may
//! implement it over mapped frame memory; [`PixelImage`] is the owned
//! implementation used when the pixels already live in a `Vec<u8>`.

use crate::error::{CodecError, Result};
use crate::format::PixelFormat;

/// Read-only access to a packed pixel buffer
///
/// Encoders borrow a source for the duration of one encode call and never
/// retain it. Implementations must not mutate the pixels while borrowed.
pub trait PixelSource {
    /// Image width in pixels
    fn width(&self) -> u32;

    /// Image height in pixels
    fn height(&self) -> u32;

    /// Bytes between the start of consecutive rows
    fn row_stride(&self) -> u32;

    /// Memory layout of each pixel
    fn pixel_format(&self) -> PixelFormat;

    /// The `row_stride * height` bytes of the image
    ///
    /// Returns `None` when the backing memory is not currently accessible
    /// (for example a capture buffer that was already recycled).
    fn pixels(&self) -> Option<&[u8]>;
}

/// Owned pixel buffer
///
/// # Examples
///
/// ```
/// use lamco_codec::{PixelFormat, PixelImage, PixelSource};
///
/// let image = PixelImage::new(2, 1, 8, PixelFormat::BGRA, vec![0u8; 8]).unwrap();
/// assert_eq!(image.pixels().map(<[u8]>::len), Some(8));
///
/// // Length must equal row_stride * height
/// assert!(PixelImage::new(2, 2, 8, PixelFormat::BGRA, vec![0u8; 8]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelImage {
    width: u32,
    height: u32,
    row_stride: u32,
    pixel_format: PixelFormat,
    pixels: Vec<u8>,
}

impl PixelImage {
    /// Wrap an existing buffer after validating its geometry
    pub fn new(
        width: u32,
        height: u32,
        row_stride: u32,
        pixel_format: PixelFormat,
        pixels: Vec<u8>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CodecError::invalid_image(format!(
                "dimensions must be non-zero, got {width}x{height}"
            )));
        }

        let min_stride = width as usize * pixel_format.bytes_per_pixel();
        if (row_stride as usize) < min_stride {
            return Err(CodecError::invalid_image(format!(
                "row stride {row_stride} too small for {width} {pixel_format} pixels ({min_stride} bytes)"
            )));
        }

        let expected = row_stride as usize * height as usize;
        if pixels.len() != expected {
            return Err(CodecError::invalid_image(format!(
                "expected {expected} bytes (row_stride * height), got {}",
                pixels.len()
            )));
        }

        Ok(Self {
            width,
            height,
            row_stride,
            pixel_format,
            pixels,
        })
    }

    /// Create a tightly packed image with every byte set to `value`
    pub fn filled(width: u32, height: u32, pixel_format: PixelFormat, value: u8) -> Result<Self> {
        let row_stride = packed_stride(width, pixel_format)?;
        let len = row_stride as usize * height as usize;
        Self::new(width, height, row_stride, pixel_format, vec![value; len])
    }

    /// Consume the image and return its buffer
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

impl PixelSource for PixelImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn row_stride(&self) -> u32 {
        self.row_stride
    }

    fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    fn pixels(&self) -> Option<&[u8]> {
        Some(&self.pixels)
    }
}

/// Stride of a tightly packed row
pub fn packed_stride(width: u32, pixel_format: PixelFormat) -> Result<u32> {
    let bpp = u32::try_from(pixel_format.bytes_per_pixel()).unwrap_or(u32::MAX);
    width
        .checked_mul(bpp)
        .ok_or_else(|| CodecError::invalid_image(format!("width {width} overflows row stride")))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn format_strategy() -> impl Strategy<Value = PixelFormat> {
        prop::sample::select(PixelFormat::ALL.to_vec())
    }

    proptest! {
        /// Property: construction succeeds exactly when the geometry is consistent.
        #[test]
        fn prop_new_accepts_consistent_geometry(
            format in format_strategy(),
            width in 0u32..=32,
            height in 0u32..=32,
            stride in 0u32..=160,
            len in 0usize..=4096,
        ) {
            let valid = width > 0
                && height > 0
                && stride as usize >= width as usize * format.bytes_per_pixel()
                && len == stride as usize * height as usize;

            let result = PixelImage::new(width, height, stride, format, vec![0; len]);
            prop_assert_eq!(result.is_ok(), valid);
        }

        /// Property: filled images are tightly packed and valid.
        #[test]
        fn prop_filled_is_packed(
            format in format_strategy(),
            width in 1u32..=64,
            height in 1u32..=64,
        ) {
            let image = PixelImage::filled(width, height, format, 0).unwrap();
            prop_assert_eq!(image.row_stride() as usize, width as usize * format.bytes_per_pixel());
            prop_assert_eq!(
                image.pixels().map(<[u8]>::len),
                Some(image.row_stride() as usize * height as usize)
            );
        }
    }
}
