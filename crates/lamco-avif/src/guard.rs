//! Scoped view over the caller's pixel buffer
//!
//! [`PinnedPixels`] borrows the source for as long as the encode session
//! needs to read it. The borrow checker keeps the view from escaping the
//! call, and dropping it is the single release point.

use lamco_codec::PixelSource;
use tracing::trace;

use crate::error::{AvifError, Result};

/// Bytes the conversion step reads for every pixel
///
/// The RGB descriptor always describes 4-byte samples, so rows must hold
/// `width * 4` bytes even for 24-bit source formats.
pub const SAMPLE_BYTES: usize = 4;

/// Read-only view of a pixel source
///
/// Bytes handed out by the view borrow the view itself, so they cannot
/// outlive it:
///
/// ```compile_fail
/// use lamco_avif::guard;
/// use lamco_codec::{PixelFormat, PixelImage};
///
/// let image = PixelImage::filled(2, 2, PixelFormat::BGRX, 0).unwrap();
/// let bytes = {
///     let pinned = guard::acquire(&image).unwrap();
///     pinned.as_slice()
/// };
/// assert_eq!(bytes.len(), 16);
/// ```
#[derive(Debug)]
pub struct PinnedPixels<'a> {
    bytes: &'a [u8],
    width: u32,
    height: u32,
    row_stride: u32,
}

impl PinnedPixels<'_> {
    /// Pixel bytes, `row_stride * height` long
    ///
    /// ```
    /// use lamco_avif::guard;
    /// use lamco_codec::{PixelFormat, PixelImage};
    ///
    /// let image = PixelImage::filled(2, 2, PixelFormat::BGRX, 7).unwrap();
    /// let pinned = guard::acquire(&image).unwrap();
    /// assert_eq!(pinned.as_slice().len(), 16);
    /// ```
    pub fn as_slice(&self) -> &[u8] {
        self.bytes
    }

    /// Base address of the pixel bytes
    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn row_stride(&self) -> u32 {
        self.row_stride
    }
}

impl Drop for PinnedPixels<'_> {
    fn drop(&mut self) {
        trace!(
            "Released {}x{} pixel view ({} bytes)",
            self.width,
            self.height,
            self.bytes.len()
        );
    }
}

/// View the pixels of `source` after validating its geometry
///
/// Fails with [`AvifError::AcquisitionFailure`] when the memory is not
/// accessible, the dimensions are zero, the stride cannot hold 4-byte
/// samples, or the length differs from `row_stride * height`.
pub fn acquire(source: &dyn PixelSource) -> Result<PinnedPixels<'_>> {
    let width = source.width();
    let height = source.height();
    let row_stride = source.row_stride();

    if width == 0 || height == 0 {
        return Err(AvifError::acquisition(format!(
            "invalid dimensions {width}x{height}"
        )));
    }

    let min_stride = width as usize * SAMPLE_BYTES;
    if (row_stride as usize) < min_stride {
        return Err(AvifError::acquisition(format!(
            "row stride {row_stride} cannot hold {width} 4-byte samples ({min_stride} bytes, format {})",
            source.pixel_format()
        )));
    }

    let bytes = source
        .pixels()
        .ok_or_else(|| AvifError::acquisition("pixel memory is not accessible"))?;

    let expected = row_stride as usize * height as usize;
    if bytes.len() != expected {
        return Err(AvifError::acquisition(format!(
            "buffer holds {} bytes, expected {expected} (row_stride {row_stride} * height {height})",
            bytes.len()
        )));
    }

    trace!("Pinned {}x{} pixel view ({} bytes)", width, height, expected);

    Ok(PinnedPixels {
        bytes,
        width,
        height,
        row_stride,
    })
}

/// Run `f` with a pinned view of `source`
///
/// The view is released when `f` returns, whether it succeeded or not.
pub fn with_pinned<T>(
    source: &dyn PixelSource,
    f: impl FnOnce(&PinnedPixels<'_>) -> Result<T>,
) -> Result<T> {
    let pinned = acquire(source)?;
    f(&pinned)
}
