//! Native codec backends
//!
//! [`AvifBackend`] is the seam between the encode session and the codec
//! library. It mirrors the libavif object model: an image object, an encoder
//! object and an output buffer, each created and destroyed explicitly. The
//! session owns every object a backend hands out and returns it through the
//! matching `destroy_*`/`free_*` call exactly once.
//!
//! Backends:
//!
//! | Backend | Feature | Library |
//! |---------|---------|---------|
//! | [`LibavifBackend`] | `libavif` | libavif via `libavif-sys` |
//! | [`RavifBackend`] | `ravif` (default) | rav1e via `ravif`, pure Rust |
//!
//! [`DefaultBackend`] is libavif when enabled, ravif otherwise.

use std::fmt;

use lamco_codec::Version;

use crate::negotiate::RgbView;

#[cfg(feature = "libavif")]
pub mod native;

#[cfg(feature = "ravif")]
pub mod software;

#[cfg(test)]
pub(crate) mod recording;

#[cfg(feature = "libavif")]
pub use native::LibavifBackend;

#[cfg(feature = "ravif")]
pub use software::RavifBackend;

/// Backend used by [`AvifEncoder::new`](crate::AvifEncoder::new)
#[cfg(feature = "libavif")]
pub type DefaultBackend = LibavifBackend;

/// Backend used by [`AvifEncoder::new`](crate::AvifEncoder::new)
#[cfg(all(feature = "ravif", not(feature = "libavif")))]
pub type DefaultBackend = RavifBackend;

/// Status returned by a native call
///
/// Values follow libavif's `avifResult` numbering; `0` is success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResultCode(pub i32);

impl ResultCode {
    pub const OK: Self = Self(0);
    pub const UNKNOWN_ERROR: Self = Self(1);
    pub const REFORMAT_FAILED: Self = Self(5);
    pub const UNSUPPORTED_DEPTH: Self = Self(6);
    pub const ENCODE_COLOR_FAILED: Self = Self(7);
    pub const NO_CONTENT: Self = Self(3);
    pub const INVALID_ARGUMENT: Self = Self(24);
    pub const OUT_OF_MEMORY: Self = Self(26);

    pub fn is_ok(self) -> bool {
        self == Self::OK
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chroma subsampling of the native image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YuvFormat {
    /// Full chroma resolution
    Yuv444,
    Yuv422,
    Yuv420,
    /// Monochrome
    Yuv400,
}

/// Geometry of the native image object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageParams {
    pub width: u32,
    pub height: u32,
    /// Bits per sample
    pub depth: u32,
    pub yuv_format: YuvFormat,
}

/// Encoder tuning applied right after allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderSettings {
    /// 0 (slowest, best) to 10 (fastest)
    pub speed: i32,
    /// Worker threads the codec may use, at least 1
    pub max_threads: usize,
}

/// Flags for [`AvifBackend::add_image`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddImageFlags(u32);

impl AddImageFlags {
    pub const NONE: Self = Self(0);
    /// Force this frame to be a keyframe
    pub const FORCE_KEYFRAME: Self = Self(1 << 0);
    /// This is the only frame; the encoder may finalize as a still image
    pub const SINGLE: Self = Self(1 << 1);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for AddImageFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Object model of a native AVIF codec
///
/// Allocation calls return `None` where the C API returns a null pointer.
/// Status calls return a [`ResultCode`]. Objects passed back to the
/// `destroy_*`/`free_*` calls are never used again.
pub trait AvifBackend: Send + Sync {
    /// Native image object
    type Image;
    /// Native encoder object
    type Encoder;
    /// Native output buffer
    type Output;

    /// Short backend name for logging
    fn name(&self) -> &'static str;

    /// Version of the codec library
    fn version(&self) -> Version;

    /// Allocate an image object
    fn create_image(&self, params: &ImageParams) -> Option<Self::Image>;

    /// Release an image object
    fn destroy_image(&self, image: Self::Image);

    /// Convert the RGB view into the image's YUV (and alpha) planes
    fn rgb_to_yuv(&self, image: &mut Self::Image, rgb: &RgbView<'_>) -> ResultCode;

    /// Allocate an encoder object
    fn create_encoder(&self) -> Option<Self::Encoder>;

    /// Apply speed and threading settings to a fresh encoder
    fn configure_encoder(&self, encoder: &mut Self::Encoder, settings: &EncoderSettings);

    /// Release an encoder object
    fn destroy_encoder(&self, encoder: Self::Encoder);

    /// Submit a frame
    fn add_image(
        &self,
        encoder: &mut Self::Encoder,
        image: &Self::Image,
        duration: u64,
        flags: AddImageFlags,
    ) -> ResultCode;

    /// Create an empty output buffer for [`finish`](AvifBackend::finish)
    fn create_output(&self) -> Self::Output;

    /// Serialize all submitted frames into `output`
    fn finish(&self, encoder: &mut Self::Encoder, output: &mut Self::Output) -> ResultCode;

    /// Bytes written to an output buffer so far
    fn output_bytes<'o>(&self, output: &'o Self::Output) -> &'o [u8];

    /// Release an output buffer
    fn free_output(&self, output: Self::Output);

    /// Library description of a result code, if it has one
    fn result_to_string(&self, code: ResultCode) -> Option<String>;
}
