//! # lamco-avif
//!
//! AVIF still-image encoder adapter for remote display pipelines.
//!
//! This crate is part of the [lamco-codecs](https://github.com/lamco-admin/lamco-codecs)
//! workspace. It implements [`lamco_codec::ImageEncoder`] so it can be
//! registered in an [`EncoderRegistry`](lamco_codec::EncoderRegistry) and
//! selected by the name `"avif"`.
//!
//! # Features
//!
//! - **Scoped pixel access**: the caller's buffer is borrowed, never copied,
//!   and released on every exit path
//! - **Deterministic cleanup**: native image, encoder and output buffer are
//!   released exactly once, in that order, whichever stage fails
//! - **Uniform errors**: native result codes become [`AvifError`] variants
//!   carrying the code and a readable message
//! - **Pluggable backends**: pure Rust `ravif` by default, libavif optional
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lamco_avif::{AvifConfig, AvifEncoder};
//! use lamco_codec::{EncodeOptions, PixelFormat, PixelImage};
//!
//! let encoder = AvifEncoder::new(AvifConfig::default());
//!
//! let frame = PixelImage::filled(1920, 1080, PixelFormat::BGRX, 0)?;
//! let outcome = encoder.encode("avif", &frame, &EncodeOptions::new())?;
//!
//! println!("{} bytes, alpha={}", outcome.payload.len(), outcome.client_options.alpha);
//! ```
//!
//! # Pipeline
//!
//! ```text
//! PixelSource ──> guard::acquire ──> negotiate ──> EncodeSession ──> translate ──> EncodeOutcome
//!                 (scoped view)      (RGB layout)  image → yuv →     (status →
//!                                                  encoder → add →    error, envelope)
//!                                                  finish
//! ```
//!
//! The conversion step always reads 4-byte BGRA-ordered samples. Formats
//! containing `A` are treated as premultiplied alpha; for the others the
//! fourth byte is ignored. Packed 24-bit rows (stride below `width * 4`) are
//! rejected with [`AvifError::AcquisitionFailure`].
//!
//! # Environment
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `LAMCO_AVIF_THREADS` | Worker thread hint, read once per process. Default `min(4, max(1, cpus / 2))` |
//! | `LAMCO_AVIF_DUMP_DIR` | Write every payload into this directory ([`AvifConfig::from_env`]) |
//!
//! # Cargo Features
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `ravif` | Yes | Pure Rust backend (rav1e) |
//! | `libavif` | No | libavif backend, preferred when enabled |
//! | `full` | No | All features enabled |

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod backend;
pub mod config;
pub mod dump;
pub mod encoder;
pub mod error;
pub mod guard;
pub mod negotiate;
pub mod selftest;
pub mod session;
pub mod translate;

// =============================================================================
// RE-EXPORTS - PRIMARY API
// =============================================================================

pub use encoder::AvifEncoder;

pub use config::{AvifConfig, AvifConfigBuilder, DUMP_DIR_ENV, THREADS_ENV};

pub use error::{AvifError, Result, Stage};

pub use dump::{DirectoryDump, PayloadDump};

pub use selftest::SelfTestError;

// =============================================================================
// RE-EXPORTS - ADVANCED API
// =============================================================================

pub use backend::{
    AddImageFlags, AvifBackend, EncoderSettings, ImageParams, ResultCode, YuvFormat,
};

#[cfg(any(feature = "ravif", feature = "libavif"))]
pub use backend::DefaultBackend;

#[cfg(feature = "libavif")]
pub use backend::LibavifBackend;

#[cfg(feature = "ravif")]
pub use backend::RavifBackend;

pub use guard::PinnedPixels;
pub use negotiate::{ChromaUpsampling, RgbDescriptor, RgbLayout, RgbView};
pub use session::{EncodeSession, SessionState, ENCODER_SPEED};

// =============================================================================
// CRATE-LEVEL ITEMS
// =============================================================================

use tracing::info;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Codec name reported to the registry and stamped on every outcome
pub const CODEC_NAME: &str = "avif";

/// Encodings this adapter produces
pub const ENCODINGS: &[&str] = &[CODEC_NAME];

/// Codec type name
pub fn get_type() -> &'static str {
    CODEC_NAME
}

/// Encodings this adapter produces
pub fn get_encodings() -> &'static [&'static str] {
    ENCODINGS
}

/// Version of the default backend's codec library
#[cfg(any(feature = "ravif", feature = "libavif"))]
pub fn get_version() -> lamco_codec::Version {
    DefaultBackend::default().version()
}

/// Version and encodings of the default backend
#[cfg(any(feature = "ravif", feature = "libavif"))]
pub fn get_info() -> lamco_codec::EncoderInfo {
    lamco_codec::EncoderInfo {
        version: get_version(),
        encodings: ENCODINGS.to_vec(),
    }
}

/// Module initialization hook
///
/// Nothing to set up; logs the adapter coming online.
pub fn init_module() {
    info!("AVIF encoder module initialized (lamco-avif {})", VERSION);
}

/// Module cleanup hook
pub fn cleanup_module() {
    info!("AVIF encoder module cleaned up");
}
