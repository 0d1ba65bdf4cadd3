//! # lamco-codec
//!
//! Shared interface for the lamco still-image encoder adapters.
//!
//! This crate is part of the [lamco-codecs](https://github.com/lamco-admin/lamco-codecs)
//! workspace. It defines what an encoder adapter receives and returns so the
//! remote display pipeline can pick an adapter by encoding name without
//! depending on any particular codec library.
//!
//! # Overview
//!
//! - [`PixelSource`] / [`PixelImage`]: read-only pixel buffers
//! - [`PixelFormat`]: the packed RGB-family layouts adapters accept
//! - [`EncodeOptions`]: open key/value map of per-call hints
//! - [`EncodeOutcome`]: compressed payload plus client decode hints
//! - [`ImageEncoder`]: the adapter trait
//! - [`EncoderRegistry`]: runtime selection by encoding name
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lamco_codec::{EncodeOptions, EncoderRegistry, PixelFormat, PixelImage};
//!
//! let registry = EncoderRegistry::new();
//! registry.register(Arc::new(lamco_avif::AvifEncoder::from_env()));
//!
//! let frame = PixelImage::filled(1920, 1080, PixelFormat::BGRX, 0)?;
//! let outcome = registry.encode("avif", &frame, &EncodeOptions::new())?;
//! println!("{} bytes", outcome.payload.len());
//! ```

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod encoder;
pub mod error;
pub mod format;
pub mod image;
pub mod options;
pub mod outcome;
pub mod registry;

// =============================================================================
// RE-EXPORTS - PRIMARY API
// =============================================================================

pub use encoder::{EncoderInfo, ImageEncoder, Version};
pub use error::{CodecError, Result};
pub use format::PixelFormat;
pub use image::{packed_stride, PixelImage, PixelSource};
pub use options::{EncodeOptions, OptionValue};
pub use outcome::{ClientOptions, EncodeOutcome};
pub use registry::EncoderRegistry;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
