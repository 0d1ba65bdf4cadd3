//! # lamco-codecs
//!
//! Still-image encoder adapters for remote display pipelines.
//!
//! This crate provides a unified interface to the lamco codec libraries:
//!
//! - **[`codec`]** - Shared adapter interface (pixel sources, outcomes, registry)
//! - **[`avif`]** - AVIF encoder adapter with deterministic native cleanup
//!
//! # Features
//!
//! All features are enabled by default. You can selectively enable only what you need:
//!
//! ```toml
//! # Use everything (default)
//! lamco-codecs = "0.1"
//!
//! # Interface only, for writing your own adapter
//! lamco-codecs = { version = "0.1", default-features = false, features = ["codec"] }
//!
//! # All features including sub-crate features (libavif backend)
//! lamco-codecs = { version = "0.1", features = ["full"] }
//! ```
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `codec` | Yes | Shared encoder adapter interface |
//! | `avif` | Yes | AVIF adapter (pure Rust backend) |
//! | `full` | No | All features from all sub-crates |
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lamco_codecs::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = EncoderRegistry::new();
//!     registry.register(Arc::new(AvifEncoder::from_env()));
//!
//!     let frame = PixelImage::filled(1280, 720, PixelFormat::BGRX, 0)?;
//!     let outcome = registry.encode("avif", &frame, &EncodeOptions::new())?;
//!
//!     println!("{} bytes", outcome.payload.len());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                     lamco-codecs                      │
//! ├──────────────────────────┬────────────────────────────┤
//! │       lamco-codec        │         lamco-avif         │
//! │                          │                            │
//! │  PixelSource             │  AvifEncoder               │
//! │  EncodeOutcome           │  EncodeSession             │
//! │  EncoderRegistry         │  AvifConfig                │
//! └────────────┬─────────────┴──────────────┬─────────────┘
//!              │                            │
//!              ▼                            ▼
//!      runtime selection            ravif / libavif
//! ```
//!
//! # Related Crates
//!
//! You can also use the individual crates directly:
//!
//! - [`lamco-codec`](https://crates.io/crates/lamco-codec) - Interface only
//! - [`lamco-avif`](https://crates.io/crates/lamco-avif) - AVIF adapter only

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// RE-EXPORTS
// =============================================================================

/// Shared encoder adapter interface.
///
/// This module provides:
/// - Pixel source trait and owned image type
/// - Encode options and outcome envelope
/// - The `ImageEncoder` trait and a name-keyed registry
///
/// See [`lamco_codec`] documentation for details.
#[cfg(feature = "codec")]
#[cfg_attr(docsrs, doc(cfg(feature = "codec")))]
pub use lamco_codec as codec;

/// AVIF encoder adapter.
///
/// See [`lamco_avif`] documentation for details.
#[cfg(feature = "avif")]
#[cfg_attr(docsrs, doc(cfg(feature = "avif")))]
pub use lamco_avif as avif;

// =============================================================================
// PRELUDE - Common types for convenience
// =============================================================================

/// Prelude module with commonly used types.
///
/// ```rust
/// use lamco_codecs::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "codec")]
    pub use lamco_codec::{
        CodecError, EncodeOptions, EncodeOutcome, EncoderRegistry, ImageEncoder, PixelFormat,
        PixelImage, PixelSource,
    };

    #[cfg(feature = "avif")]
    pub use lamco_avif::{AvifConfig, AvifEncoder, AvifError};
}
