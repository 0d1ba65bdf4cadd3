//! Error types shared by encoder adapters
//!
//! Adapters keep their own detailed error enums. When an adapter is driven
//! through [`ImageEncoder`](crate::ImageEncoder) or the
//! [`EncoderRegistry`](crate::EncoderRegistry) its error is boxed into
//! [`CodecError::Encoder`] so callers can still downcast to it.

use thiserror::Error;

/// Errors raised by the shared encoder interface
///
/// # Examples
///
/// ```
/// # use lamco_codec::{CodecError, EncoderRegistry, EncodeOptions, PixelFormat, PixelImage};
/// let registry = EncoderRegistry::new();
/// let image = PixelImage::filled(4, 4, PixelFormat::BGRX, 0x80).unwrap();
///
/// match registry.encode("jpeg", &image, &EncodeOptions::new()) {
///     Err(CodecError::UnknownEncoding(name)) => assert_eq!(name, "jpeg"),
///     other => panic!("unexpected: {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum CodecError {
    /// No encoder is registered for the requested encoding name
    #[error("No encoder registered for encoding '{0}'")]
    UnknownEncoding(String),

    /// The pixel format name is not one of the supported layouts
    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    /// The pixel buffer does not describe a valid image
    ///
    /// Raised when dimensions are zero, the stride is too small for the
    /// format, or the buffer length does not equal `row_stride * height`.
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// An encoder adapter failed
    ///
    /// The adapter's own error is preserved as the source.
    #[error("{codec} encoder failed: {source}")]
    Encoder {
        /// Encoding name of the failing adapter
        codec: &'static str,
        /// Adapter-specific error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

/// Result type for shared encoder operations
pub type Result<T> = std::result::Result<T, CodecError>;

impl CodecError {
    /// Create an unsupported format error
    pub(crate) fn unsupported_format(name: impl Into<String>) -> Self {
        Self::UnsupportedFormat(name.into())
    }

    /// Create an invalid image error
    pub(crate) fn invalid_image(msg: impl Into<String>) -> Self {
        Self::InvalidImage(msg.into())
    }

    /// Wrap an adapter error
    pub fn encoder<E>(codec: &'static str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Encoder {
            codec,
            source: Box::new(source),
        }
    }
}
