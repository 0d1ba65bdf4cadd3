//! Encoded payload envelope
//!
//! Every adapter returns the same envelope so the transport layer can forward
//! it to the client without knowing which codec produced it.

/// Options the client needs to decode the payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientOptions {
    /// Payload carries an alpha channel
    pub alpha: bool,
}

/// Result of one successful encode call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOutcome {
    /// Encoding name, e.g. `"avif"`
    pub codec: &'static str,

    /// Compressed bitstream, owned by the caller
    pub payload: Vec<u8>,

    /// Decode hints forwarded to the client
    pub client_options: ClientOptions,

    /// Encoded width in pixels
    pub width: u32,

    /// Encoded height in pixels
    pub height: u32,

    /// Codec specific extra value, 0 for still images
    pub extra: u32,

    /// Colour bits per pixel, alpha excluded
    pub bits_per_pixel: u8,
}

impl EncodeOutcome {
    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Compressed size relative to the raw 32-bit frame
    ///
    /// Returns 0.0 for zero-sized images.
    pub fn compression_ratio(&self) -> f64 {
        let raw = f64::from(self.width) * f64::from(self.height) * 4.0;
        if raw == 0.0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
        let compressed = self.payload.len() as f64;
        compressed / raw
    }
}
