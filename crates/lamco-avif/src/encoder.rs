//! The AVIF encoder adapter
//!
//! [`AvifEncoder`] ties the pipeline together: pin the caller's pixels,
//! negotiate the RGB layout, run one encode session and wrap the bitstream
//! in an [`EncodeOutcome`].

use lamco_codec::{CodecError, EncodeOptions, EncodeOutcome, ImageEncoder, PixelSource, Version};
use tracing::{debug, trace};

use crate::backend::AvifBackend;
use crate::config::AvifConfig;
use crate::error::Result;
use crate::{guard, negotiate, session, translate, CODEC_NAME, ENCODINGS};

/// AVIF encoder over a native backend
///
/// Stateless between calls apart from its configuration, so one instance can
/// serve any number of threads when the backend is `Send + Sync`.
///
/// # Examples
///
/// ```rust,ignore
/// use lamco_avif::AvifEncoder;
/// use lamco_codec::{EncodeOptions, PixelFormat, PixelImage};
///
/// let encoder = AvifEncoder::from_env();
/// let frame = PixelImage::filled(64, 64, PixelFormat::BGRX, 0x80)?;
/// let outcome = encoder.encode("avif", &frame, &EncodeOptions::new())?;
/// assert!(!outcome.client_options.alpha);
/// ```
#[derive(Debug)]
pub struct AvifEncoder<B: AvifBackend> {
    backend: B,
    config: AvifConfig,
}

#[cfg(any(feature = "ravif", feature = "libavif"))]
impl AvifEncoder<crate::backend::DefaultBackend> {
    /// Encoder on the default backend
    pub fn new(config: AvifConfig) -> Self {
        Self::with_backend(crate::backend::DefaultBackend::default(), config)
    }

    /// Encoder on the default backend, configured from the environment
    pub fn from_env() -> Self {
        Self::new(AvifConfig::from_env())
    }
}

impl<B: AvifBackend> AvifEncoder<B> {
    /// Encoder on a specific backend
    pub fn with_backend(backend: B, config: AvifConfig) -> Self {
        if let Err(issues) = config.validate() {
            for issue in issues {
                debug!("AVIF config: {}", issue);
            }
        }
        debug!(
            "AVIF encoder on {} {} ({} threads)",
            backend.name(),
            backend.version(),
            config.max_threads
        );
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &AvifConfig {
        &self.config
    }

    /// Compress one image to AVIF
    ///
    /// `format_hint` is informational; the output is always AVIF. `options`
    /// are accepted but not consumed: speed is fixed and alpha follows the
    /// pixel format. On error no payload is produced and every native object
    /// has already been released.
    pub fn encode(
        &self,
        format_hint: &str,
        image: &dyn PixelSource,
        options: &EncodeOptions,
    ) -> Result<EncodeOutcome> {
        if format_hint != CODEC_NAME {
            debug!("Format hint '{}' ignored, encoding {}", format_hint, CODEC_NAME);
        }
        if !options.is_empty() {
            trace!("Ignoring encode options: {:?}", options.keys().collect::<Vec<_>>());
        }

        let pixel_format = image.pixel_format();
        let row_stride = image.row_stride();
        let (width, height) = (image.width(), image.height());

        let payload = guard::with_pinned(image, |pinned| {
            let rgb = negotiate::negotiate(pixel_format, row_stride, pinned);
            session::run(&self.backend, &rgb, self.config.max_threads)
        })?;

        let outcome = translate::build_outcome(CODEC_NAME, pixel_format, width, height, payload);
        debug!(
            "Encoded {}x{} {} to {} bytes (alpha={})",
            width,
            height,
            pixel_format,
            outcome.len(),
            outcome.client_options.alpha
        );

        if let Some(dump) = &self.config.dump {
            dump.dump(&outcome);
        }
        Ok(outcome)
    }
}

impl<B: AvifBackend> ImageEncoder for AvifEncoder<B> {
    fn get_type(&self) -> &'static str {
        CODEC_NAME
    }

    fn get_encodings(&self) -> &'static [&'static str] {
        ENCODINGS
    }

    fn get_version(&self) -> Version {
        self.backend.version()
    }

    fn init_module(&self) {
        crate::init_module();
    }

    fn cleanup_module(&self) {
        crate::cleanup_module();
    }

    fn encode(
        &self,
        format_hint: &str,
        image: &dyn PixelSource,
        options: &EncodeOptions,
    ) -> lamco_codec::Result<EncodeOutcome> {
        AvifEncoder::encode(self, format_hint, image, options).map_err(CodecError::from)
    }
}
