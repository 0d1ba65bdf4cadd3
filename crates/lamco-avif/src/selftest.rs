//! Built-in self-test
//!
//! Encodes small synthetic frames with and without alpha at several quality
//! hints and checks that every call yields a usable payload. Meant to be run
//! once at startup before the adapter is offered to clients.

use lamco_codec::{packed_stride, CodecError, EncodeOptions, PixelFormat, PixelImage};
use thiserror::Error;
use tracing::{debug, info};

use crate::backend::AvifBackend;
use crate::encoder::AvifEncoder;
use crate::error::AvifError;

/// Width of the synthetic frames
pub const SELFTEST_WIDTH: u32 = 24;

/// Height of the synthetic frames
pub const SELFTEST_HEIGHT: u32 = 16;

/// Quality hints passed with each frame
pub const QUALITY_HINTS: [i64; 3] = [10, 50, 90];

/// Source formats exercised, one with alpha and one without
pub const SELFTEST_FORMATS: [PixelFormat; 2] = [PixelFormat::BGRA, PixelFormat::BGRX];

/// First problem found by [`run`]
#[derive(Error, Debug)]
pub enum SelfTestError {
    #[error("Failed to build {format} test image: {source}")]
    Image {
        format: PixelFormat,
        #[source]
        source: CodecError,
    },

    #[error("{format} encode at quality {quality} failed: {source}")]
    Encode {
        format: PixelFormat,
        quality: i64,
        #[source]
        source: AvifError,
    },

    #[error("{format} encode at quality {quality} produced an empty payload")]
    EmptyPayload { format: PixelFormat, quality: i64 },

    #[error(
        "{format} encode reported {width}x{height}, expected {}x{}",
        SELFTEST_WIDTH,
        SELFTEST_HEIGHT
    )]
    SizeMismatch {
        format: PixelFormat,
        width: u32,
        height: u32,
    },

    #[error("{format} encode reported alpha={actual}, expected {expected}")]
    AlphaMismatch {
        format: PixelFormat,
        expected: bool,
        actual: bool,
    },
}

/// Gradient frame in `format`, premultiplied when the format has alpha
///
/// Padding bytes (`X`) are set to 0xff.
pub fn synthetic_image(
    format: PixelFormat,
    width: u32,
    height: u32,
) -> lamco_codec::Result<PixelImage> {
    let stride = packed_stride(width, format)?;
    let mut pixels = Vec::with_capacity(stride as usize * height as usize);

    for y in 0..height {
        for x in 0..width {
            let alpha = if format.has_alpha() {
                (64 + (x * 191) / width.max(1)) as u8
            } else {
                0xff
            };
            let premultiply = |c: u32| ((c.min(255) * u32::from(alpha)) / 255) as u8;
            let (r, g, b) = (
                premultiply(x * 10),
                premultiply(y * 15),
                premultiply((x + y) * 5),
            );

            for channel in format.as_str().chars() {
                pixels.push(match channel {
                    'R' => r,
                    'G' => g,
                    'B' => b,
                    'A' => alpha,
                    _ => 0xff,
                });
            }
        }
    }

    PixelImage::new(width, height, stride, format, pixels)
}

/// Run the self-test and return the number of payloads checked
pub fn run<B: AvifBackend>(encoder: &AvifEncoder<B>) -> Result<usize, SelfTestError> {
    let mut checked = 0;

    for format in SELFTEST_FORMATS {
        let image = synthetic_image(format, SELFTEST_WIDTH, SELFTEST_HEIGHT)
            .map_err(|source| SelfTestError::Image { format, source })?;

        for quality in QUALITY_HINTS {
            let options = EncodeOptions::new().with("quality", quality);
            let outcome = encoder
                .encode(crate::CODEC_NAME, &image, &options)
                .map_err(|source| SelfTestError::Encode {
                    format,
                    quality,
                    source,
                })?;

            if outcome.payload.is_empty() {
                return Err(SelfTestError::EmptyPayload { format, quality });
            }
            if (outcome.width, outcome.height) != (SELFTEST_WIDTH, SELFTEST_HEIGHT) {
                return Err(SelfTestError::SizeMismatch {
                    format,
                    width: outcome.width,
                    height: outcome.height,
                });
            }
            if outcome.client_options.alpha != format.has_alpha() {
                return Err(SelfTestError::AlphaMismatch {
                    format,
                    expected: format.has_alpha(),
                    actual: outcome.client_options.alpha,
                });
            }

            debug!(
                "Self-test {} q={}: {} bytes",
                format,
                quality,
                outcome.payload.len()
            );
            checked += 1;
        }
    }

    info!("AVIF self-test passed ({} payloads)", checked);
    Ok(checked)
}

#[cfg(test)]
mod tests {
    use lamco_codec::PixelSource;

    use super::*;
    use crate::backend::recording::{FailPoint, RecordingBackend};
    use crate::backend::ResultCode;
    use crate::config::AvifConfig;

    fn encoder(backend: RecordingBackend) -> AvifEncoder<RecordingBackend> {
        AvifEncoder::with_backend(backend, AvifConfig::builder().max_threads(1).build())
    }

    #[test]
    fn test_synthetic_image_layout() {
        let image = synthetic_image(PixelFormat::BGRX, 4, 2).unwrap();
        assert_eq!(image.row_stride(), 16);

        let bytes = image.pixels().unwrap();
        // x=1, y=0 -> r=10, g=0, b=5, padding 0xff
        assert_eq!(&bytes[4..8], &[5, 0, 10, 0xff]);
    }

    #[test]
    fn test_synthetic_alpha_is_premultiplied() {
        let image = synthetic_image(PixelFormat::RGBA, 8, 8).unwrap();
        for px in image.pixels().unwrap().chunks_exact(4) {
            assert!(px[0] <= px[3] && px[1] <= px[3] && px[2] <= px[3]);
            assert!(px[3] >= 64);
        }
    }

    #[test]
    fn test_synthetic_24bit() {
        let image = synthetic_image(PixelFormat::RGB, 5, 3).unwrap();
        assert_eq!(image.row_stride(), 15);
        assert_eq!(image.pixels().unwrap().len(), 45);
    }

    #[test]
    fn test_run_checks_every_combination() {
        let backend = RecordingBackend::new();
        let encoder = encoder(backend);

        assert_eq!(run(&encoder).unwrap(), 6);
        assert_eq!(encoder.backend().images_created(), 6);
        assert_eq!(encoder.backend().live_objects(), 0);
    }

    #[test]
    fn test_run_reports_first_failure() {
        let backend = RecordingBackend::failing_at(FailPoint::AddImage, ResultCode::UNKNOWN_ERROR);
        let err = run(&encoder(backend)).unwrap_err();

        assert!(matches!(
            err,
            SelfTestError::Encode {
                format: PixelFormat::BGRA,
                quality: 10,
                source: AvifError::EncodeError { .. },
            }
        ));
    }

    #[test]
    fn test_run_rejects_empty_payload() {
        let err = run(&encoder(RecordingBackend::new().with_empty_output())).unwrap_err();
        // The session turns an empty bitstream into a finish error
        assert!(matches!(
            err,
            SelfTestError::Encode {
                source: AvifError::FinishError { .. },
                ..
            }
        ));
    }
}
