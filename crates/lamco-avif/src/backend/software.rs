//! Pure Rust backend built on `ravif`
//!
//! ravif takes RGBA pixels and does its own colour conversion, so the
//! "image" object here is an RGBA8 buffer filled by
//! [`rgb_to_yuv`](AvifBackend::rgb_to_yuv) and the conversion step is where
//! the negotiated layout, padding and premultiplication are resolved.

use std::sync::Arc;

use ::ravif::{Encoder, Img, RGBA8};
use lamco_codec::Version;
use tracing::{debug, warn};

use super::{AddImageFlags, AvifBackend, EncoderSettings, ImageParams, ResultCode, YuvFormat};
use crate::negotiate::RgbView;

/// ravif release line this backend is written against
const RAVIF_VERSION: Version = Version::new(0, 11, 0);

/// RGBA8 image awaiting encode
#[derive(Debug)]
pub struct RavifImage {
    width: u32,
    height: u32,
    pixels: Arc<[RGBA8]>,
    converted: bool,
}

/// Encoder settings and the frame submitted to it
#[derive(Debug)]
pub struct RavifEncoder {
    speed: u8,
    threads: usize,
    frame: Option<Frame>,
}

#[derive(Debug)]
struct Frame {
    width: u32,
    height: u32,
    pixels: Arc<[RGBA8]>,
}

/// [`AvifBackend`] over the `ravif` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct RavifBackend;

impl RavifBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Undo alpha premultiplication of one channel
fn unpremultiply(channel: u8, alpha: u8) -> u8 {
    if alpha == 0 {
        return 0;
    }
    let value = (u32::from(channel) * 255 + u32::from(alpha) / 2) / u32::from(alpha);
    value.min(255) as u8
}

impl AvifBackend for RavifBackend {
    type Image = RavifImage;
    type Encoder = RavifEncoder;
    type Output = Vec<u8>;

    fn name(&self) -> &'static str {
        "ravif"
    }

    fn version(&self) -> Version {
        RAVIF_VERSION
    }

    fn create_image(&self, params: &ImageParams) -> Option<RavifImage> {
        if params.depth != 8 || params.yuv_format != YuvFormat::Yuv444 {
            debug!(
                "ravif backend only takes 8-bit 4:4:4 input, got {}-bit {:?}",
                params.depth, params.yuv_format
            );
            return None;
        }
        let count = (params.width as usize).checked_mul(params.height as usize)?;
        if count == 0 {
            return None;
        }

        Some(RavifImage {
            width: params.width,
            height: params.height,
            pixels: Arc::from(vec![RGBA8::new(0, 0, 0, 0); count]),
            converted: false,
        })
    }

    fn destroy_image(&self, image: RavifImage) {
        drop(image);
    }

    fn rgb_to_yuv(&self, image: &mut RavifImage, rgb: &RgbView<'_>) -> ResultCode {
        let descriptor = rgb.descriptor;
        if descriptor.depth != 8 {
            return ResultCode::UNSUPPORTED_DEPTH;
        }
        if rgb.width != image.width || rgb.height != image.height {
            return ResultCode::INVALID_ARGUMENT;
        }
        let Some(pixels) = Arc::get_mut(&mut image.pixels) else {
            return ResultCode::INVALID_ARGUMENT;
        };

        let (r, g, b, a) = descriptor.layout.channel_offsets();
        let width = image.width as usize;

        for y in 0..image.height {
            let Some(row) = rgb.row(y) else {
                return ResultCode::REFORMAT_FAILED;
            };
            let start = y as usize * width;
            let Some(dst) = pixels.get_mut(start..start + width) else {
                return ResultCode::REFORMAT_FAILED;
            };

            for (out, sample) in dst.iter_mut().zip(row.chunks_exact(descriptor.sample_bytes())) {
                *out = if descriptor.ignore_alpha {
                    RGBA8::new(sample[r], sample[g], sample[b], 255)
                } else if descriptor.alpha_premultiplied {
                    let alpha = sample[a];
                    RGBA8::new(
                        unpremultiply(sample[r], alpha),
                        unpremultiply(sample[g], alpha),
                        unpremultiply(sample[b], alpha),
                        alpha,
                    )
                } else {
                    RGBA8::new(sample[r], sample[g], sample[b], sample[a])
                };
            }
        }

        image.converted = true;
        ResultCode::OK
    }

    fn create_encoder(&self) -> Option<RavifEncoder> {
        Some(RavifEncoder {
            speed: 6,
            threads: 1,
            frame: None,
        })
    }

    fn configure_encoder(&self, encoder: &mut RavifEncoder, settings: &EncoderSettings) {
        // rav1e speed presets run 1..=10
        encoder.speed = settings.speed.clamp(1, 10) as u8;
        encoder.threads = settings.max_threads.max(1);
    }

    fn destroy_encoder(&self, encoder: RavifEncoder) {
        drop(encoder);
    }

    fn add_image(
        &self,
        encoder: &mut RavifEncoder,
        image: &RavifImage,
        _duration: u64,
        flags: AddImageFlags,
    ) -> ResultCode {
        if !image.converted {
            return ResultCode::NO_CONTENT;
        }
        // Still images only: a second frame cannot be stored
        if encoder.frame.is_some() || !flags.contains(AddImageFlags::SINGLE) {
            return ResultCode::INVALID_ARGUMENT;
        }

        encoder.frame = Some(Frame {
            width: image.width,
            height: image.height,
            pixels: Arc::clone(&image.pixels),
        });
        ResultCode::OK
    }

    fn create_output(&self) -> Vec<u8> {
        Vec::new()
    }

    fn finish(&self, encoder: &mut RavifEncoder, output: &mut Vec<u8>) -> ResultCode {
        let Some(frame) = encoder.frame.take() else {
            return ResultCode::NO_CONTENT;
        };

        let img = Img::new(&frame.pixels[..], frame.width as usize, frame.height as usize);
        let result = Encoder::new()
            .with_speed(encoder.speed)
            .with_num_threads(Some(encoder.threads))
            .encode_rgba(img);

        match result {
            Ok(encoded) => {
                debug!(
                    "ravif encoded {}x{}: {} colour + {} alpha bytes",
                    frame.width, frame.height, encoded.color_byte_size, encoded.alpha_byte_size
                );
                *output = encoded.avif_file;
                ResultCode::OK
            }
            Err(e) => {
                warn!("ravif encode failed: {}", e);
                ResultCode::ENCODE_COLOR_FAILED
            }
        }
    }

    fn output_bytes<'o>(&self, output: &'o Vec<u8>) -> &'o [u8] {
        output
    }

    fn free_output(&self, output: Vec<u8>) {
        drop(output);
    }

    fn result_to_string(&self, _code: ResultCode) -> Option<String> {
        None
    }
}
