//! Result translation
//!
//! Maps native result codes onto [`AvifError`] and assembles the
//! [`EncodeOutcome`] returned to callers.

use lamco_codec::{ClientOptions, EncodeOutcome, PixelFormat};
use tracing::warn;

use crate::backend::{AvifBackend, ResultCode};
use crate::error::{AvifError, Result, Stage};

/// libavif `avifResult` names, indexed by code
const RESULT_NAMES: &[&str] = &[
    "AVIF_RESULT_OK",
    "AVIF_RESULT_UNKNOWN_ERROR",
    "AVIF_RESULT_INVALID_FTYP",
    "AVIF_RESULT_NO_CONTENT",
    "AVIF_RESULT_NO_YUV_FORMAT_SELECTED",
    "AVIF_RESULT_REFORMAT_FAILED",
    "AVIF_RESULT_UNSUPPORTED_DEPTH",
    "AVIF_RESULT_ENCODE_COLOR_FAILED",
    "AVIF_RESULT_ENCODE_ALPHA_FAILED",
    "AVIF_RESULT_BMFF_PARSE_FAILED",
    "AVIF_RESULT_MISSING_IMAGE_ITEM",
    "AVIF_RESULT_DECODE_COLOR_FAILED",
    "AVIF_RESULT_DECODE_ALPHA_FAILED",
    "AVIF_RESULT_COLOR_ALPHA_SIZE_MISMATCH",
    "AVIF_RESULT_ISPE_SIZE_MISMATCH",
    "AVIF_RESULT_NO_CODEC_AVAILABLE",
    "AVIF_RESULT_NO_IMAGES_REMAINING",
    "AVIF_RESULT_INVALID_EXIF_PAYLOAD",
    "AVIF_RESULT_INVALID_IMAGE_GRID",
    "AVIF_RESULT_INVALID_CODEC_SPECIFIC_OPTION",
    "AVIF_RESULT_TRUNCATED_DATA",
    "AVIF_RESULT_IO_NOT_SET",
    "AVIF_RESULT_IO_ERROR",
    "AVIF_RESULT_WAITING_ON_IO",
    "AVIF_RESULT_INVALID_ARGUMENT",
    "AVIF_RESULT_NOT_IMPLEMENTED",
    "AVIF_RESULT_OUT_OF_MEMORY",
    "AVIF_RESULT_CANNOT_CHANGE_SETTING",
    "AVIF_RESULT_INCOMPATIBLE_IMAGE",
];

/// Local name of a result code
pub fn result_name(code: ResultCode) -> Option<&'static str> {
    usize::try_from(code.raw())
        .ok()
        .and_then(|index| RESULT_NAMES.get(index))
        .copied()
}

/// Human readable message for a result code
///
/// Prefers the backend's own description, then the local name table, then
/// the bare number.
pub fn resolve_message<B: AvifBackend + ?Sized>(backend: &B, code: ResultCode) -> String {
    backend
        .result_to_string(code)
        .filter(|message| !message.is_empty())
        .or_else(|| result_name(code).map(str::to_string))
        .unwrap_or_else(|| format!("unknown result code {code}"))
}

/// Turn a stage's status into `Ok(())` or the stage's error
pub fn check<B: AvifBackend + ?Sized>(backend: &B, stage: Stage, code: ResultCode) -> Result<()> {
    if code.is_ok() {
        return Ok(());
    }

    let message = resolve_message(backend, code);
    warn!("AVIF {} failed: {} (code {})", stage, message, code);
    Err(AvifError::from_status(stage, code, message))
}

/// Wrap an encoded payload in the envelope returned to callers
pub fn build_outcome(
    codec: &'static str,
    pixel_format: PixelFormat,
    width: u32,
    height: u32,
    payload: Vec<u8>,
) -> EncodeOutcome {
    EncodeOutcome {
        codec,
        payload,
        client_options: ClientOptions {
            alpha: pixel_format.has_alpha(),
        },
        width,
        height,
        extra: 0,
        bits_per_pixel: pixel_format.bits_per_pixel(),
    }
}
