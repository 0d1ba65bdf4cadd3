//! libavif backend
//!
//! Thin wrapper over the libavif C API via `libavif-sys`. Every object handed
//! out is a non-null pointer owned by the encode session, which passes it
//! back to the matching destroy call exactly once.

use std::ffi::CStr;
use std::mem;
use std::ptr::NonNull;
use std::slice;

use lamco_codec::Version;
use libavif_sys as sys;
use tracing::warn;

use super::{AddImageFlags, AvifBackend, EncoderSettings, ImageParams, ResultCode, YuvFormat};
use crate::negotiate::{ChromaUpsampling, RgbLayout, RgbView};

/// Owned `avifImage`
#[derive(Debug)]
pub struct NativeImage(NonNull<sys::avifImage>);

/// Owned `avifEncoder`
#[derive(Debug)]
pub struct NativeEncoder(NonNull<sys::avifEncoder>);

/// Owned `avifRWData`
pub struct NativeOutput(sys::avifRWData);

/// [`AvifBackend`] over libavif
#[derive(Debug, Clone, Copy, Default)]
pub struct LibavifBackend;

impl LibavifBackend {
    pub fn new() -> Self {
        Self
    }
}

fn pixel_format(format: YuvFormat) -> sys::avifPixelFormat {
    match format {
        YuvFormat::Yuv444 => sys::AVIF_PIXEL_FORMAT_YUV444 as _,
        YuvFormat::Yuv422 => sys::AVIF_PIXEL_FORMAT_YUV422 as _,
        YuvFormat::Yuv420 => sys::AVIF_PIXEL_FORMAT_YUV420 as _,
        YuvFormat::Yuv400 => sys::AVIF_PIXEL_FORMAT_YUV400 as _,
    }
}

fn rgb_format(layout: RgbLayout) -> sys::avifRGBFormat {
    match layout {
        RgbLayout::Rgba => sys::AVIF_RGB_FORMAT_RGBA as _,
        RgbLayout::Bgra => sys::AVIF_RGB_FORMAT_BGRA as _,
    }
}

fn chroma_upsampling(mode: ChromaUpsampling) -> sys::avifChromaUpsampling {
    match mode {
        ChromaUpsampling::Automatic => sys::AVIF_CHROMA_UPSAMPLING_AUTOMATIC as _,
        ChromaUpsampling::Fastest => sys::AVIF_CHROMA_UPSAMPLING_FASTEST as _,
        ChromaUpsampling::BestQuality => sys::AVIF_CHROMA_UPSAMPLING_BEST_QUALITY as _,
        ChromaUpsampling::Nearest => sys::AVIF_CHROMA_UPSAMPLING_NEAREST as _,
        ChromaUpsampling::Bilinear => sys::AVIF_CHROMA_UPSAMPLING_BILINEAR as _,
    }
}

impl AvifBackend for LibavifBackend {
    type Image = NativeImage;
    type Encoder = NativeEncoder;
    type Output = NativeOutput;

    fn name(&self) -> &'static str {
        "libavif"
    }

    fn version(&self) -> Version {
        // SAFETY: avifVersion returns a pointer to a static NUL-terminated string.
        let raw = unsafe { CStr::from_ptr(sys::avifVersion()) };
        raw.to_str()
            .ok()
            .and_then(Version::parse)
            .unwrap_or_default()
    }

    fn create_image(&self, params: &ImageParams) -> Option<NativeImage> {
        // SAFETY: plain value arguments; a null return is handled by NonNull::new.
        let ptr = unsafe {
            sys::avifImageCreate(
                params.width as _,
                params.height as _,
                params.depth as _,
                pixel_format(params.yuv_format),
            )
        };
        NonNull::new(ptr).map(NativeImage)
    }

    fn destroy_image(&self, image: NativeImage) {
        // SAFETY: the pointer came from avifImageCreate and is released only here.
        unsafe { sys::avifImageDestroy(image.0.as_ptr()) }
    }

    fn rgb_to_yuv(&self, image: &mut NativeImage, rgb: &RgbView<'_>) -> ResultCode {
        let descriptor = rgb.descriptor;
        let needed = (descriptor.row_bytes as usize).checked_mul(rgb.height as usize);
        if !matches!(needed, Some(n) if rgb.pixels.len() >= n) {
            return ResultCode::INVALID_ARGUMENT;
        }

        // SAFETY: avifRGBImage is a plain C struct; all-zero is a valid value
        // that avifRGBImageSetDefaults overwrites.
        let mut rgb_image: sys::avifRGBImage = unsafe { mem::zeroed() };
        // SAFETY: both pointers are valid for the duration of the call.
        unsafe { sys::avifRGBImageSetDefaults(&mut rgb_image, image.0.as_ptr()) };

        rgb_image.format = rgb_format(descriptor.layout);
        rgb_image.depth = descriptor.depth as _;
        rgb_image.chromaUpsampling = chroma_upsampling(descriptor.chroma_upsampling);
        rgb_image.ignoreAlpha = descriptor.ignore_alpha as _;
        rgb_image.alphaPremultiplied = descriptor.alpha_premultiplied as _;
        rgb_image.rowBytes = descriptor.row_bytes as _;
        // libavif only reads from the buffer during RGB to YUV conversion
        rgb_image.pixels = rgb.pixels.as_ptr().cast_mut();

        // SAFETY: the pixel buffer holds at least row_bytes * height bytes
        // (checked above) and outlives this call.
        let code = unsafe { sys::avifImageRGBToYUV(image.0.as_ptr(), &rgb_image) };
        ResultCode(code as i32)
    }

    fn create_encoder(&self) -> Option<NativeEncoder> {
        // SAFETY: no arguments; a null return is handled by NonNull::new.
        let ptr = unsafe { sys::avifEncoderCreate() };
        NonNull::new(ptr).map(NativeEncoder)
    }

    fn configure_encoder(&self, encoder: &mut NativeEncoder, settings: &EncoderSettings) {
        let enc = encoder.0.as_ptr();
        // SAFETY: enc is a live encoder owned by the caller; no other
        // reference to it exists during this call.
        unsafe {
            (*enc).speed = settings.speed as _;
            (*enc).maxThreads = settings.max_threads as _;
        }
    }

    fn destroy_encoder(&self, encoder: NativeEncoder) {
        // SAFETY: the pointer came from avifEncoderCreate and is released only here.
        unsafe { sys::avifEncoderDestroy(encoder.0.as_ptr()) }
    }

    fn add_image(
        &self,
        encoder: &mut NativeEncoder,
        image: &NativeImage,
        duration: u64,
        flags: AddImageFlags,
    ) -> ResultCode {
        // SAFETY: both objects are live and owned by the calling session.
        let code = unsafe {
            sys::avifEncoderAddImage(
                encoder.0.as_ptr(),
                image.0.as_ptr(),
                duration as _,
                flags.bits() as _,
            )
        };
        ResultCode(code as i32)
    }

    fn create_output(&self) -> NativeOutput {
        // SAFETY: all-zero avifRWData is AVIF_DATA_EMPTY (null data, zero size).
        NativeOutput(unsafe { mem::zeroed() })
    }

    fn finish(&self, encoder: &mut NativeEncoder, output: &mut NativeOutput) -> ResultCode {
        // SAFETY: the encoder is live; output is a valid avifRWData that
        // libavif may reallocate.
        let code = unsafe { sys::avifEncoderFinish(encoder.0.as_ptr(), &mut output.0) };
        ResultCode(code as i32)
    }

    fn output_bytes<'o>(&self, output: &'o NativeOutput) -> &'o [u8] {
        let data = output.0.data;
        let size = output.0.size as usize;
        if data.is_null() || size == 0 {
            return &[];
        }
        // SAFETY: libavif guarantees `data` points at `size` initialized bytes
        // until avifRWDataFree; the borrow is tied to `output`.
        unsafe { slice::from_raw_parts(data.cast_const(), size) }
    }

    fn free_output(&self, mut output: NativeOutput) {
        // SAFETY: data is either null or owned by libavif; freed only here.
        unsafe { sys::avifRWDataFree(&mut output.0) }
    }

    fn result_to_string(&self, code: ResultCode) -> Option<String> {
        // SAFETY: avifResultToString accepts any value and returns a static string.
        let ptr = unsafe { sys::avifResultToString(code.raw() as _) };
        if ptr.is_null() {
            warn!("libavif returned no description for result {}", code);
            return None;
        }
        // SAFETY: non-null pointers from avifResultToString are static C strings.
        let message = unsafe { CStr::from_ptr(ptr) };
        message.to_str().ok().map(str::to_string)
    }
}
