//! Encode session
//!
//! An [`EncodeSession`] owns the native image, encoder and output buffer for
//! a single encode call and walks them through the pipeline:
//!
//! ```text
//! Created -> ImageAllocated -> Converted -> EncoderReady -> ImageAdded -> Finished
//!     \____________\______________\____________\______________\-> Failed
//! Finished | Failed -> Released
//! ```
//!
//! Whatever state the session ends in, dropping it releases every object that
//! was actually allocated, exactly once, in the order image, encoder, output.

use tracing::debug;

use crate::backend::{
    AddImageFlags, AvifBackend, EncoderSettings, ImageParams, ResultCode, YuvFormat,
};
use crate::error::{AvifError, Result, Stage};
use crate::negotiate::RgbView;
use crate::translate;

/// Encoder speed, 0 (slowest) to 10 (fastest)
///
/// Remote display favours latency over compression.
pub const ENCODER_SPEED: i32 = 10;

/// Bits per sample of the native image
pub const IMAGE_DEPTH: u32 = 8;

/// Frame duration passed with the single frame, in timescale units
const FRAME_DURATION: u64 = 1;

/// Pipeline position of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    ImageAllocated,
    Converted,
    EncoderReady,
    ImageAdded,
    Finished,
    Failed,
    Released,
}

impl SessionState {
    /// Finished or failed; no further stage may run
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::Released)
    }
}

/// Native objects of one encode call
pub struct EncodeSession<'b, B: AvifBackend> {
    backend: &'b B,
    state: SessionState,
    image: Option<B::Image>,
    encoder: Option<B::Encoder>,
    output: Option<B::Output>,
}

impl<'b, B: AvifBackend> EncodeSession<'b, B> {
    pub fn new(backend: &'b B) -> Self {
        Self {
            backend,
            state: SessionState::Created,
            image: None,
            encoder: None,
            output: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Allocate the 8-bit 4:4:4 image object
    pub fn allocate_image(&mut self, width: u32, height: u32) -> Result<()> {
        self.expect_state(SessionState::Created, Stage::ImageAllocation)?;

        let params = ImageParams {
            width,
            height,
            depth: IMAGE_DEPTH,
            yuv_format: YuvFormat::Yuv444,
        };
        match self.backend.create_image(&params) {
            Some(image) => {
                self.image = Some(image);
                self.advance(SessionState::ImageAllocated);
                Ok(())
            }
            None => Err(self.fail(AvifError::AllocationError { width, height })),
        }
    }

    /// Convert the RGB view into the image's YUV and alpha planes
    pub fn convert(&mut self, rgb: &RgbView<'_>) -> Result<()> {
        self.expect_state(SessionState::ImageAllocated, Stage::Conversion)?;

        let code = match self.image.as_mut() {
            Some(image) => self.backend.rgb_to_yuv(image, rgb),
            None => ResultCode::INVALID_ARGUMENT,
        };
        self.settle(Stage::Conversion, code, SessionState::Converted)
    }

    /// Allocate and configure the encoder
    pub fn create_encoder(&mut self, max_threads: usize) -> Result<()> {
        self.expect_state(SessionState::Converted, Stage::EncoderAllocation)?;

        let Some(mut encoder) = self.backend.create_encoder() else {
            return Err(self.fail(AvifError::EncoderAllocationError));
        };
        let settings = EncoderSettings {
            speed: ENCODER_SPEED,
            max_threads: max_threads.max(1),
        };
        self.backend.configure_encoder(&mut encoder, &settings);
        self.encoder = Some(encoder);
        self.advance(SessionState::EncoderReady);
        Ok(())
    }

    /// Submit the image as the single, final frame
    pub fn add_image(&mut self) -> Result<()> {
        self.expect_state(SessionState::EncoderReady, Stage::AddImage)?;

        let code = match (self.encoder.as_mut(), self.image.as_ref()) {
            (Some(encoder), Some(image)) => {
                self.backend
                    .add_image(encoder, image, FRAME_DURATION, AddImageFlags::SINGLE)
            }
            _ => ResultCode::INVALID_ARGUMENT,
        };
        self.settle(Stage::AddImage, code, SessionState::ImageAdded)
    }

    /// Finalize the bitstream and copy it out
    ///
    /// An empty bitstream reported as success is treated as a finish failure.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        self.expect_state(SessionState::ImageAdded, Stage::Finish)?;

        let mut output = self.backend.create_output();
        let code = match self.encoder.as_mut() {
            Some(encoder) => self.backend.finish(encoder, &mut output),
            None => ResultCode::INVALID_ARGUMENT,
        };
        self.output = Some(output);
        if let Err(err) = translate::check(self.backend, Stage::Finish, code) {
            return Err(self.fail(err));
        }

        let backend = self.backend;
        let payload = self
            .output
            .as_ref()
            .map(|output| backend.output_bytes(output).to_vec())
            .unwrap_or_default();
        if payload.is_empty() {
            let code = ResultCode::NO_CONTENT;
            let message = translate::resolve_message(self.backend, code);
            return Err(self.fail(AvifError::from_status(Stage::Finish, code, message)));
        }

        self.advance(SessionState::Finished);
        Ok(payload)
    }

    fn expect_state(&mut self, expected: SessionState, stage: Stage) -> Result<()> {
        if self.state == expected {
            return Ok(());
        }
        let message = format!("{stage} attempted in state {:?}", self.state);
        Err(self.fail(AvifError::out_of_order(stage, message)))
    }

    fn settle(&mut self, stage: Stage, code: ResultCode, next: SessionState) -> Result<()> {
        match translate::check(self.backend, stage, code) {
            Ok(()) => {
                self.advance(next);
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn advance(&mut self, next: SessionState) {
        debug!("AVIF session ({}): {:?} -> {:?}", self.backend.name(), self.state, next);
        self.state = next;
    }

    fn fail(&mut self, err: AvifError) -> AvifError {
        if self.state != SessionState::Failed {
            debug!(
                "AVIF session ({}): {:?} -> Failed at {}",
                self.backend.name(),
                self.state,
                err.stage()
            );
            self.state = SessionState::Failed;
        }
        err
    }
}

impl<B: AvifBackend> Drop for EncodeSession<'_, B> {
    fn drop(&mut self) {
        if let Some(image) = self.image.take() {
            self.backend.destroy_image(image);
        }
        if let Some(encoder) = self.encoder.take() {
            self.backend.destroy_encoder(encoder);
        }
        if let Some(output) = self.output.take() {
            self.backend.free_output(output);
        }
        debug!("AVIF session ({}): {:?} -> Released", self.backend.name(), self.state);
        self.state = SessionState::Released;
    }
}

/// Run the whole pipeline for one RGB view and return the bitstream
pub fn run<B: AvifBackend>(backend: &B, rgb: &RgbView<'_>, max_threads: usize) -> Result<Vec<u8>> {
    let mut session = EncodeSession::new(backend);
    session.allocate_image(rgb.width, rgb.height)?;
    session.convert(rgb)?;
    session.create_encoder(max_threads)?;
    session.add_image()?;
    session.finish()
}

#[cfg(test)]
mod tests {
    use lamco_codec::{PixelFormat, PixelImage, PixelSource};

    use super::*;
    use crate::backend::recording::{Event, FailPoint, RecordingBackend};
    use crate::{guard, negotiate};

    fn encode_with(backend: &RecordingBackend, format: PixelFormat) -> Result<Vec<u8>> {
        let image = PixelImage::filled(24, 16, format, 0x40).unwrap();
        guard::with_pinned(&image, |pinned| {
            let rgb = negotiate::negotiate(format, image.row_stride(), pinned);
            run(backend, &rgb, 2)
        })
    }

    #[test]
    fn test_success_releases_everything_in_order() {
        let backend = RecordingBackend::new();
        let payload = encode_with(&backend, PixelFormat::BGRA).unwrap();

        assert_eq!(&payload[4..8], b"ftyp");
        assert_eq!(backend.images_created(), 1);
        assert_eq!(backend.encoders_created(), 1);
        assert_eq!(backend.outputs_created(), 1);
        assert_eq!(backend.live_objects(), 0);
        assert_eq!(backend.release_order(), vec!["image", "encoder", "output"]);
    }

    #[test]
    fn test_encoder_settings_and_flags() {
        let backend = RecordingBackend::new();
        encode_with(&backend, PixelFormat::BGRX).unwrap();

        let events = backend.events();
        assert!(events.contains(&Event::ConfigureEncoder(EncoderSettings {
            speed: 10,
            max_threads: 2,
        })));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::AddImage { duration: 1, flags, .. } if *flags == AddImageFlags::SINGLE
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::CreateImage { params, .. }
                if params.depth == 8 && params.yuv_format == YuvFormat::Yuv444
        )));
        assert!(events.contains(&Event::RgbToYuv {
            image: 1,
            ignore_alpha: true
        }));
    }

    #[test]
    fn test_image_allocation_failure() {
        let backend = RecordingBackend::failing_at(FailPoint::ImageAllocation, ResultCode::OK);
        let err = encode_with(&backend, PixelFormat::BGRA).unwrap_err();

        assert_eq!(
            err,
            AvifError::AllocationError {
                width: 24,
                height: 16
            }
        );
        assert!(backend.events().is_empty());
    }

    #[test]
    fn test_conversion_failure_destroys_image_once() {
        let backend = RecordingBackend::failing_at(FailPoint::Conversion, ResultCode::REFORMAT_FAILED)
            .with_message(ResultCode::REFORMAT_FAILED, "Reformat failed");
        let err = encode_with(&backend, PixelFormat::BGRA).unwrap_err();

        assert_eq!(
            err,
            AvifError::ConversionError {
                code: 5,
                message: "Reformat failed".into()
            }
        );
        assert_eq!(backend.images_destroyed(), 1);
        assert_eq!(backend.encoders_created(), 0);
        assert_eq!(backend.outputs_created(), 0);
        assert_eq!(backend.live_objects(), 0);
    }

    #[test]
    fn test_encoder_allocation_failure() {
        let backend = RecordingBackend::failing_at(FailPoint::EncoderAllocation, ResultCode::OK);
        let err = encode_with(&backend, PixelFormat::RGBA).unwrap_err();

        assert_eq!(err, AvifError::EncoderAllocationError);
        assert_eq!(backend.release_order(), vec!["image"]);
        assert_eq!(backend.outputs_created(), 0);
    }

    #[test]
    fn test_add_image_failure() {
        let backend = RecordingBackend::failing_at(FailPoint::AddImage, ResultCode::OUT_OF_MEMORY);
        let err = encode_with(&backend, PixelFormat::RGBX).unwrap_err();

        assert!(matches!(err, AvifError::EncodeError { code: 26, .. }));
        assert_eq!(backend.release_order(), vec!["image", "encoder"]);
        assert_eq!(backend.outputs_created(), 0);
        assert_eq!(backend.live_objects(), 0);
    }

    #[test]
    fn test_finish_failure_frees_partial_output() {
        let backend =
            RecordingBackend::failing_at(FailPoint::Finish, ResultCode::ENCODE_COLOR_FAILED);
        let err = encode_with(&backend, PixelFormat::BGRA).unwrap_err();

        assert_eq!(
            err,
            AvifError::FinishError {
                code: 7,
                message: "AVIF_RESULT_ENCODE_COLOR_FAILED".into()
            }
        );
        assert_eq!(backend.release_order(), vec!["image", "encoder", "output"]);
        assert_eq!(backend.live_objects(), 0);
    }

    #[test]
    fn test_empty_output_is_a_finish_error() {
        let backend = RecordingBackend::new().with_empty_output();
        let err = encode_with(&backend, PixelFormat::BGRA).unwrap_err();

        assert!(matches!(err, AvifError::FinishError { code: 3, .. }));
        assert_eq!(backend.live_objects(), 0);
    }

    #[test]
    fn test_state_transitions() {
        let backend = RecordingBackend::new();
        let image = PixelImage::filled(4, 4, PixelFormat::BGRA, 1).unwrap();
        let pinned = guard::acquire(&image).unwrap();
        let rgb = negotiate::negotiate(PixelFormat::BGRA, 16, &pinned);

        let mut session = EncodeSession::new(&backend);
        assert_eq!(session.state(), SessionState::Created);
        session.allocate_image(4, 4).unwrap();
        assert_eq!(session.state(), SessionState::ImageAllocated);
        session.convert(&rgb).unwrap();
        assert_eq!(session.state(), SessionState::Converted);
        session.create_encoder(1).unwrap();
        assert_eq!(session.state(), SessionState::EncoderReady);
        session.add_image().unwrap();
        assert_eq!(session.state(), SessionState::ImageAdded);
        session.finish().unwrap();
        assert_eq!(session.state(), SessionState::Finished);
        assert!(session.state().is_terminal());

        drop(session);
        assert_eq!(backend.live_objects(), 0);
    }

    #[test]
    fn test_out_of_order_stage_fails() {
        let backend = RecordingBackend::new();
        let mut session = EncodeSession::new(&backend);

        let err = session.add_image().unwrap_err();
        assert!(matches!(
            err,
            AvifError::StageFailed {
                stage: Stage::AddImage,
                code: 24,
                ..
            }
        ));
        assert_eq!(session.state(), SessionState::Failed);

        // Nothing further may run once failed
        let err = session.allocate_image(4, 4).unwrap_err();
        assert!(matches!(
            err,
            AvifError::StageFailed {
                stage: Stage::ImageAllocation,
                ..
            }
        ));
        drop(session);
        assert!(backend.events().is_empty());
    }

    #[test]
    fn test_encoder_before_conversion_is_ordering_error() {
        let backend = RecordingBackend::new();
        let mut session = EncodeSession::new(&backend);

        let err = session.create_encoder(1).unwrap_err();
        assert!(!matches!(err, AvifError::AcquisitionFailure(_)));
        assert_eq!(err.stage(), Stage::EncoderAllocation);
        assert_eq!(err.native_code(), Some(24));
        drop(session);
        assert_eq!(backend.encoders_created(), 0);
    }

    #[test]
    fn test_second_image_allocation_is_ordering_error() {
        let backend = RecordingBackend::new();
        let mut session = EncodeSession::new(&backend);

        session.allocate_image(4, 4).unwrap();
        let err = session.allocate_image(4, 4).unwrap_err();
        assert!(matches!(
            err,
            AvifError::StageFailed {
                stage: Stage::ImageAllocation,
                code: 24,
                ..
            }
        ));
        drop(session);
        assert_eq!(backend.images_created(), 1);
        assert_eq!(backend.images_destroyed(), 1);
    }

    #[test]
    fn test_zero_threads_clamped() {
        let backend = RecordingBackend::new();
        let image = PixelImage::filled(2, 2, PixelFormat::BGRX, 0).unwrap();
        guard::with_pinned(&image, |pinned| {
            let rgb = negotiate::negotiate(PixelFormat::BGRX, 8, pinned);
            run(&backend, &rgb, 0)
        })
        .unwrap();

        assert!(backend.events().contains(&Event::ConfigureEncoder(EncoderSettings {
            speed: ENCODER_SPEED,
            max_threads: 1,
        })));
    }
}
