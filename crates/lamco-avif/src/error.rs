//! Error types for AVIF encoding
//!
//! Every failure of the encode pipeline maps to exactly one [`AvifError`]
//! variant. Variants raised by a native call that reports a status carry the
//! raw result code and a resolved message (see [`crate::translate`]).

use std::fmt;

use thiserror::Error;

use crate::backend::ResultCode;

/// Pipeline stage that raised an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Viewing the caller's pixel buffer
    Acquire,
    /// Allocating the native image object
    ImageAllocation,
    /// RGB to YUV conversion
    Conversion,
    /// Allocating the native encoder object
    EncoderAllocation,
    /// Submitting the image to the encoder
    AddImage,
    /// Finalizing the bitstream
    Finish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Acquire => "acquire",
            Self::ImageAllocation => "image allocation",
            Self::Conversion => "conversion",
            Self::EncoderAllocation => "encoder allocation",
            Self::AddImage => "add image",
            Self::Finish => "finish",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while encoding an image
///
/// No variant is ever accompanied by a partial result, and all native
/// resources have been released by the time the caller sees it.
///
/// # Examples
///
/// ```
/// use lamco_avif::{AvifError, Stage};
///
/// let err = AvifError::ConversionError {
///     code: 5,
///     message: "Reformat failed".into(),
/// };
/// assert_eq!(err.stage(), Stage::Conversion);
/// assert_eq!(err.native_code(), Some(5));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvifError {
    /// The pixel buffer could not be viewed
    ///
    /// Raised when the source has no accessible memory, or its length or
    /// stride do not match its geometry.
    #[error("Cannot access pixel buffer: {0}")]
    AcquisitionFailure(String),

    /// The native image object could not be created
    #[error("Failed to allocate {width}x{height} codec image")]
    AllocationError { width: u32, height: u32 },

    /// RGB to YUV conversion was rejected by the codec
    #[error("RGB to YUV conversion failed: {message} (code {code})")]
    ConversionError { code: i32, message: String },

    /// The native encoder object could not be created
    #[error("Failed to allocate encoder")]
    EncoderAllocationError,

    /// The encoder rejected the image
    #[error("Failed to add image to encoder: {message} (code {code})")]
    EncodeError { code: i32, message: String },

    /// The bitstream could not be finalized
    #[error("Failed to finish encoding: {message} (code {code})")]
    FinishError { code: i32, message: String },

    /// A stage failed with a status that has no dedicated variant
    ///
    /// Raised when an [`EncodeSession`](crate::EncodeSession) stage is called
    /// out of order, or an allocation stage reports a status code.
    #[error("AVIF {stage} failed: {message} (code {code})")]
    StageFailed {
        stage: Stage,
        code: i32,
        message: String,
    },
}

/// Result type for AVIF operations
pub type Result<T> = std::result::Result<T, AvifError>;

impl AvifError {
    /// Stage of the pipeline that failed
    pub fn stage(&self) -> Stage {
        match self {
            Self::AcquisitionFailure(_) => Stage::Acquire,
            Self::AllocationError { .. } => Stage::ImageAllocation,
            Self::ConversionError { .. } => Stage::Conversion,
            Self::EncoderAllocationError => Stage::EncoderAllocation,
            Self::EncodeError { .. } => Stage::AddImage,
            Self::FinishError { .. } => Stage::Finish,
            Self::StageFailed { stage, .. } => *stage,
        }
    }

    /// Native result code, for errors raised by a status-returning call
    pub fn native_code(&self) -> Option<i32> {
        match self {
            Self::ConversionError { code, .. }
            | Self::EncodeError { code, .. }
            | Self::FinishError { code, .. }
            | Self::StageFailed { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Create an acquisition error
    pub(crate) fn acquisition(msg: impl Into<String>) -> Self {
        Self::AcquisitionFailure(msg.into())
    }

    /// Build the error for a failed status-returning stage
    ///
    /// Stages without a status-carrying variant of their own get
    /// [`AvifError::StageFailed`].
    pub(crate) fn from_status(stage: Stage, code: ResultCode, message: String) -> Self {
        let code = code.raw();
        match stage {
            Stage::Conversion => Self::ConversionError { code, message },
            Stage::AddImage => Self::EncodeError { code, message },
            Stage::Finish => Self::FinishError { code, message },
            Stage::Acquire | Stage::ImageAllocation | Stage::EncoderAllocation => {
                Self::StageFailed {
                    stage,
                    code,
                    message,
                }
            }
        }
    }

    /// Error for a session stage called from the wrong state
    pub(crate) fn out_of_order(stage: Stage, message: String) -> Self {
        Self::StageFailed {
            stage,
            code: ResultCode::INVALID_ARGUMENT.raw(),
            message,
        }
    }
}

impl From<AvifError> for lamco_codec::CodecError {
    fn from(err: AvifError) -> Self {
        lamco_codec::CodecError::encoder(crate::CODEC_NAME, err)
    }
}
