use thiserror::Error;

use crate::image_pipeline::buffer::types::{FrameFormat, PixelEncoding};
use crate::image_pipeline::framing::FrameHeader;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Crop {crop_width}x{crop_height} exceeds source {width}x{height}")]
    CropOutOfBounds {
        crop_width: usize,
        crop_height: usize,
        width: usize,
        height: usize,
    },

    #[error("Unsupported color conversion: {from:?} -> {to:?}")]
    UnsupportedConversion { from: PixelEncoding, to: FrameFormat },

    #[error("Pixel encoding {0:?} is not a canonical frame format")]
    NonCanonicalFormat(PixelEncoding),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("Failed to allocate {0} bytes")]
    AllocationFailed(usize),

    #[error("Signal read out of range: offset={offset}, length={length}, total={total}")]
    SignalOutOfRange {
        offset: usize,
        length: usize,
        total: usize,
    },

    #[error("Classifier expects {expected} values, signal provides {actual}")]
    SignalLengthMismatch { expected: usize, actual: usize },

    #[error("Camera capture failed: {0}")]
    CaptureError(String),

    #[error("Classifier failed: {0}")]
    ClassifierError(String),

    #[error("Invalid frame header: {0}")]
    InvalidHeader(String),

    #[error("Base64 decode failed: {0}")]
    Base64Error(String),

    #[error("Serial line exceeds {0} bytes")]
    LineTooLong(usize),

    #[error("Frame header {0:?} was not followed by its payload")]
    MissingPayload(FrameHeader),

    #[error("Payload length mismatch: header implies {expected} bytes, got {actual}")]
    PayloadLengthMismatch { expected: usize, actual: usize },

    #[error("Failed to encode TIFF image: {0}")]
    EncodeError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
