//! Camera-to-serial image streaming for memory-constrained devices.
//!
//! Frames are captured from a camera, resampled, center-cropped and converted
//! to a canonical pixel format, then handed to an on-device classifier through
//! a pull-based signal and streamed to a host as base64 EIML frames.

pub mod image_pipeline;
pub mod logger;

pub use image_pipeline::{
    Classification, Classifier, FrameFormat, FrameHeader, FrameReceiver, PipelineConfig,
    PipelineError, PixelBuffer, ReceivedMessage, Result, SensorFormat, Signal, StreamPipeline,
};
