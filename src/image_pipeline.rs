//! Image streaming pipeline module
//!
//! This module provides the per-frame path from camera sensor to classifier and
//! serial link, with separate modules for buffers, transforms, framing, the
//! classifier signal, and cycle orchestration.

pub mod buffer;
pub mod camera;
pub mod common;
pub mod config;
pub mod framing;
pub mod signal;
pub mod streaming;
pub mod transform;

pub use common::{
    PipelineError,
    Result,
};

pub use buffer::{
    FrameFormat,
    PixelBuffer,
    PixelEncoding,
    SensorFormat,
};

pub use camera::{
    CameraSource,
    TestPatternCamera,
};

pub use config::{
    PipelineConfig,
    PipelineConfigBuilder,
};

pub use framing::{
    Base64FrameEncoder,
    DecodedFrame,
    FrameEncoder,
    FrameHeader,
    FrameReceiver,
    ReceivedMessage,
};

pub use signal::{
    Classification,
    Classifier,
    PixelSignal,
    Signal,
    SignalSource,
};

pub use streaming::{
    CycleReport,
    RunSummary,
    StreamPipeline,
};
