//! Capture cycle orchestration
//!
//! Drives one camera frame through scale, crop and color conversion, then
//! hands the result to the classifier and the serial transport.

mod stream_pipeline;


pub use stream_pipeline::{CycleReport, RunSummary, StreamPipeline};
