//! Common utilities module
//!
//! This module contains the error type and stage timing shared across the pipeline.

pub mod error;
pub mod timing;

pub use error::{PipelineError, Result};
pub use timing::{CycleTimings, StageTiming, Timer};
