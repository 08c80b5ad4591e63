//! Camera module
//!
//! The sensor collaborator interface and a synthetic sensor.

mod source;
mod test_pattern;

pub use source::CameraSource;
pub use test_pattern::TestPatternCamera;
