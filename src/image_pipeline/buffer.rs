//! Pixel buffer module
//!
//! Owned pixel storage and the sensor-native and canonical format tags.

mod pixel_buffer;
pub mod types;

pub use pixel_buffer::PixelBuffer;
pub use types::{FrameFormat, PixelEncoding, SensorFormat};
