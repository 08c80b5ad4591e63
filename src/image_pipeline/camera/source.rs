use crate::image_pipeline::buffer::types::SensorFormat;
use crate::image_pipeline::common::error::Result;

/// A camera sensor driver.
///
/// Geometry and format are queried before every capture since a driver may be
/// reconfigured between frames.
pub trait CameraSource {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn sensor_format(&self) -> SensorFormat;

    fn bytes_per_pixel(&self) -> usize {
        self.sensor_format().bytes_per_pixel()
    }

    /// Fills `buffer` (exactly `width * height * bytes_per_pixel` bytes) with one frame.
    fn read_frame(&mut self, buffer: &mut [u8]) -> Result<()>;
}
