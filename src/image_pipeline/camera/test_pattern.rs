//! Deterministic synthetic sensor.
//!
//! Produces a diagonal gradient that shifts by one pixel per frame, in either
//! grayscale or packed RGB565. Used by the demo binary, tests and benches.

use tracing::trace;

use crate::image_pipeline::buffer::types::SensorFormat;
use crate::image_pipeline::camera::source::CameraSource;
use crate::image_pipeline::common::error::{PipelineError, Result};

pub struct TestPatternCamera {
    width: usize,
    height: usize,
    format: SensorFormat,
    frame: usize,
}

impl TestPatternCamera {
    pub fn new(width: usize, height: usize, format: SensorFormat) -> Self {
        Self {
            width,
            height,
            format,
            frame: 0,
        }
    }

    /// Number of frames read so far.
    pub fn frames_read(&self) -> usize {
        self.frame
    }
}

/// Packs 5/6/5-bit channels into the sensor's big-endian RGB565 layout.
fn pack_rgb565(r5: u8, g6: u8, b5: u8) -> [u8; 2] {
    let value = ((r5 as u16 & 0x1F) << 11) | ((g6 as u16 & 0x3F) << 5) | (b5 as u16 & 0x1F);
    value.to_be_bytes()
}

impl CameraSource for TestPatternCamera {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn sensor_format(&self) -> SensorFormat {
        self.format
    }

    fn read_frame(&mut self, buffer: &mut [u8]) -> Result<()> {
        let expected = self.width * self.height * self.bytes_per_pixel();
        if buffer.len() != expected {
            return Err(PipelineError::CaptureError(format!(
                "frame buffer is {} bytes, sensor delivers {}",
                buffer.len(),
                expected
            )));
        }

        let shift = self.frame;
        match self.format {
            SensorFormat::Grayscale => {
                for (i, px) in buffer.iter_mut().enumerate() {
                    let (x, y) = (i % self.width, i / self.width);
                    *px = ((x + y + shift) % 256) as u8;
                }
            }
            SensorFormat::Rgb565 => {
                for (i, px) in buffer.chunks_exact_mut(2).enumerate() {
                    let (x, y) = (i % self.width, i / self.width);
                    let packed = pack_rgb565(
                        ((x + shift) % 32) as u8,
                        (y % 64) as u8,
                        ((x + y) % 32) as u8,
                    );
                    px.copy_from_slice(&packed);
                }
            }
        }

        self.frame += 1;
        trace!("Test pattern frame {} ({}x{})", self.frame, self.width, self.height);
        Ok(())
    }
}
