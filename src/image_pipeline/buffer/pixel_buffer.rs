use tracing::trace;

use crate::image_pipeline::buffer::types::PixelEncoding;
use crate::image_pipeline::common::error::{PipelineError, Result};

/// Owned, unpadded pixel storage.
///
/// Stages take a buffer by value and return a new one, so a buffer has exactly
/// one owner and is released as soon as the next stage has produced its output.
/// Deliberately not `Clone`.
#[derive(Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    encoding: PixelEncoding,
    data: Vec<u8>,
}

/// `width * height * bytes_per_pixel`, or `None` on overflow.
fn byte_len(width: usize, height: usize, encoding: PixelEncoding) -> Option<usize> {
    width
        .checked_mul(height)?
        .checked_mul(encoding.bytes_per_pixel())
}

impl PixelBuffer {
    /// Allocates a zeroed buffer.
    ///
    /// Allocation is fallible so exhaustion aborts the current cycle instead of the process.
    pub fn try_alloc(width: usize, height: usize, encoding: PixelEncoding) -> Result<Self> {
        let len = byte_len(width, height, encoding)
            .ok_or(PipelineError::InvalidDimensions(width, height))?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| PipelineError::AllocationFailed(len))?;
        data.resize(len, 0);

        trace!("Allocated {:?} buffer {}x{} ({} bytes)", encoding, width, height, len);

        Ok(Self {
            width,
            height,
            encoding,
            data,
        })
    }

    /// Wraps existing bytes, checking the length against the geometry.
    pub fn from_vec(
        width: usize,
        height: usize,
        encoding: PixelEncoding,
        data: Vec<u8>,
    ) -> Result<Self> {
        let expected = byte_len(width, height, encoding)
            .ok_or(PipelineError::InvalidDimensions(width, height))?;
        if data.len() != expected {
            return Err(PipelineError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            encoding,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn encoding(&self) -> PixelEncoding {
        self.encoding
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.encoding.bytes_per_pixel()
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}
