use crate::image_pipeline::buffer::{FrameFormat, PixelBuffer};
use crate::image_pipeline::common::error::{PipelineError, Result};

/// Start-of-frame marker.
pub const SOF_MARKER: [u8; 3] = [0xFF, 0xA0, 0xFF];

/// Base64 form of [`SOF_MARKER`]; every encoded frame starts with it.
pub const SOF_BASE64: &str = "/6D/";

/// SOF + format + width + height.
pub const HEADER_SIZE: usize = 12;

/// Base64 length of a header. 12 is a multiple of 3, so never padded.
pub const HEADER_BASE64_LEN: usize = HEADER_SIZE / 3 * 4;

const FORMAT_OFFSET: usize = 3;
const WIDTH_OFFSET: usize = 4;
const HEIGHT_OFFSET: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub format: FrameFormat,
    pub width: u32,
    pub height: u32,
}

impl FrameHeader {
    pub fn new(format: FrameFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            width,
            height,
        }
    }

    /// Describes a canonical buffer. RGB565 buffers cannot be framed.
    pub fn for_buffer(buffer: &PixelBuffer) -> Result<Self> {
        let format = buffer
            .encoding()
            .frame_format()
            .ok_or(PipelineError::NonCanonicalFormat(buffer.encoding()))?;
        let invalid = || PipelineError::InvalidDimensions(buffer.width(), buffer.height());
        let width = u32::try_from(buffer.width()).map_err(|_| invalid())?;
        let height = u32::try_from(buffer.height()).map_err(|_| invalid())?;
        Ok(Self::new(format, width, height))
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[..FORMAT_OFFSET].copy_from_slice(&SOF_MARKER);
        bytes[FORMAT_OFFSET] = self.format.tag();
        bytes[WIDTH_OFFSET..HEIGHT_OFFSET].copy_from_slice(&self.width.to_le_bytes());
        bytes[HEIGHT_OFFSET..].copy_from_slice(&self.height.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(PipelineError::InvalidHeader(format!(
                "{} bytes, expected {}",
                bytes.len(),
                HEADER_SIZE
            )));
        }
        if bytes[..FORMAT_OFFSET] != SOF_MARKER {
            return Err(PipelineError::InvalidHeader(format!(
                "bad start-of-frame marker {:02X?}",
                &bytes[..FORMAT_OFFSET]
            )));
        }

        let format = FrameFormat::try_from(bytes[FORMAT_OFFSET])?;
        let mut word = [0u8; 4];
        word.copy_from_slice(&bytes[WIDTH_OFFSET..HEIGHT_OFFSET]);
        let width = u32::from_le_bytes(word);
        word.copy_from_slice(&bytes[HEIGHT_OFFSET..HEADER_SIZE]);
        let height = u32::from_le_bytes(word);

        Ok(Self::new(format, width, height))
    }

    /// Payload size implied by the header, `None` for the reserved format or on overflow.
    pub fn payload_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.format.bytes_per_pixel()?)
    }
}
