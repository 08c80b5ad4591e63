//! Pixel format tags

use crate::image_pipeline::common::error::{PipelineError, Result};

/// Encodings a camera sensor can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorFormat {
    /// One byte of luminance per pixel
    Grayscale,
    /// Two bytes per pixel, `RRRRRGGG GGGBBBBB`, high byte first
    Rgb565,
}

impl SensorFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            SensorFormat::Grayscale => 1,
            SensorFormat::Rgb565 => 2,
        }
    }
}

/// Canonical payload encoding carried in the EIML header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameFormat {
    Reserved = 0,
    Grayscale = 1,
    Rgb888 = 2,
}

impl FrameFormat {
    /// Bytes per pixel of the payload, `None` for the reserved tag.
    pub const fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            FrameFormat::Reserved => None,
            FrameFormat::Grayscale => Some(1),
            FrameFormat::Rgb888 => Some(3),
        }
    }

    pub const fn tag(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for FrameFormat {
    type Error = PipelineError;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(FrameFormat::Reserved),
            1 => Ok(FrameFormat::Grayscale),
            2 => Ok(FrameFormat::Rgb888),
            other => Err(PipelineError::InvalidHeader(format!(
                "unknown format tag {other}"
            ))),
        }
    }
}

/// Encoding of the bytes held by a [`PixelBuffer`](super::PixelBuffer).
///
/// RGB565 exists only between capture and color conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelEncoding {
    Grayscale,
    Rgb565,
    Rgb888,
}

impl PixelEncoding {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelEncoding::Grayscale => 1,
            PixelEncoding::Rgb565 => 2,
            PixelEncoding::Rgb888 => 3,
        }
    }

    /// The wire tag for this encoding, if it is canonical.
    pub const fn frame_format(self) -> Option<FrameFormat> {
        match self {
            PixelEncoding::Grayscale => Some(FrameFormat::Grayscale),
            PixelEncoding::Rgb888 => Some(FrameFormat::Rgb888),
            PixelEncoding::Rgb565 => None,
        }
    }
}

impl From<SensorFormat> for PixelEncoding {
    fn from(format: SensorFormat) -> Self {
        match format {
            SensorFormat::Grayscale => PixelEncoding::Grayscale,
            SensorFormat::Rgb565 => PixelEncoding::Rgb565,
        }
    }
}
