//! Pipeline configuration types

use crate::image_pipeline::buffer::FrameFormat;
use crate::image_pipeline::common::error::{PipelineError, Result};

/// Configuration for the capture/transform/stream cycle.
///
/// Fixed for the lifetime of a [`StreamPipeline`](crate::image_pipeline::StreamPipeline).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Working resolution the camera frame is resampled to
    pub scaled_width: usize,
    pub scaled_height: usize,
    /// Centered region kept from the scaled frame; transmitted and classified
    pub crop_width: usize,
    pub crop_height: usize,
    /// Canonical format for transmission and inference
    pub frame_format: FrameFormat,
    /// Whether frames are written to the serial transport
    pub transmit: bool,
    /// Whether classification results are written as text lines after each frame
    pub report_predictions: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scaled_width: 128,
            scaled_height: 96,
            crop_width: 96,
            crop_height: 96,
            frame_format: FrameFormat::Grayscale,
            transmit: true,
            report_predictions: true,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Rejects configurations no cycle could complete with.
    ///
    /// A crop larger than the scaled size is left to the cropper, which reports it per cycle.
    pub fn validate(&self) -> Result<()> {
        if self.scaled_width == 0 || self.scaled_height == 0 {
            return Err(PipelineError::InvalidDimensions(self.scaled_width, self.scaled_height));
        }
        if self.crop_width == 0 || self.crop_height == 0 {
            return Err(PipelineError::InvalidDimensions(self.crop_width, self.crop_height));
        }
        if self.frame_format == FrameFormat::Reserved {
            return Err(PipelineError::InvalidHeader(
                "reserved format cannot be streamed".to_string(),
            ));
        }
        Ok(())
    }

    /// Signal length the pipeline produces: one value per cropped pixel.
    pub fn signal_length(&self) -> usize {
        self.crop_width * self.crop_height
    }
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    scaled: Option<(usize, usize)>,
    crop: Option<(usize, usize)>,
    frame_format: Option<FrameFormat>,
    transmit: Option<bool>,
    report_predictions: Option<bool>,
}

impl PipelineConfigBuilder {
    pub fn scaled_size(mut self, width: usize, height: usize) -> Self {
        self.scaled = Some((width, height));
        self
    }

    pub fn crop_size(mut self, width: usize, height: usize) -> Self {
        self.crop = Some((width, height));
        self
    }

    pub fn frame_format(mut self, format: FrameFormat) -> Self {
        self.frame_format = Some(format);
        self
    }

    pub fn transmit(mut self, enable: bool) -> Self {
        self.transmit = Some(enable);
        self
    }

    pub fn report_predictions(mut self, enable: bool) -> Self {
        self.report_predictions = Some(enable);
        self
    }

    pub fn build(self) -> PipelineConfig {
        let default = PipelineConfig::default();
        let (scaled_width, scaled_height) =
            self.scaled.unwrap_or((default.scaled_width, default.scaled_height));
        let (crop_width, crop_height) =
            self.crop.unwrap_or((default.crop_width, default.crop_height));
        PipelineConfig {
            scaled_width,
            scaled_height,
            crop_width,
            crop_height,
            frame_format: self.frame_format.unwrap_or(default.frame_format),
            transmit: self.transmit.unwrap_or(default.transmit),
            report_predictions: self.report_predictions.unwrap_or(default.report_predictions),
        }
    }
}
