use std::io::Write;

use tracing::{debug, info, instrument, warn};

use crate::image_pipeline::{
    buffer::{FrameFormat, PixelBuffer, PixelEncoding},
    camera::CameraSource,
    common::{CycleTimings, PipelineError, Result, Timer},
    config::PipelineConfig,
    framing::{Base64FrameEncoder, FrameEncoder, FrameHeader},
    signal::{Classification, Classifier, PixelSignal, Signal},
    transform::{convert, crop_center, scale_nearest},
};

/// Outcome of one completed cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub sequence: u64,
    pub width: usize,
    pub height: usize,
    pub format: FrameFormat,
    pub classifications: Vec<Classification>,
    pub timings: CycleTimings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: u64,
    pub dropped: u64,
}

/// Single-threaded capture → transform → classify → transmit loop.
///
/// Each stage consumes the previous stage's buffer, so at most an input and an
/// output buffer are alive at once. A failing stage aborts only the current
/// cycle; nothing carries over to the next one except the sequence number.
pub struct StreamPipeline<C: CameraSource, E: FrameEncoder> {
    camera: C,
    encoder: E,
    config: PipelineConfig,
    sequence: u64,
}

impl<C: CameraSource> StreamPipeline<C, Base64FrameEncoder> {
    pub fn new(camera: C, config: PipelineConfig) -> Result<Self> {
        Self::with_custom(camera, Base64FrameEncoder, config)
    }
}

impl<C: CameraSource, E: FrameEncoder> StreamPipeline<C, E> {
    pub fn with_custom(camera: C, encoder: E, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            camera,
            encoder,
            config,
            sequence: 0,
        })
    }

    /// Allocates a frame buffer for the camera's current geometry and reads into it.
    fn capture(&mut self) -> Result<PixelBuffer> {
        let (width, height) = (self.camera.width(), self.camera.height());
        let format = self.camera.sensor_format();
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimensions(width, height));
        }
        if self.camera.bytes_per_pixel() != format.bytes_per_pixel() {
            return Err(PipelineError::CaptureError(format!(
                "camera reports {} bytes per pixel for {:?}",
                self.camera.bytes_per_pixel(),
                format
            )));
        }

        let mut buffer = PixelBuffer::try_alloc(width, height, PixelEncoding::from(format))?;
        self.camera.read_frame(buffer.data_mut())?;
        debug!("Captured {}x{} {:?}", width, height, format);
        Ok(buffer)
    }

    fn classify(&self, frame: &PixelBuffer, classifier: &mut dyn Classifier) -> Result<Vec<Classification>> {
        let source = PixelSignal::new(frame)?;
        let expected = classifier.input_frame_size();
        if expected != source.len() {
            return Err(PipelineError::SignalLengthMismatch {
                expected,
                actual: source.len(),
            });
        }

        let signal = Signal::new(expected, &source);
        classifier.classify(&signal)
    }

    /// Writes the frame and, if enabled, one `label: value` line per class.
    ///
    /// Transport errors are logged and otherwise ignored; the receiver
    /// resynchronizes on the next start-of-frame.
    fn transmit(&self, frame: &PixelBuffer, classifications: &[Classification], output: &mut dyn Write) -> Result<()> {
        let header = FrameHeader::for_buffer(frame)?;
        if let Err(e) = self.encoder.encode_frame(&header, frame.data(), output) {
            warn!(error = %e, "Frame write failed");
        }

        if self.config.report_predictions {
            for class in classifications {
                if let Err(e) = write!(output, "{}: {:.5}\r\n", class.label, class.value) {
                    warn!(error = %e, "Prediction write failed");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Runs one full cycle on the next camera frame.
    #[instrument(skip_all, fields(sequence = self.sequence))]
    pub fn run_cycle(&mut self, classifier: &mut dyn Classifier, output: &mut dyn Write) -> Result<CycleReport> {
        let sequence = self.sequence;
        self.sequence += 1;
        let mut timings = CycleTimings::new();

        let captured = {
            let _span = tracing::info_span!("capture").entered();
            let timer = Timer::start("capture");
            let buffer = self.capture()?;
            timings.record(timer);
            buffer
        };

        let scaled = {
            let _span = tracing::info_span!("scale",
                width = self.config.scaled_width,
                height = self.config.scaled_height
            ).entered();
            let timer = Timer::start("scale");
            let buffer = scale_nearest(captured, self.config.scaled_width, self.config.scaled_height)?;
            timings.record(timer);
            buffer
        };

        let cropped = {
            let _span = tracing::info_span!("crop",
                width = self.config.crop_width,
                height = self.config.crop_height
            ).entered();
            let timer = Timer::start("crop");
            let buffer = crop_center(scaled, self.config.crop_width, self.config.crop_height)?;
            timings.record(timer);
            buffer
        };

        let frame = {
            let _span = tracing::info_span!("convert").entered();
            let timer = Timer::start("convert");
            let buffer = convert(cropped, self.config.frame_format)?;
            timings.record(timer);
            buffer
        };

        let classifications = {
            let _span = tracing::info_span!("classify").entered();
            let timer = Timer::start("classify");
            let classes = self.classify(&frame, classifier)?;
            timings.record(timer);
            classes
        };

        if self.config.transmit {
            let _span = tracing::info_span!("transmit").entered();
            let timer = Timer::start("transmit");
            self.transmit(&frame, &classifications, output)?;
            timings.record(timer);
        }

        let (width, height) = (frame.width(), frame.height());
        drop(frame);

        timings.log_summary();
        info!(
            sequence,
            width,
            height,
            elapsed_ms = timings.total_duration().as_secs_f64() * 1000.0,
            "Cycle complete"
        );

        Ok(CycleReport {
            sequence,
            width,
            height,
            format: self.config.frame_format,
            classifications,
            timings,
        })
    }

    /// Runs cycles until `max_cycles` have been attempted, or forever for `None`.
    ///
    /// A failed cycle is logged and dropped; the next one starts from a fresh frame.
    pub fn run(
        &mut self,
        classifier: &mut dyn Classifier,
        output: &mut dyn Write,
        max_cycles: Option<u64>,
    ) -> RunSummary {
        let mut summary = RunSummary::default();
        while max_cycles.is_none_or(|max| summary.completed + summary.dropped < max) {
            match self.run_cycle(classifier, output) {
                Ok(_) => summary.completed += 1,
                Err(e) => {
                    warn!(sequence = self.sequence - 1, error = %e, "Dropping cycle");
                    summary.dropped += 1;
                }
            }
        }
        summary
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    #[cfg(test)]
    pub(crate) fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }

    /// Sequence number the next cycle will get.
    pub fn next_sequence(&self) -> u64 {
        self.sequence
    }
}
