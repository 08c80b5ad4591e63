use eiml_stream_rs::image_pipeline::{
    Classification, Classifier, FrameFormat, PipelineConfig, PipelineError, Result, SensorFormat,
    Signal, StreamPipeline, TestPatternCamera,
};
use eiml_stream_rs::logger;

use clap::Parser;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Stream test-pattern camera frames as EIML lines on stdout")]
struct Args {
    /// Number of cycles to run; streams until killed when omitted.
    #[arg(long)]
    cycles: Option<u64>,
}

/// Values pulled from the signal per read.
const CHUNK: usize = 256;

/// Stand-in for a trained model: scores mean luminance, pulling the signal in chunks.
struct BrightnessClassifier {
    input_size: usize,
}

impl Classifier for BrightnessClassifier {
    fn input_frame_size(&self) -> usize {
        self.input_size
    }

    fn classify(&mut self, signal: &Signal<'_>) -> Result<Vec<Classification>> {
        let total = signal.total_length();
        if total == 0 {
            return Err(PipelineError::ClassifierError("empty signal".to_string()));
        }

        let mut chunk = [0.0f32; CHUNK];
        let mut sum = 0.0f64;
        let mut offset = 0;
        while offset < total {
            let len = CHUNK.min(total - offset);
            signal.read(offset, &mut chunk[..len])?;
            // packed 0xRRGGBB, average the three channels
            sum += chunk[..len]
                .iter()
                .map(|&v| {
                    let v = v as u32;
                    ((v >> 16) + ((v >> 8) & 0xFF) + (v & 0xFF)) as f64 / (3.0 * 255.0)
                })
                .sum::<f64>();
            offset += len;
        }

        let bright = (sum / total as f64) as f32;
        Ok(vec![
            Classification { label: "bright".to_string(), value: bright },
            Classification { label: "dark".to_string(), value: 1.0 - bright },
        ])
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init();

    info!("Starting eiml_stream...");

    let config = PipelineConfig::builder()
        .scaled_size(64, 48)
        .crop_size(48, 48)
        .frame_format(FrameFormat::Rgb888)
        .build();
    let camera = TestPatternCamera::new(320, 240, SensorFormat::Rgb565);
    let mut classifier = BrightnessClassifier {
        input_size: config.signal_length(),
    };
    let mut pipeline = StreamPipeline::new(camera, config)?;

    info!("Streaming pipeline initialized");
    info!(
        "Scale {}x{} -> crop {}x{} as {:?}",
        pipeline.config().scaled_width,
        pipeline.config().scaled_height,
        pipeline.config().crop_width,
        pipeline.config().crop_height,
        pipeline.config().frame_format
    );

    let stdout = std::io::stdout();
    let mut serial = stdout.lock();
    let summary = pipeline.run(&mut classifier, &mut serial, args.cycles);

    if summary.dropped > 0 {
        warn!("{} of {} cycles dropped", summary.dropped, summary.completed + summary.dropped);
    }
    info!("Streamed {} frames", summary.completed);

    Ok(())
}
