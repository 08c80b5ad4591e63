//! frame_capture - Host receiver for the EIML serial stream.
//!
//! Reads the stream from stdin or a serial device, logs device text and frame
//! rate, and optionally saves every received frame as TIFF.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use eiml_stream_rs::image_pipeline::{FrameReceiver, ReceivedMessage};
use eiml_stream_rs::logger;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Receive EIML frames from a serial stream")]
struct Args {
    /// Directory to save received frames into as TIFF.
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Label prefixed to saved file names.
    #[arg(long, default_value = "")]
    label: String,

    /// Serial device to read instead of stdin (reconnects on disconnect).
    /// The port must already be configured, e.g. with `stty`.
    #[arg(long, env = "EIML_SERIAL_DEVICE")]
    serial_device: Option<PathBuf>,

    /// Delay between reconnect attempts when using --serial-device.
    #[arg(long, default_value = "2")]
    reconnect_delay_secs: u64,

    /// Save grayscale frames widened to RGB.
    #[arg(long)]
    rgb: bool,
}

/// Per-connection receive state.
struct Capture<'a> {
    args: &'a Args,
    receiver: FrameReceiver,
    last_frame: Option<Instant>,
}

impl<'a> Capture<'a> {
    fn new(args: &'a Args) -> Self {
        Self {
            args,
            receiver: FrameReceiver::new(),
            last_frame: None,
        }
    }

    /// Reads until EOF.
    fn receive<R: Read>(&mut self, mut reader: R) -> anyhow::Result<()> {
        let mut chunk = [0u8; 4096];
        loop {
            let n = reader.read(&mut chunk).context("read serial stream")?;
            if n == 0 {
                return Ok(());
            }
            for message in self.receiver.push(&chunk[..n]) {
                self.handle(message);
            }
        }
    }

    fn handle(&mut self, message: ReceivedMessage) {
        match message {
            ReceivedMessage::Text(text) => info!("Recv: {}", text.trim()),
            ReceivedMessage::Jpeg(jpeg) => info!("JPEG frame, {} bytes", jpeg.len()),
            ReceivedMessage::Corrupt(e) => warn!("Discarded frame: {}", e),
            ReceivedMessage::Frame(frame) => {
                let now = Instant::now();
                let fps = self
                    .last_frame
                    .map(|prev| 1.0 / now.duration_since(prev).as_secs_f64().max(f64::EPSILON))
                    .unwrap_or(0.0);
                self.last_frame = Some(now);
                info!(
                    "Frame {}x{} {:?} ({:.1} fps)",
                    frame.header.width, frame.header.height, frame.header.format, fps
                );

                if let Some(dir) = &self.args.save_dir {
                    let frame = if self.args.rgb { frame.into_rgb888() } else { frame };
                    if let Err(e) = frame.save_capture(dir, &self.args.label) {
                        warn!(dir = %dir.display(), "Save failed: {}", e);
                    }
                }
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init();

    if let Some(dir) = &args.save_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        info!(dir = %dir.display(), "Saving frames");
    }

    if let Some(device_path) = args.serial_device.as_deref() {
        let reconnect_delay = Duration::from_secs(args.reconnect_delay_secs);
        loop {
            read_device(&args, device_path);
            info!("Reconnecting to serial device in {}s", reconnect_delay.as_secs());
            std::thread::sleep(reconnect_delay);
        }
    }

    Capture::new(&args).receive(io::stdin().lock())
}

/// One connection to the device, with a fresh receiver so a partial line is not carried over.
fn read_device(args: &Args, device_path: &Path) {
    match std::fs::File::open(device_path)
        .with_context(|| format!("failed to open serial device {}", device_path.display()))
    {
        Ok(file) => {
            info!(device = %device_path.display(), "Connected");
            match Capture::new(args).receive(file) {
                Ok(()) => warn!("Serial input ended (EOF)"),
                Err(e) => warn!("Serial input ended: {:#}", e),
            }
        }
        Err(e) => warn!("Serial device unavailable: {:#}", e),
    }
}
