//! Saving received frames to disk as TIFF.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tiff::encoder::{TiffEncoder, colortype};
use tracing::{debug, info};

use crate::image_pipeline::buffer::FrameFormat;
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::framing::receiver::DecodedFrame;

const CAPTURE_EXT: &str = ".tiff";

/// Characters that are not allowed in a capture file name.
const FORBIDDEN_CHARS: &[char] = &['\\', '/', ':', '*', '?', '<', '>', '|'];

/// Builds `label.uid.tiff` (or `uid.tiff` for an empty label) with path separators
/// and other reserved characters removed.
pub fn capture_file_name(label: &str, uid: &str) -> String {
    let name = if label.is_empty() {
        format!("{uid}{CAPTURE_EXT}")
    } else {
        format!("{label}.{uid}{CAPTURE_EXT}")
    };
    name.chars().filter(|c| !FORBIDDEN_CHARS.contains(c)).collect()
}

impl DecodedFrame {
    pub fn write_tiff(&self, output: &mut dyn Write) -> Result<()> {
        let (width, height) = (self.header.width, self.header.height);
        debug!("Encoding TIFF image: {}x{} {:?}", width, height, self.header.format);

        let mut buffer: Vec<u8> = Vec::new();
        {
            let mut encoder = TiffEncoder::new(std::io::Cursor::new(&mut buffer))
                .map_err(|e| PipelineError::EncodeError(e.to_string()))?;

            let written = match self.header.format {
                FrameFormat::Grayscale => {
                    encoder.write_image::<colortype::Gray8>(width, height, &self.pixels)
                }
                FrameFormat::Rgb888 => {
                    encoder.write_image::<colortype::RGB8>(width, height, &self.pixels)
                }
                FrameFormat::Reserved => {
                    return Err(PipelineError::InvalidHeader(
                        "reserved format has no pixel layout".to_string(),
                    ));
                }
            };
            written.map_err(|e| PipelineError::EncodeError(e.to_string()))?;
        }

        output.write_all(&buffer)?;
        Ok(())
    }

    /// Writes a new TIFF file. An existing file at `path` is never replaced.
    pub fn save_tiff<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut encoded = Vec::new();
        self.write_tiff(&mut encoded)?;

        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(&encoded)?;
        info!(path = %path.display(), "Saved frame");
        Ok(())
    }

    /// Saves into `dir` as `label.uid.tiff`, where uid is a hex timestamp in
    /// microseconds, bumped until the name is unused.
    pub fn save_capture(&self, dir: &Path, label: &str) -> Result<PathBuf> {
        let mut uid = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros())
            .unwrap_or_default();
        loop {
            let path = dir.join(capture_file_name(label, &format!("{uid:x}")));
            match self.save_tiff(&path) {
                Err(PipelineError::IoError(e)) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "Capture name taken");
                    uid += 1;
                }
                saved => return saved.map(|()| path),
            }
        }
    }
}
