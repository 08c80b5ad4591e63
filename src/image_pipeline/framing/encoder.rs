use std::io::{self, Write};

use crate::image_pipeline::framing::header::FrameHeader;

/// Serializes one frame onto a transport.
pub trait FrameEncoder {
    fn encode_frame(&self, header: &FrameHeader, payload: &[u8], output: &mut dyn Write) -> io::Result<()>;
}
