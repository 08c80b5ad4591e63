use std::io::{self, Write};

use base64::engine::general_purpose::STANDARD;
use base64::write::EncoderWriter;
use tracing::trace;

use crate::image_pipeline::framing::encoder::FrameEncoder;
use crate::image_pipeline::framing::header::FrameHeader;

/// Line terminator after the payload.
const LINE_END: &[u8] = b"\r\n";

/// Writes a frame as base64 header immediately followed by base64 payload, then CRLF.
///
/// Header and payload are encoded independently. The header is always 16
/// characters with no padding, so the line is also one valid base64 string and
/// a receiver can split it at a fixed offset. The payload is streamed through
/// the encoder, so no encoded copy of the frame is held in memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct Base64FrameEncoder;

fn write_base64(output: &mut dyn Write, bytes: &[u8]) -> io::Result<()> {
    let mut encoder = EncoderWriter::new(output, &STANDARD);
    encoder.write_all(bytes)?;
    encoder.finish()?;
    Ok(())
}

impl FrameEncoder for Base64FrameEncoder {
    fn encode_frame(&self, header: &FrameHeader, payload: &[u8], output: &mut dyn Write) -> io::Result<()> {
        trace!("Encoding frame {:?}, {} payload bytes", header, payload.len());

        write_base64(output, &header.to_bytes())?;
        write_base64(output, payload)?;
        output.write_all(LINE_END)?;
        output.flush()
    }
}
