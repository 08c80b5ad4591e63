//! Host-side reader for the serial stream.
//!
//! The stream interleaves plain text lines (device logs, predictions) with
//! base64 frames. Lines are classified by their first four characters: the
//! base64 SOF marker starts an EIML frame and `/9j/` (a base64 JPEG SOI)
//! starts a JPEG image. Anything that fails to decode is reported and the
//! receiver resynchronizes on the next line.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, warn};

use crate::image_pipeline::buffer::FrameFormat;
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::framing::header::{FrameHeader, HEADER_BASE64_LEN, SOF_BASE64};

/// Base64 prefix of a JPEG stream (`FF D8 FF`).
pub const JPEG_BASE64: &str = "/9j/";

/// Lines longer than this are dropped.
const DEFAULT_MAX_LINE: usize = 4 * 1024 * 1024;

/// A frame decoded from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub header: FrameHeader,
    pub pixels: Vec<u8>,
}

impl DecodedFrame {
    pub fn new(header: FrameHeader, pixels: Vec<u8>) -> Result<Self> {
        let expected = header.payload_len().ok_or_else(|| {
            PipelineError::InvalidHeader(format!("no payload size for {:?}", header.format))
        })?;
        if pixels.len() != expected {
            return Err(PipelineError::PayloadLengthMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self { header, pixels })
    }

    /// Converts to an RGB888 frame, widening grayscale the way the viewer displays it.
    pub fn into_rgb888(self) -> Self {
        match self.header.format {
            FrameFormat::Grayscale => Self {
                header: FrameHeader::new(FrameFormat::Rgb888, self.header.width, self.header.height),
                pixels: self.pixels.iter().flat_map(|&v| [v, v, v]).collect(),
            },
            _ => self,
        }
    }
}

#[derive(Debug)]
pub enum ReceivedMessage {
    Text(String),
    Frame(DecodedFrame),
    /// Decoded JPEG bytes, passed through undecoded.
    Jpeg(Vec<u8>),
    Corrupt(PipelineError),
}

pub struct FrameReceiver {
    line: Vec<u8>,
    pending_header: Option<FrameHeader>,
    max_line: usize,
    overflowed: bool,
}

impl Default for FrameReceiver {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_base64(text: &[u8]) -> Result<Vec<u8>> {
    STANDARD
        .decode(text)
        .map_err(|e| PipelineError::Base64Error(e.to_string()))
}

fn decode_header(text: &[u8]) -> Result<FrameHeader> {
    FrameHeader::from_bytes(&decode_base64(text)?)
}

fn decode_frame(header: FrameHeader, payload: &[u8]) -> Result<DecodedFrame> {
    DecodedFrame::new(header, decode_base64(payload)?)
}

impl FrameReceiver {
    pub fn new() -> Self {
        Self::with_max_line(DEFAULT_MAX_LINE)
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            line: Vec::new(),
            pending_header: None,
            max_line,
            overflowed: false,
        }
    }

    /// Feeds raw serial bytes, returning every message completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<ReceivedMessage> {
        let mut messages = Vec::new();
        for &byte in bytes {
            if byte == b'\n' {
                let line = std::mem::take(&mut self.line);
                if std::mem::take(&mut self.overflowed) {
                    warn!("Dropped serial line longer than {} bytes", self.max_line);
                    messages.push(ReceivedMessage::Corrupt(PipelineError::LineTooLong(self.max_line)));
                    continue;
                }
                self.handle_line(line, &mut messages);
            } else if self.overflowed {
                continue;
            } else if self.line.len() >= self.max_line {
                self.line.clear();
                self.pending_header = None;
                self.overflowed = true;
            } else {
                self.line.push(byte);
            }
        }
        messages
    }

    fn handle_line(&mut self, mut line: Vec<u8>, messages: &mut Vec<ReceivedMessage>) {
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        if let Some(header) = self.pending_header.take() {
            if encoded_payload_len(&header) == Some(line.len()) {
                messages.push(to_message(decode_frame(header, &line)));
                return;
            }
            // not the payload: report the header and read the line on its own
            debug!("Header {:?} was not followed by a payload", header);
            messages.push(ReceivedMessage::Corrupt(PipelineError::MissingPayload(header)));
        }

        if line.starts_with(SOF_BASE64.as_bytes()) {
            let (header_text, payload_text) = line.split_at(HEADER_BASE64_LEN.min(line.len()));
            let header = match decode_header(header_text) {
                Ok(header) => header,
                Err(e) => {
                    messages.push(ReceivedMessage::Corrupt(e));
                    return;
                }
            };
            if payload_text.is_empty() && header.payload_len().is_some_and(|len| len > 0) {
                self.pending_header = Some(header);
                return;
            }
            messages.push(to_message(decode_frame(header, payload_text)));
            return;
        }

        if line.starts_with(JPEG_BASE64.as_bytes()) {
            messages.push(match decode_base64(&line) {
                Ok(jpeg) => ReceivedMessage::Jpeg(jpeg),
                Err(e) => ReceivedMessage::Corrupt(e),
            });
            return;
        }

        if !line.is_empty() {
            messages.push(ReceivedMessage::Text(String::from_utf8_lossy(&line).into_owned()));
        }
    }
}

/// Length of the padded base64 text carrying the header's payload.
fn encoded_payload_len(header: &FrameHeader) -> Option<usize> {
    header.payload_len()?.div_ceil(3).checked_mul(4)
}

fn to_message(frame: Result<DecodedFrame>) -> ReceivedMessage {
    match frame {
        Ok(frame) => ReceivedMessage::Frame(frame),
        Err(e) => {
            debug!("Discarding frame: {}", e);
            ReceivedMessage::Corrupt(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::framing::{Base64FrameEncoder, FrameEncoder};

    fn encoded_frame(header: &FrameHeader, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        Base64FrameEncoder.encode_frame(header, payload, &mut out).unwrap();
        out
    }

    #[test]
    fn test_single_line_frame() {
        let header = FrameHeader::new(FrameFormat::Grayscale, 3, 2);
        let payload = vec![1, 2, 3, 4, 5, 6];
        let mut receiver = FrameReceiver::new();

        let messages = receiver.push(&encoded_frame(&header, &payload));

        assert_eq!(messages.len(), 1);
        match &messages[0] {
            ReceivedMessage::Frame(frame) => {
                assert_eq!(frame.header, header);
                assert_eq!(frame.pixels, payload);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_header_and_payload_on_separate_lines() {
        let header = FrameHeader::new(FrameFormat::Rgb888, 1, 1);
        let mut stream = STANDARD.encode(header.to_bytes()).into_bytes();
        stream.extend_from_slice(b"\r\n");
        stream.extend_from_slice(STANDARD.encode([9u8, 8, 7]).as_bytes());
        stream.extend_from_slice(b"\r\n");
        let mut receiver = FrameReceiver::new();

        let messages = receiver.push(&stream);

        assert_eq!(messages.len(), 1);
        assert!(matches!(&messages[0], ReceivedMessage::Frame(f) if f.pixels == vec![9, 8, 7]));
    }

    #[test]
    fn test_header_without_payload_does_not_swallow_text() {
        let header = FrameHeader::new(FrameFormat::Grayscale, 1, 1);
        let mut stream = STANDARD.encode(header.to_bytes()).into_bytes();
        stream.extend_from_slice(b"\r\nbooting\r\n");
        let mut receiver = FrameReceiver::new();

        let messages = receiver.push(&stream);

        assert_eq!(messages.len(), 2);
        assert!(matches!(
            &messages[0],
            ReceivedMessage::Corrupt(PipelineError::MissingPayload(h)) if *h == header
        ));
        assert!(matches!(&messages[1], ReceivedMessage::Text(t) if t == "booting"));
    }

    #[test]
    fn test_header_without_payload_then_full_frame() {
        let orphan = FrameHeader::new(FrameFormat::Rgb888, 2, 2);
        let header = FrameHeader::new(FrameFormat::Grayscale, 2, 1);
        let mut stream = STANDARD.encode(orphan.to_bytes()).into_bytes();
        stream.extend_from_slice(b"\r\n");
        stream.extend(encoded_frame(&header, &[5, 6]));
        let mut receiver = FrameReceiver::new();

        let messages = receiver.push(&stream);

        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], ReceivedMessage::Corrupt(PipelineError::MissingPayload(_))));
        assert!(matches!(&messages[1], ReceivedMessage::Frame(f) if f.pixels == vec![5, 6]));
    }

    #[test]
    fn test_text_and_frames_interleave_across_chunks() {
        let header = FrameHeader::new(FrameFormat::Grayscale, 2, 2);
        let mut stream = b"booting\r\n".to_vec();
        stream.extend(encoded_frame(&header, &[10, 20, 30, 40]));
        stream.extend_from_slice(b"person: 0.87500\r\n");
        let mut receiver = FrameReceiver::new();

        let mut messages = Vec::new();
        for chunk in stream.chunks(5) {
            messages.extend(receiver.push(chunk));
        }

        assert_eq!(messages.len(), 3);
        assert!(matches!(&messages[0], ReceivedMessage::Text(t) if t == "booting"));
        assert!(matches!(&messages[1], ReceivedMessage::Frame(_)));
        assert!(matches!(&messages[2], ReceivedMessage::Text(t) if t == "person: 0.87500"));
    }

    #[test]
    fn test_truncated_payload_is_corrupt_and_receiver_recovers() {
        let header = FrameHeader::new(FrameFormat::Grayscale, 4, 4);
        let mut stream = encoded_frame(&header, &[0u8; 16]);
        // lose the middle of the payload
        stream.drain(20..28);
        stream.extend(encoded_frame(&header, &[7u8; 16]));
        let mut receiver = FrameReceiver::new();

        let messages = receiver.push(&stream);

        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], ReceivedMessage::Corrupt(_)));
        assert!(matches!(&messages[1], ReceivedMessage::Frame(f) if f.pixels == vec![7u8; 16]));
    }

    #[test]
    fn test_jpeg_line_is_passed_through() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        let mut stream = STANDARD.encode(jpeg).into_bytes();
        stream.extend_from_slice(b"\r\n");
        let mut receiver = FrameReceiver::new();

        let messages = receiver.push(&stream);

        assert!(matches!(&messages[0], ReceivedMessage::Jpeg(bytes) if bytes == &jpeg));
    }

    #[test]
    fn test_overlong_line_is_dropped() {
        let mut receiver = FrameReceiver::with_max_line(8);

        let messages = receiver.push(b"0123456789abcdef\nok\n");

        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], ReceivedMessage::Corrupt(PipelineError::LineTooLong(8))));
        assert!(matches!(&messages[1], ReceivedMessage::Text(t) if t == "ok"));
    }

    #[test]
    fn test_grayscale_frame_widens_for_display() {
        let header = FrameHeader::new(FrameFormat::Grayscale, 2, 1);
        let frame = DecodedFrame::new(header, vec![3, 200]).unwrap().into_rgb888();

        assert_eq!(frame.header, FrameHeader::new(FrameFormat::Rgb888, 2, 1));
        assert_eq!(frame.pixels, vec![3, 3, 3, 200, 200, 200]);
        assert_eq!(frame.clone().into_rgb888(), frame);
    }

    #[test]
    fn test_reserved_format_frame_is_rejected() {
        let header = FrameHeader::new(FrameFormat::Reserved, 2, 1);

        assert!(matches!(
            DecodedFrame::new(header, vec![0, 0]),
            Err(PipelineError::InvalidHeader(_))
        ));
    }
}
