//! EIML wire framing
//!
//! A frame is a fixed 12-byte header (SOF marker, format tag, little-endian
//! width and height) followed by the raw pixel payload, both base64-encoded
//! and terminated by CRLF so it travels over a text-only serial link.

mod base64_encoder;
mod capture;
mod encoder;
pub mod header;
mod receiver;

pub use base64_encoder::Base64FrameEncoder;
pub use capture::capture_file_name;
pub use encoder::FrameEncoder;
pub use header::{FrameHeader, HEADER_SIZE, SOF_BASE64, SOF_MARKER};
pub use receiver::{DecodedFrame, FrameReceiver, JPEG_BASE64, ReceivedMessage};
