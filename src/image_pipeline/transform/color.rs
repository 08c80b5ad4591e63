//! Sensor-native to canonical color conversion.

use tracing::debug;

use crate::image_pipeline::buffer::{FrameFormat, PixelBuffer, PixelEncoding};
use crate::image_pipeline::common::error::{PipelineError, Result};

/// Widens one big-endian RGB565 pixel by shifting, without rescaling to the full 8-bit range.
///
/// The low bits of each channel are whatever the shifts leave behind, which is
/// what the receiving side expects byte for byte.
#[inline]
pub fn rgb565_to_rgb888(hi: u8, lo: u8) -> [u8; 3] {
    let r = hi & 0xF8;
    let g = (hi << 5) | ((lo & 0xE0) >> 3);
    let b = lo << 3;
    [r, g, b]
}

/// Converts `input` to the canonical `target` format.
///
/// Supported pairs:
/// - Grayscale -> Grayscale: the buffer is handed back unchanged
/// - Grayscale -> RGB888: the luminance byte is replicated into all channels
/// - RGB565 -> RGB888: bit-shift widening, see [`rgb565_to_rgb888`]
///
/// Every other pair is a configuration error.
pub fn convert(input: PixelBuffer, target: FrameFormat) -> Result<PixelBuffer> {
    let source = input.encoding();
    debug!("Converting {:?} -> {:?}", source, target);

    match (source, target) {
        (PixelEncoding::Grayscale, FrameFormat::Grayscale) => Ok(input),
        (PixelEncoding::Grayscale, FrameFormat::Rgb888) => {
            let mut output =
                PixelBuffer::try_alloc(input.width(), input.height(), PixelEncoding::Rgb888)?;
            for (dst, &v) in output.data_mut().chunks_exact_mut(3).zip(input.data()) {
                dst.fill(v);
            }
            Ok(output)
        }
        (PixelEncoding::Rgb565, FrameFormat::Rgb888) => {
            let mut output =
                PixelBuffer::try_alloc(input.width(), input.height(), PixelEncoding::Rgb888)?;
            for (dst, src) in output
                .data_mut()
                .chunks_exact_mut(3)
                .zip(input.data().chunks_exact(2))
            {
                dst.copy_from_slice(&rgb565_to_rgb888(src[0], src[1]));
            }
            Ok(output)
        }
        (from, to) => Err(PipelineError::UnsupportedConversion { from, to }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pure_red_565_widens_exactly() {
        assert_eq!(rgb565_to_rgb888(0xF8, 0x00), [0xF8, 0x00, 0x00]);
    }

    #[test]
    fn test_pure_green_and_blue_565() {
        assert_eq!(rgb565_to_rgb888(0x07, 0xE0), [0x00, 0xFC, 0x00]);
        assert_eq!(rgb565_to_rgb888(0x00, 0x1F), [0x00, 0x00, 0xF8]);
        assert_eq!(rgb565_to_rgb888(0xFF, 0xFF), [0xF8, 0xFC, 0xF8]);
    }

    #[test]
    fn test_rgb565_buffer_conversion() {
        let input =
            PixelBuffer::from_vec(2, 1, PixelEncoding::Rgb565, vec![0xF8, 0x00, 0x00, 0x1F])
                .unwrap();

        let output = convert(input, FrameFormat::Rgb888).unwrap();

        assert_eq!(output.encoding(), PixelEncoding::Rgb888);
        assert_eq!(output.data(), &[0xF8, 0x00, 0x00, 0x00, 0x00, 0xF8]);
    }

    #[test]
    fn test_grayscale_passthrough_keeps_bytes() {
        let input = PixelBuffer::from_vec(3, 1, PixelEncoding::Grayscale, vec![9, 8, 7]).unwrap();

        let output = convert(input, FrameFormat::Grayscale).unwrap();

        assert_eq!(output.encoding(), PixelEncoding::Grayscale);
        assert_eq!(output.data(), &[9, 8, 7]);
    }

    #[test]
    fn test_grayscale_to_rgb888_replicates() {
        let input = PixelBuffer::from_vec(2, 1, PixelEncoding::Grayscale, vec![0x10, 0xAB]).unwrap();

        let output = convert(input, FrameFormat::Rgb888).unwrap();

        assert_eq!(output.data(), &[0x10, 0x10, 0x10, 0xAB, 0xAB, 0xAB]);
    }

    #[test]
    fn test_unsupported_pairs_are_errors() {
        let input = PixelBuffer::from_vec(1, 1, PixelEncoding::Rgb565, vec![0, 0]).unwrap();
        assert!(matches!(
            convert(input, FrameFormat::Grayscale),
            Err(PipelineError::UnsupportedConversion {
                from: PixelEncoding::Rgb565,
                to: FrameFormat::Grayscale
            })
        ));

        let input = PixelBuffer::from_vec(1, 1, PixelEncoding::Grayscale, vec![0]).unwrap();
        assert!(matches!(
            convert(input, FrameFormat::Reserved),
            Err(PipelineError::UnsupportedConversion { .. })
        ));

        let input = PixelBuffer::from_vec(1, 1, PixelEncoding::Rgb888, vec![0, 0, 0]).unwrap();
        assert!(matches!(
            convert(input, FrameFormat::Rgb888),
            Err(PipelineError::UnsupportedConversion { .. })
        ));
    }
}
