use crate::image_pipeline::buffer::{FrameFormat, PixelBuffer};
use crate::image_pipeline::common::error::{PipelineError, Result};

/// Read capability over signal values.
pub trait SignalSource {
    /// Fills `out` with the values at `offset..offset + out.len()`.
    fn read(&self, offset: usize, out: &mut [f32]) -> Result<()>;
}

/// Packs one pixel as `0xRRGGBB`, the value the classifier expects per pixel.
#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> f32 {
    (((r as u32) << 16) | ((g as u32) << 8) | b as u32) as f32
}

/// Exposes a canonical buffer as one packed value per pixel.
///
/// Grayscale pixels are replicated into all three channels before packing, so
/// the classifier sees the same layout regardless of the frame format.
/// Borrowing the buffer keeps it alive and unmodified while the classifier runs.
pub struct PixelSignal<'a> {
    buffer: &'a PixelBuffer,
    channels: Channels,
}

#[derive(Clone, Copy)]
enum Channels {
    Gray,
    Rgb,
}

impl<'a> PixelSignal<'a> {
    pub fn new(buffer: &'a PixelBuffer) -> Result<Self> {
        let channels = match buffer.encoding().frame_format() {
            Some(FrameFormat::Grayscale) => Channels::Gray,
            Some(FrameFormat::Rgb888) => Channels::Rgb,
            _ => return Err(PipelineError::NonCanonicalFormat(buffer.encoding())),
        };
        Ok(Self { buffer, channels })
    }

    /// One value per pixel.
    pub fn len(&self) -> usize {
        self.buffer.pixel_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SignalSource for PixelSignal<'_> {
    fn read(&self, offset: usize, out: &mut [f32]) -> Result<()> {
        let total = self.len();
        let end = offset
            .checked_add(out.len())
            .filter(|&end| end <= total)
            .ok_or(PipelineError::SignalOutOfRange {
                offset,
                length: out.len(),
                total,
            })?;

        let data = self.buffer.data();
        match self.channels {
            Channels::Gray => {
                for (dst, &v) in out.iter_mut().zip(&data[offset..end]) {
                    *dst = pack_rgb(v, v, v);
                }
            }
            Channels::Rgb => {
                for (dst, px) in out.iter_mut().zip(data[offset * 3..end * 3].chunks_exact(3)) {
                    *dst = pack_rgb(px[0], px[1], px[2]);
                }
            }
        }
        Ok(())
    }
}

/// The descriptor handed to a classifier: a declared length and a pull source.
pub struct Signal<'a> {
    total_length: usize,
    source: &'a dyn SignalSource,
}

impl<'a> Signal<'a> {
    pub fn new(total_length: usize, source: &'a dyn SignalSource) -> Self {
        Self {
            total_length,
            source,
        }
    }

    pub fn total_length(&self) -> usize {
        self.total_length
    }

    pub fn read(&self, offset: usize, out: &mut [f32]) -> Result<()> {
        self.source.read(offset, out)
    }

    /// Allocating form of [`read`](Self::read).
    pub fn pull(&self, offset: usize, length: usize) -> Result<Vec<f32>> {
        let mut values = vec![0.0f32; length];
        self.source.read(offset, &mut values)?;
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::buffer::PixelEncoding;

    #[test]
    fn test_rgb888_packs_one_value_per_pixel() {
        let buffer =
            PixelBuffer::from_vec(2, 1, PixelEncoding::Rgb888, vec![0x12, 0x34, 0x56, 0xFF, 0, 0])
                .unwrap();
        let signal = PixelSignal::new(&buffer).unwrap();

        let mut out = [0.0f32; 2];
        signal.read(0, &mut out).unwrap();

        assert_eq!(out, [0x123456 as f32, 0xFF0000 as f32]);
    }

    #[test]
    fn test_grayscale_is_replicated_before_packing() {
        let buffer = PixelBuffer::from_vec(3, 1, PixelEncoding::Grayscale, vec![0, 0x80, 0xFF]).unwrap();
        let signal = PixelSignal::new(&buffer).unwrap();

        let mut out = [0.0f32; 2];
        signal.read(1, &mut out).unwrap();

        assert_eq!(out, [0x808080 as f32, 0xFFFFFF as f32]);
    }

    #[test]
    fn test_pull_is_idempotent_and_order_independent() {
        let data: Vec<u8> = (0..48).collect();
        let buffer = PixelBuffer::from_vec(4, 4, PixelEncoding::Rgb888, data).unwrap();
        let pixel_signal = PixelSignal::new(&buffer).unwrap();
        let signal = Signal::new(pixel_signal.len(), &pixel_signal);

        let late = signal.pull(10, 6).unwrap();
        let early = signal.pull(0, 4).unwrap();

        assert_eq!(signal.pull(10, 6).unwrap(), late);
        assert_eq!(signal.pull(0, 4).unwrap(), early);
        assert_eq!(signal.pull(0, 16).unwrap()[10..], late[..]);
    }

    #[test]
    fn test_out_of_range_read_is_rejected() {
        let buffer = PixelBuffer::from_vec(2, 2, PixelEncoding::Grayscale, vec![1, 2, 3, 4]).unwrap();
        let signal = PixelSignal::new(&buffer).unwrap();

        let mut out = [0.0f32; 3];
        assert!(matches!(
            signal.read(2, &mut out),
            Err(PipelineError::SignalOutOfRange { offset: 2, length: 3, total: 4 })
        ));
        assert!(signal.read(usize::MAX, &mut out).is_err());
        assert!(signal.read(4, &mut []).is_ok());
    }

    #[test]
    fn test_rgb565_buffer_cannot_back_a_signal() {
        let buffer = PixelBuffer::try_alloc(1, 1, PixelEncoding::Rgb565).unwrap();

        assert!(matches!(
            PixelSignal::new(&buffer),
            Err(PipelineError::NonCanonicalFormat(_))
        ));
    }
}
