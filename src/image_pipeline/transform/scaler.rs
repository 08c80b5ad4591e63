//! Fixed-point nearest-neighbor resampling.

use tracing::debug;

use crate::image_pipeline::buffer::PixelBuffer;
use crate::image_pipeline::common::error::{PipelineError, Result};

/// Fractional bits of the 16.16 step ratios.
const FIXED_SHIFT: u32 = 16;

/// Source index for destination index `dst`, clamped to the last valid index.
///
/// Both axes are clamped. With floor-rounded ratios the unclamped index never
/// leaves the source, the clamp only pins that down.
#[inline]
fn source_index(dst: usize, ratio: u64, src_len: usize) -> usize {
    (((dst as u64 * ratio) >> FIXED_SHIFT) as usize).min(src_len - 1)
}

/// Resizes `input` to `out_width x out_height` by copying the nearest source pixel.
///
/// No interpolation: each destination pixel is a verbatim copy of one source pixel.
/// Both upscaling and downscaling are supported.
pub fn scale_nearest(input: PixelBuffer, out_width: usize, out_height: usize) -> Result<PixelBuffer> {
    if out_width == 0 || out_height == 0 {
        return Err(PipelineError::InvalidDimensions(out_width, out_height));
    }
    let (in_width, in_height) = (input.width(), input.height());
    if in_width == 0 || in_height == 0 {
        return Err(PipelineError::InvalidDimensions(in_width, in_height));
    }

    debug!("Scaling {}x{} -> {}x{}", in_width, in_height, out_width, out_height);

    let ratio_x = ((in_width as u64) << FIXED_SHIFT) / out_width as u64;
    let ratio_y = ((in_height as u64) << FIXED_SHIFT) / out_height as u64;

    let bpp = input.bytes_per_pixel();
    let in_stride = in_width * bpp;
    let out_stride = out_width * bpp;

    let mut output = PixelBuffer::try_alloc(out_width, out_height, input.encoding())?;
    let src = input.data();

    for (y, dst_row) in output.data_mut().chunks_exact_mut(out_stride).enumerate() {
        let src_y = source_index(y, ratio_y, in_height);
        let src_row = &src[src_y * in_stride..(src_y + 1) * in_stride];

        for (x, dst_px) in dst_row.chunks_exact_mut(bpp).enumerate() {
            let src_x = source_index(x, ratio_x, in_width);
            dst_px.copy_from_slice(&src_row[src_x * bpp..(src_x + 1) * bpp]);
        }
    }

    Ok(output)
}
