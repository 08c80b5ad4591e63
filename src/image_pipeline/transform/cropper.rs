//! Center crop.

use tracing::debug;

use crate::image_pipeline::buffer::PixelBuffer;
use crate::image_pipeline::common::error::{PipelineError, Result};

/// Extracts the centered `out_width x out_height` region of `input`.
///
/// Offsets truncate, so an odd margin leaves the extra column/row on the right/bottom.
/// A crop larger than the source in either axis is an error, never clamped.
pub fn crop_center(input: PixelBuffer, out_width: usize, out_height: usize) -> Result<PixelBuffer> {
    let (in_width, in_height) = (input.width(), input.height());
    if out_width > in_width || out_height > in_height {
        return Err(PipelineError::CropOutOfBounds {
            crop_width: out_width,
            crop_height: out_height,
            width: in_width,
            height: in_height,
        });
    }
    if out_width == 0 || out_height == 0 {
        return Err(PipelineError::InvalidDimensions(out_width, out_height));
    }

    let off_x = (in_width - out_width) / 2;
    let off_y = (in_height - out_height) / 2;
    debug!(
        "Cropping {}x{} -> {}x{} at ({}, {})",
        in_width, in_height, out_width, out_height, off_x, off_y
    );

    let bpp = input.bytes_per_pixel();
    let out_stride = out_width * bpp;

    let mut output = PixelBuffer::try_alloc(out_width, out_height, input.encoding())?;
    let src = input.data();

    for (row, dst_row) in output.data_mut().chunks_exact_mut(out_stride).enumerate() {
        let start = ((off_y + row) * in_width + off_x) * bpp;
        dst_row.copy_from_slice(&src[start..start + out_stride]);
    }

    Ok(output)
}
