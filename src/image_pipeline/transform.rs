//! Geometric and color transforms
//!
//! Every transform consumes its input buffer and returns a newly owned output,
//! so the input is released as soon as the output exists.

pub mod color;
pub mod cropper;
pub mod scaler;

pub use color::convert;
pub use cropper::crop_center;
pub use scaler::scale_nearest;
