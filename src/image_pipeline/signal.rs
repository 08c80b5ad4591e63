//! Classifier input
//!
//! The classifier pulls pixel values on demand through a [`Signal`] instead of
//! receiving a copied feature array up front.

mod adapter;
mod classifier;

pub use adapter::{PixelSignal, Signal, SignalSource, pack_rgb};
pub use classifier::{Classification, Classifier};
