use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::signal::adapter::Signal;

/// One class score.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub value: f32,
}

/// An on-device classifier that pulls its input through a [`Signal`].
pub trait Classifier {
    /// Number of signal values one inference consumes.
    fn input_frame_size(&self) -> usize;

    /// Runs one inference. May read the signal any number of times, in any order.
    fn classify(&mut self, signal: &Signal<'_>) -> Result<Vec<Classification>>;
}
