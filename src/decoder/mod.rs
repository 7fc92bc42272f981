pub mod frame_data;
pub mod sampler;
pub mod video;

pub use frame_data::Frame;
pub use sampler::{FrameSampler, SamplingConfig};
pub use video::VideoDecoder;

use image::RgbImage;

/// Outcome of one forward decode step.
pub enum FrameRead {
    Frame(RgbImage),
    /// The stream advanced past a frame that could not be decoded.
    Corrupt(String),
    End,
}

/// A forward-only, one-frame-at-a-time video stream.
pub trait FrameSource {
    /// Native frames per second as reported by the container.
    fn frame_rate(&self) -> f64;

    /// Total frame count, when the container knows it.
    fn frame_count(&self) -> Option<u64> {
        None
    }

    fn read_next(&mut self) -> FrameRead;
}
