use image::RgbImage;
use std::time::Duration;

/// A decoded RGB frame tagged with its position in the source stream.
#[derive(Clone, Debug)]
pub struct Frame {
    pub index: u64,
    pub timestamp: Duration,
    pub image: RgbImage,
}

impl Frame {
    pub fn new(index: u64, timestamp: Duration, image: RgbImage) -> Self {
        Self { index, timestamp, image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
