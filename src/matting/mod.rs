pub mod compositor;
pub mod mask;
pub mod mat;
pub mod refine;

use crate::error::PipelineError;
use crate::shared::constants;
use crate::utils::file_utils;
use image::{RgbImage, RgbaImage};

/// Tuning for near-white background removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MattingConfig {
    /// How far from pure white (in saturation and value steps) a pixel may sit
    /// and still count as background.
    pub tolerance: u8,
    /// Side length of the feathering blur kernel; 0 disables feathering.
    pub feather_radius: u32,
}

impl MattingConfig {
    pub fn new(tolerance: u32, feather_radius: u32) -> Result<Self, PipelineError> {
        if tolerance > constants::MAX_TOLERANCE {
            return Err(PipelineError::InvalidConfig(format!(
                "tolerance {} is outside 0..={}",
                tolerance,
                constants::MAX_TOLERANCE
            )));
        }
        if feather_radius % 2 == 0 && feather_radius != 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "feather radius {} must be odd (or 0 to disable)",
                feather_radius
            )));
        }
        Ok(Self { tolerance: tolerance as u8, feather_radius })
    }
}

impl Default for MattingConfig {
    fn default() -> Self {
        Self {
            tolerance: constants::DEFAULT_TOLERANCE as u8,
            feather_radius: constants::DEFAULT_FEATHER_RADIUS,
        }
    }
}

/// A transparent-background frame ready to be written, numbered in output order.
pub struct MattedFrame {
    pub sequence: usize,
    pub image: RgbaImage,
}

impl MattedFrame {
    pub fn file_name(&self, prefix: &str) -> String {
        file_utils::sequence_file_name(prefix, self.sequence)
    }
}

pub struct BackgroundRemover {
    config: MattingConfig,
}

impl BackgroundRemover {
    pub fn new(config: MattingConfig) -> Self {
        Self { config }
    }

    pub fn process_frame(&self, frame: &RgbImage) -> Result<RgbaImage, PipelineError> {
        let rgb = mat::from_rgb(frame)?;
        let mask = mask::build_mask(&rgb, self.config.tolerance)?;
        let alpha = mat::to_gray(&refine::refine(&mask, self.config.feather_radius)?)?;
        compositor::compose(frame, &alpha)
    }
}
