use crate::error::PipelineError;
use opencv::{core, imgproc, prelude::*};

/// Marks every near-white pixel of an RGB Mat with 255 and everything else with 0.
///
/// Near-white means low saturation and high value in 8-bit HSV; hue is left
/// unconstrained since white has none.
pub fn build_mask(frame: &Mat, tolerance: u8) -> Result<Mat, PipelineError> {
    let mut hsv = Mat::default();
    imgproc::cvt_color_def(frame, &mut hsv, imgproc::COLOR_RGB2HSV)?;

    let lower = core::Scalar::new(0.0, 0.0, f64::from(255 - tolerance), 0.0);
    let upper = core::Scalar::new(180.0, f64::from(tolerance), 255.0, 0.0);
    let mut mask = Mat::default();
    core::in_range(&hsv, &lower, &upper, &mut mask)?;
    Ok(mask)
}
