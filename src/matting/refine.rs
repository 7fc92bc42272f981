use crate::error::PipelineError;
use opencv::{core, imgproc, prelude::*};

fn morph(mask: &Mat, op: i32) -> Result<Mat, PipelineError> {
    let anchor = core::Point::new(-1, -1);
    let kernel = imgproc::get_structuring_element(imgproc::MORPH_RECT, core::Size::new(3, 3), anchor)?;
    let mut out = Mat::default();
    // The default border value makes out-of-image neighbours neutral for both erode and dilate
    imgproc::morphology_ex(
        mask,
        &mut out,
        op,
        &kernel,
        anchor,
        1,
        core::BORDER_CONSTANT,
        imgproc::morphology_default_border_value()?,
    )?;
    Ok(out)
}

/// Fills holes smaller than the 3x3 element inside background regions.
pub fn close(mask: &Mat) -> Result<Mat, PipelineError> {
    morph(mask, imgproc::MORPH_CLOSE)
}

/// Removes background specks smaller than the 3x3 element.
pub fn open(mask: &Mat) -> Result<Mat, PipelineError> {
    morph(mask, imgproc::MORPH_OPEN)
}

/// Gaussian blur with an odd `size`x`size` kernel; sigma is derived from the size.
pub fn feather(mask: &Mat, size: u32) -> Result<Mat, PipelineError> {
    if size <= 1 {
        return Ok(mask.try_clone()?);
    }
    let mut out = Mat::default();
    imgproc::gaussian_blur_def(mask, &mut out, core::Size::new(size as i32, size as i32), 0.0)?;
    Ok(out)
}

/// Turns background-ness into opacity: 255 becomes fully transparent.
pub fn invert(mask: &Mat) -> Result<Mat, PipelineError> {
    let mut out = Mat::default();
    core::bitwise_not(mask, &mut out, &core::no_array())?;
    Ok(out)
}

/// Closing, opening, optional feathering, then inversion into an alpha channel.
pub fn refine(mask: &Mat, feather_size: u32) -> Result<Mat, PipelineError> {
    let mut refined = open(&close(mask)?)?;
    if feather_size > 0 {
        refined = feather(&refined, feather_size)?;
    }
    invert(&refined)
}
