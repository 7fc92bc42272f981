use crate::error::PipelineError;
use image::{GrayImage, Rgba, RgbImage, RgbaImage};

/// Copies `frame`'s colors unchanged and takes the fourth channel from `alpha`.
/// Alpha is stored straight; colors are not pre-multiplied.
pub fn compose(frame: &RgbImage, alpha: &GrayImage) -> Result<RgbaImage, PipelineError> {
    if frame.dimensions() != alpha.dimensions() {
        return Err(PipelineError::DimensionMismatch {
            frame_width: frame.width(),
            frame_height: frame.height(),
            mask_width: alpha.width(),
            mask_height: alpha.height(),
        });
    }

    let mut out = RgbaImage::new(frame.width(), frame.height());
    for ((dst, src), a) in out.pixels_mut().zip(frame.pixels()).zip(alpha.pixels()) {
        *dst = Rgba([src[0], src[1], src[2], a[0]]);
    }
    Ok(out)
}
