use crate::error::PipelineError;
use image::{EncodableLayout, ImageBuffer, ImageFormat, PixelWithColorType};
use std::path::Path;

/// Writes `image` losslessly as PNG, keeping an alpha channel when the pixel type has one.
pub fn save_png<P>(image: &ImageBuffer<P, Vec<P::Subpixel>>, path: &Path) -> Result<(), PipelineError>
where
    P: PixelWithColorType,
    [P::Subpixel]: EncodableLayout,
{
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| PipelineError::OutputFailed { path: path.to_path_buf(), source })
}
