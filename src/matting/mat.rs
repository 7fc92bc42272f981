use crate::error::PipelineError;
use image::{GrayImage, RgbImage};
use opencv::{core, prelude::*};

pub fn from_rgb(image: &RgbImage) -> Result<Mat, PipelineError> {
    from_raw(image.width(), image.height(), core::CV_8UC3, image.as_raw())
}

pub fn from_gray(mask: &GrayImage) -> Result<Mat, PipelineError> {
    from_raw(mask.width(), mask.height(), core::CV_8UC1, mask.as_raw())
}

fn from_raw(width: u32, height: u32, typ: i32, data: &[u8]) -> Result<Mat, PipelineError> {
    let mut mat = Mat::new_rows_cols_with_default(height as i32, width as i32, typ, core::Scalar::all(0.0))?;
    let dst = mat.data_bytes_mut()?;
    if dst.len() != data.len() {
        return Err(layout_error(format!("{}x{} buffer holds {} bytes, Mat needs {}", width, height, data.len(), dst.len())));
    }
    dst.copy_from_slice(data);
    Ok(mat)
}

/// Copies a single-channel 8-bit Mat back into a [`GrayImage`].
pub fn to_gray(mat: &Mat) -> Result<GrayImage, PipelineError> {
    if mat.typ() != core::CV_8UC1 {
        return Err(layout_error(format!("expected an 8-bit single-channel Mat, got type {}", mat.typ())));
    }
    let (width, height) = (mat.cols() as u32, mat.rows() as u32);
    // Every imgproc output here is freshly allocated and therefore continuous
    let bytes = mat.data_bytes()?;
    GrayImage::from_raw(width, height, bytes.to_vec())
        .ok_or_else(|| layout_error(format!("{}x{} Mat yielded {} bytes", width, height, bytes.len())))
}

fn layout_error(message: String) -> PipelineError {
    opencv::Error::new(core::StsUnmatchedSizes, message).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn test_rgb_layout_survives_conversion() {
        let image = RgbImage::from_fn(3, 2, |x, y| Rgb([x as u8, y as u8, 9]));
        let mat = from_rgb(&image).unwrap();
        assert_eq!((mat.cols(), mat.rows()), (3, 2));
        assert_eq!(mat.typ(), core::CV_8UC3);
        assert_eq!(mat.data_bytes().unwrap(), image.as_raw().as_slice());
    }

    #[test]
    fn test_gray_round_trip() {
        let mask = GrayImage::from_fn(4, 3, |x, y| Luma([(x * 10 + y) as u8]));
        assert_eq!(to_gray(&from_gray(&mask).unwrap()).unwrap(), mask);
    }

    #[test]
    fn test_to_gray_rejects_color_mats() {
        let color = from_rgb(&RgbImage::new(2, 2)).unwrap();
        assert!(matches!(to_gray(&color), Err(PipelineError::ImageOp(_))));
    }
}
