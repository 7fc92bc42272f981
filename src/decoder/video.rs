use super::{FrameRead, FrameSource};
use crate::error::PipelineError;
use crate::utils::logger;
use image::RgbImage;
use opencv::{core, imgproc, prelude::*, videoio};
use serde::Serialize;
use std::path::Path;

/// Container metadata reported by OpenCV when the capture opens.
#[derive(Debug, Clone, Serialize)]
pub struct VideoInfo {
    pub path: String,
    pub fps: f64,
    pub frame_count: Option<u64>,
    pub width: u32,
    pub height: u32,
}

impl VideoInfo {
    pub fn duration_secs(&self) -> Option<f64> {
        match self.frame_count {
            Some(count) if self.fps > 0.0 => Some(count as f64 / self.fps),
            _ => None,
        }
    }
}

pub struct VideoDecoder {
    capture: videoio::VideoCapture,
    info: VideoInfo,
}

impl VideoDecoder {
    pub fn open(path: &Path) -> Result<Self, PipelineError> {
        let name = path.display().to_string();
        logger::info(&format!("Opening video with OpenCV: {}", name));

        if !path.is_file() {
            return Err(PipelineError::source_unavailable(name, "no such file"));
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| PipelineError::source_unavailable(name.clone(), "path is not valid UTF-8"))?;

        // CAP_ANY lets OpenCV choose the best backend for the platform
        let capture = videoio::VideoCapture::from_file(path_str, videoio::CAP_ANY)
            .map_err(|e| PipelineError::source_unavailable(name.clone(), e))?;

        let opened = capture
            .is_opened()
            .map_err(|e| PipelineError::source_unavailable(name.clone(), e))?;
        if !opened {
            logger::error(&format!("Failed to open video file: {}", name));
            return Err(PipelineError::source_unavailable(name, "unsupported container or codec"));
        }

        let prop = |id: i32| capture.get(id).unwrap_or(0.0);
        let fps = prop(videoio::CAP_PROP_FPS);
        let count = prop(videoio::CAP_PROP_FRAME_COUNT);
        let info = VideoInfo {
            path: name,
            fps,
            // Some backends report 0 or a negative estimate for streams without an index
            frame_count: (count >= 1.0).then(|| count as u64),
            width: prop(videoio::CAP_PROP_FRAME_WIDTH) as u32,
            height: prop(videoio::CAP_PROP_FRAME_HEIGHT) as u32,
        };

        logger::info(&format!(
            "VideoCapture opened: {}x{} @ {:.3} fps, {:?} frames",
            info.width, info.height, info.fps, info.frame_count
        ));

        Ok(Self { capture, info })
    }

    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn retrieve_rgb(&mut self) -> Result<RgbImage, String> {
        let mut bgr = Mat::default();
        let ok = self.capture.retrieve(&mut bgr, 0).map_err(|e| e.to_string())?;
        if !ok || bgr.empty() {
            return Err("decoder returned an empty frame".into());
        }
        if bgr.typ() != core::CV_8UC3 {
            return Err(format!("unexpected pixel layout (type {})", bgr.typ()));
        }

        let mut rgb = Mat::default();
        imgproc::cvt_color_def(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB).map_err(|e| e.to_string())?;

        let (width, height) = (rgb.cols() as u32, rgb.rows() as u32);
        // cvt_color always allocates a fresh, continuous destination
        let bytes = rgb.data_bytes().map_err(|e| e.to_string())?;
        RgbImage::from_raw(width, height, bytes.to_vec())
            .ok_or_else(|| format!("frame buffer does not match {}x{}", width, height))
    }
}

impl FrameSource for VideoDecoder {
    fn frame_rate(&self) -> f64 {
        self.info.fps
    }

    fn frame_count(&self) -> Option<u64> {
        self.info.frame_count
    }

    fn read_next(&mut self) -> FrameRead {
        // grab() advances the stream; a failure here means there is nothing left
        match self.capture.grab() {
            Ok(true) => {}
            Ok(false) => return FrameRead::End,
            Err(e) => {
                logger::debug(&format!("grab failed, treating as end of stream: {}", e));
                return FrameRead::End;
            }
        }

        match self.retrieve_rgb() {
            Ok(image) => FrameRead::Frame(image),
            Err(reason) => FrameRead::Corrupt(reason),
        }
    }
}

impl Drop for VideoDecoder {
    fn drop(&mut self) {
        if let Err(e) = self.capture.release() {
            logger::error(&format!("Failed to release {}: {}", self.info.path, e));
        } else {
            logger::debug(&format!("Released {}", self.info.path));
        }
    }
}
