use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the sampling and matting core.
///
/// `DecodeFault` is per-frame and never aborts a run on its own; the sampler
/// records it and moves on. `EmptyInput` is a zero-work completion that the
/// commands report rather than fail on.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot open {source_name}: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("frame {index} failed to decode: {reason}")]
    DecodeFault { index: u64, reason: String },

    #[error("nothing to process: {0}")]
    EmptyInput(String),

    #[error("alpha mask is {mask_width}x{mask_height} but frame is {frame_width}x{frame_height}")]
    DimensionMismatch {
        frame_width: u32,
        frame_height: u32,
        mask_width: u32,
        mask_height: u32,
    },

    #[error("image operation failed: {0}")]
    ImageOp(#[from] opencv::Error),

    #[error("failed to write {}", path.display())]
    OutputFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl PipelineError {
    pub fn source_unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}
