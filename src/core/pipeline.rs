use crate::config::PipelineConfig;
use crate::core::extractor::{self, ExtractSummary};
use crate::core::output;
use crate::decoder::{FrameSource, VideoDecoder};
use crate::matting::{BackgroundRemover, MattedFrame};
use crate::utils::{file_utils, logger};
use anyhow::Result;
use std::path::Path;
use std::sync::atomic::AtomicBool;

/// Samples `input` and mattes each sampled frame in-process, one frame at a time.
/// With `raw_dir` set the unmatted frames are kept there under the same numbers.
pub fn process_video(
    input: &Path,
    output_dir: &Path,
    raw_dir: Option<&Path>,
    config: &PipelineConfig,
    running: &AtomicBool,
) -> Result<ExtractSummary> {
    config.validate()?;
    let decoder = VideoDecoder::open(input)?;
    process_source(decoder, &input.display().to_string(), output_dir, raw_dir, config, running)
}

pub(crate) fn process_source<S: FrameSource>(
    source: S,
    source_name: &str,
    output_dir: &Path,
    raw_dir: Option<&Path>,
    config: &PipelineConfig,
    running: &AtomicBool,
) -> Result<ExtractSummary> {
    let remover = BackgroundRemover::new(config.matting()?);
    file_utils::ensure_dir(output_dir)?;
    if let Some(dir) = raw_dir {
        file_utils::ensure_dir(dir)?;
    }

    extractor::sample_into(source, source_name, config.sample_rate, running, |frame, seq| {
        let name = file_utils::sequence_file_name(&config.prefix, seq);
        if let Some(dir) = raw_dir {
            output::save_png(&frame.image, &dir.join(&name))?;
        }

        let matted = MattedFrame { sequence: seq, image: remover.process_frame(&frame.image)? };
        let path = output_dir.join(matted.file_name(&config.prefix));
        output::save_png(&matted.image, &path)?;
        logger::debug(&format!("Matted frame {} -> {}", frame.index, path.display()));
        Ok(())
    })
}
