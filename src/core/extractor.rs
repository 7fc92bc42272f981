use crate::config::PipelineConfig;
use crate::core::output;
use crate::decoder::{Frame, FrameSampler, FrameSource, VideoDecoder};
use crate::error::PipelineError;
use crate::utils::{file_utils, logger};
use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
pub struct ExtractSummary {
    pub source: String,
    pub fps: f64,
    pub total_frames: Option<u64>,
    pub interval: u64,
    pub frames_decoded: u64,
    pub frames_saved: usize,
    pub decode_faults: Vec<u64>,
    pub interrupted: bool,
    pub elapsed_ms: u64,
}

impl ExtractSummary {
    pub fn is_empty(&self) -> bool {
        self.frames_saved == 0
    }
}

/// Drives a sampler over `source` and hands each sampled frame to `handle`
/// together with its 1-based output sequence number. Stops early (and releases
/// the source) once `running` is cleared.
pub fn sample_into<S, F>(
    source: S,
    source_name: &str,
    sample_rate: u32,
    running: &AtomicBool,
    mut handle: F,
) -> Result<ExtractSummary>
where
    S: FrameSource,
    F: FnMut(&Frame, usize) -> Result<()>,
{
    let start = Instant::now();
    let total_frames = source.frame_count();
    let mut sampler = FrameSampler::new(source, sample_rate).map_err(|err| match err {
        PipelineError::SourceUnavailable { reason, .. } => PipelineError::source_unavailable(source_name, reason),
        other => other,
    })?;
    let config = *sampler.config();

    let mut saved = 0usize;
    let mut interrupted = false;
    for frame in sampler.by_ref() {
        if !running.load(Ordering::SeqCst) {
            logger::info(&format!("Interrupted before frame {}", frame.index));
            interrupted = true;
            break;
        }
        handle(&frame, saved + 1)?;
        saved += 1;
        logger::debug(&format!(
            "Sampled frame {} ({}x{} @ {:.3}s) as #{}",
            frame.index,
            frame.width(),
            frame.height(),
            frame.timestamp.as_secs_f64(),
            saved
        ));
    }

    let summary = ExtractSummary {
        source: source_name.to_string(),
        fps: config.source_fps,
        total_frames,
        interval: config.interval,
        frames_decoded: sampler.frames_decoded(),
        frames_saved: saved,
        decode_faults: sampler.faults().to_vec(),
        interrupted,
        elapsed_ms: start.elapsed().as_millis() as u64,
    };
    drop(sampler);

    if summary.is_empty() && !interrupted {
        logger::warn(&PipelineError::EmptyInput(format!("no frames sampled from {}", source_name)).to_string());
    }
    logger::info(&format!(
        "{}: saved {} of {} decoded frames ({} faults) in {}ms",
        source_name,
        summary.frames_saved,
        summary.frames_decoded,
        summary.decode_faults.len(),
        summary.elapsed_ms
    ));
    Ok(summary)
}

/// Samples `input` and writes the raw frames as sequentially numbered PNGs.
pub fn extract_frames(
    input: &Path,
    output_dir: &Path,
    config: &PipelineConfig,
    running: &AtomicBool,
) -> Result<ExtractSummary> {
    config.validate_sampling()?;
    config.validate_output()?;
    let decoder = VideoDecoder::open(input)?;
    file_utils::ensure_dir(output_dir)?;
    extract_from(decoder, &input.display().to_string(), output_dir, config, running)
}

pub(crate) fn extract_from<S: FrameSource>(
    source: S,
    source_name: &str,
    output_dir: &Path,
    config: &PipelineConfig,
    running: &AtomicBool,
) -> Result<ExtractSummary> {
    sample_into(source, source_name, config.sample_rate, running, |frame, seq| {
        let path = output_dir.join(file_utils::sequence_file_name(&config.prefix, seq));
        output::save_png(&frame.image, &path)?;
        logger::debug(&format!("Saved frame {} -> {}", frame.index, path.display()));
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::sampler::tests::SyntheticSource;
    use std::fs::{create_dir_all, remove_dir_all};

    #[test]
    fn test_extract_writes_one_png_per_sample() {
        let tmp_dir = std::env::temp_dir().join("spritematte_test_extract");
        let _ = remove_dir_all(&tmp_dir);
        create_dir_all(&tmp_dir).unwrap();

        let running = AtomicBool::new(true);
        let summary = extract_from(
            SyntheticSource::new(30.0, 60),
            "synthetic",
            &tmp_dir,
            &PipelineConfig::default(),
            &running,
        )
        .unwrap();

        assert_eq!(summary.interval, 5);
        assert_eq!(summary.frames_saved, 12);
        assert_eq!(summary.frames_decoded, 60);
        assert_eq!(summary.total_frames, Some(60));
        assert!(!summary.interrupted);

        let files = file_utils::list_files(&tmp_dir, &["png"]).unwrap();
        assert_eq!(files.len(), 12);
        assert!(files[0].ends_with("frame_000001.png"));
        assert!(files[11].ends_with("frame_000012.png"));

        // Frame #3 is source index 10, filled with gray level 10
        let third = image::open(&files[2]).unwrap().to_rgb8();
        assert_eq!(third.get_pixel(0, 0)[0], 10);

        remove_dir_all(&tmp_dir).unwrap();
    }

    #[test]
    fn test_sample_into_skips_faults_and_numbers_contiguously() {
        let mut source = SyntheticSource::new(30.0, 60);
        source.corrupt.insert(10);
        let running = AtomicBool::new(true);
        let mut seen = Vec::new();

        let summary = sample_into(source, "synthetic", 6, &running, |frame, seq| {
            seen.push((seq, frame.index));
            Ok(())
        })
        .unwrap();

        assert_eq!(summary.decode_faults, vec![10]);
        assert_eq!(summary.frames_saved, 11);
        assert_eq!(seen[..3], [(1, 0), (2, 5), (3, 15)]);
    }

    #[test]
    fn test_stop_flag_halts_before_first_frame() {
        let running = AtomicBool::new(false);
        let summary = sample_into(SyntheticSource::new(30.0, 60), "synthetic", 6, &running, |_, _| {
            panic!("no frame should be handled")
        })
        .unwrap();
        assert!(summary.interrupted);
        assert!(summary.is_empty());
        assert_eq!(summary.frames_decoded, 1);
    }

    #[test]
    fn test_handler_error_aborts_run() {
        let running = AtomicBool::new(true);
        let result = sample_into(SyntheticSource::new(30.0, 60), "synthetic", 6, &running, |_, seq| {
            if seq == 2 {
                anyhow::bail!("disk full");
            }
            Ok(())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_unusable_frame_rate_names_the_source() {
        let running = AtomicBool::new(true);
        let err = sample_into(SyntheticSource::new(0.0, 60), "clip.mp4", 6, &running, |_, _| Ok(()))
            .unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::SourceUnavailable { source_name, .. }) => assert_eq!(source_name, "clip.mp4"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_extract_does_not_check_matting_parameters() {
        let missing = std::env::temp_dir().join("spritematte_test_extract_missing.mp4");
        let _ = std::fs::remove_file(&missing);
        let config = PipelineConfig { feather_radius: 4, ..PipelineConfig::default() };
        let running = AtomicBool::new(true);

        // Gets past validation and fails on the missing file instead
        let err = extract_frames(&missing, &std::env::temp_dir(), &config, &running).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_invalid_rate_fails_before_decoding() {
        let running = AtomicBool::new(true);
        let err = sample_into(SyntheticSource::new(30.0, 60), "synthetic", 0, &running, |_, _| Ok(()))
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<PipelineError>(), Some(PipelineError::InvalidConfig(_))));
    }
}
