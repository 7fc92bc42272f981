use crate::config::PipelineConfig;
use crate::core::output;
use crate::error::PipelineError;
use crate::matting::{BackgroundRemover, MattedFrame};
use crate::shared::constants;
use crate::utils::{file_utils, logger};
use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub input_dir: String,
    pub found: usize,
    pub processed: usize,
    pub skipped: Vec<String>,
    pub interrupted: bool,
}

impl BatchSummary {
    pub fn is_empty(&self) -> bool {
        self.found == 0
    }
}

/// Removes the white background from every image in `input_dir`, writing the
/// results to `output_dir` as `{prefix}_{n:06}.png` in sorted input order.
/// Unreadable images are logged and skipped without consuming a sequence number.
pub fn matte_directory(
    input_dir: &Path,
    output_dir: &Path,
    config: &PipelineConfig,
    running: &AtomicBool,
) -> Result<BatchSummary> {
    config.validate_output()?;
    config.validate_matting()?;
    let remover = BackgroundRemover::new(config.matting()?);

    let files = file_utils::list_files(input_dir, constants::IMAGE_EXTENSIONS)?;
    let mut summary = BatchSummary {
        input_dir: input_dir.display().to_string(),
        found: files.len(),
        ..BatchSummary::default()
    };
    if files.is_empty() {
        logger::warn(&PipelineError::EmptyInput(format!("no images found in {}", input_dir.display())).to_string());
        return Ok(summary);
    }

    file_utils::ensure_dir(output_dir)?;
    logger::info(&format!("Matting {} images from {}", files.len(), input_dir.display()));

    for path in files {
        if !running.load(Ordering::SeqCst) {
            summary.interrupted = true;
            break;
        }
        match matte_file(&remover, &path, summary.processed + 1) {
            Ok(matted) => {
                let out_path = output_dir.join(matted.file_name(&config.prefix));
                output::save_png(&matted.image, &out_path)?;
                summary.processed += 1;
                logger::debug(&format!("{} -> {}", path.display(), out_path.display()));
            }
            Err(err) => {
                logger::warn(&format!("Skipping: {}", err));
                summary.skipped.push(file_name(&path));
            }
        }
    }

    logger::info(&format!(
        "Matted {} of {} images ({} skipped)",
        summary.processed,
        summary.found,
        summary.skipped.len()
    ));
    Ok(summary)
}

fn matte_file(remover: &BackgroundRemover, path: &Path, sequence: usize) -> Result<MattedFrame, PipelineError> {
    let frame = image::open(path)
        .map_err(|e| PipelineError::source_unavailable(path.display().to_string(), e))?
        .to_rgb8();
    let image = remover.process_frame(&frame)?;
    Ok(MattedFrame { sequence, image })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::fs::{self, create_dir_all, remove_dir_all};
    use std::path::PathBuf;

    fn scratch(name: &str) -> (PathBuf, PathBuf) {
        let root = std::env::temp_dir().join(name);
        let _ = remove_dir_all(&root);
        let input = root.join("in");
        create_dir_all(&input).unwrap();
        (input, root.join("out"))
    }

    #[test]
    fn test_empty_directory_is_reported_not_failed() {
        let (input, output) = scratch("spritematte_test_batch_empty");
        fs::write(input.join("notes.txt"), "not an image").unwrap();

        let running = AtomicBool::new(true);
        let summary = matte_directory(&input, &output, &PipelineConfig::default(), &running).unwrap();
        assert!(summary.is_empty());
        assert_eq!(summary.processed, 0);
        assert!(!output.exists());

        remove_dir_all(input.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_batch_mattes_in_sorted_order_and_skips_unreadable() {
        let (input, output) = scratch("spritematte_test_batch_run");
        RgbImage::from_pixel(4, 4, Rgb([255, 255, 255])).save(input.join("b.png")).unwrap();
        RgbImage::from_pixel(4, 4, Rgb([10, 20, 30])).save(input.join("a.bmp")).unwrap();
        fs::write(input.join("c.jpg"), b"garbage").unwrap();

        let running = AtomicBool::new(true);
        let config = PipelineConfig { prefix: "sprite".into(), ..PipelineConfig::default() };
        let summary = matte_directory(&input, &output, &config, &running).unwrap();

        assert_eq!(summary.found, 3);
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.skipped, vec!["c.jpg".to_string()]);

        let first = image::open(output.join("sprite_000001.png")).unwrap().to_rgba8();
        assert!(first.pixels().all(|p| p.0 == [10, 20, 30, 255]));
        let second = image::open(output.join("sprite_000002.png")).unwrap().to_rgba8();
        assert!(second.pixels().all(|p| p.0 == [255, 255, 255, 0]));
        assert!(!output.join("sprite_000003.png").exists());

        remove_dir_all(input.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_invalid_config_fails_before_scanning() {
        let missing = std::env::temp_dir().join("spritematte_test_batch_never_scanned");
        let running = AtomicBool::new(true);
        let config = PipelineConfig { feather_radius: 2, ..PipelineConfig::default() };
        let err = matte_directory(&missing, &missing, &config, &running).unwrap_err();
        assert!(matches!(err.downcast_ref::<PipelineError>(), Some(PipelineError::InvalidConfig(_))));
    }
}
