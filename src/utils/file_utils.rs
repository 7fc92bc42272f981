use crate::shared::constants;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Lists regular files in `dir` whose extension matches one of `extensions`
/// (case-insensitive), sorted by path. An empty result is not an error here;
/// callers decide how to report it.
pub fn list_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_extension(path, extensions))
        .collect();

    // Zero-padded names sort in capture order
    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// `frame_000001.png` style name for the `n`-th written file (1-based).
pub fn sequence_file_name(prefix: &str, n: usize) -> String {
    format!(
        "{}_{:0width$}.{}",
        prefix,
        n,
        constants::OUTPUT_EXTENSION,
        width = constants::SEQUENCE_DIGITS
    )
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create directory: {}", dir.display()))
}
