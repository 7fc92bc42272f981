pub const APP_NAME: &str = "spritematte";

pub const ERROR_LOG_FILE: &str = "error.log";
pub const DEBUG_LOG_FILE: &str = "debug.log";

pub const DEFAULT_SAMPLE_RATE: u32 = 6;
pub const DEFAULT_TOLERANCE: u32 = 30;
pub const DEFAULT_FEATHER_RADIUS: u32 = 5;
pub const MAX_TOLERANCE: u32 = 100;

pub const DEFAULT_OUTPUT_PREFIX: &str = "frame";
pub const OUTPUT_EXTENSION: &str = "png";
pub const SEQUENCE_DIGITS: usize = 6;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff"];

/// Consecutive unreadable frames after which a stream is treated as exhausted.
pub const MAX_CONSECUTIVE_DECODE_FAULTS: u32 = 32;
