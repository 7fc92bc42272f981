use crate::error::PipelineError;
use crate::matting::MattingConfig;
use crate::shared::constants;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunables shared by every command. Values come from an optional JSON file,
/// then CLI flags override them field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub sample_rate: u32,
    pub tolerance: u32,
    pub feather_radius: u32,
    pub prefix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: constants::DEFAULT_SAMPLE_RATE,
            tolerance: constants::DEFAULT_TOLERANCE,
            feather_radius: constants::DEFAULT_FEATHER_RADIUS,
            prefix: constants::DEFAULT_OUTPUT_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub sample_rate: Option<u32>,
    pub tolerance: Option<u32>,
    pub feather_radius: Option<u32>,
    pub prefix: Option<String>,
}

impl PipelineConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(rate) = overrides.sample_rate {
            self.sample_rate = rate;
        }
        if let Some(tolerance) = overrides.tolerance {
            self.tolerance = tolerance;
        }
        if let Some(radius) = overrides.feather_radius {
            self.feather_radius = radius;
        }
        if let Some(prefix) = overrides.prefix {
            self.prefix = prefix;
        }
        self
    }

    pub fn matting(&self) -> Result<MattingConfig, PipelineError> {
        MattingConfig::new(self.tolerance, self.feather_radius)
    }

    pub fn validate_sampling(&self) -> Result<(), PipelineError> {
        if self.sample_rate == 0 {
            return Err(PipelineError::InvalidConfig("sample rate must be at least 1".into()));
        }
        Ok(())
    }

    pub fn validate_output(&self) -> Result<(), PipelineError> {
        if self.prefix.is_empty() || self.prefix.contains(&['/', '\\'][..]) {
            return Err(PipelineError::InvalidConfig(format!(
                "output prefix {:?} must be a non-empty file name fragment",
                self.prefix
            )));
        }
        Ok(())
    }

    pub fn validate_matting(&self) -> Result<(), PipelineError> {
        self.matting().map(|_| ())
    }

    /// Checks everything the full sample-and-matte run needs before the first frame is touched.
    /// Commands that only sample or only matte check their own subset.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.validate_sampling()?;
        self.validate_output()?;
        self.validate_matting()
    }
}
