use crate::decoder::video::VideoInfo;
use crate::decoder::{SamplingConfig, VideoDecoder};
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

/// What an extraction of this video at `sample_rate` would look like.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    #[serde(flatten)]
    pub info: VideoInfo,
    pub duration_secs: Option<f64>,
    pub sample_rate: u32,
    pub interval: u64,
    pub expected_samples: Option<u64>,
}

pub fn inspect(input: &Path, sample_rate: u32) -> Result<InspectReport> {
    let decoder = VideoDecoder::open(input)?;
    let info = decoder.info().clone();
    let sampling = SamplingConfig::new(info.fps, sample_rate)?;
    Ok(report(info, &sampling))
}

fn report(info: VideoInfo, sampling: &SamplingConfig) -> InspectReport {
    InspectReport {
        duration_secs: info.duration_secs(),
        expected_samples: info.frame_count.map(|count| count.div_ceil(sampling.interval)),
        sample_rate: sampling.target_rate,
        interval: sampling.interval,
        info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_sampled_indices() {
        let info = VideoInfo { path: "clip.mp4".into(), fps: 30.0, frame_count: Some(61), width: 64, height: 48 };
        let report = report(info, &SamplingConfig::new(30.0, 6).unwrap());
        // indices 0, 5, ..., 60
        assert_eq!(report.expected_samples, Some(13));
        assert_eq!(report.interval, 5);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["fps"], 30.0);
        assert_eq!(json["interval"], 5);
    }
}
