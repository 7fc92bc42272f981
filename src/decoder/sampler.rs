use super::{Frame, FrameRead, FrameSource};
use crate::error::PipelineError;
use crate::shared::constants;
use crate::utils::logger;
use std::iter::FusedIterator;
use std::time::Duration;

/// Fixed cadence for one video, derived once from its native rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub source_fps: f64,
    pub target_rate: u32,
    pub interval: u64,
}

impl SamplingConfig {
    pub fn new(source_fps: f64, target_rate: u32) -> Result<Self, PipelineError> {
        if target_rate == 0 {
            return Err(PipelineError::InvalidConfig(
                "sample rate must be at least 1 frame per second".into(),
            ));
        }
        if !source_fps.is_finite() || source_fps <= 0.0 {
            return Err(PipelineError::source_unavailable(
                "video stream",
                format!("unusable native frame rate {}", source_fps),
            ));
        }

        // A target above the native rate floors to 0; sample every frame instead
        let interval = ((source_fps / target_rate as f64).floor() as u64).max(1);
        Ok(Self { source_fps, target_rate, interval })
    }

    pub fn is_sampled(&self, index: u64) -> bool {
        index % self.interval == 0
    }
}

/// Lazily walks a [`FrameSource`] front to back and yields every
/// `interval`-th frame. The sampler owns the source, so dropping it (after
/// exhaustion, an early `break`, or an error upstream) releases the stream.
pub struct FrameSampler<S: FrameSource> {
    source: S,
    config: SamplingConfig,
    next_index: u64,
    consecutive_faults: u32,
    faults: Vec<u64>,
    finished: bool,
}

impl<S: FrameSource> FrameSampler<S> {
    pub fn new(source: S, target_rate: u32) -> Result<Self, PipelineError> {
        let config = SamplingConfig::new(source.frame_rate(), target_rate)?;
        logger::info(&format!(
            "Sampling {} fps source at {}/s: every {} frame(s)",
            config.source_fps, config.target_rate, config.interval
        ));
        Ok(Self {
            source,
            config,
            next_index: 0,
            consecutive_faults: 0,
            faults: Vec::new(),
            finished: false,
        })
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    /// Frames pulled from the source so far, including skipped and corrupt ones.
    pub fn frames_decoded(&self) -> u64 {
        self.next_index
    }

    /// Indices of frames skipped as undecodable, in stream order. The reasons
    /// only go to the log.
    pub fn faults(&self) -> &[u64] {
        &self.faults
    }

    fn timestamp(&self, index: u64) -> Duration {
        Duration::from_secs_f64(index as f64 / self.config.source_fps)
    }
}

impl<S: FrameSource> Iterator for FrameSampler<S> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        while !self.finished {
            let index = self.next_index;
            match self.source.read_next() {
                FrameRead::End => {
                    logger::debug(&format!("End of stream after {} frames", index));
                    self.finished = true;
                }
                FrameRead::Corrupt(reason) => {
                    self.next_index += 1;
                    self.consecutive_faults += 1;
                    logger::warn(&format!("Skipping: {}", PipelineError::DecodeFault { index, reason }));
                    self.faults.push(index);

                    if self.consecutive_faults >= constants::MAX_CONSECUTIVE_DECODE_FAULTS {
                        logger::error(&format!(
                            "Giving up after {} consecutive undecodable frames (last index {})",
                            self.consecutive_faults, index
                        ));
                        self.finished = true;
                    }
                }
                FrameRead::Frame(image) => {
                    self.next_index += 1;
                    self.consecutive_faults = 0;
                    if self.config.is_sampled(index) {
                        return Some(Frame::new(index, self.timestamp(index), image));
                    }
                }
            }
        }
        None
    }
}

impl<S: FrameSource> FusedIterator for FrameSampler<S> {}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::collections::HashSet;

    /// In-memory stream; frame `i` is filled with the gray level `i % 256`.
    pub(crate) struct SyntheticSource {
        pub fps: f64,
        pub total: u64,
        pub corrupt: HashSet<u64>,
        pub position: u64,
        pub width: u32,
        pub height: u32,
    }

    impl SyntheticSource {
        pub(crate) fn new(fps: f64, total: u64) -> Self {
            Self { fps, total, corrupt: HashSet::new(), position: 0, width: 4, height: 3 }
        }
    }

    impl FrameSource for SyntheticSource {
        fn frame_rate(&self) -> f64 {
            self.fps
        }

        fn frame_count(&self) -> Option<u64> {
            Some(self.total)
        }

        fn read_next(&mut self) -> FrameRead {
            if self.position >= self.total {
                return FrameRead::End;
            }
            let index = self.position;
            self.position += 1;
            if self.corrupt.contains(&index) {
                return FrameRead::Corrupt("synthetic corruption".into());
            }
            let level = (index % 256) as u8;
            FrameRead::Frame(RgbImage::from_pixel(self.width, self.height, Rgb([level, level, level])))
        }
    }

    #[test]
    fn test_interval_from_common_rates() {
        assert_eq!(SamplingConfig::new(30.0, 6).unwrap().interval, 5);
        assert_eq!(SamplingConfig::new(24.0, 6).unwrap().interval, 4);
        assert_eq!(SamplingConfig::new(29.97, 6).unwrap().interval, 4);
    }

    #[test]
    fn test_interval_never_zero() {
        let config = SamplingConfig::new(24.0, 60).unwrap();
        assert_eq!(config.interval, 1);
        assert!((0..10).all(|i| config.is_sampled(i)));
    }

    #[test]
    fn test_rejects_bad_rates() {
        assert!(matches!(SamplingConfig::new(30.0, 0), Err(PipelineError::InvalidConfig(_))));
        assert!(matches!(
            SamplingConfig::new(0.0, 6),
            Err(PipelineError::SourceUnavailable { .. })
        ));
        assert!(SamplingConfig::new(f64::NAN, 6).is_err());
    }

    #[test]
    fn test_two_seconds_at_30fps_yields_twelve_frames() {
        let sampler = FrameSampler::new(SyntheticSource::new(30.0, 60), 6).unwrap();
        let indices: Vec<u64> = sampler.map(|f| f.index).collect();
        assert_eq!(indices, (0..60).step_by(5).collect::<Vec<u64>>());
        assert_eq!(indices.len(), 12);
        assert_eq!(*indices.last().unwrap(), 55);
    }

    #[test]
    fn test_frames_carry_pixels_and_timestamps() {
        let mut sampler = FrameSampler::new(SyntheticSource::new(30.0, 60), 6).unwrap();
        let _first = sampler.next().unwrap();
        let second = sampler.next().unwrap();
        assert_eq!(second.index, 5);
        assert_eq!(second.image.get_pixel(0, 0), &Rgb([5, 5, 5]));
        assert!((second.timestamp.as_secs_f64() - 5.0 / 30.0).abs() < 1e-9);
        assert_eq!((second.width(), second.height()), (4, 3));
    }

    #[test]
    fn test_decode_fault_is_skipped_and_recorded() {
        let mut source = SyntheticSource::new(30.0, 30);
        source.corrupt.insert(5);
        source.corrupt.insert(7);
        let mut sampler = FrameSampler::new(source, 6).unwrap();

        let indices: Vec<u64> = sampler.by_ref().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 10, 15, 20, 25]);
        assert_eq!(sampler.frames_decoded(), 30);

        assert_eq!(sampler.faults(), &[5, 7]);
    }

    #[test]
    fn test_gives_up_on_unbroken_corruption() {
        let mut source = SyntheticSource::new(30.0, 1000);
        source.corrupt.extend(1..1000);
        let mut sampler = FrameSampler::new(source, 6).unwrap();

        assert_eq!(sampler.next().map(|f| f.index), Some(0));
        assert!(sampler.next().is_none());
        let limit = constants::MAX_CONSECUTIVE_DECODE_FAULTS as u64;
        assert_eq!(sampler.faults(), (1..=limit).collect::<Vec<u64>>().as_slice());
    }

    #[test]
    fn test_sampler_is_not_restartable() {
        let mut sampler = FrameSampler::new(SyntheticSource::new(6.0, 3), 6).unwrap();
        assert_eq!(sampler.by_ref().count(), 3);
        assert!(sampler.next().is_none());
        assert!(sampler.next().is_none());
        assert_eq!(sampler.frames_decoded(), 3);
    }

    #[test]
    fn test_empty_stream_yields_nothing() {
        let mut sampler = FrameSampler::new(SyntheticSource::new(30.0, 0), 6).unwrap();
        assert!(sampler.next().is_none());
        assert_eq!(sampler.frames_decoded(), 0);
    }
}
