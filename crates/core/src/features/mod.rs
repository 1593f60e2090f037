mod energy;
mod pauses;
mod pitch;
mod rate;

use crate::config::AnalysisConfig;
use crate::decode::PcmBuffer;
use crate::util::stats;
use serde::{Deserialize, Serialize};

pub use energy::{FrameEnergyProvider, LogEnergyProvider, ENERGY_FLOOR_DB};
pub use pauses::PauseSegmenter;
pub use pitch::{PitchContourProvider, PitchTrack, YinPitchTracker};
pub use rate::{SpeakingRateEstimator, WORDS_PER_SECOND};

const LOG_TARGET: &str = "features";

/// Per-frame log-energy values (dB) with the framing that produced them.
/// Frame `i` starts at `i * hop_length / sample_rate` seconds.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FrameSeries {
    pub values: Vec<f64>,
    pub frame_length: usize,
    pub hop_length: usize,
    pub sample_rate: u32,
}

impl FrameSeries {
    pub fn new(values: Vec<f64>, frame_length: usize, hop_length: usize, sample_rate: u32) -> Self {
        Self {
            values,
            frame_length,
            hop_length,
            sample_rate,
        }
    }

    pub fn time_at(&self, index: usize) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        (index * self.hop_length) as f64 / f64::from(self.sample_rate)
    }

    pub fn mean(&self) -> Option<f64> {
        stats::mean(&self.values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct PitchStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

/// Voiced-frame pitch values (Hz). Only constructible from at least one
/// voiced frame.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PitchContour {
    values: Vec<f64>,
    stats: PitchStats,
}

impl PitchContour {
    /// `None` when `values` is empty.
    pub fn from_voiced(values: Vec<f64>) -> Option<Self> {
        let (min, max) = stats::min_max(&values)?;
        let mean = stats::mean(&values)?;
        let std_dev = stats::std_dev(&values)?;
        Some(Self {
            values,
            stats: PitchStats {
                min,
                max,
                mean,
                std_dev,
            },
        })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn stats(&self) -> PitchStats {
        self.stats
    }
}

/// Lowest and highest voiced pitch, persisted as `[min, max]`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct PitchRange(pub f64, pub f64);

impl PitchRange {
    pub fn min(&self) -> f64 {
        self.0
    }

    pub fn max(&self) -> f64 {
        self.1
    }

    pub fn span(&self) -> f64 {
        self.1 - self.0
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Pause {
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
}

impl Pause {
    pub fn new(start_time: f64, end_time: f64) -> Self {
        Self {
            start_time,
            end_time,
            duration: end_time - start_time,
        }
    }
}

/// Everything measured from one recording.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SpeakingPattern {
    pub speaking_rate_wpm: f64,
    pub average_pause_duration: f64,
    pub pauses: Vec<Pause>,
    pub energy_levels: FrameSeries,
    pub pitch_contour: PitchContour,
}

impl SpeakingPattern {
    pub fn mean_pitch(&self) -> f64 {
        self.pitch_contour.stats().mean
    }

    pub fn pitch_range(&self) -> PitchRange {
        let s = self.pitch_contour.stats();
        PitchRange(s.min, s.max)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FeatureError {
    #[error("no voiced frames detected, possibly silent audio")]
    NoVoicedFrames,
}

pub struct FeatureExtractor {
    energy: Box<dyn FrameEnergyProvider>,
    pitch: Box<dyn PitchContourProvider>,
    pauses: PauseSegmenter,
    rate: SpeakingRateEstimator,
}

impl FeatureExtractor {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self::with_providers(
            Box::new(LogEnergyProvider::new(config.frame_length, config.hop_length)),
            Box::new(YinPitchTracker::new(
                config.frame_length,
                config.hop_length,
                config.pitch_fmin_hz,
                config.pitch_fmax_hz,
            )),
            PauseSegmenter::new(config.pause_percentile),
        )
    }

    pub fn with_providers(
        energy: Box<dyn FrameEnergyProvider>,
        pitch: Box<dyn PitchContourProvider>,
        pauses: PauseSegmenter,
    ) -> Self {
        Self {
            energy,
            pitch,
            pauses,
            rate: SpeakingRateEstimator::default(),
        }
    }

    /// Energy → pitch → pauses → speaking rate.
    pub fn extract_all(&self, audio: &PcmBuffer) -> Result<SpeakingPattern, FeatureError> {
        tracing::info!(target: LOG_TARGET, samples = audio.len(), "starting feature extraction");

        let energy_levels = self.energy.frame_log_energy(&audio.samples, audio.sample_rate);

        let track = self.pitch.track_pitch(&audio.samples, audio.sample_rate);
        let Some(pitch_contour) = PitchContour::from_voiced(track.voiced_values()) else {
            tracing::warn!(target: LOG_TARGET, "no pitch detected, possibly silent audio");
            return Err(FeatureError::NoVoicedFrames);
        };
        let ps = pitch_contour.stats();
        tracing::info!(
            target: LOG_TARGET,
            voiced_frames = pitch_contour.values().len(),
            total_frames = track.len(),
            mean_hz = ps.mean,
            min_hz = ps.min,
            max_hz = ps.max,
            std_hz = ps.std_dev,
            "pitch extracted"
        );

        let pauses = self.pauses.segment(&energy_levels);
        let durations: Vec<f64> = pauses.iter().map(|p| p.duration).collect();
        let speaking_rate_wpm = self.rate.estimate(audio.duration_secs(), &durations);
        let average_pause_duration = stats::mean(&durations).unwrap_or(0.0);

        tracing::info!(target: LOG_TARGET, "all features extracted");
        Ok(SpeakingPattern {
            speaking_rate_wpm,
            average_pause_duration,
            pauses,
            energy_levels,
            pitch_contour,
        })
    }
}
