//! Cleans a decoded recording before analysis: trims leading and trailing
//! silence, peak-normalizes, and measures the noise floor.

use crate::config::AnalysisConfig;
use crate::decode::{self, DecodeError, Decoder, PcmBuffer};
use crate::util::centered_frame_power;
use std::path::Path;

const LOG_TARGET: &str = "preprocess";

/// Outcome of peak normalization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Normalization {
    /// Samples were divided by `peak`.
    Scaled { peak: f32 },
    /// Peak amplitude was zero; samples are untouched.
    Silent,
}

#[derive(Clone)]
pub struct AudioPreprocessor {
    decoder: Decoder,
    config: AnalysisConfig,
}

impl AudioPreprocessor {
    pub fn new(decoder: Decoder, config: AnalysisConfig) -> Self {
        Self { decoder, config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load → trim → normalize → noise profile. When `output_path` is given
    /// the cleaned audio is also written there as WAV.
    pub fn preprocess(
        &self,
        audio_path: &Path,
        output_path: Option<&Path>,
    ) -> Result<PcmBuffer, DecodeError> {
        tracing::info!(target: LOG_TARGET, file = %audio_path.display(), "starting preprocessing");

        let loaded = self.decoder.load(audio_path, self.config.sample_rate)?;
        let mut samples = self.trim_silence(&loaded.samples, self.config.trim_top_db);
        self.normalize(&mut samples);
        self.estimate_noise_floor(&samples, loaded.sample_rate);

        let cleaned = PcmBuffer::new(samples, loaded.sample_rate);
        if let Some(out) = output_path {
            decode::write_wav(out, &cleaned)?;
        }

        tracing::info!(
            target: LOG_TARGET,
            duration_s = cleaned.duration_secs(),
            "preprocessing complete"
        );
        Ok(cleaned)
    }

    /// Keeps the span between the first and last frame whose power is within
    /// `top_db` of the loudest frame. All-silent input trims to nothing.
    pub fn trim_silence(&self, samples: &[f32], top_db: f64) -> Vec<f32> {
        let hop = self.config.hop_length;
        let powers = centered_frame_power(samples, self.config.frame_length, hop);
        let peak = powers.iter().copied().fold(0.0f64, f64::max);
        if peak <= 0.0 {
            tracing::info!(
                target: LOG_TARGET,
                removed = samples.len(),
                "silence removal: no frame above threshold"
            );
            return Vec::new();
        }

        let loud = |p: &f64| *p > 0.0 && 10.0 * (p / peak).log10() > -top_db;
        let first = powers.iter().position(loud).unwrap_or(0);
        let last = powers.iter().rposition(loud).unwrap_or(first);

        let start = (first * hop).min(samples.len());
        let end = ((last + 1) * hop).min(samples.len()).max(start);
        let trimmed = samples[start..end].to_vec();

        tracing::info!(
            target: LOG_TARGET,
            removed = samples.len() - trimmed.len(),
            original = samples.len(),
            trimmed = trimmed.len(),
            "silence removal"
        );
        trimmed
    }

    /// Scales samples so the peak absolute amplitude is 1.0.
    pub fn normalize(&self, samples: &mut [f32]) -> Normalization {
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        if peak == 0.0 {
            tracing::warn!(target: LOG_TARGET, "audio is silent, skipping normalization");
            return Normalization::Silent;
        }
        for s in samples.iter_mut() {
            *s /= peak;
        }
        tracing::info!(target: LOG_TARGET, peak_before = peak, peak_after = 1.0, "normalized");
        Normalization::Scaled { peak }
    }

    /// RMS level in dBFS of the opening noise window, assumed to hold no
    /// speech. Only measured and logged; the signal is not altered.
    pub fn estimate_noise_floor(&self, samples: &[f32], sample_rate: u32) -> Option<f64> {
        let window =
            ((self.config.noise_window_secs * f64::from(sample_rate)) as usize).min(samples.len());
        if window == 0 {
            return None;
        }
        let power = samples[..window]
            .iter()
            .map(|&s| f64::from(s) * f64::from(s))
            .sum::<f64>()
            / window as f64;
        let db = 10.0 * power.max(1e-12).log10();
        tracing::info!(
            target: LOG_TARGET,
            window_s = self.config.noise_window_secs,
            noise_floor_db = db,
            "noise profile measured"
        );
        Some(db)
    }
}
