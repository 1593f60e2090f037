//! Maps a voice profile onto the control knobs of a Piper-style TTS engine.

use crate::features::FrameSeries;
use crate::profile::VoiceProfile;
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "synthesis";

/// Pitch (Hz) and rate (WPM) that map to an adjustment of exactly 1.0.
pub const REFERENCE_PITCH_HZ: f64 = 150.0;
pub const REFERENCE_RATE_WPM: f64 = 150.0;
pub const MIN_ADJUST: f64 = 0.5;
pub const MAX_ADJUST: f64 = 2.0;
pub const DEFAULT_ADJUST: f64 = 1.0;
pub const DEFAULT_ENERGY_LEVEL: f64 = 0.5;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SynthesisParameters {
    pub pitch_adjust: f64,
    pub speaking_rate_adjust: f64,
    /// Seconds, passed through unclamped.
    pub pause_duration: f64,
    pub energy_level: f64,
}

impl SynthesisParameters {
    /// Phoneme duration multiplier: slower speakers get values above 1.
    pub fn length_scale(&self) -> f64 {
        1.0 / self.speaking_rate_adjust
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SynthesisParameterMapper;

impl SynthesisParameterMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn pitch_adjust(&self, mean_pitch: Option<f64>) -> f64 {
        mean_pitch.map_or(DEFAULT_ADJUST, |hz| {
            (hz / REFERENCE_PITCH_HZ).clamp(MIN_ADJUST, MAX_ADJUST)
        })
    }

    pub fn speaking_rate_adjust(&self, wpm: Option<f64>) -> f64 {
        wpm.map_or(DEFAULT_ADJUST, |wpm| {
            (wpm / REFERENCE_RATE_WPM).clamp(MIN_ADJUST, MAX_ADJUST)
        })
    }

    pub fn energy_level(&self, energy: Option<&FrameSeries>) -> f64 {
        energy
            .and_then(FrameSeries::mean)
            .unwrap_or(DEFAULT_ENERGY_LEVEL)
    }

    pub fn map(
        &self,
        mean_pitch: Option<f64>,
        wpm: Option<f64>,
        average_pause_duration: f64,
        energy: Option<&FrameSeries>,
    ) -> SynthesisParameters {
        SynthesisParameters {
            pitch_adjust: self.pitch_adjust(mean_pitch),
            speaking_rate_adjust: self.speaking_rate_adjust(wpm),
            pause_duration: average_pause_duration,
            energy_level: self.energy_level(energy),
        }
    }

    pub fn map_profile(&self, profile: &VoiceProfile) -> SynthesisParameters {
        let sc = &profile.speaking;
        let params = self.map(
            Some(sc.mean_pitch),
            Some(sc.speaking_rate_wpm),
            sc.average_pause_duration,
            profile.energy_levels.as_ref(),
        );
        tracing::info!(
            target: LOG_TARGET,
            user_id = %profile.user_id,
            pitch_adjust = params.pitch_adjust,
            speaking_rate_adjust = params.speaking_rate_adjust,
            pause_duration_s = params.pause_duration,
            energy_level = params.energy_level,
            "synthesis parameters generated"
        );
        params
    }
}
