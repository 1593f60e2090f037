//! The emotion rule table: each row is a predicate over
//! [`EmotionFeatures`](super::EmotionFeatures) plus the weights it adds.

use super::{Emotion, EmotionFeatures};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct EmotionThresholds {
    pub high_pitch: f64,
    pub low_pitch: f64,
    pub high_range: f64,
    pub low_range: f64,
    pub fast_rate: f64,
    pub slow_rate: f64,
    pub high_energy: f64,
    pub low_energy: f64,
}

impl EmotionThresholds {
    pub const DEFAULT: Self = Self {
        high_pitch: 200.0,
        low_pitch: 130.0,
        high_range: 80.0,
        low_range: 40.0,
        fast_rate: 160.0,
        slow_rate: 110.0,
        high_energy: 45.0,
        low_energy: 35.0,
    };
}

impl Default for EmotionThresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EmotionRule {
    HighMeanPitch,
    LargePitchRange,
    FastSpeakingRate,
    HighEnergy,
    LowMeanPitch,
    SmallPitchRange,
    SlowSpeakingRate,
    LowEnergy,
    MidPitchMidRange,
    MidRateMidEnergy,
}

impl EmotionRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionRule::HighMeanPitch => "high_mean_pitch",
            EmotionRule::LargePitchRange => "large_pitch_range",
            EmotionRule::FastSpeakingRate => "fast_speaking_rate",
            EmotionRule::HighEnergy => "high_energy",
            EmotionRule::LowMeanPitch => "low_mean_pitch",
            EmotionRule::SmallPitchRange => "small_pitch_range",
            EmotionRule::SlowSpeakingRate => "slow_speaking_rate",
            EmotionRule::LowEnergy => "low_energy",
            EmotionRule::MidPitchMidRange => "mid_pitch_mid_range",
            EmotionRule::MidRateMidEnergy => "mid_rate_mid_energy",
        }
    }
}

impl fmt::Display for EmotionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Predicate = fn(&EmotionFeatures, &EmotionThresholds) -> bool;

pub struct RuleSpec {
    pub rule: EmotionRule,
    pub applies: Predicate,
    pub weights: &'static [(Emotion, f64)],
}

fn high_mean_pitch(f: &EmotionFeatures, t: &EmotionThresholds) -> bool {
    f.mean_pitch > t.high_pitch
}

fn large_pitch_range(f: &EmotionFeatures, t: &EmotionThresholds) -> bool {
    f.pitch_range > t.high_range
}

fn fast_speaking_rate(f: &EmotionFeatures, t: &EmotionThresholds) -> bool {
    f.speaking_rate_wpm > t.fast_rate
}

fn high_energy(f: &EmotionFeatures, t: &EmotionThresholds) -> bool {
    f.avg_energy > t.high_energy
}

fn low_mean_pitch(f: &EmotionFeatures, t: &EmotionThresholds) -> bool {
    f.mean_pitch < t.low_pitch
}

fn small_pitch_range(f: &EmotionFeatures, t: &EmotionThresholds) -> bool {
    f.pitch_range < t.low_range
}

fn slow_speaking_rate(f: &EmotionFeatures, t: &EmotionThresholds) -> bool {
    f.speaking_rate_wpm < t.slow_rate
}

fn low_energy(f: &EmotionFeatures, t: &EmotionThresholds) -> bool {
    f.avg_energy < t.low_energy
}

fn mid_pitch_mid_range(f: &EmotionFeatures, t: &EmotionThresholds) -> bool {
    (t.low_pitch..=t.high_pitch).contains(&f.mean_pitch)
        && (t.low_range..=t.high_range).contains(&f.pitch_range)
}

fn mid_rate_mid_energy(f: &EmotionFeatures, t: &EmotionThresholds) -> bool {
    f.speaking_rate_wpm > t.slow_rate
        && f.speaking_rate_wpm < t.fast_rate
        && f.avg_energy > t.low_energy
        && f.avg_energy < t.high_energy
}

/// Evaluated top to bottom; every matching row contributes, and triggered
/// rules are reported in this order.
pub static RULES: [RuleSpec; 10] = [
    RuleSpec {
        rule: EmotionRule::HighMeanPitch,
        applies: high_mean_pitch,
        weights: &[(Emotion::Happy, 1.0), (Emotion::Angry, 0.5)],
    },
    RuleSpec {
        rule: EmotionRule::LargePitchRange,
        applies: large_pitch_range,
        weights: &[(Emotion::Happy, 1.0), (Emotion::Angry, 1.0)],
    },
    RuleSpec {
        rule: EmotionRule::FastSpeakingRate,
        applies: fast_speaking_rate,
        weights: &[(Emotion::Happy, 0.5), (Emotion::Angry, 0.5)],
    },
    RuleSpec {
        rule: EmotionRule::HighEnergy,
        applies: high_energy,
        weights: &[(Emotion::Happy, 0.5), (Emotion::Angry, 1.0)],
    },
    RuleSpec {
        rule: EmotionRule::LowMeanPitch,
        applies: low_mean_pitch,
        weights: &[(Emotion::Sad, 1.0)],
    },
    RuleSpec {
        rule: EmotionRule::SmallPitchRange,
        applies: small_pitch_range,
        weights: &[(Emotion::Sad, 0.5), (Emotion::Calm, 0.5)],
    },
    RuleSpec {
        rule: EmotionRule::SlowSpeakingRate,
        applies: slow_speaking_rate,
        weights: &[(Emotion::Sad, 0.5), (Emotion::Calm, 0.5)],
    },
    RuleSpec {
        rule: EmotionRule::LowEnergy,
        applies: low_energy,
        weights: &[(Emotion::Sad, 0.5), (Emotion::Calm, 0.5)],
    },
    RuleSpec {
        rule: EmotionRule::MidPitchMidRange,
        applies: mid_pitch_mid_range,
        weights: &[(Emotion::Neutral, 0.5)],
    },
    RuleSpec {
        rule: EmotionRule::MidRateMidEnergy,
        applies: mid_rate_mid_energy,
        weights: &[(Emotion::Calm, 0.5), (Emotion::Neutral, 0.5)],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn features(mean_pitch: f64, pitch_range: f64, rate: f64, energy: f64) -> EmotionFeatures {
        EmotionFeatures {
            mean_pitch,
            pitch_range,
            speaking_rate_wpm: rate,
            avg_energy: energy,
        }
    }

    fn triggered(f: &EmotionFeatures) -> Vec<EmotionRule> {
        RULES
            .iter()
            .filter(|r| (r.applies)(f, &EmotionThresholds::DEFAULT))
            .map(|r| r.rule)
            .collect()
    }

    #[test]
    fn table_rows_are_unique() {
        let mut seen = std::collections::HashSet::new();
        assert!(RULES.iter().all(|r| seen.insert(r.rule)));
    }

    #[test]
    fn mid_band_bounds_are_inclusive() {
        let t = triggered(&features(130.0, 80.0, 150.0, 40.0));
        assert!(t.contains(&EmotionRule::MidPitchMidRange));
        let t = triggered(&features(200.0, 40.0, 150.0, 40.0));
        assert!(t.contains(&EmotionRule::MidPitchMidRange));
    }

    #[test]
    fn mid_rate_bounds_are_exclusive() {
        assert!(!triggered(&features(150.0, 60.0, 110.0, 40.0))
            .contains(&EmotionRule::MidRateMidEnergy));
        assert!(!triggered(&features(150.0, 60.0, 150.0, 45.0))
            .contains(&EmotionRule::MidRateMidEnergy));
        assert!(triggered(&features(150.0, 60.0, 150.0, 40.0))
            .contains(&EmotionRule::MidRateMidEnergy));
    }

    #[test]
    fn thresholds_themselves_trigger_no_extreme_rule() {
        let t = triggered(&features(200.0, 80.0, 160.0, 45.0));
        assert_eq!(t, vec![EmotionRule::MidPitchMidRange]);
    }

    #[test]
    fn rule_ids_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&EmotionRule::MidRateMidEnergy).unwrap(),
            "\"mid_rate_mid_energy\""
        );
        assert_eq!(EmotionRule::LargePitchRange.to_string(), "large_pitch_range");
    }
}
