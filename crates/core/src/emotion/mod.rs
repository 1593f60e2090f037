mod analyzer;
mod rules;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use analyzer::{EmotionAnalyzer, RuleBasedEmotionAnalyzer};
pub use rules::{EmotionRule, EmotionThresholds, RuleSpec, RULES};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Calm,
    Neutral,
}

impl Emotion {
    /// Scoring and tie-break order: on equal scores the earlier label wins.
    pub const ALL: [Emotion; 5] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Calm,
        Emotion::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Calm => "calm",
            Emotion::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four measurements the rule table looks at.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EmotionFeatures {
    pub mean_pitch: f64,
    /// Width of the pitch range in Hz (`max - min`).
    pub pitch_range: f64,
    pub speaking_rate_wpm: f64,
    pub avg_energy: f64,
}

/// Accumulated rule weight per label.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EmotionScores {
    pub happy: f64,
    pub sad: f64,
    pub angry: f64,
    pub calm: f64,
    pub neutral: f64,
}

impl EmotionScores {
    pub fn get(&self, emotion: Emotion) -> f64 {
        match emotion {
            Emotion::Happy => self.happy,
            Emotion::Sad => self.sad,
            Emotion::Angry => self.angry,
            Emotion::Calm => self.calm,
            Emotion::Neutral => self.neutral,
        }
    }

    pub fn add(&mut self, emotion: Emotion, weight: f64) {
        let slot = match emotion {
            Emotion::Happy => &mut self.happy,
            Emotion::Sad => &mut self.sad,
            Emotion::Angry => &mut self.angry,
            Emotion::Calm => &mut self.calm,
            Emotion::Neutral => &mut self.neutral,
        };
        *slot += weight;
    }

    pub fn total(&self) -> f64 {
        Emotion::ALL.iter().map(|&e| self.get(e)).sum()
    }

    /// Highest-scoring label, earliest in [`Emotion::ALL`] on ties.
    pub fn dominant(&self) -> (Emotion, f64) {
        Emotion::ALL
            .iter()
            .skip(1)
            .fold((Emotion::ALL[0], self.get(Emotion::ALL[0])), |best, &e| {
                let score = self.get(e);
                if score > best.1 {
                    (e, score)
                } else {
                    best
                }
            })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EmotionProfile {
    pub dominant_emotion: Emotion,
    pub confidence: f64,
    pub scores: EmotionScores,
    pub rules_triggered: Vec<EmotionRule>,
    pub features_used: EmotionFeatures,
}
