mod store;

use crate::emotion::{EmotionFeatures, EmotionProfile};
use crate::features::{FrameSeries, PitchContour, PitchRange, SpeakingPattern};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub use store::{load_profile_file, save_profile_file, ProfileStore};

/// The persisted summary of how someone speaks.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SpeakingCharacteristics {
    pub speaking_rate_wpm: f64,
    pub average_pause_duration: f64,
    pub mean_pitch: f64,
    pub pitch_range: PitchRange,
}

impl SpeakingCharacteristics {
    pub fn from_pattern(pattern: &SpeakingPattern) -> Self {
        Self {
            speaking_rate_wpm: pattern.speaking_rate_wpm,
            average_pause_duration: pattern.average_pause_duration,
            mean_pitch: pattern.mean_pitch(),
            pitch_range: pattern.pitch_range(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VoiceProfile {
    pub user_id: String,
    pub user_name: String,
    pub created_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub speaking: SpeakingCharacteristics,
    pub emotion_profile: EmotionProfile,
    /// Raw energy trace; only present on profiles built from audio.
    pub energy_levels: Option<FrameSeries>,
    /// Voiced pitch values; only present on profiles built from audio.
    pub pitch_contour: Option<PitchContour>,
}

impl VoiceProfile {
    pub fn from_pattern(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        pattern: SpeakingPattern,
        emotion_profile: EmotionProfile,
    ) -> Self {
        let now = Utc::now();
        let speaking = SpeakingCharacteristics::from_pattern(&pattern);
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            created_date: now,
            last_updated: now,
            speaking,
            emotion_profile,
            energy_levels: Some(pattern.energy_levels),
            pitch_contour: Some(pattern.pitch_contour),
        }
    }

    pub fn to_record(&self) -> ProfileRecord {
        ProfileRecord {
            user_id: self.user_id.clone(),
            user_name: self.user_name.clone(),
            created_date: self.created_date,
            last_updated: self.last_updated,
            speaking_characteristics: self.speaking.clone(),
            emotion_profile: self.emotion_profile.clone(),
        }
    }

    /// Raw traces are not part of the record, so they come back as `None`.
    pub fn from_record(record: ProfileRecord) -> Self {
        Self {
            user_id: record.user_id,
            user_name: record.user_name,
            created_date: record.created_date,
            last_updated: record.last_updated,
            speaking: record.speaking_characteristics,
            emotion_profile: record.emotion_profile,
            energy_levels: None,
            pitch_contour: None,
        }
    }
}

/// Derives the emotion-rule inputs from profile measurements. Missing energy
/// counts as 0.
pub fn emotion_features(
    speaking: &SpeakingCharacteristics,
    energy: Option<&FrameSeries>,
) -> EmotionFeatures {
    EmotionFeatures {
        mean_pitch: speaking.mean_pitch,
        pitch_range: speaking.pitch_range.span(),
        speaking_rate_wpm: speaking.speaking_rate_wpm,
        avg_energy: energy.and_then(FrameSeries::mean).unwrap_or(0.0),
    }
}

/// On-disk shape of a profile.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProfileRecord {
    pub user_id: String,
    pub user_name: String,
    pub created_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub speaking_characteristics: SpeakingCharacteristics,
    pub emotion_profile: EmotionProfile,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProfileFormat {
    Json,
    Yaml,
}

impl ProfileFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ProfileFormat::Json => "json",
            ProfileFormat::Yaml => "yaml",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "json" => Some(ProfileFormat::Json),
            "yaml" => Some(ProfileFormat::Yaml),
            _ => None,
        }
    }
}

impl FromStr for ProfileFormat {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(&s.to_ascii_lowercase())
            .ok_or_else(|| ProfileError::UnsupportedFormat(s.to_owned()))
    }
}

impl fmt::Display for ProfileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ProfileError {
    #[error("no profile found for user {0}")]
    NotFound(String),
    #[error("user id {0:?} cannot be used as a profile file name")]
    InvalidUserId(String),
    #[error("unsupported profile format: {0}")]
    UnsupportedFormat(String),
    #[error("profile io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid json profile: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid yaml profile: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
