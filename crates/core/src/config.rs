use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_SAMPLE_RATE: u32 = 22_050;
pub const DEFAULT_FRAME_LENGTH: usize = 2048;
pub const DEFAULT_HOP_LENGTH: usize = 512;
pub const DEFAULT_TRIM_TOP_DB: f64 = 20.0;
pub const DEFAULT_PAUSE_PERCENTILE: f64 = 25.0;
pub const DEFAULT_NOISE_WINDOW_SECS: f64 = 0.5;
/// C2
pub const DEFAULT_PITCH_FMIN_HZ: f64 = 65.406;
/// C7
pub const DEFAULT_PITCH_FMAX_HZ: f64 = 2093.005;
pub const DEFAULT_PROFILE_DIR: &str = "./profiles";
pub const ENV_SAMPLE_RATE: &str = "VOICE_PERSONA_SAMPLE_RATE";
pub const ENV_PROFILE_DIR: &str = "VOICE_PERSONA_PROFILE_DIR";

/// Tunables for the preprocessing and feature-extraction stages.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    pub sample_rate: u32,
    pub frame_length: usize,
    pub hop_length: usize,
    /// Frames quieter than this many dB below the loudest frame are trimmed
    /// from both ends.
    pub trim_top_db: f64,
    pub pause_percentile: f64,
    pub noise_window_secs: f64,
    pub pitch_fmin_hz: f64,
    pub pitch_fmax_hz: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            frame_length: DEFAULT_FRAME_LENGTH,
            hop_length: DEFAULT_HOP_LENGTH,
            trim_top_db: DEFAULT_TRIM_TOP_DB,
            pause_percentile: DEFAULT_PAUSE_PERCENTILE,
            noise_window_secs: DEFAULT_NOISE_WINDOW_SECS,
            pitch_fmin_hz: DEFAULT_PITCH_FMIN_HZ,
            pitch_fmax_hz: DEFAULT_PITCH_FMAX_HZ,
        }
    }
}

impl AnalysisConfig {
    pub fn with_sample_rate(sample_rate: u32) -> Result<Self, ConfigError> {
        let cfg = Self {
            sample_rate,
            ..Self::default()
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.frame_length == 0 || self.hop_length == 0 {
            return Err(ConfigError::ZeroFrame);
        }
        if self.hop_length > self.frame_length {
            return Err(ConfigError::HopExceedsFrame {
                hop: self.hop_length,
                frame: self.frame_length,
            });
        }
        if !(0.0..=100.0).contains(&self.pause_percentile) {
            return Err(ConfigError::PercentileOutOfRange(self.pause_percentile));
        }
        if self.trim_top_db <= 0.0 {
            return Err(ConfigError::NonPositiveTopDb(self.trim_top_db));
        }
        let nyquist = f64::from(self.sample_rate) / 2.0;
        if !(self.pitch_fmin_hz > 0.0
            && self.pitch_fmin_hz < self.pitch_fmax_hz
            && self.pitch_fmax_hz < nyquist)
        {
            return Err(ConfigError::InvalidPitchBand {
                fmin: self.pitch_fmin_hz,
                fmax: self.pitch_fmax_hz,
                nyquist,
            });
        }
        // the pitch tracker needs room for at least one full period of fmin
        let longest_period = (f64::from(self.sample_rate) / self.pitch_fmin_hz).ceil() as usize;
        if longest_period >= self.frame_length {
            return Err(ConfigError::FrameTooShortForPitch {
                frame: self.frame_length,
                period: longest_period,
            });
        }
        Ok(())
    }

    /// Seconds between the starts of consecutive frames.
    pub fn hop_secs(&self) -> f64 {
        self.hop_length as f64 / f64::from(self.sample_rate)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be > 0 Hz")]
    ZeroSampleRate,
    #[error("frame and hop length must be > 0 samples")]
    ZeroFrame,
    #[error("hop length {hop} exceeds frame length {frame}")]
    HopExceedsFrame { hop: usize, frame: usize },
    #[error("pause percentile must be within [0, 100], got {0}")]
    PercentileOutOfRange(f64),
    #[error("trim threshold must be > 0 dB, got {0}")]
    NonPositiveTopDb(f64),
    #[error("pitch band {fmin}..{fmax} Hz must be positive, ordered and below nyquist ({nyquist} Hz)")]
    InvalidPitchBand { fmin: f64, fmax: f64, nyquist: f64 },
    #[error("frame length {frame} cannot hold the longest pitch period ({period} samples)")]
    FrameTooShortForPitch { frame: usize, period: usize },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// CLI value, then environment, then [`DEFAULT_SAMPLE_RATE`].
pub fn resolve_sample_rate(cli_value: Option<u32>, env: &impl Env) -> Result<u32, ConfigError> {
    match cli_value {
        Some(v) => Ok(v),
        None => match env.var(ENV_SAMPLE_RATE) {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: ENV_SAMPLE_RATE.to_owned(),
                    value: raw,
                }),
            None => Ok(DEFAULT_SAMPLE_RATE),
        },
    }
}

pub fn resolve_profile_dir(cli_value: Option<PathBuf>, env: &impl Env) -> PathBuf {
    match cli_value {
        Some(v) => v,
        None => PathBuf::from(resolve_string_with_default(
            None,
            ENV_PROFILE_DIR,
            env,
            DEFAULT_PROFILE_DIR,
        )),
    }
}

pub fn resolve_string_with_default(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
    default: &str,
) -> String {
    match cli_value {
        Some(v) => v,
        None => env.var(env_key).unwrap_or_else(|| default.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(AnalysisConfig::default().validate(), Ok(()));
    }

    #[test]
    fn hop_secs_for_defaults() {
        let cfg = AnalysisConfig::default();
        assert!((cfg.hop_secs() - 512.0 / 22_050.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_zero_sample_rate() {
        assert_eq!(
            AnalysisConfig::with_sample_rate(0),
            Err(ConfigError::ZeroSampleRate)
        );
    }

    #[test]
    fn rejects_pitch_band_above_nyquist() {
        // C7 is above nyquist at 4 kHz
        let err = AnalysisConfig::with_sample_rate(4_000).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPitchBand { .. }));
    }

    #[test]
    fn rejects_hop_longer_than_frame() {
        let cfg = AnalysisConfig {
            hop_length: 4096,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::HopExceedsFrame { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_percentile() {
        let cfg = AnalysisConfig {
            pause_percentile: 101.0,
            ..AnalysisConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::PercentileOutOfRange(101.0))
        );
    }

    #[test]
    fn rejects_frame_shorter_than_lowest_period() {
        let cfg = AnalysisConfig {
            frame_length: 256,
            hop_length: 128,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::FrameTooShortForPitch { .. })
        ));
    }

    #[test]
    fn sample_rate_cli_takes_precedence_over_env() {
        let env = MapEnv::default().with_var(ENV_SAMPLE_RATE, "16000");
        assert_eq!(resolve_sample_rate(Some(44_100), &env), Ok(44_100));
    }

    #[test]
    fn sample_rate_env_used_when_cli_missing() {
        let env = MapEnv::default().with_var(ENV_SAMPLE_RATE, "16000");
        assert_eq!(resolve_sample_rate(None, &env), Ok(16_000));
    }

    #[test]
    fn sample_rate_defaults_when_both_missing() {
        assert_eq!(
            resolve_sample_rate(None, &MapEnv::default()),
            Ok(DEFAULT_SAMPLE_RATE)
        );
    }

    #[test]
    fn sample_rate_env_garbage_is_reported() {
        let env = MapEnv::default().with_var(ENV_SAMPLE_RATE, "fast");
        assert!(matches!(
            resolve_sample_rate(None, &env),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn profile_dir_env_used_when_cli_missing() {
        let env = MapEnv::default().with_var(ENV_PROFILE_DIR, "/tmp/voices");
        assert_eq!(resolve_profile_dir(None, &env), PathBuf::from("/tmp/voices"));
        assert_eq!(
            resolve_profile_dir(None, &MapEnv::default()),
            PathBuf::from(DEFAULT_PROFILE_DIR)
        );
    }

    #[test]
    fn resolve_string_with_default_cli_takes_precedence() {
        let env = MapEnv::default().with_var(ENV_PROFILE_DIR, "env");
        let v = resolve_string_with_default(Some("cli".to_owned()), ENV_PROFILE_DIR, &env, "def");
        assert_eq!(v, "cli");
    }
}
