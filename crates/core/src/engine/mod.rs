use crate::config::{AnalysisConfig, ConfigError};
use crate::decode::{AudioLoader, DecodeError, Decoder, SymphoniaAudioLoader};
use crate::emotion::{EmotionAnalyzer, RuleBasedEmotionAnalyzer};
use crate::features::{FeatureError, FeatureExtractor};
use crate::preprocess::AudioPreprocessor;
use crate::profile::{
    emotion_features, load_profile_file, save_profile_file, ProfileError, ProfileFormat,
    ProfileStore, SpeakingCharacteristics, VoiceProfile,
};
use crate::synthesis::{SynthesisParameterMapper, SynthesisParameters};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const LOG_TARGET: &str = "engine";

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("audio load failed: {0}")]
    AudioLoad(#[from] DecodeError),
    #[error("feature extraction failed: {0}")]
    Features(#[from] FeatureError),
}

/// Builds voice profiles from recordings and owns them for the session.
pub struct PersonalizationEngine {
    config: AnalysisConfig,
    preprocessor: AudioPreprocessor,
    extractor: FeatureExtractor,
    analyzer: Box<dyn EmotionAnalyzer>,
    mapper: SynthesisParameterMapper,
    profiles: ProfileStore,
}

impl PersonalizationEngine {
    pub fn new(config: AnalysisConfig) -> Result<Self, EngineError> {
        Self::with_loader(config, Arc::new(SymphoniaAudioLoader::new()))
    }

    pub fn with_loader(
        config: AnalysisConfig,
        loader: Arc<dyn AudioLoader>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let extractor = FeatureExtractor::new(&config);
        Ok(Self::from_parts(
            config.clone(),
            AudioPreprocessor::new(Decoder::new(loader), config),
            extractor,
            Box::new(RuleBasedEmotionAnalyzer::new()),
        ))
    }

    pub fn from_parts(
        config: AnalysisConfig,
        preprocessor: AudioPreprocessor,
        extractor: FeatureExtractor,
        analyzer: Box<dyn EmotionAnalyzer>,
    ) -> Self {
        tracing::info!(target: LOG_TARGET, sample_rate = config.sample_rate, "engine initialized");
        Self {
            config,
            preprocessor,
            extractor,
            analyzer,
            mapper: SynthesisParameterMapper::new(),
            profiles: ProfileStore::new(),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    /// Preprocesses `audio_path`, extracts features, infers the emotion
    /// profile and stores the result under `user_id`, replacing any earlier
    /// profile for that user.
    pub fn create_voice_profile(
        &mut self,
        user_id: &str,
        user_name: &str,
        audio_path: &Path,
    ) -> Result<&VoiceProfile, EngineError> {
        self.create_voice_profile_with_cleaned_audio(user_id, user_name, audio_path, None)
    }

    /// Like [`create_voice_profile`](Self::create_voice_profile), also
    /// writing the cleaned audio to `cleaned_output` when given.
    pub fn create_voice_profile_with_cleaned_audio(
        &mut self,
        user_id: &str,
        user_name: &str,
        audio_path: &Path,
        cleaned_output: Option<&Path>,
    ) -> Result<&VoiceProfile, EngineError> {
        tracing::info!(target: LOG_TARGET, user_id, user_name, "creating voice profile");

        let audio = self
            .preprocessor
            .preprocess(audio_path, cleaned_output)
            .inspect_err(|e| tracing::error!(target: LOG_TARGET, user_id, error = %e, "audio load failed"))?;

        let pattern = self.extractor.extract_all(&audio)?;

        let speaking = SpeakingCharacteristics::from_pattern(&pattern);
        let features = emotion_features(&speaking, Some(&pattern.energy_levels));
        let emotion = self.analyzer.analyze(&features);
        let profile = VoiceProfile::from_pattern(user_id, user_name, pattern, emotion);

        tracing::info!(target: LOG_TARGET, user_id, "voice profile created");
        Ok(self.profiles.upsert(profile))
    }

    pub fn profile(&self, user_id: &str) -> Option<&VoiceProfile> {
        self.profiles.get(user_id)
    }

    /// `None` when no profile is stored for `user_id`.
    pub fn synthesis_parameters(&self, user_id: &str) -> Option<SynthesisParameters> {
        let Some(profile) = self.profiles.get(user_id) else {
            tracing::warn!(target: LOG_TARGET, user_id, "no profile found");
            return None;
        };
        Some(self.mapper.map_profile(profile))
    }

    pub fn save_profile(
        &self,
        user_id: &str,
        output_dir: &Path,
        format: ProfileFormat,
    ) -> Result<PathBuf, ProfileError> {
        let profile = self
            .profiles
            .get(user_id)
            .ok_or_else(|| ProfileError::NotFound(user_id.to_owned()))?;
        save_profile_file(profile, output_dir, format)
    }

    /// Loads a saved profile and stores it, replacing any profile with the
    /// same `user_id`.
    pub fn load_profile(&mut self, path: &Path) -> Result<&VoiceProfile, ProfileError> {
        let profile = load_profile_file(path)?;
        Ok(self.profiles.upsert(profile))
    }

    pub fn evict_profile(&mut self, user_id: &str) -> Option<VoiceProfile> {
        self.profiles.remove(user_id)
    }

    pub fn clear_profiles(&mut self) {
        self.profiles.clear();
    }
}
