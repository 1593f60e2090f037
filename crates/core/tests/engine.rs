use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;
use std::path::Path;
use voice_persona_core::config::AnalysisConfig;
use voice_persona_core::emotion::Emotion;
use voice_persona_core::engine::{EngineError, PersonalizationEngine};
use voice_persona_core::features::FeatureError;
use voice_persona_core::profile::{ProfileError, ProfileFormat};
use voice_persona_core::synthesis::DEFAULT_ENERGY_LEVEL;

const SR: u32 = 22_050;

fn write_i16_wav(path: &Path, samples: &[f32]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SR,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer
            .write_sample((s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16)
            .unwrap();
    }
    writer.finalize().unwrap();
}

fn tone(hz: f32, secs: f32, amplitude: f32) -> Vec<f32> {
    let n = (secs * SR as f32) as usize;
    (0..n)
        .map(|i| amplitude * (2.0 * PI * hz * i as f32 / SR as f32).sin())
        .collect()
}

fn hiss(secs: f32, amplitude: f32, rng: &mut StdRng) -> Vec<f32> {
    let n = (secs * SR as f32) as usize;
    (0..n)
        .map(|_| amplitude * rng.random_range(-1.0f32..1.0))
        .collect()
}

/// Three 200 Hz "phrases" separated by quiet gaps.
fn phrase_recording(path: &Path) {
    let mut rng = StdRng::seed_from_u64(7);
    let mut samples = tone(200.0, 0.8, 0.5);
    samples.extend(hiss(0.6, 0.01, &mut rng));
    samples.extend(tone(200.0, 0.8, 0.5));
    samples.extend(hiss(0.6, 0.01, &mut rng));
    samples.extend(tone(200.0, 0.8, 0.5));
    write_i16_wav(path, &samples);
}

#[test]
fn creates_profile_from_recording() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("phrases.wav");
    phrase_recording(&audio);

    let mut engine = PersonalizationEngine::new(AnalysisConfig::default()).unwrap();
    let profile = engine
        .create_voice_profile("u1", "Ada", &audio)
        .unwrap()
        .clone();

    assert_eq!(profile.user_id, "u1");
    assert_eq!(profile.user_name, "Ada");
    assert_eq!(profile.created_date, profile.last_updated);

    let s = &profile.speaking;
    assert!((s.speaking_rate_wpm - 150.0).abs() < 1e-9);
    assert!((s.mean_pitch - 200.0).abs() < 10.0, "mean pitch {}", s.mean_pitch);
    assert!(s.pitch_range.min() <= s.mean_pitch && s.mean_pitch <= s.pitch_range.max());
    assert!(s.average_pause_duration > 0.0);
    assert!(s.average_pause_duration < 0.7);

    let energy = profile.energy_levels.as_ref().unwrap();
    assert!(energy.values.iter().all(|&v| v <= 0.0));
    assert!(profile.pitch_contour.is_some());

    let e = &profile.emotion_profile;
    assert!(Emotion::ALL.contains(&e.dominant_emotion));
    assert!((0.0..=1.0).contains(&e.confidence));
    assert_eq!(e.features_used.mean_pitch, s.mean_pitch);

    let params = engine.synthesis_parameters("u1").unwrap();
    assert!((params.speaking_rate_adjust - 1.0).abs() < 1e-9);
    assert!((params.pitch_adjust - s.mean_pitch / 150.0).abs() < 1e-12);
    assert!(params.energy_level <= 0.0);
    assert_eq!(params.pause_duration, s.average_pause_duration);
}

#[test]
fn writes_cleaned_audio_when_requested() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("phrases.wav");
    let cleaned = dir.path().join("cleaned.wav");
    phrase_recording(&audio);

    let mut engine = PersonalizationEngine::new(AnalysisConfig::default()).unwrap();
    engine
        .create_voice_profile_with_cleaned_audio("u1", "Ada", &audio, Some(&cleaned))
        .unwrap();

    let reader = hound::WavReader::open(&cleaned).unwrap();
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().sample_rate, SR);
    assert!(reader.len() > 0);
}

#[test]
fn silent_recording_has_no_voiced_frames() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("silence.wav");
    write_i16_wav(&audio, &vec![0.0; SR as usize]);

    let mut engine = PersonalizationEngine::new(AnalysisConfig::default()).unwrap();
    let err = engine
        .create_voice_profile("u1", "Ada", &audio)
        .unwrap_err();
    assert!(matches!(err, EngineError::Features(FeatureError::NoVoicedFrames)));
    assert!(engine.profile("u1").is_none());
}

#[test]
fn missing_audio_is_a_load_error() {
    let mut engine = PersonalizationEngine::new(AnalysisConfig::default()).unwrap();
    let err = engine
        .create_voice_profile("u1", "Ada", Path::new("/definitely/not/here.wav"))
        .unwrap_err();
    assert!(matches!(err, EngineError::AudioLoad(_)));
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = AnalysisConfig {
        pause_percentile: -1.0,
        ..AnalysisConfig::default()
    };
    assert!(matches!(
        PersonalizationEngine::new(cfg),
        Err(EngineError::Config(_))
    ));
}

#[test]
fn unknown_user_has_no_parameters() {
    let engine = PersonalizationEngine::new(AnalysisConfig::default()).unwrap();
    assert!(engine.synthesis_parameters("nobody").is_none());

    let dir = tempfile::tempdir().unwrap();
    let err = engine
        .save_profile("nobody", dir.path(), ProfileFormat::Json)
        .unwrap_err();
    assert!(matches!(err, ProfileError::NotFound(ref id) if id == "nobody"));
}

#[test]
fn saved_profile_reloads_without_raw_traces() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("phrases.wav");
    phrase_recording(&audio);

    let mut engine = PersonalizationEngine::new(AnalysisConfig::default()).unwrap();
    let original = engine
        .create_voice_profile("u1", "Ada", &audio)
        .unwrap()
        .clone();

    for format in [ProfileFormat::Json, ProfileFormat::Yaml] {
        let out = dir.path().join("profiles");
        let path = engine.save_profile("u1", &out, format).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            format!("u1_profile.{}", format.extension())
        );

        let mut fresh = PersonalizationEngine::new(AnalysisConfig::default()).unwrap();
        let loaded = fresh.load_profile(&path).unwrap().clone();
        assert_eq!(loaded.user_id, "u1");
        assert_eq!(loaded.speaking, original.speaking);
        assert_eq!(loaded.emotion_profile, original.emotion_profile);
        assert_eq!(loaded.created_date, original.created_date);
        assert!(loaded.energy_levels.is_none());
        assert!(loaded.pitch_contour.is_none());

        let params = fresh.synthesis_parameters("u1").unwrap();
        assert_eq!(params.energy_level, DEFAULT_ENERGY_LEVEL);
        assert_eq!(
            params.pitch_adjust,
            engine.synthesis_parameters("u1").unwrap().pitch_adjust
        );
    }
}

#[test]
fn recreating_a_profile_replaces_the_previous_one() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("phrases.wav");
    phrase_recording(&audio);

    let mut engine = PersonalizationEngine::new(AnalysisConfig::default()).unwrap();
    engine.create_voice_profile("u1", "Ada", &audio).unwrap();
    engine.create_voice_profile("u1", "Ada L.", &audio).unwrap();

    assert_eq!(engine.profiles().len(), 1);
    assert_eq!(engine.profile("u1").unwrap().user_name, "Ada L.");

    assert!(engine.evict_profile("u1").is_some());
    assert!(engine.profile("u1").is_none());
}
