#![deny(warnings)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use voice_persona_core::config::{
    resolve_profile_dir, resolve_sample_rate, AnalysisConfig, Env, StdEnv,
};
use voice_persona_core::decode::{AudioLoader, SymphoniaAudioLoader};
use voice_persona_core::engine::PersonalizationEngine;
use voice_persona_core::profile::{load_profile_file, ProfileFormat, VoiceProfile};
use voice_persona_core::synthesis::SynthesisParameters;

#[derive(Parser, Debug)]
#[command(name = "voice-persona")]
#[command(about = "Build voice profiles from speech recordings and derive TTS parameters")]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Analysis sample rate in Hz (falls back to VOICE_PERSONA_SAMPLE_RATE).
    #[arg(long, global = true)]
    sample_rate: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a recording and save the resulting profile.
    Create {
        #[arg(long)]
        user_id: String,

        #[arg(long)]
        user_name: String,

        #[arg(long)]
        audio: PathBuf,

        /// Falls back to VOICE_PERSONA_PROFILE_DIR, then ./profiles.
        #[arg(long)]
        out_dir: Option<PathBuf>,

        #[arg(long, default_value = "json")]
        format: String,

        /// Also write the trimmed, normalized audio as WAV.
        #[arg(long)]
        cleaned_audio: Option<PathBuf>,

        /// Decode through ffmpeg instead of the built-in decoders.
        #[cfg(feature = "ffmpeg")]
        #[arg(long, default_value_t = false)]
        ffmpeg: bool,
    },
    /// Print synthesis parameters for a saved profile.
    Params {
        #[arg(long)]
        profile: PathBuf,
    },
    /// Print a saved profile.
    Show {
        #[arg(long)]
        profile: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let env = StdEnv;
    let sample_rate = resolve_sample_rate(args.sample_rate, &env)?;
    let config = AnalysisConfig::with_sample_rate(sample_rate)
        .with_context(|| format!("invalid analysis config for {sample_rate} Hz"))?;

    tracing::info!(sample_rate, "config loaded");

    match args.command {
        Command::Create {
            user_id,
            user_name,
            audio,
            out_dir,
            format,
            cleaned_audio,
            #[cfg(feature = "ffmpeg")]
            ffmpeg,
        } => {
            #[cfg(feature = "ffmpeg")]
            let loader = select_loader(ffmpeg);
            #[cfg(not(feature = "ffmpeg"))]
            let loader: Arc<dyn AudioLoader> = Arc::new(SymphoniaAudioLoader::new());

            run_create(
                config,
                loader,
                CreateArgs {
                    user_id,
                    user_name,
                    audio,
                    out_dir,
                    format,
                    cleaned_audio,
                },
                &env,
            )
        }
        Command::Params { profile } => run_params(config, profile),
        Command::Show { profile } => run_show(profile),
    }
}

struct CreateArgs {
    user_id: String,
    user_name: String,
    audio: PathBuf,
    out_dir: Option<PathBuf>,
    format: String,
    cleaned_audio: Option<PathBuf>,
}

#[cfg(feature = "ffmpeg")]
fn select_loader(ffmpeg: bool) -> Arc<dyn AudioLoader> {
    if ffmpeg {
        Arc::new(voice_persona_core::decode::FfmpegAudioLoader::new())
    } else {
        Arc::new(SymphoniaAudioLoader::new())
    }
}

fn run_create(
    config: AnalysisConfig,
    loader: Arc<dyn AudioLoader>,
    args: CreateArgs,
    env: &impl Env,
) -> anyhow::Result<()> {
    let format: ProfileFormat = args
        .format
        .parse()
        .with_context(|| format!("invalid --format: {}", args.format))?;
    let out_dir = resolve_profile_dir(args.out_dir, env);

    let mut engine = PersonalizationEngine::with_loader(config, loader)?;
    let profile = engine
        .create_voice_profile_with_cleaned_audio(
            &args.user_id,
            &args.user_name,
            &args.audio,
            args.cleaned_audio.as_deref(),
        )
        .with_context(|| format!("failed to build profile from {}", args.audio.display()))?;
    print_summary(profile);

    let params = engine
        .synthesis_parameters(&args.user_id)
        .context("profile vanished from the engine")?;
    print_params(&params);

    let path = engine
        .save_profile(&args.user_id, &out_dir, format)
        .with_context(|| format!("failed to save profile to {}", out_dir.display()))?;
    println!("saved: {}", path.display());
    Ok(())
}

fn run_params(config: AnalysisConfig, path: PathBuf) -> anyhow::Result<()> {
    let mut engine = PersonalizationEngine::new(config)?;
    let user_id = engine
        .load_profile(&path)
        .with_context(|| format!("failed to load profile {}", path.display()))?
        .user_id
        .clone();
    let params = engine
        .synthesis_parameters(&user_id)
        .context("profile vanished from the engine")?;
    print_params(&params);
    Ok(())
}

fn run_show(path: PathBuf) -> anyhow::Result<()> {
    let profile = load_profile_file(&path)
        .with_context(|| format!("failed to load profile {}", path.display()))?;
    let body = serde_json::to_string_pretty(&profile.to_record())?;
    println!("{body}");
    Ok(())
}

fn print_summary(profile: &VoiceProfile) {
    let s = &profile.speaking;
    let e = &profile.emotion_profile;
    println!("user: {} ({})", profile.user_name, profile.user_id);
    println!("  speaking rate: {:.1} wpm", s.speaking_rate_wpm);
    println!("  average pause: {:.3} s", s.average_pause_duration);
    println!(
        "  pitch: mean {:.1} Hz, range {:.1}..{:.1} Hz",
        s.mean_pitch,
        s.pitch_range.min(),
        s.pitch_range.max()
    );
    println!("  emotion: {} (confidence {:.2})", e.dominant_emotion, e.confidence);
}

fn print_params(params: &SynthesisParameters) {
    println!("synthesis parameters:");
    println!("  pitch_adjust: {:.3}", params.pitch_adjust);
    println!("  speaking_rate_adjust: {:.3}", params.speaking_rate_adjust);
    println!("  pause_duration: {:.3}", params.pause_duration);
    println!("  energy_level: {:.3}", params.energy_level);
    println!("  length_scale: {:.3}", params.length_scale());
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}
