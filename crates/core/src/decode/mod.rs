#[cfg(feature = "ffmpeg")]
mod ffmpeg;
mod resample;
mod native;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(feature = "ffmpeg")]
pub use self::ffmpeg::FfmpegAudioLoader;
pub use native::SymphoniaAudioLoader;
pub use resample::resample_mono;

const LOG_TARGET: &str = "decode";

/// Mono PCM in `[-1.0, 1.0]` at a known sample rate.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PcmBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl PcmBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("cannot open audio file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported audio container or codec: {0}")]
    Unsupported(String),

    #[error("no decodable audio track")]
    NoAudioTrack,

    #[error("corrupt audio stream: {0}")]
    Corrupt(String),

    #[error("audio file decoded to zero samples")]
    Empty,

    #[error("resampling failed: {0}")]
    Resample(String),

    #[error("failed to write wav: {0}")]
    Write(String),

    #[cfg(feature = "ffmpeg")]
    #[error("ffmpeg unavailable: {0}")]
    FfmpegUnavailable(String),

    #[cfg(feature = "ffmpeg")]
    #[error("ffmpeg failed: {0}")]
    FfmpegFailed(String),

    #[cfg(feature = "ffmpeg")]
    #[error("invalid pcm output: {0}")]
    InvalidPcm(String),
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Decodes an audio file into mono samples at `target_rate`.
pub trait AudioLoader: Send + Sync {
    fn load(&self, path: &Path, target_rate: u32) -> Result<PcmBuffer>;
}

#[derive(Clone)]
pub struct Decoder {
    inner: Arc<dyn AudioLoader>,
}

impl Decoder {
    pub fn new(inner: Arc<dyn AudioLoader>) -> Self {
        Self { inner }
    }

    pub fn load(&self, path: &Path, target_rate: u32) -> Result<PcmBuffer> {
        let buffer = self.inner.load(path, target_rate)?;
        tracing::info!(
            target: LOG_TARGET,
            file = %path.display(),
            duration_s = buffer.duration_secs(),
            sample_rate = buffer.sample_rate,
            samples = buffer.len(),
            "loaded audio"
        );
        Ok(buffer)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(Arc::new(SymphoniaAudioLoader::default()))
    }
}

/// Averages interleaved frames down to one channel.
pub fn downmix_interleaved(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    let scale = 1.0 / channels as f32;
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect()
}

/// Writes mono f32 samples as a 32-bit float WAV.
pub fn write_wav(path: &Path, buffer: &PcmBuffer) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer =
        hound::WavWriter::create(path, spec).map_err(|e| DecodeError::Write(e.to_string()))?;
    for &s in &buffer.samples {
        writer
            .write_sample(s)
            .map_err(|e| DecodeError::Write(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| DecodeError::Write(e.to_string()))?;
    tracing::info!(target: LOG_TARGET, file = %path.display(), "saved preprocessed audio");
    Ok(())
}
