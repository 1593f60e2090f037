use super::{downmix_interleaved, resample_mono, AudioLoader, DecodeError, PcmBuffer, Result};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

const LOG_TARGET: &str = "decode::symphonia";

/// In-process decoder for the containers symphonia ships (wav, flac, ogg,
/// mp3, ...).
#[derive(Clone, Debug, Default)]
pub struct SymphoniaAudioLoader;

impl SymphoniaAudioLoader {
    pub fn new() -> Self {
        Self
    }

    fn decode_file(path: &Path) -> Result<PcmBuffer> {
        let file = std::fs::File::open(path).map_err(|source| DecodeError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| DecodeError::Unsupported(e.to_string()))?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(DecodeError::NoAudioTrack)?;
        let track_id = track.id;
        let codec_params = track.codec_params.clone();
        let sample_rate = codec_params
            .sample_rate
            .ok_or_else(|| DecodeError::Unsupported("track has no sample rate".to_owned()))?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| DecodeError::Unsupported(e.to_string()))?;

        let mut mono = Vec::new();
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
            };
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let channels = spec.channels.count();
                    let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    buf.copy_interleaved_ref(decoded);
                    mono.extend(downmix_interleaved(buf.samples(), channels));
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::warn!(target: LOG_TARGET, error = %e, "skipping undecodable packet");
                }
                Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
            }
        }

        if mono.is_empty() {
            return Err(DecodeError::Empty);
        }
        Ok(PcmBuffer::new(mono, sample_rate))
    }
}

impl AudioLoader for SymphoniaAudioLoader {
    fn load(&self, path: &Path, target_rate: u32) -> Result<PcmBuffer> {
        let native = Self::decode_file(path)?;
        if native.sample_rate == target_rate {
            return Ok(native);
        }
        tracing::debug!(
            target: LOG_TARGET,
            from = native.sample_rate,
            to = target_rate,
            "resampling"
        );
        let samples = resample_mono(&native.samples, native.sample_rate, target_rate)?;
        Ok(PcmBuffer::new(samples, target_rate))
    }
}
