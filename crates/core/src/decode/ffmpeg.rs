use super::{AudioLoader, DecodeError, PcmBuffer, Result};
use ffmpeg_sidecar::{download, paths::ffmpeg_path};
use std::path::Path;
use std::process::{Command, Stdio};

/// Decodes through an ffmpeg binary managed by `ffmpeg-sidecar`, which also
/// handles resampling and down-mixing.
#[derive(Clone, Debug, Default)]
pub struct FfmpegAudioLoader;

impl FfmpegAudioLoader {
    pub fn new() -> Self {
        Self
    }

    fn ensure_ffmpeg_available(&self) -> Result<()> {
        download::auto_download().map_err(|e| DecodeError::FfmpegUnavailable(e.to_string()))
    }

    fn parse_f32le_mono(raw: &[u8]) -> Result<Vec<f32>> {
        if raw.len() % 4 != 0 {
            return Err(DecodeError::InvalidPcm(format!(
                "f32le byte length must be multiple of 4, got {}",
                raw.len()
            )));
        }
        Ok(raw
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    fn decode_with_ffmpeg(&self, path: &Path, target_rate: u32) -> Result<Vec<f32>> {
        let rate = target_rate.to_string();
        let output = Command::new(ffmpeg_path())
            .args(["-hide_banner", "-nostdin", "-loglevel", "error", "-i"])
            .arg(path)
            .args([
                "-vn", "-sn", "-dn", "-ac", "1", "-ar", &rate, "-f", "f32le", "-acodec",
                "pcm_f32le", "pipe:1",
            ])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| DecodeError::FfmpegFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr_s = String::from_utf8_lossy(&output.stderr).trim().to_owned();
            return Err(DecodeError::FfmpegFailed(format!(
                "exit_code={:?} stderr={stderr_s}",
                output.status.code()
            )));
        }

        Self::parse_f32le_mono(&output.stdout)
    }
}

impl AudioLoader for FfmpegAudioLoader {
    fn load(&self, path: &Path, target_rate: u32) -> Result<PcmBuffer> {
        // ffmpeg's own error for a missing input is opaque
        if let Err(source) = std::fs::metadata(path) {
            return Err(DecodeError::Open {
                path: path.to_path_buf(),
                source,
            });
        }
        self.ensure_ffmpeg_available()?;
        let samples = self.decode_with_ffmpeg(path, target_rate)?;
        if samples.is_empty() {
            return Err(DecodeError::Empty);
        }
        Ok(PcmBuffer::new(samples, target_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_f32le_rejects_non_multiple_of_4() {
        let err = FfmpegAudioLoader::parse_f32le_mono(&[0, 1, 2]).unwrap_err();
        assert!(err.to_string().contains("multiple of 4"));
    }

    #[test]
    fn parse_f32le_reads_little_endian() {
        let mut raw = Vec::new();
        for f in [0.0f32, -0.5, 1.0] {
            raw.extend_from_slice(&f.to_le_bytes());
        }
        let out = FfmpegAudioLoader::parse_f32le_mono(&raw).unwrap();
        assert_eq!(out, vec![0.0, -0.5, 1.0]);
    }

    #[test]
    fn missing_file_fails_before_ffmpeg() {
        let err = FfmpegAudioLoader::new()
            .load(Path::new("/definitely/not/here.mp3"), 22_050)
            .unwrap_err();
        assert!(matches!(err, DecodeError::Open { .. }));
    }
}
