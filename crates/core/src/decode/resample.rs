use super::{DecodeError, Result};
use rubato::{FftFixedIn, Resampler};

const CHUNK: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Resamples mono PCM from `sr_in` to `sr_out`.
///
/// The input is fed in fixed chunks with the tail zero-padded. The
/// resampler's output delay is skipped and the result is truncated to
/// `len * sr_out / sr_in` samples.
pub fn resample_mono(input: &[f32], sr_in: u32, sr_out: u32) -> Result<Vec<f32>> {
    if sr_in == sr_out || input.is_empty() {
        return Ok(input.to_vec());
    }
    if sr_in == 0 || sr_out == 0 {
        return Err(DecodeError::Resample(format!(
            "invalid rates {sr_in} -> {sr_out}"
        )));
    }

    let mut resampler =
        FftFixedIn::<f32>::new(sr_in as usize, sr_out as usize, CHUNK, SUB_CHUNKS, 1)
            .map_err(|e| DecodeError::Resample(e.to_string()))?;
    // rubato may round the requested chunk to fit its fft sizes
    let chunk_len = resampler.input_frames_next();

    let expected_len = (input.len() as f64 * f64::from(sr_out) / f64::from(sr_in)).round() as usize;
    let delay = resampler.output_delay();
    let wanted = delay + expected_len;
    let mut out = Vec::with_capacity(wanted + chunk_len);

    let mut chunks = input.chunks(chunk_len);
    while out.len() < wanted {
        let mut block = vec![0.0f32; chunk_len];
        if let Some(chunk) = chunks.next() {
            block[..chunk.len()].copy_from_slice(chunk);
        }
        let frames = resampler
            .process(&[block], None)
            .map_err(|e| DecodeError::Resample(e.to_string()))?;
        out.extend_from_slice(&frames[0]);
    }

    out.drain(..delay);
    out.truncate(expected_len);
    Ok(out)
}
