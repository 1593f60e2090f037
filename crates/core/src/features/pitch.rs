//! Fundamental-frequency tracking.
//!
//! [`YinPitchTracker`] is a plain YIN estimator: cumulative-mean-normalized
//! difference function, absolute threshold, then parabolic refinement of the
//! chosen lag.

const LOG_TARGET: &str = "features::pitch";

/// Dips of the normalized difference below this value count as periodic.
const YIN_THRESHOLD: f64 = 0.1;
/// Frames with an RMS below this are treated as unvoiced without analysis.
const SILENCE_RMS: f64 = 1e-3;

/// Per-frame pitch estimate: `Some(hz)` for voiced frames, `None` otherwise.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PitchTrack {
    frames: Vec<Option<f64>>,
}

impl PitchTrack {
    pub fn new(frames: Vec<Option<f64>>) -> Self {
        Self { frames }
    }

    pub fn voiced_mask(&self) -> Vec<bool> {
        self.frames.iter().map(Option::is_some).collect()
    }

    pub fn voiced_values(&self) -> Vec<f64> {
        self.frames.iter().flatten().copied().collect()
    }

    pub fn frames(&self) -> &[Option<f64>] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

pub trait PitchContourProvider: Send + Sync {
    fn track_pitch(&self, samples: &[f32], sample_rate: u32) -> PitchTrack;
}

#[derive(Clone, Debug)]
pub struct YinPitchTracker {
    frame_length: usize,
    hop_length: usize,
    fmin: f64,
    fmax: f64,
}

impl YinPitchTracker {
    pub fn new(frame_length: usize, hop_length: usize, fmin: f64, fmax: f64) -> Self {
        Self {
            frame_length,
            hop_length,
            fmin,
            fmax,
        }
    }

    /// Lag search range in samples, `None` when the band does not fit the frame.
    fn lag_bounds(&self, sample_rate: u32) -> Option<(usize, usize)> {
        let sr = f64::from(sample_rate);
        let tau_min = ((sr / self.fmax).floor() as usize).max(2);
        let tau_max = (sr / self.fmin).ceil() as usize;
        if tau_min >= tau_max || tau_max + 1 >= self.frame_length {
            return None;
        }
        Some((tau_min, tau_max))
    }

    fn estimate_frame(&self, frame: &[f32], sample_rate: u32, tau_min: usize, tau_max: usize) -> Option<f64> {
        let rms = (frame.iter().map(|&s| f64::from(s) * f64::from(s)).sum::<f64>()
            / frame.len() as f64)
            .sqrt();
        if rms < SILENCE_RMS {
            return None;
        }

        let window = frame.len() - tau_max;
        let mut diff = vec![0.0f64; tau_max + 1];
        for (tau, d) in diff.iter_mut().enumerate().skip(1) {
            *d = frame[..window]
                .iter()
                .zip(&frame[tau..tau + window])
                .map(|(&a, &b)| {
                    let delta = f64::from(a) - f64::from(b);
                    delta * delta
                })
                .sum();
        }

        let mut cmnd = vec![1.0f64; tau_max + 1];
        let mut running = 0.0;
        for tau in 1..=tau_max {
            running += diff[tau];
            cmnd[tau] = if running > 0.0 {
                diff[tau] * tau as f64 / running
            } else {
                1.0
            };
        }

        let mut tau = (tau_min..=tau_max).find(|&t| cmnd[t] < YIN_THRESHOLD)?;
        while tau < tau_max && cmnd[tau + 1] < cmnd[tau] {
            tau += 1;
        }

        let refined = if tau > 1 && tau < tau_max {
            let (a, b, c) = (cmnd[tau - 1], cmnd[tau], cmnd[tau + 1]);
            let denom = a - 2.0 * b + c;
            if denom.abs() > f64::EPSILON {
                tau as f64 + 0.5 * (a - c) / denom
            } else {
                tau as f64
            }
        } else {
            tau as f64
        };

        let hz = f64::from(sample_rate) / refined;
        (self.fmin..=self.fmax).contains(&hz).then_some(hz)
    }
}

impl PitchContourProvider for YinPitchTracker {
    fn track_pitch(&self, samples: &[f32], sample_rate: u32) -> PitchTrack {
        let Some((tau_min, tau_max)) = self.lag_bounds(sample_rate) else {
            tracing::warn!(
                target: LOG_TARGET,
                fmin = self.fmin,
                fmax = self.fmax,
                frame_length = self.frame_length,
                "pitch band does not fit the frame, no frames analysed"
            );
            return PitchTrack::default();
        };
        if samples.len() < self.frame_length || self.hop_length == 0 {
            return PitchTrack::default();
        }

        let n_frames = 1 + (samples.len() - self.frame_length) / self.hop_length;
        let frames: Vec<Option<f64>> = (0..n_frames)
            .map(|i| {
                let start = i * self.hop_length;
                let frame = &samples[start..start + self.frame_length];
                self.estimate_frame(frame, sample_rate, tau_min, tau_max)
            })
            .collect();

        let track = PitchTrack::new(frames);
        tracing::debug!(
            target: LOG_TARGET,
            frames = track.len(),
            voiced = track.voiced_values().len(),
            "pitch tracked"
        );
        track
    }
}
