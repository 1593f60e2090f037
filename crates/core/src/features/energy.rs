use super::FrameSeries;
use crate::util::centered_frame_power;

const LOG_TARGET: &str = "features::energy";

/// Quietest level a frame can report, relative to the loudest frame.
pub const ENERGY_FLOOR_DB: f64 = -80.0;

pub trait FrameEnergyProvider: Send + Sync {
    fn frame_log_energy(&self, samples: &[f32], sample_rate: u32) -> FrameSeries;
}

/// Time-domain mean frame power in dB relative to the loudest frame, so
/// every value is in `[ENERGY_FLOOR_DB, 0]`.
#[derive(Clone, Debug)]
pub struct LogEnergyProvider {
    frame_length: usize,
    hop_length: usize,
}

impl LogEnergyProvider {
    pub fn new(frame_length: usize, hop_length: usize) -> Self {
        Self {
            frame_length,
            hop_length,
        }
    }
}

impl FrameEnergyProvider for LogEnergyProvider {
    fn frame_log_energy(&self, samples: &[f32], sample_rate: u32) -> FrameSeries {
        let powers = centered_frame_power(samples, self.frame_length, self.hop_length);
        let reference = powers.iter().copied().fold(0.0f64, f64::max);

        let values: Vec<f64> = powers
            .iter()
            .map(|&p| {
                if reference <= 0.0 || p <= 0.0 {
                    ENERGY_FLOOR_DB
                } else {
                    (10.0 * (p / reference).log10()).max(ENERGY_FLOOR_DB)
                }
            })
            .collect();

        let series = FrameSeries::new(values, self.frame_length, self.hop_length, sample_rate);
        if let (Some(lo), Some(hi)) = (
            series.values.iter().copied().reduce(f64::min),
            series.values.iter().copied().reduce(f64::max),
        ) {
            tracing::info!(
                target: LOG_TARGET,
                frames = series.len(),
                min_db = lo,
                max_db = hi,
                "energy extracted"
            );
        }
        series
    }
}
