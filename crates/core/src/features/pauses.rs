use super::{FrameSeries, Pause};
use crate::config::DEFAULT_PAUSE_PERCENTILE;
use crate::util::stats;

const LOG_TARGET: &str = "features::pauses";

/// Splits an energy trace into pauses: runs of frames strictly quieter than
/// the given percentile of the whole trace.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PauseSegmenter {
    percentile: f64,
}

impl Default for PauseSegmenter {
    fn default() -> Self {
        Self::new(DEFAULT_PAUSE_PERCENTILE)
    }
}

impl PauseSegmenter {
    pub fn new(percentile: f64) -> Self {
        Self { percentile }
    }

    pub fn percentile(&self) -> f64 {
        self.percentile
    }

    /// Pauses in time order as `[open, close)` frame times.
    ///
    /// A pause still open when the trace ends is never closed and is not
    /// reported.
    pub fn segment(&self, energy: &FrameSeries) -> Vec<Pause> {
        let Some(threshold) = stats::percentile(&energy.values, self.percentile) else {
            return Vec::new();
        };

        let mut pauses = Vec::new();
        let mut open_at: Option<f64> = None;
        for (i, &value) in energy.values.iter().enumerate() {
            let paused = value < threshold;
            match (paused, open_at) {
                (true, None) => open_at = Some(energy.time_at(i)),
                (false, Some(start)) => {
                    pauses.push(Pause::new(start, energy.time_at(i)));
                    open_at = None;
                }
                _ => {}
            }
        }

        if pauses.is_empty() {
            tracing::info!(target: LOG_TARGET, threshold_db = threshold, "no significant pauses detected");
        } else {
            let avg = pauses.iter().map(|p| p.duration).sum::<f64>() / pauses.len() as f64;
            tracing::info!(
                target: LOG_TARGET,
                threshold_db = threshold,
                pauses = pauses.len(),
                average_s = avg,
                "pauses detected"
            );
        }
        pauses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One frame per second.
    fn series(values: &[f64]) -> FrameSeries {
        FrameSeries::new(values.to_vec(), 1, 1, 1)
    }

    #[test]
    fn empty_trace_has_no_pauses() {
        assert!(PauseSegmenter::default().segment(&series(&[])).is_empty());
    }

    #[test]
    fn quiet_run_becomes_one_pause() {
        // 25th percentile interpolates to 6.25, so only the -5 frames qualify
        let energy = series(&[10.0, 10.0, -5.0, -5.0, 10.0, 10.0, 10.0, 10.0]);
        let pauses = PauseSegmenter::new(25.0).segment(&energy);
        assert_eq!(pauses, vec![Pause::new(2.0, 4.0)]);
    }

    #[test]
    fn trailing_open_pause_is_dropped() {
        let energy = series(&[10.0, 10.0, -5.0, -5.0, 10.0, 10.0, -5.0, -5.0]);
        let pauses = PauseSegmenter::new(50.0).segment(&energy);
        assert_eq!(pauses, vec![Pause::new(2.0, 4.0)]);
    }

    #[test]
    fn threshold_is_strict() {
        // the percentile lands exactly on -5, and -5 is not below -5
        let energy = series(&[10.0, 10.0, -5.0, -5.0, -5.0, 10.0]);
        assert!(PauseSegmenter::new(25.0).segment(&energy).is_empty());

        let pauses = PauseSegmenter::new(50.0).segment(&energy);
        assert_eq!(pauses, vec![Pause::new(2.0, 5.0)]);
    }

    #[test]
    fn constant_trace_has_no_pauses() {
        let energy = series(&[-20.0; 12]);
        assert!(PauseSegmenter::default().segment(&energy).is_empty());
    }

    #[test]
    fn pauses_are_ordered_and_non_negative() {
        let values: Vec<f64> = (0..200).map(|i| ((i * 37) % 23) as f64 - 11.0).collect();
        let energy = FrameSeries::new(values, 2048, 512, 22_050);
        let pauses = PauseSegmenter::default().segment(&energy);
        assert!(!pauses.is_empty());
        for p in &pauses {
            assert!(p.start_time <= p.end_time);
            assert!(p.duration >= 0.0);
        }
        for pair in pauses.windows(2) {
            assert!(pair[0].end_time <= pair[1].start_time);
        }
    }
}
