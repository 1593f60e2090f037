const LOG_TARGET: &str = "features::rate";

/// Assumed speech density when no transcript is available.
pub const WORDS_PER_SECOND: f64 = 2.5;

/// Duration-based speaking-rate heuristic.
///
/// Estimated words are `speaking_time * words_per_second`, and the rate is
/// those words over the same speaking time, so any positive speaking time
/// yields `words_per_second * 60` WPM.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeakingRateEstimator {
    words_per_second: f64,
}

impl Default for SpeakingRateEstimator {
    fn default() -> Self {
        Self {
            words_per_second: WORDS_PER_SECOND,
        }
    }
}

impl SpeakingRateEstimator {
    pub fn new(words_per_second: f64) -> Self {
        Self { words_per_second }
    }

    /// Words per minute; `0` when pauses cover the whole duration.
    pub fn estimate(&self, duration_secs: f64, pause_durations: &[f64]) -> f64 {
        let pause_time: f64 = pause_durations.iter().sum();
        let speaking_time = duration_secs - pause_time;

        let wpm = if speaking_time > 0.0 {
            let estimated_words = speaking_time * self.words_per_second;
            estimated_words / speaking_time * 60.0
        } else {
            0.0
        };

        tracing::info!(
            target: LOG_TARGET,
            duration_s = duration_secs,
            pause_s = pause_time,
            speaking_s = speaking_time,
            wpm,
            "speaking rate estimated"
        );
        wpm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_speaking_time_gives_constant_rate() {
        let est = SpeakingRateEstimator::default();
        assert_eq!(est.estimate(10.0, &[2.0]), 150.0);
        assert_eq!(est.estimate(3.75, &[]), 150.0);
        assert_eq!(est.estimate(600.0, &[0.25, 1.25, 0.5]), 150.0);
    }

    #[test]
    fn pauses_covering_everything_give_zero() {
        let est = SpeakingRateEstimator::default();
        assert_eq!(est.estimate(5.0, &[5.0, 5.0]), 0.0);
        assert_eq!(est.estimate(5.0, &[5.0]), 0.0);
        assert_eq!(est.estimate(0.0, &[]), 0.0);
    }

    #[test]
    fn density_scales_rate() {
        assert_eq!(SpeakingRateEstimator::new(3.0).estimate(8.0, &[1.0]), 180.0);
    }
}
