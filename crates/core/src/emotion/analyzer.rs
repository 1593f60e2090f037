use crate::emotion::rules::{EmotionThresholds, RuleSpec, RULES};
use crate::emotion::{EmotionFeatures, EmotionProfile, EmotionScores};

const LOG_TARGET: &str = "emotion";

pub trait EmotionAnalyzer: Send + Sync {
    fn analyze(&self, features: &EmotionFeatures) -> EmotionProfile;
}

/// Additive scoring over a rule table. Confidence is the winning score over
/// the sum of all scores, rounded to two decimals.
pub struct RuleBasedEmotionAnalyzer {
    thresholds: EmotionThresholds,
    rules: &'static [RuleSpec],
}

impl RuleBasedEmotionAnalyzer {
    pub fn new() -> Self {
        Self::with_thresholds(EmotionThresholds::DEFAULT)
    }

    pub fn with_thresholds(thresholds: EmotionThresholds) -> Self {
        Self {
            thresholds,
            rules: &RULES,
        }
    }

    pub fn thresholds(&self) -> &EmotionThresholds {
        &self.thresholds
    }
}

impl Default for RuleBasedEmotionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl EmotionAnalyzer for RuleBasedEmotionAnalyzer {
    fn analyze(&self, features: &EmotionFeatures) -> EmotionProfile {
        let mut scores = EmotionScores::default();
        let mut rules_triggered = Vec::new();

        for spec in self.rules {
            if (spec.applies)(features, &self.thresholds) {
                for &(emotion, weight) in spec.weights {
                    scores.add(emotion, weight);
                }
                rules_triggered.push(spec.rule);
            }
        }

        let (dominant_emotion, max_score) = scores.dominant();
        let total = match scores.total() {
            t if t > 0.0 => t,
            _ => 1.0,
        };
        let confidence = round2(max_score / total);

        tracing::info!(
            target: LOG_TARGET,
            dominant = %dominant_emotion,
            confidence,
            rules = rules_triggered.len(),
            "emotion inferred"
        );

        EmotionProfile {
            dominant_emotion,
            confidence,
            scores,
            rules_triggered,
            features_used: *features,
        }
    }
}

/// Two decimals, ties to even (0.625 -> 0.62, 0.375 -> 0.38).
fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::round2;

    #[test]
    fn round2_breaks_ties_to_even() {
        assert_eq!(round2(0.625), 0.62);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(2.0 / 3.0), 0.67);
        assert_eq!(round2(0.0), 0.0);
    }
}
