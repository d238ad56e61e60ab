//! Term Mastery Calculator
//!
//! Converts one term's attempt history (most-recent-first, capped) into a
//! mastery level plus the numeric components behind it:
//! - Recency-weighted performance with partial credit for incorrect answers
//! - Consistency (inverse variance of raw similarity)
//! - Improvement trend (recent half vs older half)
//!
//! The composite blends the three and maps onto the level thresholds. The
//! calculation is a pure function of the input sequence; repeated calls with
//! unchanged history return identical results.

use crate::sanitize::{clamp_unit, round_dp};
use crate::types::{AttemptRecord, MasteryLevel, MasteryResult, ScoringConfig};

/// Internal failure, converted to an `error`-level result at the boundary
#[derive(Debug, thiserror::Error)]
pub enum ComputeError {
    #[error("non-finite {0} in mastery computation")]
    NonFinite(&'static str),
}

pub struct MasteryCalculator {
    config: ScoringConfig,
}

impl MasteryCalculator {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one term's attempt history, most-recent-first.
    ///
    /// Never panics and never propagates an error: an empty history yields
    /// the `not_attempted` default and an internal failure yields the
    /// `error`-level default, so one bad term cannot fail a dashboard
    /// request.
    pub fn calculate(&self, history: &[AttemptRecord]) -> MasteryResult {
        if history.is_empty() {
            return MasteryResult::empty();
        }

        match self.compute(history) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(error = %err, "mastery computation failed, defaulting");
                MasteryResult::failed()
            }
        }
    }

    fn compute(&self, history: &[AttemptRecord]) -> Result<MasteryResult, ComputeError> {
        let config = &self.config;

        // 1. Cap the window and re-clamp similarities; records may have been
        //    deserialized around the validating constructor.
        let capped = &history[..history.len().min(config.history_cap)];
        let scores: Vec<f64> = capped
            .iter()
            .map(|a| clamp_unit(a.similarity_score))
            .collect();
        let attempts = capped.len();

        // 2. Recency-weighted performance. Index 0 is the most recent
        //    attempt; incorrect answers keep partial credit for near-misses.
        let mut weighted_sum = 0.0;
        let mut weight_sum = 0.0;
        for (i, attempt) in capped.iter().enumerate() {
            let weight = (-config.recency_decay * i as f64).exp2();
            let contribution = if attempt.is_correct {
                scores[i]
            } else {
                scores[i] * config.incorrect_penalty
            };
            weighted_sum += contribution * weight;
            weight_sum += weight;
        }
        if weight_sum <= 0.0 || !weight_sum.is_finite() {
            return Err(ComputeError::NonFinite("weight sum"));
        }
        let weighted_average = weighted_sum / weight_sum;

        // 3. Consistency: inverse population variance of raw similarity.
        //    A single attempt is perfectly consistent by definition.
        let consistency = if attempts < 2 {
            1.0
        } else {
            (1.0 - population_variance(&scores)).max(0.0)
        };

        // 4. Improvement trend: recent half vs older half, neutral 0.5 until
        //    enough attempts exist. Recent half is the first ⌊n/2⌋ entries.
        let improvement = if attempts >= config.trend_min_attempts {
            let mid = attempts / 2;
            let recent_mean = mean(&scores[..mid]);
            let older_mean = mean(&scores[mid..]);
            ((recent_mean - older_mean) + 0.5).clamp(0.0, 1.0)
        } else {
            0.5
        };

        // 5. Composite score, classified on the rounded value.
        let composite = config.performance_weight * weighted_average
            + config.consistency_weight * consistency
            + config.improvement_weight * improvement;
        if !composite.is_finite() {
            return Err(ComputeError::NonFinite("composite score"));
        }
        let score = round_dp(clamp_unit(composite), 3);
        let level = MasteryLevel::from_score(score, config);

        // 6. Confidence grows with sample size, capped by consistency.
        let confidence =
            ((attempts as f64 / config.confidence_samples as f64) * consistency).min(1.0);

        // 7. Recent performance: mean raw similarity of the newest attempts.
        let recent_window = attempts.min(config.recent_window);
        let recent_performance = mean(&scores[..recent_window]);

        Ok(MasteryResult {
            level,
            score,
            confidence: round_dp(confidence, 3),
            attempts_count: attempts as u32,
            recent_performance: round_dp(recent_performance, 3),
            consistency: round_dp(consistency, 3),
            improvement_trend: round_dp(improvement, 3),
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn calculator() -> MasteryCalculator {
        MasteryCalculator::new(ScoringConfig::default())
    }

    /// Most-recent-first history from (similarity, correct) pairs.
    fn history(entries: &[(f64, bool)]) -> Vec<AttemptRecord> {
        let total = entries.len() as u32;
        entries
            .iter()
            .enumerate()
            .map(|(i, (similarity, correct))| {
                let at = Utc
                    .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
                    .unwrap()
                    - chrono::Duration::hours(i as i64);
                AttemptRecord::new("term-1", "user-1", *similarity, *correct, total - i as u32, at)
            })
            .collect()
    }

    #[test]
    fn test_empty_history_default() {
        let result = calculator().calculate(&[]);
        assert_eq!(result, MasteryResult::empty());
    }

    #[test]
    fn test_single_attempt_reference_arithmetic() {
        // weighted 0.85, consistency 1.0 (single attempt), trend 0.5 neutral:
        // 0.6*0.85 + 0.25*1.0 + 0.15*0.5 = 0.835, just below mastered.
        let result = calculator().calculate(&history(&[(0.85, true)]));

        assert_eq!(result.score, 0.835);
        assert_eq!(result.level, MasteryLevel::Proficient);
        assert_eq!(result.attempts_count, 1);
        assert_eq!(result.consistency, 1.0);
        assert_eq!(result.improvement_trend, 0.5);
        assert_eq!(result.recent_performance, 0.85);
        // confidence = min(1, 1/5 * 1.0)
        assert_eq!(result.confidence, 0.2);
    }

    #[test]
    fn test_three_strong_attempts_reach_mastered() {
        let result = calculator().calculate(&history(&[(0.9, true), (0.95, true), (0.92, true)]));

        assert_eq!(result.level, MasteryLevel::Mastered, "score was {}", result.score);
        assert_eq!(result.score, 0.878);
        assert_eq!(result.attempts_count, 3);
        assert_eq!(result.recent_performance, 0.923);
        // Three attempts is below the trend minimum.
        assert_eq!(result.improvement_trend, 0.5);
    }

    #[test]
    fn test_incorrect_answer_keeps_partial_credit() {
        let result = calculator().calculate(&history(&[(1.0, false)]));

        // weighted = 1.0 * 0.7 -> 0.6*0.7 + 0.25 + 0.075 = 0.745
        assert_eq!(result.score, 0.745);
        assert_eq!(result.level, MasteryLevel::Proficient);
    }

    #[test]
    fn test_correct_never_scores_below_incorrect() {
        let calc = calculator();
        for similarity in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let correct = calc.calculate(&history(&[(similarity, true)]));
            let incorrect = calc.calculate(&history(&[(similarity, false)]));
            assert!(
                correct.score >= incorrect.score,
                "correct {} < incorrect {} at similarity {}",
                correct.score,
                incorrect.score,
                similarity
            );
        }
    }

    #[test]
    fn test_recency_weighting_favors_recent_attempts() {
        let calc = calculator();
        // Same multiset of scores, opposite order: the strong attempt first
        // must win because index 0 carries the largest weight.
        let strong_first = calc.calculate(&history(&[(0.9, true), (0.3, true)]));
        let weak_first = calc.calculate(&history(&[(0.3, true), (0.9, true)]));
        assert!(strong_first.score > weak_first.score);
    }

    #[test]
    fn test_improvement_trend_halves() {
        let calc = calculator();
        // Most-recent-first: recent half [0.9, 0.85, 0.8], older [0.5, 0.45, 0.4].
        let improving = calc.calculate(&history(&[
            (0.9, true),
            (0.85, true),
            (0.8, true),
            (0.5, true),
            (0.45, true),
            (0.4, true),
        ]));
        assert_eq!(improving.improvement_trend, 0.9);

        let declining = calc.calculate(&history(&[
            (0.4, true),
            (0.45, true),
            (0.5, true),
            (0.8, true),
            (0.85, true),
            (0.9, true),
        ]));
        assert_eq!(declining.improvement_trend, 0.1);
    }

    #[test]
    fn test_improvement_trend_clamped() {
        let calc = calculator();
        let jump = calc.calculate(&history(&[
            (1.0, true),
            (1.0, true),
            (0.0, false),
            (0.0, false),
        ]));
        // (1.0 - 0.0) + 0.5 clamps to 1.0
        assert_eq!(jump.improvement_trend, 1.0);

        let collapse = calc.calculate(&history(&[
            (0.0, false),
            (0.0, false),
            (1.0, true),
            (1.0, true),
        ]));
        assert_eq!(collapse.improvement_trend, 0.0);
    }

    #[test]
    fn test_consistency_penalizes_erratic_scores() {
        let calc = calculator();
        let steady = calc.calculate(&history(&[(0.6, true), (0.6, true), (0.6, true)]));
        let erratic = calc.calculate(&history(&[(1.0, true), (0.2, true), (0.6, true)]));
        assert_eq!(steady.consistency, 1.0);
        assert!(erratic.consistency < steady.consistency);
    }

    #[test]
    fn test_confidence_grows_with_samples() {
        let calc = calculator();
        let one = calc.calculate(&history(&[(0.8, true)]));
        let five = calc.calculate(&history(&[(0.8, true); 5]));
        assert_eq!(one.confidence, 0.2);
        assert_eq!(five.confidence, 1.0);
        assert!(one.confidence < five.confidence);
    }

    #[test]
    fn test_history_truncated_to_cap() {
        let entries = vec![(0.9, true); 15];
        let result = calculator().calculate(&history(&entries));
        assert_eq!(result.attempts_count, 10);
    }

    #[test]
    fn test_out_of_range_similarity_clamped() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        // Bypass the validating constructor, as a deserialized record would.
        let record = AttemptRecord {
            term_id: "t1".into(),
            user_id: "u1".into(),
            similarity_score: 4.2,
            is_correct: true,
            attempt_number: 1,
            created_at: at,
        };
        let result = calculator().calculate(&[record]);
        // Treated as similarity 1.0: 0.6 + 0.25 + 0.075
        assert_eq!(result.score, 0.925);
        assert_eq!(result.level, MasteryLevel::Mastered);
    }

    #[test]
    fn test_nan_similarity_does_not_poison_result() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let record = AttemptRecord {
            term_id: "t1".into(),
            user_id: "u1".into(),
            similarity_score: f64::NAN,
            is_correct: true,
            attempt_number: 1,
            created_at: at,
        };
        let result = calculator().calculate(&[record]);
        assert_ne!(result.level, MasteryLevel::Error);
        assert!(result.score.is_finite());
    }

    #[test]
    fn test_determinism() {
        let calc = calculator();
        let entries = history(&[(0.7, true), (0.4, false), (0.9, true), (0.55, true)]);
        let first = calc.calculate(&entries);
        let second = calc.calculate(&entries);
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn prop_all_fields_stay_in_range(
            entries in proptest::collection::vec(
                ((0u64..=1000u64), any::<bool>()),
                0..=12,
            )
        ) {
            let pairs: Vec<(f64, bool)> = entries
                .iter()
                .map(|(s, c)| (*s as f64 / 1000.0, *c))
                .collect();
            let result = calculator().calculate(&history(&pairs));

            prop_assert!((0.0..=1.0).contains(&result.score));
            prop_assert!((0.0..=1.0).contains(&result.confidence));
            prop_assert!((0.0..=1.0).contains(&result.recent_performance));
            prop_assert!((0.0..=1.0).contains(&result.consistency));
            prop_assert!((0.0..=1.0).contains(&result.improvement_trend));
            prop_assert!(result.attempts_count as usize <= 10);
            prop_assert_ne!(result.level, MasteryLevel::Error);
        }

        #[test]
        fn prop_deterministic(
            entries in proptest::collection::vec(
                ((0u64..=1000u64), any::<bool>()),
                0..=12,
            )
        ) {
            let pairs: Vec<(f64, bool)> = entries
                .iter()
                .map(|(s, c)| (*s as f64 / 1000.0, *c))
                .collect();
            let records = history(&pairs);
            let calc = calculator();
            prop_assert_eq!(calc.calculate(&records), calc.calculate(&records));
        }
    }
}
