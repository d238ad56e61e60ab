//! Common Types and Constants
//!
//! Typed records shared across the scoring modules, plus the immutable
//! scoring configuration. Attempt histories arrive most-recent-first; every
//! struct here is a plain value with no interior mutability.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::sanitize::clamp_unit;

// ==================== Constants ====================

/// Maximum attempts considered per term (most recent first)
pub const DEFAULT_HISTORY_CAP: usize = 10;

/// Attempts averaged for recent performance
pub const DEFAULT_RECENT_WINDOW: usize = 3;

/// Minimum attempts before the improvement trend is computed
pub const DEFAULT_TREND_MIN_ATTEMPTS: usize = 4;

/// Attempts needed for full confidence
pub const DEFAULT_CONFIDENCE_SAMPLES: usize = 5;

/// Exponential recency decay rate per attempt index
pub const DEFAULT_RECENCY_DECAY: f64 = 0.3;

/// Contribution multiplier for incorrect answers
pub const DEFAULT_INCORRECT_PENALTY: f64 = 0.7;

/// Trailing window for streak statistics (days)
pub const DEFAULT_STREAK_WINDOW_DAYS: u32 = 30;

/// Entries in the dashboard recent-activity feed
pub const DEFAULT_ACTIVITY_FEED_LEN: usize = 10;

/// Tolerance for weight-sum validation
pub const WEIGHT_SUM_EPSILON: f64 = 1e-6;

// ==================== Attempt Records ====================

/// One historical quiz answer. Created by the attempt-recording collaborator
/// and immutable thereafter; this crate only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub term_id: String,
    pub user_id: String,
    /// Answer similarity in [0, 1], computed upstream
    pub similarity_score: f64,
    /// Independent of similarity: a low-similarity answer can still be correct
    pub is_correct: bool,
    /// Assigned externally, monotonically increasing per (user, term)
    pub attempt_number: u32,
    pub created_at: DateTime<Utc>,
}

impl AttemptRecord {
    /// Build a record, clamping the similarity score into [0, 1].
    pub fn new(
        term_id: &str,
        user_id: &str,
        similarity_score: f64,
        is_correct: bool,
        attempt_number: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            term_id: term_id.to_string(),
            user_id: user_id.to_string(),
            similarity_score: clamp_unit(similarity_score),
            is_correct,
            attempt_number,
            created_at,
        }
    }
}

// ==================== Mastery Types ====================

/// Categorical mastery label derived from the continuous mastery score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryLevel {
    NotAttempted,
    NeedsPractice,
    Beginner,
    Developing,
    Proficient,
    Mastered,
    Error,
}

impl MasteryLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MasteryLevel::NotAttempted => "not_attempted",
            MasteryLevel::NeedsPractice => "needs_practice",
            MasteryLevel::Beginner => "beginner",
            MasteryLevel::Developing => "developing",
            MasteryLevel::Proficient => "proficient",
            MasteryLevel::Mastered => "mastered",
            MasteryLevel::Error => "error",
        }
    }

    /// Classify a composite score. Thresholds are inclusive lower bounds.
    pub fn from_score(score: f64, config: &ScoringConfig) -> Self {
        if score >= config.mastered_threshold {
            MasteryLevel::Mastered
        } else if score >= config.proficient_threshold {
            MasteryLevel::Proficient
        } else if score >= config.developing_threshold {
            MasteryLevel::Developing
        } else if score >= config.beginner_threshold {
            MasteryLevel::Beginner
        } else {
            MasteryLevel::NeedsPractice
        }
    }
}

/// Computed mastery snapshot for one term. Ephemeral: recomputed on every
/// request from the capped attempt history, never persisted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryResult {
    pub level: MasteryLevel,
    /// Weighted composite in [0, 1]
    pub score: f64,
    pub confidence: f64,
    pub attempts_count: u32,
    /// Mean raw similarity of the most recent attempts
    pub recent_performance: f64,
    /// Inverse of similarity variance; meaningful from 2 attempts
    pub consistency: f64,
    /// Recent-vs-older half comparison; meaningful from 4 attempts
    pub improvement_trend: f64,
}

impl MasteryResult {
    /// Default for a term with no attempts
    pub fn empty() -> Self {
        Self {
            level: MasteryLevel::NotAttempted,
            score: 0.0,
            confidence: 0.0,
            attempts_count: 0,
            recent_performance: 0.0,
            consistency: 0.0,
            improvement_trend: 0.0,
        }
    }

    /// Default when the computation itself failed
    pub fn failed() -> Self {
        Self {
            level: MasteryLevel::Error,
            ..Self::empty()
        }
    }
}

// ==================== Domain Aggregates ====================

/// Per-level term counts; counters sum to the domain's term count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryBreakdown {
    pub not_attempted: u32,
    pub needs_practice: u32,
    pub beginner: u32,
    pub developing: u32,
    pub proficient: u32,
    pub mastered: u32,
    pub error: u32,
}

impl MasteryBreakdown {
    pub fn record(&mut self, level: MasteryLevel) {
        match level {
            MasteryLevel::NotAttempted => self.not_attempted += 1,
            MasteryLevel::NeedsPractice => self.needs_practice += 1,
            MasteryLevel::Beginner => self.beginner += 1,
            MasteryLevel::Developing => self.developing += 1,
            MasteryLevel::Proficient => self.proficient += 1,
            MasteryLevel::Mastered => self.mastered += 1,
            MasteryLevel::Error => self.error += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.not_attempted
            + self.needs_practice
            + self.beginner
            + self.developing
            + self.proficient
            + self.mastered
            + self.error
    }

    /// Terms at developing or better, the per-domain notion of progress
    pub fn progressed(&self) -> u32 {
        self.developing + self.proficient + self.mastered
    }
}

/// Aggregate over all terms in one domain for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainProgress {
    pub total_terms: u32,
    /// 100 × (developing + proficient + mastered) / total, in [0, 100]
    pub completion_percentage: f64,
    /// 100 × mastered / total, in [0, 100]
    pub mastery_percentage: f64,
    pub mastery_breakdown: MasteryBreakdown,
    /// Latest attempt timestamp across the domain, if any
    pub last_activity: Option<DateTime<Utc>>,
}

impl DomainProgress {
    /// Aggregate for a domain with no terms
    pub fn empty() -> Self {
        Self {
            total_terms: 0,
            completion_percentage: 0.0,
            mastery_percentage: 0.0,
            mastery_breakdown: MasteryBreakdown::default(),
            last_activity: None,
        }
    }
}

// ==================== Streak Types ====================

/// One active day in the trailing activity window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub attempt_count: u32,
    pub correct_count: u32,
}

/// Streak statistics over the trailing 30-day window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStreak {
    /// Consecutive active days ending today
    pub current_streak: u32,
    /// Longest consecutive-day run in the window
    pub longest_streak: u32,
    pub total_attempts_30_days: u32,
    pub total_correct_30_days: u32,
    pub active_days_30_days: u32,
    /// 100 × correct / attempts, in [0, 100]
    pub accuracy_30_days: f64,
}

// ==================== Dashboard Types ====================

/// Domain descriptor supplied by the catalog collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainMeta {
    pub id: String,
    pub name: String,
    pub term_count: u32,
}

/// One row of the dashboard recent-activity feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivityItem {
    pub timestamp: DateTime<Utc>,
    pub is_correct: bool,
    /// Raw similarity rounded to 2 decimals for display
    pub similarity_score: f64,
    pub term_id: String,
    pub domain_name: String,
}

/// Per-domain aggregate inside the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainOverview {
    pub domain_id: String,
    pub domain_name: String,
    pub progress: DomainProgress,
}

/// User-wide dashboard: cross-domain totals, activity feed, streaks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub total_terms: u32,
    pub mastered_terms: u32,
    pub proficient_terms: u32,
    /// 100 × (mastered + proficient) / total terms. Intentionally narrower
    /// than per-domain completion: developing terms do not count here.
    pub overall_completion_percentage: f64,
    pub overall_mastery_percentage: f64,
    pub domains: Vec<DomainOverview>,
    pub recent_activity: Vec<RecentActivityItem>,
    pub streak: LearningStreak,
}

impl DashboardView {
    pub fn empty() -> Self {
        Self {
            total_terms: 0,
            mastered_terms: 0,
            proficient_terms: 0,
            overall_completion_percentage: 0.0,
            overall_mastery_percentage: 0.0,
            domains: Vec::new(),
            recent_activity: Vec::new(),
            streak: LearningStreak::default(),
        }
    }
}

// ==================== Configuration ====================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("component weights must sum to 1.0, got {0}")]
    WeightSum(f64),
    #[error("level thresholds must be strictly descending and inside (0, 1)")]
    ThresholdOrder,
    #[error("{0} must be greater than zero")]
    ZeroWindow(&'static str),
    #[error("{0} must lie in [0, 1]")]
    UnitRange(&'static str),
}

/// Immutable scoring configuration, passed to each component at construction.
/// Every tunable of the engine lives here; there is no module-level state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    /// Attempts considered per term, most recent first
    pub history_cap: usize,
    /// Attempts averaged for recent performance
    pub recent_window: usize,
    /// Minimum attempts before the trend is computed
    pub trend_min_attempts: usize,
    /// Attempts needed for full confidence
    pub confidence_samples: usize,
    /// Exponential decay rate per recency index
    pub recency_decay: f64,
    /// Multiplier applied to incorrect-answer similarity
    pub incorrect_penalty: f64,
    pub performance_weight: f64,
    pub consistency_weight: f64,
    pub improvement_weight: f64,
    pub mastered_threshold: f64,
    pub proficient_threshold: f64,
    pub developing_threshold: f64,
    pub beginner_threshold: f64,
    /// Trailing window for streak statistics (days)
    pub streak_window_days: u32,
    /// Entries in the recent-activity feed
    pub activity_feed_len: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            history_cap: DEFAULT_HISTORY_CAP,
            recent_window: DEFAULT_RECENT_WINDOW,
            trend_min_attempts: DEFAULT_TREND_MIN_ATTEMPTS,
            confidence_samples: DEFAULT_CONFIDENCE_SAMPLES,
            recency_decay: DEFAULT_RECENCY_DECAY,
            incorrect_penalty: DEFAULT_INCORRECT_PENALTY,
            performance_weight: 0.6,
            consistency_weight: 0.25,
            improvement_weight: 0.15,
            mastered_threshold: 0.85,
            proficient_threshold: 0.70,
            developing_threshold: 0.50,
            beginner_threshold: 0.30,
            streak_window_days: DEFAULT_STREAK_WINDOW_DAYS,
            activity_feed_len: DEFAULT_ACTIVITY_FEED_LEN,
        }
    }
}

impl ScoringConfig {
    /// Reject nonsensical tunables before the engine is constructed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weight_sum =
            self.performance_weight + self.consistency_weight + self.improvement_weight;
        if (weight_sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(ConfigError::WeightSum(weight_sum));
        }
        for (name, value) in [
            ("incorrect_penalty", self.incorrect_penalty),
            ("performance_weight", self.performance_weight),
            ("consistency_weight", self.consistency_weight),
            ("improvement_weight", self.improvement_weight),
        ] {
            if !(0.0..=1.0).contains(&value) || value.is_nan() {
                return Err(ConfigError::UnitRange(name));
            }
        }
        let thresholds = [
            self.mastered_threshold,
            self.proficient_threshold,
            self.developing_threshold,
            self.beginner_threshold,
        ];
        let descending = thresholds.windows(2).all(|w| w[0] > w[1]);
        let in_range = thresholds.iter().all(|t| *t > 0.0 && *t < 1.0);
        if !descending || !in_range {
            return Err(ConfigError::ThresholdOrder);
        }
        for (name, value) in [
            ("history_cap", self.history_cap),
            ("recent_window", self.recent_window),
            ("trend_min_attempts", self.trend_min_attempts),
            ("confidence_samples", self.confidence_samples),
            ("activity_feed_len", self.activity_feed_len),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroWindow(name));
            }
        }
        if self.streak_window_days == 0 {
            return Err(ConfigError::ZeroWindow("streak_window_days"));
        }
        Ok(())
    }
}

// ==================== Tests ====================
