//! Learning Streak Calculator
//!
//! Folds a user's daily attempt counts over the trailing window into streak
//! lengths, totals, and accuracy. `today` is an explicit argument so the
//! calculation stays a pure function of its inputs; the caller supplies the
//! clock.

use chrono::{Days, NaiveDate};

use crate::sanitize::percentage;
use crate::types::{DailyActivity, LearningStreak, ScoringConfig};

pub struct StreakCalculator {
    config: ScoringConfig,
}

impl StreakCalculator {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Compute streak statistics from daily activity rows, descending by
    /// date, one row per active day. Rows outside the trailing window (or in
    /// the future) are ignored.
    pub fn calculate(&self, today: NaiveDate, daily_activity: &[DailyActivity]) -> LearningStreak {
        let window_start = today
            .checked_sub_days(Days::new(
                (self.config.streak_window_days as u64).saturating_sub(1),
            ))
            .unwrap_or(NaiveDate::MIN);
        let rows: Vec<&DailyActivity> = daily_activity
            .iter()
            .filter(|d| d.date >= window_start && d.date <= today)
            .collect();

        // Current streak: consecutive calendar days ending today. A day off
        // today means no current streak, regardless of earlier runs.
        let mut current_streak = 0u32;
        let mut expected = today;
        for day in &rows {
            if day.date != expected {
                break;
            }
            current_streak += 1;
            match expected.checked_sub_days(Days::new(1)) {
                Some(prev) => expected = prev,
                None => break,
            }
        }

        // Longest streak: maximal consecutive-day run, scanned ascending.
        let mut longest_streak = 0u32;
        let mut run = 0u32;
        let mut prev_date: Option<NaiveDate> = None;
        for day in rows.iter().rev() {
            let continues = match prev_date {
                Some(prev) => prev.checked_add_days(Days::new(1)) == Some(day.date),
                None => false,
            };
            run = if continues { run + 1 } else { 1 };
            longest_streak = longest_streak.max(run);
            prev_date = Some(day.date);
        }

        let total_attempts: u32 = rows.iter().map(|d| d.attempt_count).sum();
        let total_correct: u32 = rows.iter().map(|d| d.correct_count).sum();

        LearningStreak {
            current_streak,
            longest_streak,
            total_attempts_30_days: total_attempts,
            total_correct_30_days: total_correct,
            active_days_30_days: rows.len() as u32,
            accuracy_30_days: percentage(total_correct, total_attempts),
        }
    }
}
