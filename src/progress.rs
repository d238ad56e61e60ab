//! Domain Progress Aggregator
//!
//! Runs the mastery calculator once per term in a domain and folds the
//! results into completion/mastery percentages, a per-level breakdown, and
//! the most recent activity timestamp. Per-term calculations are independent
//! and read-only, so the fan out runs on rayon.

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::mastery::MasteryCalculator;
use crate::provider::AttemptHistoryProvider;
use crate::sanitize::percentage;
use crate::types::{AttemptRecord, DomainProgress, MasteryBreakdown, MasteryLevel, ScoringConfig};

/// One term's pre-fetched attempt history, most-recent-first
#[derive(Debug, Clone)]
pub struct TermHistory {
    pub term_id: String,
    pub attempts: Vec<AttemptRecord>,
}

pub struct DomainAggregator {
    calculator: MasteryCalculator,
    config: ScoringConfig,
}

impl DomainAggregator {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            calculator: MasteryCalculator::new(config.clone()),
            config,
        }
    }

    /// Fetch each term's capped history and aggregate. A failed fetch
    /// classifies that term as `error` rather than failing the aggregate.
    pub fn aggregate_domain<P>(
        &self,
        provider: &P,
        user_id: &str,
        term_ids: &[String],
    ) -> DomainProgress
    where
        P: AttemptHistoryProvider,
    {
        let mut histories = Vec::with_capacity(term_ids.len());
        let mut failed_terms = 0u32;

        for term_id in term_ids {
            match provider.fetch_recent_attempts(user_id, term_id, self.config.history_cap) {
                Ok(attempts) => histories.push(TermHistory {
                    term_id: term_id.clone(),
                    attempts,
                }),
                Err(err) => {
                    tracing::warn!(error = %err, term_id = %term_id, "attempt fetch failed");
                    failed_terms += 1;
                }
            }
        }

        self.fold(&histories, failed_terms)
    }

    /// Aggregate pre-fetched histories. Pure: no I/O, no shared state.
    pub fn aggregate(&self, histories: &[TermHistory]) -> DomainProgress {
        self.fold(histories, 0)
    }

    pub(crate) fn fold(&self, histories: &[TermHistory], failed_terms: u32) -> DomainProgress {
        let total_terms = histories.len() as u32 + failed_terms;
        if total_terms == 0 {
            return DomainProgress::empty();
        }

        let outcomes: Vec<(MasteryLevel, Option<DateTime<Utc>>)> = histories
            .par_iter()
            .map(|term| {
                let result = self.calculator.calculate(&term.attempts);
                let last = term.attempts.iter().map(|a| a.created_at).max();
                (result.level, last)
            })
            .collect();

        let mut breakdown = MasteryBreakdown {
            error: failed_terms,
            ..MasteryBreakdown::default()
        };
        let mut last_activity: Option<DateTime<Utc>> = None;
        for (level, last) in outcomes {
            breakdown.record(level);
            if let Some(ts) = last {
                last_activity = Some(last_activity.map_or(ts, |prev| prev.max(ts)));
            }
        }

        DomainProgress {
            total_terms,
            completion_percentage: percentage(breakdown.progressed(), total_terms),
            mastery_percentage: percentage(breakdown.mastered, total_terms),
            mastery_breakdown: breakdown,
            last_activity,
        }
    }
}
