//! Dashboard Composer
//!
//! Combines per-domain aggregates into user-wide totals, a short
//! recent-activity feed, and the learning streak. Collaborator failures
//! degrade to documented defaults instead of failing the request: a term
//! fetch failure classifies that term as `error`, a failed activity fetch
//! falls back to a zero streak, and a failed domain listing yields an empty
//! dashboard (the streak is still computed, it runs off a different store).

use chrono::NaiveDate;

use crate::progress::{DomainAggregator, TermHistory};
use crate::provider::{AttemptHistoryProvider, DailyActivityProvider, DomainCatalog};
use crate::sanitize::{percentage, round_dp};
use crate::streak::StreakCalculator;
use crate::types::{
    DashboardView, DomainMeta, DomainOverview, LearningStreak, RecentActivityItem, ScoringConfig,
};

pub struct DashboardComposer {
    aggregator: DomainAggregator,
    streaks: StreakCalculator,
    config: ScoringConfig,
}

impl DashboardComposer {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            aggregator: DomainAggregator::new(config.clone()),
            streaks: StreakCalculator::new(config.clone()),
            config,
        }
    }

    /// Compose the user-wide dashboard. Never fails: every collaborator
    /// error degrades to the documented default for its slice of the view.
    pub fn compose<C, A, D>(
        &self,
        user_id: &str,
        today: NaiveDate,
        catalog: &C,
        attempts: &A,
        activity: &D,
    ) -> DashboardView
    where
        C: DomainCatalog,
        A: AttemptHistoryProvider,
        D: DailyActivityProvider,
    {
        let streak = self.compose_streak(user_id, today, activity);

        let domains = match catalog.list_domains(user_id) {
            Ok(domains) => domains,
            Err(err) => {
                tracing::warn!(error = %err, user_id = %user_id, "domain listing failed");
                return DashboardView {
                    streak,
                    ..DashboardView::empty()
                };
            }
        };

        let mut view = DashboardView {
            streak,
            ..DashboardView::empty()
        };
        let mut feed: Vec<RecentActivityItem> = Vec::new();

        for domain in &domains {
            let (overview, mut items) = self.compose_domain(user_id, domain, catalog, attempts);
            view.total_terms += overview.progress.total_terms;
            view.mastered_terms += overview.progress.mastery_breakdown.mastered;
            view.proficient_terms += overview.progress.mastery_breakdown.proficient;
            view.domains.push(overview);
            feed.append(&mut items);
        }

        // Conservative headline: only mastered + proficient count, unlike
        // the per-domain completion which also counts developing.
        view.overall_completion_percentage = percentage(
            view.mastered_terms + view.proficient_terms,
            view.total_terms,
        );
        view.overall_mastery_percentage = percentage(view.mastered_terms, view.total_terms);

        feed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        feed.truncate(self.config.activity_feed_len);
        view.recent_activity = feed;

        view
    }

    fn compose_domain<C, A>(
        &self,
        user_id: &str,
        domain: &DomainMeta,
        catalog: &C,
        attempts: &A,
    ) -> (DomainOverview, Vec<RecentActivityItem>)
    where
        C: DomainCatalog,
        A: AttemptHistoryProvider,
    {
        let term_ids = match catalog.list_terms(&domain.id) {
            Ok(term_ids) => term_ids,
            Err(err) => {
                tracing::warn!(error = %err, domain_id = %domain.id, "term listing failed");
                return (
                    DomainOverview {
                        domain_id: domain.id.clone(),
                        domain_name: domain.name.clone(),
                        progress: crate::types::DomainProgress::empty(),
                    },
                    Vec::new(),
                );
            }
        };

        let mut histories = Vec::with_capacity(term_ids.len());
        let mut failed_terms = 0u32;
        for term_id in &term_ids {
            match attempts.fetch_recent_attempts(user_id, term_id, self.config.history_cap) {
                Ok(fetched) => histories.push(TermHistory {
                    term_id: term_id.clone(),
                    attempts: fetched,
                }),
                Err(err) => {
                    tracing::warn!(error = %err, term_id = %term_id, "attempt fetch failed");
                    failed_terms += 1;
                }
            }
        }

        let items = histories
            .iter()
            .flat_map(|term| {
                term.attempts.iter().map(|attempt| RecentActivityItem {
                    timestamp: attempt.created_at,
                    is_correct: attempt.is_correct,
                    similarity_score: round_dp(attempt.similarity_score, 2),
                    term_id: term.term_id.clone(),
                    domain_name: domain.name.clone(),
                })
            })
            .collect();

        let progress = self.aggregator.fold(&histories, failed_terms);
        (
            DomainOverview {
                domain_id: domain.id.clone(),
                domain_name: domain.name.clone(),
                progress,
            },
            items,
        )
    }

    fn compose_streak<D>(&self, user_id: &str, today: NaiveDate, activity: &D) -> LearningStreak
    where
        D: DailyActivityProvider,
    {
        match activity.fetch_daily_activity(user_id, self.config.streak_window_days) {
            Ok(rows) => self.streaks.calculate(today, &rows),
            Err(err) => {
                tracing::warn!(error = %err, user_id = %user_id, "daily activity fetch failed");
                LearningStreak::default()
            }
        }
    }
}
