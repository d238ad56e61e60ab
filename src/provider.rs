//! External Collaborator Interfaces
//!
//! The scoring engine performs no I/O of its own. A surrounding handler
//! supplies implementations of these traits (backed by whatever store it
//! uses); the only implementations in this crate are test fixtures.

use crate::types::{AttemptRecord, DailyActivity, DomainMeta};

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("backing store unavailable: {0}")]
    Unavailable(String),
    #[error("unknown domain: {0}")]
    UnknownDomain(String),
    #[error("unknown user: {0}")]
    UnknownUser(String),
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// Supplies per-(user, term) attempt history, most-recent-first, capped to
/// `limit` entries.
pub trait AttemptHistoryProvider {
    fn fetch_recent_attempts(
        &self,
        user_id: &str,
        term_id: &str,
        limit: usize,
    ) -> ProviderResult<Vec<AttemptRecord>>;
}

/// Enumerates a user's domains and the terms inside a domain.
pub trait DomainCatalog {
    fn list_domains(&self, user_id: &str) -> ProviderResult<Vec<DomainMeta>>;
    fn list_terms(&self, domain_id: &str) -> ProviderResult<Vec<String>>;
}

/// Supplies daily attempt counts for the trailing window, descending by
/// date, one row per active day. Days without activity are absent.
pub trait DailyActivityProvider {
    fn fetch_daily_activity(&self, user_id: &str, days: u32) -> ProviderResult<Vec<DailyActivity>>;
}
