//! # mastery-algo - Adaptive mastery and progress scoring
//!
//! Pure scoring engine for quiz-based learning: converts a time-ordered
//! sequence of answer attempts into mastery levels and aggregates them into
//! per-domain and user-wide progress views.
//!
//! ## Design
//!
//! - **Pure computation** - no network, file, or database access; the
//!   surrounding handler supplies data through the [`provider`] traits
//! - **Deterministic** - the same attempt history always yields the same
//!   result, so repeated requests are cheap to recompute
//! - **Never the failure** - empty data and internal failures collapse to
//!   documented defaults instead of propagating, so one bad term cannot
//!   break a dashboard request
//! - **Configurable** - all tunables live in an immutable [`ScoringConfig`]
//!   passed at construction
//!
//! ## Modules
//!
//! - [`types`] - typed records, mastery levels, configuration
//! - [`sanitize`] - numeric hygiene (clamping, rounding, safe percentages)
//! - [`provider`] - traits for the external data collaborators
//! - [`mastery`] - per-term mastery calculation
//! - [`progress`] - per-domain aggregation
//! - [`streak`] - trailing-window streak statistics
//! - [`dashboard`] - user-wide dashboard composition
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use mastery_algo::{AttemptRecord, MasteryCalculator, ScoringConfig};
//!
//! let calculator = MasteryCalculator::new(ScoringConfig::default());
//!
//! // Most-recent-first attempt history for one term.
//! let history = vec![
//!     AttemptRecord::new("term-1", "user-1", 0.92, true, 3, Utc::now()),
//!     AttemptRecord::new("term-1", "user-1", 0.88, true, 2, Utc::now()),
//! ];
//!
//! let result = calculator.calculate(&history);
//! assert_eq!(result.attempts_count, 2);
//! assert!(result.score > 0.0 && result.score <= 1.0);
//! ```

pub mod dashboard;
pub mod mastery;
pub mod progress;
pub mod provider;
pub mod sanitize;
pub mod streak;
pub mod types;

pub use types::*;

pub use dashboard::DashboardComposer;
pub use mastery::{ComputeError, MasteryCalculator};
pub use progress::{DomainAggregator, TermHistory};
pub use provider::{
    AttemptHistoryProvider, DailyActivityProvider, DomainCatalog, ProviderError, ProviderResult,
};
pub use streak::StreakCalculator;
