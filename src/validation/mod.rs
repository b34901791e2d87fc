//! Conformance rules for GTFS-RT trip updates.
//!
//! A validator walks a decoded [`FeedMessage`] alongside the static
//! [`ScheduleIndex`] and returns its violations grouped by
//! [`ValidationRule`], in rule order, omitting rules that found nothing.

pub mod aligner;
pub mod occurrence;
pub mod rules;
pub mod stop_time_update;

pub use occurrence::{Occurrence, OccurrenceLog, RuleGroup};
pub use rules::{Severity, ValidationRule};
pub use stop_time_update::StopTimeUpdateValidator;

use chrono::{DateTime, Utc};

use crate::gtfs_rt::FeedMessage;
use crate::schedule::ScheduleIndex;

/// A set of rules evaluated over one feed snapshot.
///
/// Implementations hold no state between calls, so the same snapshot and
/// schedule always produce the same groups.
pub trait FeedValidator {
    /// `now` is the time the snapshot is validated at.
    fn validate(
        &self,
        now: DateTime<Utc>,
        schedule: &ScheduleIndex,
        feed: &FeedMessage,
    ) -> Vec<RuleGroup>;
}
