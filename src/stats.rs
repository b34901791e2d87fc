use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::gtfs_rt::FeedMessage;
use crate::validation::{RuleGroup, ValidationRule};

/// One summary row per validation run, written to the CSV history.
#[derive(Debug, Default, Serialize)]
pub struct ValidationStats {
    pub timestamp: DateTime<Utc>,
    pub feed: Option<String>,
    pub feed_timestamp: Option<u64>,
    pub total_entities: usize,
    pub trip_updates: usize,
    pub stop_time_updates: usize,

    // occurrences per rule
    pub total_occurrences: usize,
    pub e002: usize,
    pub e036: usize,
    pub e037: usize,
    pub e040: usize,
    pub e041: usize,
    pub e042: usize,
    pub e043: usize,
    pub e044: usize,
    pub e045: usize,

    // error tracking
    pub error_type: Option<String>,
    pub error_message: Option<String>,
}

impl ValidationStats {
    pub fn from_report(feed: &FeedMessage, groups: &[RuleGroup]) -> Self {
        let mut s = ValidationStats {
            timestamp: Utc::now(),
            feed_timestamp: feed.header.timestamp,
            total_entities: feed.entity.len(),
            ..Default::default()
        };

        for e in &feed.entity {
            if let Some(trip_update) = &e.trip_update {
                s.trip_updates += 1;
                s.stop_time_updates += trip_update.stop_time_update.len();
            }
        }

        for group in groups {
            let n = group.occurrences.len();
            s.total_occurrences += n;
            *s.count_mut(group.rule) += n;
        }

        s
    }

    /// Create an error record with timestamp and error information
    pub fn from_error(error_type: &str, error_message: &str) -> Self {
        ValidationStats {
            timestamp: Utc::now(),
            error_type: Some(error_type.to_string()),
            error_message: Some(error_message.to_string()),
            ..Default::default()
        }
    }

    /// Set the label of the feed the row describes
    pub fn with_feed_info(mut self, feed: &str) -> Self {
        self.feed = Some(feed.to_string());
        self
    }

    pub fn count(&self, rule: ValidationRule) -> usize {
        match rule {
            ValidationRule::E002 => self.e002,
            ValidationRule::E036 => self.e036,
            ValidationRule::E037 => self.e037,
            ValidationRule::E040 => self.e040,
            ValidationRule::E041 => self.e041,
            ValidationRule::E042 => self.e042,
            ValidationRule::E043 => self.e043,
            ValidationRule::E044 => self.e044,
            ValidationRule::E045 => self.e045,
        }
    }

    fn count_mut(&mut self, rule: ValidationRule) -> &mut usize {
        match rule {
            ValidationRule::E002 => &mut self.e002,
            ValidationRule::E036 => &mut self.e036,
            ValidationRule::E037 => &mut self.e037,
            ValidationRule::E040 => &mut self.e040,
            ValidationRule::E041 => &mut self.e041,
            ValidationRule::E042 => &mut self.e042,
            ValidationRule::E043 => &mut self.e043,
            ValidationRule::E044 => &mut self.e044,
            ValidationRule::E045 => &mut self.e045,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.error_type.is_none() && self.total_occurrences == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs_rt::trip_update::StopTimeUpdate;
    use crate::gtfs_rt::{FeedEntity, FeedHeader, TripUpdate};
    use crate::validation::Occurrence;

    fn create_feed() -> FeedMessage {
        FeedMessage {
            header: FeedHeader {
                gtfs_realtime_version: "2.0".to_string(),
                timestamp: Some(1700000000),
                ..Default::default()
            },
            entity: vec![
                FeedEntity {
                    id: "1".to_string(),
                    trip_update: Some(TripUpdate {
                        stop_time_update: vec![StopTimeUpdate::default(), StopTimeUpdate::default()],
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                FeedEntity {
                    id: "2".to_string(),
                    ..Default::default()
                },
            ],
        }
    }

    fn group(rule: ValidationRule, n: usize) -> RuleGroup {
        RuleGroup {
            rule,
            occurrences: (0..n).map(|i| Occurrence::new(format!("trip_id t{i}"))).collect(),
        }
    }

    #[test]
    fn test_from_report_counts_entities() {
        let stats = ValidationStats::from_report(&create_feed(), &[]);

        assert_eq!(stats.total_entities, 2);
        assert_eq!(stats.trip_updates, 1);
        assert_eq!(stats.stop_time_updates, 2);
        assert_eq!(stats.feed_timestamp, Some(1700000000));
        assert!(stats.is_clean());
    }

    #[test]
    fn test_from_report_counts_occurrences_per_rule() {
        let groups = vec![group(ValidationRule::E002, 1), group(ValidationRule::E043, 3)];
        let stats = ValidationStats::from_report(&create_feed(), &groups);

        assert_eq!(stats.total_occurrences, 4);
        assert_eq!(stats.count(ValidationRule::E002), 1);
        assert_eq!(stats.count(ValidationRule::E043), 3);
        assert_eq!(stats.count(ValidationRule::E045), 0);
        assert!(!stats.is_clean());
    }

    #[test]
    fn test_from_error_with_feed_info() {
        let stats = ValidationStats::from_error("parse_error", "bad bytes").with_feed_info("mbta");

        assert_eq!(stats.feed.as_deref(), Some("mbta"));
        assert_eq!(stats.error_type.as_deref(), Some("parse_error"));
        assert_eq!(stats.total_occurrences, 0);
        assert!(!stats.is_clean());
    }
}
