//! Catalog of the stop-time-update rules checked by this crate.

use serde::{Serialize, Serializer};
use std::fmt;

/// How serious a rule violation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
}

/// A single validation rule.
///
/// Variants are declared in report order, so the derived `Ord` is the order
/// rule groups are emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValidationRule {
    /// stop_time_updates for a trip must be sorted by increasing stop_sequence.
    E002,
    /// Sequential stop_time_updates have the same stop_sequence.
    E036,
    /// Sequential stop_time_updates have the same stop_id.
    E037,
    /// stop_time_update doesn't contain stop_id or stop_sequence.
    E040,
    /// Trip doesn't have any stop_time_updates.
    E041,
    /// Arrival or departure provided for a NO_DATA stop_time_update.
    E042,
    /// stop_time_update doesn't have arrival or departure.
    E043,
    /// stop_time_update arrival/departure doesn't have delay or time.
    E044,
    /// GTFS-rt stop_sequence and stop_id do not match GTFS.
    E045,
}

impl ValidationRule {
    /// Every rule, in report order.
    pub const ALL: [ValidationRule; 9] = [
        ValidationRule::E002,
        ValidationRule::E036,
        ValidationRule::E037,
        ValidationRule::E040,
        ValidationRule::E041,
        ValidationRule::E042,
        ValidationRule::E043,
        ValidationRule::E044,
        ValidationRule::E045,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ValidationRule::E002 => "E002",
            ValidationRule::E036 => "E036",
            ValidationRule::E037 => "E037",
            ValidationRule::E040 => "E040",
            ValidationRule::E041 => "E041",
            ValidationRule::E042 => "E042",
            ValidationRule::E043 => "E043",
            ValidationRule::E044 => "E044",
            ValidationRule::E045 => "E045",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Error
    }

    /// Short human-readable summary of what the rule catches.
    pub fn title(&self) -> &'static str {
        match self {
            ValidationRule::E002 => "stop_time_updates not strictly sorted",
            ValidationRule::E036 => "Sequential stop_time_updates have the same stop_sequence",
            ValidationRule::E037 => "Sequential stop_time_updates have the same stop_id",
            ValidationRule::E040 => "stop_time_update doesn't contain stop_id or stop_sequence",
            ValidationRule::E041 => "trip doesn't have any stop_time_updates",
            ValidationRule::E042 => "arrival or departure provided for NO_DATA stop_time_update",
            ValidationRule::E043 => "stop_time_update doesn't have arrival or departure",
            ValidationRule::E044 => "stop_time_update arrival/departure doesn't have delay or time",
            ValidationRule::E045 => {
                "GTFS-rt stop_time_update stop_sequence and stop_id do not match GTFS"
            }
        }
    }

    /// Text appended after an occurrence's prefix when it is logged.
    pub fn occurrence_suffix(&self) -> &'static str {
        match self {
            ValidationRule::E002 => "is not sorted by increasing stop_sequence",
            ValidationRule::E036 => "- sequential stop_time_updates must differ",
            ValidationRule::E037 => "- sequential stop_time_updates must differ",
            ValidationRule::E040 => "doesn't contain stop_id or stop_sequence",
            ValidationRule::E041 => "doesn't have any stop_time_updates",
            ValidationRule::E042 => "but is NO_DATA",
            ValidationRule::E043 => "doesn't have arrival or departure",
            ValidationRule::E044 => "doesn't have delay or time",
            ValidationRule::E045 => "",
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl Serialize for ValidationRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}
