//! Stop-time-update rules for trip updates.
//!
//! | Rule | Checks |
//! |------|--------|
//! | E002 | stop_time_updates for a trip are sorted by increasing stop_sequence |
//! | E036 | sequential stop_time_updates don't repeat a stop_sequence |
//! | E037 | sequential stop_time_updates don't repeat a stop_id |
//! | E040 | every stop_time_update has a stop_id or stop_sequence |
//! | E041 | a non-canceled trip has at least one stop_time_update |
//! | E042 | NO_DATA stop_time_updates carry no arrival or departure |
//! | E043 | other stop_time_updates carry an arrival or departure |
//! | E044 | every arrival/departure has a delay or time |
//! | E045 | stop_sequence and stop_id agree with the static schedule |

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::gtfs_rt::trip_descriptor::ScheduleRelationship as TripRelationship;
use crate::gtfs_rt::trip_update::stop_time_update::ScheduleRelationship as StopRelationship;
use crate::gtfs_rt::trip_update::{StopTimeEvent, StopTimeUpdate};
use crate::gtfs_rt::{FeedEntity, FeedMessage, TripUpdate};
use crate::schedule::ScheduleIndex;
use crate::validation::FeedValidator;
use crate::validation::aligner::{Alignment, ScheduleAligner};
use crate::validation::occurrence::{OccurrenceLog, RuleGroup};
use crate::validation::rules::ValidationRule;

/// Validates the stop_time_updates of every trip update in a feed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StopTimeUpdateValidator;

impl FeedValidator for StopTimeUpdateValidator {
    fn validate(
        &self,
        _now: DateTime<Utc>,
        schedule: &ScheduleIndex,
        feed: &FeedMessage,
    ) -> Vec<RuleGroup> {
        let mut log = OccurrenceLog::new();
        let mut trip_updates = 0usize;

        for entity in &feed.entity {
            if let Some(trip_update) = &entity.trip_update {
                trip_updates += 1;
                validate_trip(entity, trip_update, schedule, &mut log);
            }
        }

        let groups = log.into_groups();
        debug!(trip_updates, groups = groups.len(), "Stop time updates validated");
        groups
    }
}

/// Runs every rule over one trip update in a single pass.
pub fn validate_trip(
    entity: &FeedEntity,
    trip_update: &TripUpdate,
    schedule: &ScheduleIndex,
    log: &mut OccurrenceLog,
) {
    let trip = trip_label(entity, trip_update);
    check_e041(&trip, trip_update, log);

    let mut aligner = trip_update
        .trip
        .trip_id
        .as_deref()
        .and_then(|trip_id| schedule.trip_stops(trip_id))
        .map(ScheduleAligner::new);

    let mut previous = PreviousStop::default();
    let mut stop_sequences = Vec::new();

    for update in &trip_update.stop_time_update {
        previous = previous.advance(&trip, update, log);

        if let Some(stop_sequence) = update.stop_sequence {
            stop_sequences.push(stop_sequence);
        }
        if let Some(aligner) = aligner.as_mut() {
            check_e045(&trip, aligner, update, log);
        }

        check_e040(&trip, update, log);
        check_e042(&trip, update, log);
        check_e043(&trip, update, log);
        check_e044(&trip, update, log);
    }

    check_e002(&trip, &stop_sequences, log);
    // Out-of-order stops without stop_sequence are not detected.
}

/// Identifies a trip in occurrence messages: its trip_id, or the entity id
/// when the descriptor has none.
fn trip_label(entity: &FeedEntity, trip_update: &TripUpdate) -> String {
    match &trip_update.trip.trip_id {
        Some(trip_id) => format!("trip_id {trip_id}"),
        None => format!("entity ID {}", entity.id),
    }
}

fn stop_label(update: &StopTimeUpdate) -> String {
    match update.stop_sequence {
        Some(stop_sequence) => format!("stop_sequence {stop_sequence}"),
        None => format!("stop_id {}", update.stop_id()),
    }
}

/// Adjacency state carried from one stop_time_update to the next.
///
/// Always holds the raw values of the immediately preceding update, whether
/// or not that update produced an occurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PreviousStop<'a> {
    stop_sequence: Option<u32>,
    stop_id: Option<&'a str>,
}

impl<'a> PreviousStop<'a> {
    /// Checks E036 and E037 for `update`, then returns the state for the
    /// next update.
    fn advance(self, trip: &str, update: &'a StopTimeUpdate, log: &mut OccurrenceLog) -> Self {
        if let Some(previous) = self.stop_sequence {
            check_e036(trip, previous, update, log);
        }
        if let Some(previous) = self.stop_id {
            check_e037(trip, previous, update, log);
        }

        PreviousStop {
            stop_sequence: update.stop_sequence,
            stop_id: update.stop_id.as_deref(),
        }
    }
}

fn check_e002(trip: &str, stop_sequences: &[u32], log: &mut OccurrenceLog) -> bool {
    let sorted = stop_sequences.windows(2).all(|pair| pair[0] <= pair[1]);
    if !sorted {
        log.record(
            ValidationRule::E002,
            format!("{trip} stop_sequence {stop_sequences:?}"),
        );
    }
    !sorted
}

fn check_e036(
    trip: &str,
    previous_stop_sequence: u32,
    update: &StopTimeUpdate,
    log: &mut OccurrenceLog,
) -> bool {
    if update.stop_sequence == Some(previous_stop_sequence) {
        log.record(
            ValidationRule::E036,
            format!("{trip} has repeating stop_sequence {previous_stop_sequence}"),
        );
        return true;
    }
    false
}

fn check_e037(
    trip: &str,
    previous_stop_id: &str,
    update: &StopTimeUpdate,
    log: &mut OccurrenceLog,
) -> bool {
    if previous_stop_id.is_empty() || update.stop_id.as_deref() != Some(previous_stop_id) {
        return false;
    }

    let mut prefix = format!("{trip} has repeating stop_id {previous_stop_id}");
    if let Some(stop_sequence) = update.stop_sequence {
        prefix.push_str(&format!(" at stop_sequence {stop_sequence}"));
    }
    log.record(ValidationRule::E037, prefix);
    true
}

fn check_e040(trip: &str, update: &StopTimeUpdate, log: &mut OccurrenceLog) -> bool {
    if update.stop_sequence.is_none() && update.stop_id.is_none() {
        log.record(ValidationRule::E040, trip);
        return true;
    }
    false
}

fn check_e041(trip: &str, trip_update: &TripUpdate, log: &mut OccurrenceLog) -> bool {
    if !trip_update.stop_time_update.is_empty() {
        return false;
    }
    // Canceled trips don't need any stop_time_updates.
    if trip_update.trip.schedule_relationship() == TripRelationship::Canceled {
        return false;
    }
    log.record(ValidationRule::E041, trip);
    true
}

fn check_e042(trip: &str, update: &StopTimeUpdate, log: &mut OccurrenceLog) -> bool {
    if update.schedule_relationship() != StopRelationship::NoData {
        return false;
    }

    let id = format!("{trip} {}", stop_label(update));
    let mut found = false;
    if update.arrival.is_some() {
        log.record(ValidationRule::E042, format!("{id} has arrival"));
        found = true;
    }
    if update.departure.is_some() {
        log.record(ValidationRule::E042, format!("{id} has departure"));
        found = true;
    }
    found
}

fn check_e043(trip: &str, update: &StopTimeUpdate, log: &mut OccurrenceLog) -> bool {
    if update.arrival.is_some() || update.departure.is_some() {
        return false;
    }
    if matches!(
        update.schedule_relationship(),
        StopRelationship::Skipped | StopRelationship::NoData
    ) {
        return false;
    }
    log.record(
        ValidationRule::E043,
        format!("{trip} {}", stop_label(update)),
    );
    true
}

fn check_e044(trip: &str, update: &StopTimeUpdate, log: &mut OccurrenceLog) -> bool {
    let id = format!("{trip} {}", stop_label(update));
    let arrival = update
        .arrival
        .as_ref()
        .is_some_and(|event| check_e044_event(event, &format!("{id} arrival"), log));
    let departure = update
        .departure
        .as_ref()
        .is_some_and(|event| check_e044_event(event, &format!("{id} departure"), log));
    arrival || departure
}

fn check_e044_event(event: &StopTimeEvent, prefix: &str, log: &mut OccurrenceLog) -> bool {
    if event.delay.is_none() && event.time.is_none() {
        log.record(ValidationRule::E044, prefix);
        return true;
    }
    false
}

fn check_e045(
    trip: &str,
    aligner: &mut ScheduleAligner<'_>,
    update: &StopTimeUpdate,
    log: &mut OccurrenceLog,
) -> bool {
    let (Some(stop_sequence), Some(stop_id)) = (update.stop_sequence, update.stop_id.as_deref())
    else {
        return false;
    };

    match aligner.align(stop_sequence, stop_id) {
        Alignment::Mismatch(scheduled) => {
            log.record(
                ValidationRule::E045,
                format!(
                    "GTFS-rt {trip} stop_sequence {stop_sequence} has stop_id {stop_id} \
                     but GTFS stop_sequence {} has stop_id {}",
                    scheduled.stop_sequence, scheduled.stop_id
                ),
            );
            true
        }
        Alignment::Match | Alignment::Exhausted => false,
    }
}
