//! Static GTFS schedule index: the ordered stop list of every trip.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// One `stop_times.txt` row reduced to what the validator needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StaticStopEntry {
    pub stop_sequence: u32,
    pub stop_id: String,
}

impl StaticStopEntry {
    pub fn new(stop_sequence: u32, stop_id: impl Into<String>) -> Self {
        Self {
            stop_sequence,
            stop_id: stop_id.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StopTimeRow {
    trip_id: String,
    stop_id: String,
    stop_sequence: u32,
}

/// Maps `trip_id` to that trip's stops, sorted ascending by `stop_sequence`.
///
/// Built once per static schedule load and shared read-only by every
/// validation run.
#[derive(Debug, Clone, Default)]
pub struct ScheduleIndex {
    trips: HashMap<String, Vec<StaticStopEntry>>,
}

impl ScheduleIndex {
    /// Groups `(trip_id, entry)` pairs by trip and sorts each trip's stops.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, StaticStopEntry)>,
        S: Into<String>,
    {
        let mut trips: HashMap<String, Vec<StaticStopEntry>> = HashMap::new();
        for (trip_id, entry) in entries {
            trips.entry(trip_id.into()).or_default().push(entry);
        }
        for stops in trips.values_mut() {
            stops.sort_by_key(|s| s.stop_sequence);
        }
        Self { trips }
    }

    /// Reads GTFS `stop_times.txt` content. Columns other than `trip_id`,
    /// `stop_id` and `stop_sequence` are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending line if a row is missing one of
    /// those columns or has a non-integer `stop_sequence`.
    pub fn from_stop_times_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let mut rows = Vec::new();

        for result in rdr.deserialize::<StopTimeRow>() {
            let row = result.with_context(|| {
                format!("invalid stop_times row at line {}", rows.len() + 2)
            })?;
            rows.push((row.trip_id, StaticStopEntry::new(row.stop_sequence, row.stop_id)));
        }

        debug!(rows = rows.len(), "stop_times rows read");
        Ok(Self::from_entries(rows))
    }

    /// Loads the index from a `stop_times.txt` file on disk.
    pub fn load_stop_times(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open stop_times file {}", path.display()))?;
        let index = Self::from_stop_times_reader(file)
            .with_context(|| format!("failed to load {}", path.display()))?;

        info!(path = %path.display(), trips = index.trip_count(), "Static schedule loaded");
        Ok(index)
    }

    pub fn trip_stops(&self, trip_id: &str) -> Option<&[StaticStopEntry]> {
        self.trips.get(trip_id).map(Vec::as_slice)
    }

    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}
