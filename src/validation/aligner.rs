//! Forward alignment of real-time stop updates against a trip's static stops.

use crate::schedule::StaticStopEntry;

/// Result of aligning one real-time `(stop_sequence, stop_id)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment<'a> {
    /// A static stop with the same stop_sequence and stop_id.
    Match,
    /// A static stop with the same stop_sequence but a different stop_id.
    Mismatch(&'a StaticStopEntry),
    /// No static stop with that stop_sequence remains ahead of the cursor.
    Exhausted,
}

/// Two-pointer cursor over one trip's static stops.
///
/// The cursor only moves forward and is shared by every update of the trip.
/// Real-time stop_sequences that go backwards are never matched again, and an
/// unmatched stop_sequence exhausts the cursor for the rest of the trip.
#[derive(Debug)]
pub struct ScheduleAligner<'a> {
    stops: &'a [StaticStopEntry],
    cursor: usize,
}

impl<'a> ScheduleAligner<'a> {
    pub fn new(stops: &'a [StaticStopEntry]) -> Self {
        Self { stops, cursor: 0 }
    }

    /// Advances to the static stop with `stop_sequence`, consuming it.
    pub fn align(&mut self, stop_sequence: u32, stop_id: &str) -> Alignment<'a> {
        while let Some(stop) = self.stops.get(self.cursor) {
            self.cursor += 1;
            if stop.stop_sequence == stop_sequence {
                return if stop.stop_id == stop_id {
                    Alignment::Match
                } else {
                    Alignment::Mismatch(stop)
                };
            }
        }
        Alignment::Exhausted
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.stops.len()
    }
}
