use chrono::{TimeZone, Utc};
use gtfs_rt_validator::gtfs_rt::trip_update::{StopTimeEvent, StopTimeUpdate};
use gtfs_rt_validator::gtfs_rt::{FeedEntity, FeedHeader, FeedMessage, TripDescriptor, TripUpdate};
use gtfs_rt_validator::schedule::{ScheduleIndex, StaticStopEntry};
use gtfs_rt_validator::validation::{FeedValidator, RuleGroup, StopTimeUpdateValidator, ValidationRule};
use proptest::prelude::*;

fn update(stop_sequence: Option<u32>, stop_id: Option<String>) -> StopTimeUpdate {
    StopTimeUpdate {
        stop_sequence,
        stop_id,
        arrival: Some(StopTimeEvent {
            time: Some(1700000000),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn feed_of(trips: Vec<Vec<StopTimeUpdate>>) -> FeedMessage {
    FeedMessage {
        header: FeedHeader {
            gtfs_realtime_version: "2.0".to_string(),
            ..Default::default()
        },
        entity: trips
            .into_iter()
            .enumerate()
            .map(|(i, updates)| FeedEntity {
                id: i.to_string(),
                trip_update: Some(TripUpdate {
                    trip: TripDescriptor {
                        trip_id: Some(format!("t{}", i % 2)),
                        ..Default::default()
                    },
                    stop_time_update: updates,
                    ..Default::default()
                }),
                ..Default::default()
            })
            .collect(),
    }
}

fn schedule() -> ScheduleIndex {
    ScheduleIndex::from_entries(
        (1..=5).map(|n| ("t0", StaticStopEntry::new(n, ["A", "B", "C", "D", "E"][n as usize - 1]))),
    )
}

fn validate(feed: &FeedMessage) -> Vec<RuleGroup> {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    StopTimeUpdateValidator.validate(now, &schedule(), feed)
}

fn count(groups: &[RuleGroup], rule: ValidationRule) -> usize {
    groups
        .iter()
        .filter(|g| g.rule == rule)
        .map(|g| g.occurrences.len())
        .sum()
}

fn arb_update() -> impl Strategy<Value = StopTimeUpdate> {
    (
        prop::option::of(0u32..6),
        prop::option::of(prop::sample::select(vec!["A", "B", "C", "X"])),
    )
        .prop_map(|(seq, id)| update(seq, id.map(String::from)))
}

proptest! {
    #[test]
    fn prop_e002_once_per_unsorted_trip(seqs in prop::collection::vec(prop::option::of(0u32..6), 0..10)) {
        let updates = seqs.iter().map(|s| update(*s, None)).collect();
        let groups = validate(&feed_of(vec![updates]));

        let present: Vec<u32> = seqs.iter().flatten().copied().collect();
        let sorted = present.windows(2).all(|w| w[0] <= w[1]);
        prop_assert_eq!(count(&groups, ValidationRule::E002), usize::from(!sorted));
    }

    #[test]
    fn prop_e036_counts_adjacent_repeats(seqs in prop::collection::vec(prop::option::of(0u32..4), 0..10)) {
        let updates = seqs.iter().map(|s| update(*s, None)).collect();
        let groups = validate(&feed_of(vec![updates]));

        let expected = seqs
            .windows(2)
            .filter(|w| w[0].is_some() && w[0] == w[1])
            .count();
        prop_assert_eq!(count(&groups, ValidationRule::E036), expected);
    }

    #[test]
    fn prop_e037_counts_adjacent_repeats(ids in prop::collection::vec(prop::option::of(prop::sample::select(vec!["", "A", "B"])), 0..10)) {
        let updates = ids
            .iter()
            .enumerate()
            .map(|(i, id)| update(Some(i as u32), id.map(String::from)))
            .collect();
        let groups = validate(&feed_of(vec![updates]));

        let expected = ids
            .windows(2)
            .filter(|w| matches!(w[0], Some(id) if !id.is_empty()) && w[0] == w[1])
            .count();
        prop_assert_eq!(count(&groups, ValidationRule::E037), expected);
    }

    #[test]
    fn prop_validation_is_idempotent_and_groups_are_non_empty(
        trips in prop::collection::vec(prop::collection::vec(arb_update(), 0..6), 0..5)
    ) {
        let feed = feed_of(trips);
        let first = validate(&feed);
        let second = validate(&feed);

        prop_assert_eq!(&first, &second);
        prop_assert!(first.iter().all(|g| !g.occurrences.is_empty()));
        let rules: Vec<_> = first.iter().map(|g| g.rule).collect();
        let mut sorted = rules.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(rules, sorted);
    }
}
