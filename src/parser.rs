//! Protobuf parser for GTFS Realtime feeds.

use anyhow::{Context, Result};
use prost::Message;

use crate::gtfs_rt::FeedMessage;

/// Decodes a protobuf-encoded GTFS-RT [`FeedMessage`] from raw bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid protobuf for a `FeedMessage`.
pub fn parse_feed(bytes: &[u8]) -> Result<FeedMessage> {
    FeedMessage::decode(bytes)
        .with_context(|| format!("failed to decode GTFS-RT feed ({} bytes)", bytes.len()))
}

/// Number of entities in `feed` that carry a trip update.
pub fn trip_update_count(feed: &FeedMessage) -> usize {
    feed.entity
        .iter()
        .filter(|e| e.trip_update.is_some())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs_rt::trip_update::StopTimeUpdate;
    use crate::gtfs_rt::{FeedEntity, FeedHeader, TripDescriptor, TripUpdate};

    #[test]
    fn test_parse_invalid_bytes() {
        let invalid_bytes = vec![0xFF, 0xFE, 0x00, 0x01];
        let err = parse_feed(&invalid_bytes).unwrap_err();
        assert!(err.to_string().contains("4 bytes"));
    }

    #[test]
    fn test_parse_trip_update_feed() {
        let feed = FeedMessage {
            header: FeedHeader {
                gtfs_realtime_version: "2.0".to_string(),
                timestamp: Some(1234567890),
                ..Default::default()
            },
            entity: vec![
                FeedEntity {
                    id: "1".to_string(),
                    trip_update: Some(TripUpdate {
                        trip: TripDescriptor {
                            trip_id: Some("t1".to_string()),
                            ..Default::default()
                        },
                        stop_time_update: vec![StopTimeUpdate {
                            stop_sequence: Some(4),
                            stop_id: Some("A".to_string()),
                            ..Default::default()
                        }],
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                FeedEntity {
                    id: "2".to_string(),
                    ..Default::default()
                },
            ],
        };

        let parsed = parse_feed(&feed.encode_to_vec()).unwrap();

        assert_eq!(parsed.header.timestamp, Some(1234567890));
        assert_eq!(trip_update_count(&parsed), 1);
        let update = &parsed.entity[0].trip_update.as_ref().unwrap().stop_time_update[0];
        assert_eq!(update.stop_sequence, Some(4));
        assert_eq!(update.stop_id(), "A");
        // Absent optional fields stay absent after decoding.
        assert!(update.arrival.is_none());
        assert!(update.schedule_relationship.is_none());
    }
}
