//! Embedded-player event bridge
//!
//! The embedded player posts JSON envelopes tagged `PLAYER_EVENT`; each
//! carries the playback event kind, the current position, and enough of the
//! content key to address a progress record. Malformed envelopes are logged
//! and dropped, never an error. Events with a positive elapsed time forward
//! to the content store's progress path.

use crate::content::ContentStore;
use reel_common::{ContentType, ProgressKey, Result, ViewingProgress};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Envelope tag distinguishing player events from other posted messages
pub const PLAYER_EVENT_TYPE: &str = "PLAYER_EVENT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerEventKind {
    TimeUpdate,
    Play,
    Pause,
    Ended,
    Seeked,
}

/// A playback event addressed to one content item
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerEvent {
    pub kind: PlayerEventKind,
    pub current_time: f64,
    pub duration: f64,
    pub key: ProgressKey,
}

impl PlayerEvent {
    /// Whether this event should be recorded as viewing progress
    ///
    /// Position-bearing kinds only, and only with a positive elapsed time
    /// and a known duration.
    pub fn should_record(&self) -> bool {
        matches!(
            self.kind,
            PlayerEventKind::TimeUpdate | PlayerEventKind::Pause | PlayerEventKind::Ended
        ) && self.current_time > 0.0
            && self.duration > 0.0
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    data: EnvelopeData,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeData {
    event: PlayerEventKind,
    current_time: f64,
    #[serde(default)]
    duration: f64,
    id: String,
    media_type: String,
    season: Option<u32>,
    episode: Option<u32>,
}

/// Parse a posted message into a player event
///
/// Returns `None` for messages that are not player events, and for player
/// events whose payload cannot be addressed to a content item.
pub fn parse_player_event(raw: &str) -> Option<PlayerEvent> {
    let envelope: Envelope = match serde_json::from_str(raw) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "dropping malformed player message");
            return None;
        }
    };
    if envelope.kind != PLAYER_EVENT_TYPE {
        debug!(kind = %envelope.kind, "ignoring non-player message");
        return None;
    }
    let data = envelope.data;

    let content_id = match data.id.parse::<u32>() {
        Ok(id) if id > 0 => id,
        _ => {
            warn!("dropping player event with invalid content id");
            return None;
        }
    };
    let content_type = match data.media_type.as_str() {
        "movie" => ContentType::Movie,
        "tv" => ContentType::Series,
        other => {
            warn!(media_type = %other, "dropping player event with unknown media type");
            return None;
        }
    };

    Some(PlayerEvent {
        kind: data.event,
        current_time: data.current_time,
        duration: data.duration,
        key: ProgressKey {
            content_id,
            content_type,
            season: data.season,
            episode: data.episode,
        },
    })
}

/// Forward a player event to the content store's progress path
///
/// Events that should not be recorded resolve to `Ok(None)`.
pub async fn forward_player_event(
    store: &ContentStore,
    event: &PlayerEvent,
) -> Result<Option<ViewingProgress>> {
    if !event.should_record() {
        return Ok(None);
    }
    store
        .record_progress(event.key, event.current_time, event.duration)
        .await
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie_envelope(event: &str, current_time: f64) -> String {
        format!(
            r#"{{"type":"PLAYER_EVENT","data":{{"event":"{event}","currentTime":{current_time},"duration":7200,"progress":1.5,"id":"550","mediaType":"movie","timestamp":1700000000}}}}"#
        )
    }

    #[test]
    fn parses_a_movie_timeupdate() {
        let event = parse_player_event(&movie_envelope("timeupdate", 105.5)).unwrap();
        assert_eq!(event.kind, PlayerEventKind::TimeUpdate);
        assert!((event.current_time - 105.5).abs() < f64::EPSILON);
        assert_eq!(event.key.content_id, 550);
        assert_eq!(event.key.content_type, ContentType::Movie);
        assert_eq!(event.key.season, None);
        assert!(event.should_record());
    }

    #[test]
    fn parses_an_episodic_event_with_tv_mapped_to_series() {
        let raw = r#"{"type":"PLAYER_EVENT","data":{"event":"ended","currentTime":3590,"duration":3600,"progress":99.7,"id":"1399","mediaType":"tv","season":6,"episode":9,"timestamp":1700000000}}"#;
        let event = parse_player_event(raw).unwrap();
        assert_eq!(event.key.content_type, ContentType::Series);
        assert_eq!(event.key.season, Some(6));
        assert_eq!(event.key.episode, Some(9));
    }

    #[test]
    fn non_player_messages_are_ignored() {
        let raw = r#"{"type":"SOMETHING_ELSE","data":{"event":"timeupdate","currentTime":10,"duration":100,"id":"550","mediaType":"movie"}}"#;
        assert!(parse_player_event(raw).is_none());
    }

    #[test]
    fn malformed_payloads_are_dropped() {
        assert!(parse_player_event("not json").is_none());
        assert!(parse_player_event(r#"{"type":"PLAYER_EVENT"}"#).is_none());
        let bad_id = r#"{"type":"PLAYER_EVENT","data":{"event":"pause","currentTime":10,"duration":100,"id":"abc","mediaType":"movie"}}"#;
        assert!(parse_player_event(bad_id).is_none());
        let bad_type = r#"{"type":"PLAYER_EVENT","data":{"event":"pause","currentTime":10,"duration":100,"id":"550","mediaType":"radio"}}"#;
        assert!(parse_player_event(bad_type).is_none());
    }

    #[test]
    fn only_position_bearing_events_with_positive_time_record() {
        assert!(!parse_player_event(&movie_envelope("play", 100.0))
            .unwrap()
            .should_record());
        assert!(!parse_player_event(&movie_envelope("seeked", 100.0))
            .unwrap()
            .should_record());
        assert!(!parse_player_event(&movie_envelope("timeupdate", 0.0))
            .unwrap()
            .should_record());
        assert!(parse_player_event(&movie_envelope("pause", 100.0))
            .unwrap()
            .should_record());
        assert!(parse_player_event(&movie_envelope("ended", 7100.0))
            .unwrap()
            .should_record());
    }

    mod forwarding {
        use super::*;
        use crate::content::ContentStore;
        use reel_common::events::EventBus;
        use reel_common::models::NewProfile;
        use reel_common::{AgeRating, UserId};
        use reel_data::DataStore;
        use std::sync::Arc;

        async fn scoped_store() -> Arc<ContentStore> {
            let data = Arc::new(DataStore::in_memory().await.unwrap());
            let user = UserId::parse(&"a".repeat(28)).unwrap();
            let profile = data
                .create_profile(
                    &user,
                    NewProfile {
                        name: "Main".to_string(),
                        avatar: "avatar-1".to_string(),
                        age_rating: AgeRating::Adult,
                    },
                )
                .await
                .unwrap();
            let store = Arc::new(ContentStore::new(data, EventBus::new(16)));
            Arc::clone(&store)
                .scope_changed(Some(user), Some(profile.id))
                .await
                .unwrap();
            store
        }

        #[tokio::test]
        async fn positive_timeupdate_records_progress() {
            let store = scoped_store().await;
            let event = parse_player_event(&movie_envelope("timeupdate", 105.5)).unwrap();

            let recorded = forward_player_event(&store, &event).await.unwrap().unwrap();
            assert_eq!(recorded.content_id, 550);
            assert_eq!(store.progress().await.len(), 1);
        }

        #[tokio::test]
        async fn zero_time_and_play_events_are_not_recorded() {
            let store = scoped_store().await;

            let zero = parse_player_event(&movie_envelope("timeupdate", 0.0)).unwrap();
            assert!(forward_player_event(&store, &zero).await.unwrap().is_none());

            let play = parse_player_event(&movie_envelope("play", 50.0)).unwrap();
            assert!(forward_player_event(&store, &play).await.unwrap().is_none());

            assert!(store.progress().await.is_empty());
        }
    }
}
