//! Wire events on the command/status pub/sub channel.
//!
//! Inbound messages decode to [`Command`] values consumed by the playback
//! controller. Outbound status messages ([`StatusEvent`]) are published on
//! the same channel on every play/end transition, so the decoder must
//! tolerate the daemon's own publications looping back.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::track::TrackRef;

// Event names on the wire
pub const ADD_EVENT: &str = "add"; // Track added to the queue
pub const PAUSE_EVENT: &str = "pause"; // Pause a playing track
pub const RESUME_EVENT: &str = "resume"; // Resume a paused track
pub const STOP_EVENT: &str = "stop"; // Stop the currently playing track (aka skip)
pub const PLAY_EVENT: &str = "play"; // Start/resume playback
pub const END_EVENT: &str = "end"; // Published by us when a track ends

/// A decoded instruction from the command channel.
///
/// Ephemeral: constructed per message by the command reactor, consumed
/// immediately by the playback controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A track was added to the queue. The payload may name the track.
    Add { track: Option<TrackRef> },
    Pause,
    Resume,
    Stop,
    Play,
}

/// Raw inbound message shape. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct ControlMessage {
    event: String,
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    user: Option<String>,
}

impl Command {
    /// Decode a raw pub/sub payload.
    ///
    /// Returns `Ok(None)` for events this daemon does not react to,
    /// including its own published `end` events looping back. Malformed
    /// JSON is an error; the caller logs it and keeps consuming.
    pub fn decode(payload: &[u8]) -> Result<Option<Command>> {
        let msg: ControlMessage = serde_json::from_slice(payload)?;
        let command = match msg.event.as_str() {
            ADD_EVENT => Some(Command::Add {
                track: match (msg.uri, msg.user) {
                    (Some(uri), Some(user)) => Some(TrackRef { uri, user }),
                    _ => None,
                },
            }),
            PAUSE_EVENT => Some(Command::Pause),
            RESUME_EVENT => Some(Command::Resume),
            STOP_EVENT => Some(Command::Stop),
            PLAY_EVENT => Some(Command::Play),
            _ => None,
        };
        Ok(command)
    }
}

/// Status payload published on play/end transitions:
/// `{"event": "play", "uri": "...", "user": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub event: String,
    pub uri: String,
    pub user: String,
}

impl StatusEvent {
    pub fn play(track: &TrackRef) -> Self {
        Self {
            event: PLAY_EVENT.to_string(),
            uri: track.uri.clone(),
            user: track.user.clone(),
        }
    }

    pub fn end(track: &TrackRef) -> Self {
        Self {
            event: END_EVENT.to_string(),
            uri: track.uri.clone(),
            user: track.user.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_transport_commands() {
        assert_eq!(
            Command::decode(br#"{"event":"pause"}"#).unwrap(),
            Some(Command::Pause)
        );
        assert_eq!(
            Command::decode(br#"{"event":"resume"}"#).unwrap(),
            Some(Command::Resume)
        );
        assert_eq!(
            Command::decode(br#"{"event":"stop"}"#).unwrap(),
            Some(Command::Stop)
        );
        assert_eq!(
            Command::decode(br#"{"event":"play"}"#).unwrap(),
            Some(Command::Play)
        );
    }

    #[test]
    fn test_decode_add_with_track() {
        let cmd = Command::decode(br#"{"event":"add","uri":"t:1","user":"u1"}"#).unwrap();
        assert_eq!(
            cmd,
            Some(Command::Add {
                track: Some(TrackRef::new("t:1", "u1"))
            })
        );
    }

    #[test]
    fn test_decode_add_without_track() {
        let cmd = Command::decode(br#"{"event":"add"}"#).unwrap();
        assert_eq!(cmd, Some(Command::Add { track: None }));
    }

    #[test]
    fn test_unknown_event_is_ignored() {
        assert_eq!(Command::decode(br#"{"event":"volume"}"#).unwrap(), None);
        // Our own end publications loop back on the shared channel
        assert_eq!(
            Command::decode(br#"{"event":"end","uri":"t:1","user":"u1"}"#).unwrap(),
            None
        );
    }

    #[test]
    fn test_malformed_payload_is_error() {
        assert!(Command::decode(b"pause").is_err());
        assert!(Command::decode(br#"{"no_event":1}"#).is_err());
    }

    #[test]
    fn test_status_event_payload() {
        let track = TrackRef::new("t:1", "u1");
        let json = StatusEvent::play(&track).to_json().unwrap();
        assert_eq!(json, r#"{"event":"play","uri":"t:1","user":"u1"}"#);
        let json = StatusEvent::end(&track).to_json().unwrap();
        assert_eq!(json, r#"{"event":"end","uri":"t:1","user":"u1"}"#);
    }
}
