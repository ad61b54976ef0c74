//! Track references popped off the remote queue.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single playable item: the backend URI plus the requesting user.
///
/// Immutable once read off the queue. Owned by the playback controller for
/// the duration of one playback cycle and discarded when the cycle ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRef {
    pub uri: String,
    pub user: String,
}

impl TrackRef {
    pub fn new(uri: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            user: user.into(),
        }
    }

    /// Decode a queue payload: JSON `{"uri": ..., "user": ...}`.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl std::fmt::Display for TrackRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (user {})", self.uri, self.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_queue_payload() {
        let track = TrackRef::from_json(br#"{"uri":"t:1","user":"u1"}"#).unwrap();
        assert_eq!(track.uri, "t:1");
        assert_eq!(track.user, "u1");
    }

    #[test]
    fn test_decode_ignores_extra_fields() {
        let track =
            TrackRef::from_json(br#"{"uri":"t:2","user":"u2","uuid":"abc"}"#).unwrap();
        assert_eq!(track.uri, "t:2");
    }

    #[test]
    fn test_decode_malformed_payload() {
        assert!(TrackRef::from_json(b"not json").is_err());
        assert!(TrackRef::from_json(br#"{"uri":"t:3"}"#).is_err());
    }

    #[test]
    fn test_round_trip() {
        let track = TrackRef::new("t:4", "u4");
        let json = track.to_json().unwrap();
        assert_eq!(TrackRef::from_json(json.as_bytes()).unwrap(), track);
    }
}
