//! Playback phase and session state

use std::time::Duration;

use tokio::time::Instant;

use crate::backend::EndOfTrack;
use crate::track::TrackRef;

/// Playback phase of the controller state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No current track
    #[default]
    Idle,
    /// Track handed to the backend, not yet confirmed playing
    Loading,
    Playing,
    Paused,
    /// Stop requested, waiting for the backend unload to complete
    Draining,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Loading => write!(f, "loading"),
            Phase::Playing => write!(f, "playing"),
            Phase::Paused => write!(f, "paused"),
            Phase::Draining => write!(f, "draining"),
        }
    }
}

/// Read-only view of the session, published to observers over a watch
/// channel. Observers never mutate playback state.
#[derive(Debug, Clone, Default)]
pub struct PlaybackSnapshot {
    pub phase: Phase,
    pub current: Option<TrackRef>,
}

/// Mutable per-process playback record.
///
/// Exclusively owned and mutated by the playback controller; one instance
/// lives for the process lifetime.
#[derive(Debug, Default)]
pub struct PlaybackSession {
    pub phase: Phase,

    /// The one current track; empty while idle.
    pub current: Option<TrackRef>,

    /// Pending end-of-track notification for the current cycle.
    pub end_of_track: Option<EndOfTrack>,

    /// When the current pause began; set only while paused.
    pub pause_started: Option<Instant>,

    /// Total time paused during the current cycle; resets with each track.
    pub paused_total: Duration,
}

impl PlaybackSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            phase: self.phase,
            current: self.current.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_session_is_idle() {
        let session = PlaybackSession::new();
        assert_eq!(session.phase, Phase::Idle);
        assert!(session.current.is_none());
        assert!(session.end_of_track.is_none());
        assert_eq!(session.paused_total, Duration::ZERO);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Idle.to_string(), "idle");
        assert_eq!(Phase::Draining.to_string(), "draining");
    }
}
