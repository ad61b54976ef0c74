//! Transport facade over the streaming media backend.
//!
//! The backend itself (login, decoding, audio output) is an external
//! collaborator; this module defines the capability set the playback core
//! calls into, plus the end-of-track and connectivity notification types.

pub mod sim;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::error::Result;
use crate::track::TrackRef;

pub use sim::SimBackend;

/// Session-level connection status, independent of playback phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    LoggedOut,
    LoggedIn,
    Disconnected,
    Offline,
    Unknown,
}

impl std::fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectivityState::LoggedOut => write!(f, "logged out"),
            ConnectivityState::LoggedIn => write!(f, "logged in"),
            ConnectivityState::Disconnected => write!(f, "disconnected"),
            ConnectivityState::Offline => write!(f, "offline"),
            ConnectivityState::Unknown => write!(f, "unknown"),
        }
    }
}

/// One-shot end-of-track notification for a single playback cycle.
///
/// Returned by [`Backend::load_and_play`]; resolves when the backend reports
/// the accepted track finished. Dropped unconsumed when a stop command wins
/// the race against the natural end of track.
#[derive(Debug)]
pub struct EndOfTrack(oneshot::Receiver<()>);

impl EndOfTrack {
    /// Create a linked signal/notification pair.
    pub fn channel() -> (EndOfTrackSignal, EndOfTrack) {
        let (tx, rx) = oneshot::channel();
        (EndOfTrackSignal(tx), EndOfTrack(rx))
    }

    /// Wait for the backend to report the end of the track.
    pub async fn ended(&mut self) {
        // A dropped signal also counts: the backend abandoned the track.
        let _ = (&mut self.0).await;
    }
}

/// Sending half of an [`EndOfTrack`] pair, held by the backend.
#[derive(Debug)]
pub struct EndOfTrackSignal(oneshot::Sender<()>);

impl EndOfTrackSignal {
    /// Report the track finished. Consumes the signal; firing twice is
    /// impossible by construction.
    pub fn fire(self) {
        let _ = self.0.send(());
    }
}

/// Capability set of the streaming media backend.
///
/// All playback mutation goes through the playback controller, which is the
/// only caller of `load_and_play`/`pause`/`resume`/`unload`. The
/// connectivity accessors are shared with the queue watcher and the
/// connectivity monitor.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Hand a track to the backend for playback.
    ///
    /// Asynchronous: returns once the backend has accepted the track, not
    /// when playback finishes. Completion is signaled through the returned
    /// [`EndOfTrack`]. A load failure is fatal for the process.
    async fn load_and_play(&self, track: &TrackRef) -> Result<EndOfTrack>;

    /// Pause the currently loaded track.
    async fn pause(&self) -> Result<()>;

    /// Resume the currently loaded track.
    async fn resume(&self) -> Result<()>;

    /// Unload the current track, releasing backend playback resources.
    /// Idempotent: unloading with nothing loaded is a no-op.
    async fn unload(&self) -> Result<()>;

    /// Current connection-state snapshot.
    fn connectivity(&self) -> ConnectivityState;

    /// Infinite stream of connection-state transitions.
    ///
    /// Single subscription; not restartable.
    fn connectivity_updates(&self) -> mpsc::Receiver<ConnectivityState>;
}
