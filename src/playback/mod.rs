//! Playback orchestration
//!
//! The controller state machine plus its satellite workers: elapsed-time
//! tracking, playlist watching and elapsed-time publication.

mod controller;
mod elapsed;
mod playlist;
mod publisher;
mod state;

pub use controller::PlaybackController;
pub use elapsed::ElapsedTimer;
pub use playlist::PlaylistWatcher;
pub use publisher::ElapsedPublisher;
pub use state::{Phase, PlaybackSession, PlaybackSnapshot};
