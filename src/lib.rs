//! # jukeboxd
//!
//! Single-track-at-a-time playback daemon.
//!
//! Pops track references off a remote queue (a Redis list), hands them to a
//! streaming media backend, reacts to transport commands arriving on a
//! pub/sub channel (pause/resume/stop/add/play) and publishes playback
//! status back to the store.
//!
//! **Architecture:** one long-lived tokio task per component (queue watcher,
//! command reactor, connectivity monitor, elapsed-time ticker, elapsed-time
//! publisher) around a single [`playback::PlaybackController`] task that
//! exclusively owns the playback session state. Components communicate via
//! channels; nothing mutates session state from outside the controller.

pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod gate;
pub mod monitor;
pub mod playback;
pub mod reactor;
pub mod store;
pub mod track;

pub use error::{Error, Result};
pub use track::TrackRef;
