//! Remote store seams: the track queue and the status sink.
//!
//! The daemon's queue, command channel and status keys all live in one
//! shared store (Redis in production). The traits here are the boundary the
//! playback core depends on; `redis.rs` holds the production
//! implementations and the integration tests substitute in-memory ones.

pub mod redis;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::track::TrackRef;

pub use self::redis::{RedisQueue, RedisStatus};

/// Source of queued track references.
#[async_trait]
pub trait TrackQueue: Send + Sync + 'static {
    /// Pop the next queued track, blocking until one is available.
    ///
    /// An empty queue is not an error: the call keeps blocking. Errors are
    /// transport failures only.
    async fn next(&self) -> Result<TrackRef>;

    /// Non-destructive read of the queue item behind the head.
    ///
    /// Advisory look-ahead for prefetch; never consumes the item and makes
    /// no pre-load guarantee.
    async fn peek_next(&self) -> Result<Option<TrackRef>>;
}

/// Sink for playback status visible to the rest of the system.
#[async_trait]
pub trait StatusSink: Send + Sync + 'static {
    /// Record and announce the start of a playback cycle: set the
    /// current-track and start-time keys, clear stale pause bookkeeping and
    /// publish the `play` event.
    async fn publish_play(&self, track: &TrackRef) -> Result<()>;

    /// Record and announce the end of a playback cycle: clear the
    /// current-track and start-time keys and publish the `end` event.
    async fn publish_end(&self, track: &TrackRef) -> Result<()>;

    /// Write the current elapsed-play value (seconds).
    async fn set_elapsed(&self, seconds: u64) -> Result<()>;

    /// Remove the elapsed-play key while nothing is playing.
    async fn clear_elapsed(&self) -> Result<()>;

    /// Record the wall-clock instant the current pause began.
    async fn record_pause(&self, at: DateTime<Utc>) -> Result<()>;

    /// Record the total paused duration of the current cycle.
    async fn record_resume(&self, total_paused_ms: u64) -> Result<()>;
}
