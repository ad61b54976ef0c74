//! Elapsed-time publisher.
//!
//! Once per second, writes the current elapsed-play value to the store
//! while a track is playing and deletes the key while nothing is. Reads the
//! controller's published snapshot; never touches session state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval_at, Instant};
use tracing::warn;

use crate::playback::elapsed::ElapsedTimer;
use crate::playback::state::{Phase, PlaybackSnapshot};
use crate::store::StatusSink;

const PUBLISH_TICK: Duration = Duration::from_secs(1);

pub struct ElapsedPublisher<S> {
    status: Arc<S>,
    timer: ElapsedTimer,
    snapshot: watch::Receiver<PlaybackSnapshot>,
}

impl<S: StatusSink> ElapsedPublisher<S> {
    pub fn new(
        status: Arc<S>,
        timer: ElapsedTimer,
        snapshot: watch::Receiver<PlaybackSnapshot>,
    ) -> Self {
        Self {
            status,
            timer,
            snapshot,
        }
    }

    /// Publish loop. Runs for the process lifetime; store errors are logged
    /// and the loop continues.
    pub async fn run(self) {
        let mut tick = interval_at(Instant::now() + PUBLISH_TICK, PUBLISH_TICK);
        loop {
            tick.tick().await;
            let playing = self.snapshot.borrow().phase == Phase::Playing;
            let result = if playing {
                self.status.set_elapsed(self.timer.value()).await
            } else {
                self.status.clear_elapsed().await
            };
            if let Err(e) = result {
                warn!("elapsed-time publish failed: {e}");
            }
        }
    }
}
