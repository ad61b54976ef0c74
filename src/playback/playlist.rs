//! Playlist watcher: pulls queued tracks and hands them to the controller.
//!
//! Advances only while the backend is logged in. While it is not, the
//! watcher re-checks on a fixed poll interval, or immediately when the
//! request gate is armed by the connectivity monitor or an `add` command.
//! After handing a track over it waits for the cycle to complete before
//! popping again, so a queue item is only ever consumed for immediate
//! playback.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Notify};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::backend::{Backend, ConnectivityState};
use crate::gate::Gate;
use crate::store::TrackQueue;
use crate::track::TrackRef;

const CONNECTIVITY_POLL: Duration = Duration::from_secs(1);

pub struct PlaylistWatcher<B, Q> {
    backend: Arc<B>,
    queue: Arc<Q>,
    gate: Gate,
    tracks: mpsc::Sender<TrackRef>,
    cycle_done: Arc<Notify>,
}

impl<B, Q> PlaylistWatcher<B, Q>
where
    B: Backend,
    Q: TrackQueue,
{
    pub fn new(
        backend: Arc<B>,
        queue: Arc<Q>,
        gate: Gate,
        tracks: mpsc::Sender<TrackRef>,
        cycle_done: Arc<Notify>,
    ) -> Self {
        Self {
            backend,
            queue,
            gate,
            tracks,
            cycle_done,
        }
    }

    /// Blocking watch loop. Runs for the process lifetime.
    pub async fn run(self) {
        info!("playlist watcher started");
        loop {
            if self.backend.connectivity() != ConnectivityState::LoggedIn {
                // Not logged in: do not consume an item we cannot play.
                // Re-check after the poll interval or on a gate wake-up.
                tokio::select! {
                    _ = self.gate.wait() => debug!("request gate armed"),
                    _ = sleep(CONNECTIVITY_POLL) => {}
                }
                continue;
            }

            match self.queue.next().await {
                Ok(track) => {
                    // Advisory look-ahead while the popped track plays.
                    match self.queue.peek_next().await {
                        Ok(Some(next)) => debug!(uri = %next.uri, "upcoming track"),
                        Ok(None) => {}
                        Err(e) => warn!("prefetch peek failed: {e}"),
                    }

                    if self.tracks.send(track).await.is_err() {
                        warn!("controller gone, playlist watcher exiting");
                        return;
                    }
                    self.cycle_done.notified().await;
                }
                Err(e) => {
                    warn!("queue pop failed: {e}");
                    sleep(CONNECTIVITY_POLL).await;
                }
            }
        }
    }
}
