//! Simulated media backend.
//!
//! Stands in for the proprietary streaming stack: logs in on start, "plays"
//! each accepted track for a fixed duration (respecting pause) and drives
//! the connectivity update stream. Keeps the daemon runnable end-to-end and
//! gives the test suite a fully controllable backend.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info};

use crate::backend::{Backend, ConnectivityState, EndOfTrack};
use crate::error::Result;
use crate::track::TrackRef;

const PLAYBACK_TICK: Duration = Duration::from_millis(100);

/// A track currently held by the simulated backend.
struct SimPlayback {
    task: JoinHandle<()>,
    paused: Arc<AtomicBool>,
}

pub struct SimBackend {
    /// How long every track "plays" for.
    track_duration: Duration,

    /// Connection-state snapshot; the watch sender doubles as storage.
    connectivity: watch::Sender<ConnectivityState>,

    updates_tx: mpsc::Sender<ConnectivityState>,
    updates_rx: Mutex<Option<mpsc::Receiver<ConnectivityState>>>,

    current: Mutex<Option<SimPlayback>>,
}

impl SimBackend {
    pub fn new(track_duration: Duration) -> Self {
        let (connectivity, _) = watch::channel(ConnectivityState::Unknown);
        let (updates_tx, updates_rx) = mpsc::channel(32);
        Self {
            track_duration,
            connectivity,
            updates_tx,
            updates_rx: Mutex::new(Some(updates_rx)),
            current: Mutex::new(None),
        }
    }

    /// Establish the backend session.
    ///
    /// The simulated login always succeeds; with the real media stack this
    /// is where authentication failure surfaces as a fatal error.
    pub async fn login(&self, user: Option<&str>) -> Result<()> {
        info!(user = user.unwrap_or("<none>"), "backend session created");
        self.set_connectivity(ConnectivityState::LoggedIn);
        Ok(())
    }

    /// Drive a connection-state transition.
    ///
    /// Used by operators (and tests) to simulate disconnects and
    /// reconnects.
    pub fn set_connectivity(&self, state: ConnectivityState) {
        self.connectivity.send_replace(state);
        // Lossy: a full update buffer drops the oldest observer view,
        // the snapshot stays authoritative.
        let _ = self.updates_tx.try_send(state);
    }
}

#[async_trait]
impl Backend for SimBackend {
    async fn load_and_play(&self, track: &TrackRef) -> Result<EndOfTrack> {
        info!(uri = %track.uri, "loading track into backend");

        let (signal, eot) = EndOfTrack::channel();
        let paused = Arc::new(AtomicBool::new(false));

        let task = {
            let paused = Arc::clone(&paused);
            let duration = self.track_duration;
            let uri = track.uri.clone();
            tokio::spawn(async move {
                let mut remaining = duration;
                let start = Instant::now() + PLAYBACK_TICK;
                let mut tick = interval_at(start, PLAYBACK_TICK);
                loop {
                    tick.tick().await;
                    if paused.load(Ordering::Acquire) {
                        continue;
                    }
                    remaining = remaining.saturating_sub(PLAYBACK_TICK);
                    if remaining.is_zero() {
                        debug!(uri = %uri, "simulated track finished");
                        signal.fire();
                        return;
                    }
                }
            })
        };

        let previous = self
            .current
            .lock()
            .expect("sim backend lock poisoned")
            .replace(SimPlayback { task, paused });
        if let Some(previous) = previous {
            // The controller unloads before loading; guard anyway.
            previous.task.abort();
        }

        Ok(eot)
    }

    async fn pause(&self) -> Result<()> {
        if let Some(playback) = self.current.lock().expect("sim backend lock poisoned").as_ref() {
            playback.paused.store(true, Ordering::Release);
        }
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        if let Some(playback) = self.current.lock().expect("sim backend lock poisoned").as_ref() {
            playback.paused.store(false, Ordering::Release);
        }
        Ok(())
    }

    async fn unload(&self) -> Result<()> {
        if let Some(playback) = self.current.lock().expect("sim backend lock poisoned").take() {
            playback.task.abort();
            debug!("track unloaded");
        }
        Ok(())
    }

    fn connectivity(&self) -> ConnectivityState {
        *self.connectivity.borrow()
    }

    fn connectivity_updates(&self) -> mpsc::Receiver<ConnectivityState> {
        self.updates_rx
            .lock()
            .expect("sim backend lock poisoned")
            .take()
            .expect("connectivity updates stream already taken")
    }
}
