//! Shared test fixtures: in-memory implementations of the backend and
//! store seams, fully controllable from the test body.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Notify};

use jukeboxd::backend::{Backend, ConnectivityState, EndOfTrack, EndOfTrackSignal};
use jukeboxd::error::Result;
use jukeboxd::store::{StatusSink, TrackQueue};
use jukeboxd::track::TrackRef;

/// Scriptable media backend. Records every call, lets the test fire the
/// end-of-track notification and drive connectivity transitions.
pub struct MockBackend {
    connectivity: Mutex<ConnectivityState>,
    updates_tx: mpsc::Sender<ConnectivityState>,
    updates_rx: Mutex<Option<mpsc::Receiver<ConnectivityState>>>,
    calls: Mutex<Vec<String>>,
    end_signal: Mutex<Option<EndOfTrackSignal>>,
}

impl MockBackend {
    pub fn new(initial: ConnectivityState) -> Arc<Self> {
        let (updates_tx, updates_rx) = mpsc::channel(32);
        Arc::new(Self {
            connectivity: Mutex::new(initial),
            updates_tx,
            updates_rx: Mutex::new(Some(updates_rx)),
            calls: Mutex::new(Vec::new()),
            end_signal: Mutex::new(None),
        })
    }

    pub fn logged_in() -> Arc<Self> {
        Self::new(ConnectivityState::LoggedIn)
    }

    pub fn set_connectivity(&self, state: ConnectivityState) {
        *self.connectivity.lock().unwrap() = state;
        let _ = self.updates_tx.try_send(state);
    }

    /// Report the currently loaded track as finished.
    pub fn finish_track(&self) {
        if let Some(signal) = self.end_signal.lock().unwrap().take() {
            signal.fire();
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(name))
            .count()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn load_and_play(&self, track: &TrackRef) -> Result<EndOfTrack> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("load {}", track.uri));
        let (signal, end_of_track) = EndOfTrack::channel();
        *self.end_signal.lock().unwrap() = Some(signal);
        Ok(end_of_track)
    }

    async fn pause(&self) -> Result<()> {
        self.calls.lock().unwrap().push("pause".to_string());
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        self.calls.lock().unwrap().push("resume".to_string());
        Ok(())
    }

    async fn unload(&self) -> Result<()> {
        self.calls.lock().unwrap().push("unload".to_string());
        self.end_signal.lock().unwrap().take();
        Ok(())
    }

    fn connectivity(&self) -> ConnectivityState {
        *self.connectivity.lock().unwrap()
    }

    fn connectivity_updates(&self) -> mpsc::Receiver<ConnectivityState> {
        self.updates_rx
            .lock()
            .unwrap()
            .take()
            .expect("connectivity updates stream already taken")
    }
}

/// In-memory track queue with blocking-pop semantics.
pub struct MockQueue {
    items: Mutex<VecDeque<TrackRef>>,
    notify: Notify,
    next_calls: AtomicUsize,
    pops: AtomicUsize,
    peeks: AtomicUsize,
}

impl MockQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            items: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            next_calls: AtomicUsize::new(0),
            pops: AtomicUsize::new(0),
            peeks: AtomicUsize::new(0),
        })
    }

    pub fn push(&self, track: TrackRef) {
        self.items.lock().unwrap().push_back(track);
        self.notify.notify_waiters();
    }

    /// How many times `next` was entered (including blocked calls).
    pub fn next_calls(&self) -> usize {
        self.next_calls.load(Ordering::SeqCst)
    }

    /// How many items were actually popped.
    pub fn pops(&self) -> usize {
        self.pops.load(Ordering::SeqCst)
    }

    pub fn peeks(&self) -> usize {
        self.peeks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrackQueue for MockQueue {
    async fn next(&self) -> Result<TrackRef> {
        self.next_calls.fetch_add(1, Ordering::SeqCst);
        loop {
            let notified = self.notify.notified();
            if let Some(track) = self.items.lock().unwrap().pop_front() {
                self.pops.fetch_add(1, Ordering::SeqCst);
                return Ok(track);
            }
            notified.await;
        }
    }

    async fn peek_next(&self) -> Result<Option<TrackRef>> {
        self.peeks.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.lock().unwrap().get(1).cloned())
    }
}

/// Everything the controller publishes, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusRecord {
    Play { uri: String, user: String },
    End { uri: String, user: String },
    Elapsed(u64),
    ClearElapsed,
    Pause,
    Resume(u64),
}

pub struct RecordingStatus {
    records: Mutex<Vec<StatusRecord>>,
}

impl RecordingStatus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(Vec::new()),
        })
    }

    pub fn records(&self) -> Vec<StatusRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Play/End transitions only, dropping the periodic elapsed noise.
    pub fn transitions(&self) -> Vec<StatusRecord> {
        self.records()
            .into_iter()
            .filter(|record| {
                matches!(record, StatusRecord::Play { .. } | StatusRecord::End { .. })
            })
            .collect()
    }

    pub fn count_ends(&self) -> usize {
        self.records()
            .iter()
            .filter(|record| matches!(record, StatusRecord::End { .. }))
            .count()
    }

    pub fn last_resume(&self) -> Option<u64> {
        self.records().into_iter().rev().find_map(|record| match record {
            StatusRecord::Resume(ms) => Some(ms),
            _ => None,
        })
    }
}

#[async_trait]
impl StatusSink for RecordingStatus {
    async fn publish_play(&self, track: &TrackRef) -> Result<()> {
        self.records.lock().unwrap().push(StatusRecord::Play {
            uri: track.uri.clone(),
            user: track.user.clone(),
        });
        Ok(())
    }

    async fn publish_end(&self, track: &TrackRef) -> Result<()> {
        self.records.lock().unwrap().push(StatusRecord::End {
            uri: track.uri.clone(),
            user: track.user.clone(),
        });
        Ok(())
    }

    async fn set_elapsed(&self, seconds: u64) -> Result<()> {
        self.records
            .lock()
            .unwrap()
            .push(StatusRecord::Elapsed(seconds));
        Ok(())
    }

    async fn clear_elapsed(&self) -> Result<()> {
        self.records.lock().unwrap().push(StatusRecord::ClearElapsed);
        Ok(())
    }

    async fn record_pause(&self, _at: DateTime<Utc>) -> Result<()> {
        self.records.lock().unwrap().push(StatusRecord::Pause);
        Ok(())
    }

    async fn record_resume(&self, total_paused_ms: u64) -> Result<()> {
        self.records
            .lock()
            .unwrap()
            .push(StatusRecord::Resume(total_paused_ms));
        Ok(())
    }
}
