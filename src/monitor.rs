//! Connectivity monitor.
//!
//! Observes backend connection-state transitions for observability and
//! re-arms the playlist request gate on every transition into logged-in
//! (the first successful login and each reconnection). Arming is
//! idempotent, so a reconnect while the gate is already armed is a no-op.

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::backend::ConnectivityState;
use crate::gate::Gate;

pub struct ConnectivityMonitor {
    updates: mpsc::Receiver<ConnectivityState>,
    gate: Gate,
}

impl ConnectivityMonitor {
    pub fn new(updates: mpsc::Receiver<ConnectivityState>, gate: Gate) -> Self {
        Self { updates, gate }
    }

    /// Blocking loop over the backend's connectivity update stream.
    pub async fn watch(mut self) {
        let mut last = ConnectivityState::Unknown;
        while let Some(state) = self.updates.recv().await {
            if state == last {
                continue;
            }
            info!(from = %last, to = %state, "connectivity changed");
            if state == ConnectivityState::LoggedIn {
                self.gate.arm();
            }
            last = state;
        }
        warn!("connectivity stream closed");
    }
}
