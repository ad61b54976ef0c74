//! Playback controller: the orchestration state machine.
//!
//! The controller is the sole authority for "what is playing now". It owns
//! the [`PlaybackSession`] record, serializes every backend mutation and
//! coordinates the other workers over channels: track-ready hand-offs from
//! the playlist watcher, commands from the reactor and the current cycle's
//! end-of-track notification from the backend.
//!
//! A stop command and an end-of-track signal racing each other trigger the
//! drain exactly once; whichever arrives second finds the session no longer
//! playing and is discarded.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch, Notify};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::backend::{Backend, EndOfTrack};
use crate::error::Result;
use crate::events::Command;
use crate::gate::Gate;
use crate::playback::elapsed::ElapsedTimer;
use crate::playback::state::{Phase, PlaybackSession, PlaybackSnapshot};
use crate::store::{StatusSink, TrackQueue};
use crate::track::TrackRef;

/// What woke the controller's select loop.
enum Wake {
    Command(Option<Command>),
    Track(Option<TrackRef>),
    Ended,
}

pub struct PlaybackController<B, Q, S> {
    backend: Arc<B>,
    queue: Arc<Q>,
    status: Arc<S>,
    timer: ElapsedTimer,

    /// Playlist request gate, armed on `add` while idle.
    gate: Gate,

    commands: mpsc::Receiver<Command>,
    tracks: mpsc::Receiver<TrackRef>,
    tracks_open: bool,

    /// Signals the playlist watcher that the current cycle finished.
    cycle_done: Arc<Notify>,

    snapshot: watch::Sender<PlaybackSnapshot>,
    session: PlaybackSession,
}

impl<B, Q, S> PlaybackController<B, Q, S>
where
    B: Backend,
    Q: TrackQueue,
    S: StatusSink,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        backend: Arc<B>,
        queue: Arc<Q>,
        status: Arc<S>,
        timer: ElapsedTimer,
        gate: Gate,
        cycle_done: Arc<Notify>,
        commands: mpsc::Receiver<Command>,
        tracks: mpsc::Receiver<TrackRef>,
    ) -> (Self, watch::Receiver<PlaybackSnapshot>) {
        let (snapshot, snapshot_rx) = watch::channel(PlaybackSnapshot::default());
        let controller = Self {
            backend,
            queue,
            status,
            timer,
            gate,
            commands,
            tracks,
            tracks_open: true,
            cycle_done,
            snapshot,
            session: PlaybackSession::new(),
        };
        (controller, snapshot_rx)
    }

    /// Main loop. Runs until the command channel closes; a backend load
    /// failure is fatal and propagates out.
    pub async fn run(mut self) -> Result<()> {
        info!("playback controller started");
        loop {
            let idle = self.session.phase == Phase::Idle && self.tracks_open;
            let playing = self.session.end_of_track.is_some();

            let wake = tokio::select! {
                command = self.commands.recv() => Wake::Command(command),
                track = self.tracks.recv(), if idle => Wake::Track(track),
                _ = Self::track_ended(&mut self.session.end_of_track), if playing => Wake::Ended,
            };

            match wake {
                Wake::Command(Some(command)) => self.handle_command(command).await,
                Wake::Command(None) => {
                    info!("command channel closed, controller stopping");
                    return Ok(());
                }
                Wake::Track(Some(track)) => self.start_cycle(track).await?,
                Wake::Track(None) => {
                    warn!("track source closed");
                    self.tracks_open = false;
                }
                Wake::Ended => {
                    info!("end of track reported by backend");
                    self.session.end_of_track = None;
                    self.drain().await;
                }
            }
        }
    }

    async fn track_ended(slot: &mut Option<EndOfTrack>) {
        match slot {
            Some(end_of_track) => end_of_track.ended().await,
            None => std::future::pending().await,
        }
    }

    /// Begin a playback cycle for a track handed over by the playlist
    /// watcher. Only reachable from idle.
    async fn start_cycle(&mut self, track: TrackRef) -> Result<()> {
        info!(uri = %track.uri, user = %track.user, "loading track");
        self.session.current = Some(track.clone());
        self.set_phase(Phase::Loading);

        // A load/authenticate failure has no recovery path; surface it.
        let end_of_track = self.backend.load_and_play(&track).await?;

        self.session.end_of_track = Some(end_of_track);
        self.session.pause_started = None;
        self.session.paused_total = Duration::ZERO;
        self.timer.start();
        self.set_phase(Phase::Playing);
        info!(uri = %track.uri, "playing");

        if let Err(e) = self.status.publish_play(&track).await {
            error!("failed to publish play event: {e}");
        }
        Ok(())
    }

    async fn handle_command(&mut self, command: Command) {
        debug!(?command, phase = %self.session.phase, "handling command");
        match command {
            Command::Pause => self.pause().await,
            Command::Resume => self.resume().await,
            Command::Play => match self.session.phase {
                Phase::Paused => self.resume().await,
                Phase::Idle => self.gate.arm(),
                _ => debug!("play command ignored in phase {}", self.session.phase),
            },
            Command::Stop => self.stop().await,
            Command::Add { track } => self.handle_add(track).await,
        }
    }

    async fn pause(&mut self) {
        if self.session.phase != Phase::Playing {
            debug!("pause ignored in phase {}", self.session.phase);
            return;
        }
        if let Err(e) = self.backend.pause().await {
            error!("backend pause failed: {e}");
            return;
        }
        self.timer.pause();
        self.session.pause_started = Some(Instant::now());
        self.set_phase(Phase::Paused);
        info!("playback paused");

        if let Err(e) = self.status.record_pause(Utc::now()).await {
            warn!("failed to record pause time: {e}");
        }
    }

    async fn resume(&mut self) {
        if self.session.phase != Phase::Paused {
            debug!("resume ignored in phase {}", self.session.phase);
            return;
        }
        if let Err(e) = self.backend.resume().await {
            error!("backend resume failed: {e}");
            return;
        }
        if let Some(started) = self.session.pause_started.take() {
            self.session.paused_total += started.elapsed();
        }
        self.timer.resume();
        self.set_phase(Phase::Playing);
        info!(paused_ms = self.session.paused_total.as_millis() as u64, "playback resumed");

        let paused_ms = self.session.paused_total.as_millis() as u64;
        if let Err(e) = self.status.record_resume(paused_ms).await {
            warn!("failed to record paused duration: {e}");
        }
    }

    async fn stop(&mut self) {
        match self.session.phase {
            Phase::Playing | Phase::Paused => {
                info!("stop command received");
                // Discard the pending notification so a racing end-of-track
                // cannot drain the same cycle twice.
                self.session.end_of_track = None;
                self.drain().await;
            }
            Phase::Idle => debug!("stop ignored while idle"),
            phase => debug!("stop ignored in phase {phase}"),
        }
    }

    /// Tear down the current cycle: unload, publish `end`, return to idle
    /// and release the playlist watcher for the next pop.
    async fn drain(&mut self) {
        self.set_phase(Phase::Draining);
        self.timer.stop();
        self.session.pause_started = None;

        if let Err(e) = self.backend.unload().await {
            error!("backend unload failed: {e}");
        }

        if let Some(track) = self.session.current.take() {
            if let Err(e) = self.status.publish_end(&track).await {
                error!("failed to publish end event: {e}");
            }
            info!(uri = %track.uri, "track ended");
        }

        self.set_phase(Phase::Idle);
        self.cycle_done.notify_one();
    }

    async fn handle_add(&mut self, track: Option<TrackRef>) {
        if let Some(track) = &track {
            debug!(uri = %track.uri, "track added to queue");
        }
        match self.session.phase {
            // Wake the playlist watcher out of its connectivity poll.
            Phase::Idle => self.gate.arm(),
            Phase::Playing | Phase::Paused => match self.queue.peek_next().await {
                Ok(Some(next)) => info!(uri = %next.uri, "next track queued"),
                Ok(None) => debug!("queue shows no further item"),
                Err(e) => warn!("prefetch peek failed: {e}"),
            },
            phase => debug!("add ignored in phase {phase}"),
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.session.phase != phase {
            debug!(from = %self.session.phase, to = %phase, "phase transition");
            self.session.phase = phase;
        }
        let _ = self.snapshot.send(self.session.snapshot());
    }
}
