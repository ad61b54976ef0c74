//! jukeboxd - Main entry point
//!
//! Wires the playback core to its collaborators: the simulated media
//! backend, the Redis queue/pub-sub/status store, and the per-component
//! worker tasks. Runs until an OS signal arrives or the playback
//! controller hits a fatal backend error.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::{mpsc, Notify};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jukeboxd::backend::{Backend, SimBackend};
use jukeboxd::config::Config;
use jukeboxd::gate::Gate;
use jukeboxd::monitor::ConnectivityMonitor;
use jukeboxd::playback::{
    ElapsedPublisher, ElapsedTimer, PlaybackController, PlaylistWatcher,
};
use jukeboxd::reactor::CommandReactor;
use jukeboxd::store::{RedisQueue, RedisStatus};

/// Command-line arguments for jukeboxd
#[derive(Parser, Debug)]
#[command(name = "jukeboxd")]
#[command(about = "Queue-driven single-track playback daemon")]
#[command(version)]
struct Args {
    /// Path to TOML configuration file
    #[arg(long, env = "JUKEBOXD_CONFIG")]
    config: Option<PathBuf>,

    /// Backend account user
    #[arg(short, long)]
    user: Option<String>,

    /// Backend account password
    #[arg(short, long)]
    pass: Option<String>,

    /// Backend application key path
    #[arg(short, long)]
    key: Option<PathBuf>,

    /// Redis server URL
    #[arg(short, long, env = "JUKEBOXD_REDIS_URL")]
    redis: Option<String>,

    /// Redis list key for the track queue
    #[arg(short, long, env = "JUKEBOXD_QUEUE")]
    queue: Option<String>,

    /// Pub/sub channel for commands and status events
    #[arg(short, long, env = "JUKEBOXD_CHANNEL")]
    channel: Option<String>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(redis) = self.redis {
            config.redis_url = redis;
        }
        if let Some(queue) = self.queue {
            config.queue_key = queue;
        }
        if let Some(channel) = self.channel {
            config.channel = channel;
        }
        if let Some(user) = self.user {
            config.backend.user = Some(user);
        }
        if let Some(pass) = self.pass {
            config.backend.pass = Some(pass);
        }
        if let Some(key) = self.key {
            config.backend.key_path = Some(key.to_string_lossy().to_string());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jukeboxd=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config =
        Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);

    info!(
        redis = %config.redis_url,
        queue = %config.queue_key,
        channel = %config.channel,
        "Starting jukeboxd"
    );

    // Backend session; authentication failure here is fatal
    let backend = Arc::new(SimBackend::new(Duration::from_secs(
        config.backend.sim_track_seconds,
    )));
    let connectivity_updates = backend.connectivity_updates();
    backend
        .login(config.backend.user.as_deref())
        .await
        .context("Backend login failed")?;

    // Store clients
    let client =
        redis::Client::open(config.redis_url.as_str()).context("Invalid redis URL")?;
    let queue = Arc::new(
        RedisQueue::connect(&config.redis_url, &config.queue_key)
            .await
            .context("Failed to connect queue client")?,
    );
    let status = Arc::new(
        RedisStatus::connect(&config.redis_url, config.keys.clone(), &config.channel)
            .await
            .context("Failed to connect status client")?,
    );

    // Channels between the workers and the controller
    let (command_tx, command_rx) = mpsc::channel(16);
    let (track_tx, track_rx) = mpsc::channel(1);
    let gate = Gate::new();
    let cycle_done = Arc::new(Notify::new());
    let timer = ElapsedTimer::new();

    // Workers: one long-lived task per component
    tokio::spawn(timer.clone().run_ticks());
    tokio::spawn(ConnectivityMonitor::new(connectivity_updates, gate.clone()).watch());
    tokio::spawn(CommandReactor::new(client, config.channel.clone(), command_tx).consume());
    tokio::spawn(
        PlaylistWatcher::new(
            Arc::clone(&backend),
            Arc::clone(&queue),
            gate.clone(),
            track_tx,
            Arc::clone(&cycle_done),
        )
        .run(),
    );

    let (controller, snapshot) = PlaybackController::new(
        Arc::clone(&backend),
        Arc::clone(&queue),
        Arc::clone(&status),
        timer.clone(),
        gate,
        cycle_done,
        command_rx,
        track_rx,
    );
    tokio::spawn(ElapsedPublisher::new(Arc::clone(&status), timer, snapshot).run());

    let mut controller_task = tokio::spawn(controller.run());

    tokio::select! {
        _ = shutdown_signal() => {
            info!("Signal received, shutting down");
        }
        result = &mut controller_task => {
            match result {
                Ok(Ok(())) => info!("Controller loop ended"),
                Ok(Err(e)) => {
                    return Err(anyhow::Error::new(e).context("Playback controller failed"))
                }
                Err(e) => {
                    return Err(anyhow::Error::new(e).context("Playback controller panicked"))
                }
            }
        }
    }

    // Release backend playback resources; mid-track state is abandoned
    controller_task.abort();
    let _ = backend.unload().await;

    info!("Shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
