//! Command reactor: consumes transport commands from the pub/sub channel.
//!
//! Decodes each inbound message into a [`Command`] and forwards it to the
//! playback controller. Malformed payloads and unknown events are logged
//! and skipped; a broken subscription stream is re-established after a
//! short delay. Nothing here crashes the process.

use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::events::Command;

const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(1);

pub struct CommandReactor {
    client: redis::Client,
    channel: String,
    commands: mpsc::Sender<Command>,
}

impl CommandReactor {
    pub fn new(client: redis::Client, channel: impl Into<String>, commands: mpsc::Sender<Command>) -> Self {
        Self {
            client,
            channel: channel.into(),
            commands,
        }
    }

    /// Blocking consume loop. Runs for the process lifetime, re-subscribing
    /// whenever the underlying stream errors or ends.
    pub async fn consume(self) {
        loop {
            if let Err(e) = self.subscribe_and_read().await {
                warn!("command stream error: {e}");
            }
            if self.commands.is_closed() {
                warn!("command channel closed, reactor exiting");
                return;
            }
            info!("re-subscribing to command channel");
            sleep(RESUBSCRIBE_DELAY).await;
        }
    }

    async fn subscribe_and_read(&self) -> Result<()> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(&self.channel).await?;
        info!(channel = %self.channel, "subscribed to command channel");

        let mut messages = pubsub.on_message();
        while let Some(msg) = messages.next().await {
            let payload: Vec<u8> = match msg.get_payload() {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("unreadable message payload: {e}");
                    continue;
                }
            };
            match Command::decode(&payload) {
                Ok(Some(command)) => {
                    debug!(?command, "dispatching command");
                    if self.commands.send(command).await.is_err() {
                        return Ok(());
                    }
                }
                Ok(None) => debug!("ignoring unhandled event"),
                Err(e) => warn!("malformed command payload: {e}"),
            }
        }
        Ok(())
    }
}
