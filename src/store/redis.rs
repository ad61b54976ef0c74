//! Redis implementations of the store seams.
//!
//! The queue is a list popped with `BLPOP` (zero timeout, blocks until an
//! item arrives), prefetch peeks with `LRANGE`, and status lives in plain
//! keys plus `PUBLISH` on the shared event channel.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::StoreKeys;
use crate::error::Result;
use crate::events::StatusEvent;
use crate::store::{StatusSink, TrackQueue};
use crate::track::TrackRef;

pub struct RedisQueue {
    /// BLPOP parks its connection for the duration of the wait, so the
    /// blocking pop gets a connection of its own.
    pop_conn: Mutex<MultiplexedConnection>,
    peek_conn: Mutex<MultiplexedConnection>,
    key: String,
}

impl RedisQueue {
    pub async fn connect(url: &str, key: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let pop_conn = client.get_multiplexed_async_connection().await?;
        let peek_conn = client.get_multiplexed_async_connection().await?;
        Ok(Self {
            pop_conn: Mutex::new(pop_conn),
            peek_conn: Mutex::new(peek_conn),
            key: key.into(),
        })
    }
}

#[async_trait]
impl TrackQueue for RedisQueue {
    async fn next(&self) -> Result<TrackRef> {
        let mut conn = self.pop_conn.lock().await;
        // BLPOP returns [key, value]
        let (_key, payload): (String, String) = redis::cmd("BLPOP")
            .arg(&self.key)
            .arg(0)
            .query_async(&mut *conn)
            .await?;
        debug!(queue = %self.key, "popped queue item");
        TrackRef::from_json(payload.as_bytes())
    }

    async fn peek_next(&self) -> Result<Option<TrackRef>> {
        let mut conn = self.peek_conn.lock().await;
        let items: Vec<String> = conn.lrange(&self.key, 1, 1).await?;
        match items.first() {
            Some(raw) => Ok(Some(TrackRef::from_json(raw.as_bytes())?)),
            None => Ok(None),
        }
    }
}

pub struct RedisStatus {
    conn: Mutex<MultiplexedConnection>,
    keys: StoreKeys,
    channel: String,
}

impl RedisStatus {
    pub async fn connect(url: &str, keys: StoreKeys, channel: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self {
            conn: Mutex::new(conn),
            keys,
            channel: channel.into(),
        })
    }
}

#[async_trait]
impl StatusSink for RedisStatus {
    async fn publish_play(&self, track: &TrackRef) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let _: () = conn.set(&self.keys.current, track.to_json()?).await?;
        let _: () = conn
            .set(&self.keys.start_time, Utc::now().to_rfc3339())
            .await?;
        // Pause bookkeeping resets with each new track
        let _: () = conn.del(&self.keys.pause_time).await?;
        let _: () = conn.del(&self.keys.pause_duration).await?;
        let _: () = conn
            .publish(&self.channel, StatusEvent::play(track).to_json()?)
            .await?;
        debug!(uri = %track.uri, "published play event");
        Ok(())
    }

    async fn publish_end(&self, track: &TrackRef) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let _: () = conn.del(&self.keys.current).await?;
        let _: () = conn.del(&self.keys.start_time).await?;
        let _: () = conn
            .publish(&self.channel, StatusEvent::end(track).to_json()?)
            .await?;
        debug!(uri = %track.uri, "published end event");
        Ok(())
    }

    async fn set_elapsed(&self, seconds: u64) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let _: () = conn.set(&self.keys.elapsed, seconds.to_string()).await?;
        Ok(())
    }

    async fn clear_elapsed(&self) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let _: () = conn.del(&self.keys.elapsed).await?;
        Ok(())
    }

    async fn record_pause(&self, at: DateTime<Utc>) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let _: () = conn.set(&self.keys.pause_time, at.to_rfc3339()).await?;
        Ok(())
    }

    async fn record_resume(&self, total_paused_ms: u64) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let _: () = conn
            .set(&self.keys.pause_duration, total_paused_ms.to_string())
            .await?;
        Ok(())
    }
}
