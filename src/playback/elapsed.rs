//! Elapsed-play accounting.
//!
//! A tick-driven counter advanced once per second while active. The tick
//! loop is the only incrementer; the controller flips the active flag and
//! zeroes the counter on track start, and any task may read the value.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant};

const TICK: Duration = Duration::from_secs(1);

/// Counter of active-play seconds for the current track.
#[derive(Debug, Clone, Default)]
pub struct ElapsedTimer {
    inner: Arc<TimerInner>,
}

#[derive(Debug, Default)]
struct TimerInner {
    seconds: AtomicU64,
    active: AtomicBool,
}

impl ElapsedTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero the counter and begin accumulating. Called exactly at the
    /// transition into playing for a new track.
    pub fn start(&self) {
        self.inner.seconds.store(0, Ordering::Release);
        self.inner.active.store(true, Ordering::Release);
    }

    /// Freeze the counter; the value is retained.
    pub fn pause(&self) {
        self.inner.active.store(false, Ordering::Release);
    }

    pub fn resume(&self) {
        self.inner.active.store(true, Ordering::Release);
    }

    /// Stop accumulating; the value is retained for a final publish.
    pub fn stop(&self) {
        self.inner.active.store(false, Ordering::Release);
    }

    pub fn value(&self) -> u64 {
        self.inner.seconds.load(Ordering::Acquire)
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::Acquire)
    }

    /// Tick loop: the sole incrementer of the counter. Spawned once and
    /// runs for the process lifetime.
    pub async fn run_ticks(self) {
        let mut tick = interval_at(Instant::now() + TICK, TICK);
        loop {
            tick.tick().await;
            if self.inner.active.load(Ordering::Acquire) {
                self.inner.seconds.fetch_add(1, Ordering::AcqRel);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance as advance_raw, sleep};

    async fn spawn_ticker(timer: &ElapsedTimer) {
        tokio::spawn(timer.clone().run_ticks());
        // Let the ticker task register its interval before moving time.
        sleep(Duration::from_millis(1)).await;
    }

    /// `tokio::time::advance` yields only once, which is not enough for
    /// the timer driver to fire the interval and poll the ticker task on
    /// a current-thread runtime; yield again so the ticker catches up.
    async fn advance(duration: Duration) {
        advance_raw(duration).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_seconds_while_active() {
        let timer = ElapsedTimer::new();
        spawn_ticker(&timer).await;

        timer.start();
        advance(Duration::from_secs(3)).await;
        assert_eq!(timer.value(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_frozen_while_paused() {
        let timer = ElapsedTimer::new();
        spawn_ticker(&timer).await;

        timer.start();
        advance(Duration::from_secs(5)).await;
        assert_eq!(timer.value(), 5);

        timer.pause();
        advance(Duration::from_secs(3)).await;
        assert_eq!(timer.value(), 5);

        timer.resume();
        advance(Duration::from_secs(1)).await;
        assert_eq!(timer.value(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_zeroes_counter() {
        let timer = ElapsedTimer::new();
        spawn_ticker(&timer).await;

        timer.start();
        advance(Duration::from_secs(4)).await;
        timer.stop();
        assert_eq!(timer.value(), 4);

        timer.start();
        assert_eq!(timer.value(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inactive_by_default() {
        let timer = ElapsedTimer::new();
        spawn_ticker(&timer).await;

        advance(Duration::from_secs(10)).await;
        assert_eq!(timer.value(), 0);
        assert!(!timer.is_active());
    }
}
