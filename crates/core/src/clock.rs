//! Time source for date-relative retrieval and run polling.
//!
//! Production code uses [`SystemClock`]. [`FixedClock`] pins "today" and
//! records sleeps without waiting, so polling loops and `current`/`upcoming`
//! selections can be exercised deterministically.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Mutex;
use std::time::Duration;

#[async_trait]
pub trait Clock: Send + Sync {
    /// The current calendar date.
    fn today(&self) -> NaiveDate;

    /// Suspend the calling task; must yield rather than block the worker.
    async fn sleep(&self, duration: Duration);
}

/// Wall clock in the server's local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// A clock frozen on one date.
#[derive(Debug)]
pub struct FixedClock {
    today: NaiveDate,
    sleeps: Mutex<Vec<Duration>>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Every duration passed to `sleep`, in call order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(duration);
        tokio::task::yield_now().await;
    }
}
