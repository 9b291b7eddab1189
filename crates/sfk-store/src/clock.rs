//! Injected time source
//!
//! Every timestamp the flow records (server-time sentinels, latency
//! measurements, timeout deadlines) goes through this trait so tests and
//! the simulator can drive time manually.

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Time source for server timestamps and latency math
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current time in epoch milliseconds
    fn now_ms(&self) -> i64;

    /// Current time as a UTC timestamp
    fn now(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(self.now_ms()).unwrap_or_else(Utc::now)
    }
}

/// Wall-clock implementation used outside tests
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

impl Clock for Arc<dyn Clock> {
    fn now_ms(&self) -> i64 {
        self.as_ref().now_ms()
    }
}

/// Manually advanced clock for tests and the simulator
#[derive(Debug)]
pub struct ManualClock {
    now_ms: parking_lot::Mutex<i64>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: parking_lot::Mutex::new(start_ms),
        }
    }

    /// Starting at a fixed, readable epoch
    #[must_use]
    pub fn fixed() -> Self {
        Self::new(1_700_000_000_000)
    }

    pub fn advance_ms(&self, delta: i64) {
        *self.now_ms.lock() += delta;
    }

    pub fn set_ms(&self, now_ms: i64) {
        *self.now_ms.lock() = now_ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        *self.now_ms.lock()
    }
}
