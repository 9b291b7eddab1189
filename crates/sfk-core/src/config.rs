//! Flow configuration
//!
//! All tunables in one place. Defaults match the deployed study; tests
//! shrink the timeouts instead of sleeping through them.

use serde::{Deserialize, Serialize};
use sfk_record::ScenarioStage;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Deadline for a full submit-to-response cycle, in milliseconds
    pub observer_timeout_ms: u64,
    /// How long page setup waits for a restored session before rendering
    pub auth_wait_ms: u64,
    /// Progress shown on entering the first scenario, percent
    pub progress_base: u8,
    /// Progress gained per scenario advance, percent
    pub progress_step: u8,
    /// Lifetime of the completed-participant marker, days
    pub persistent_cookie_days: i64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            observer_timeout_ms: 30_000,
            auth_wait_ms: 5_000,
            progress_base: 40,
            progress_step: 10,
            persistent_cookie_days: 365,
        }
    }
}

impl FlowConfig {
    #[must_use]
    pub fn with_observer_timeout_ms(mut self, ms: u64) -> Self {
        self.observer_timeout_ms = ms;
        self
    }

    #[must_use]
    pub fn with_auth_wait_ms(mut self, ms: u64) -> Self {
        self.auth_wait_ms = ms;
        self
    }

    #[must_use]
    pub fn with_persistent_cookie_days(mut self, days: i64) -> Self {
        self.persistent_cookie_days = days;
        self
    }

    #[inline]
    #[must_use]
    pub fn auth_wait(&self) -> Duration {
        Duration::from_millis(self.auth_wait_ms)
    }

    /// Progress-bar value while the given scenario is active
    #[inline]
    #[must_use]
    pub fn progress_percent(&self, stage: ScenarioStage) -> u8 {
        self.progress_base
            .saturating_add(self.progress_step.saturating_mul(stage.get() - 1))
    }
}
