//! Idle monitoring
//!
//! Tracks user silence on a session. The timer resets on any inbound event
//! and fires after a configurable quiet period; the host decides per firing
//! whether to keep monitoring or stop. Suppression while on hold or while a
//! model response is in flight is the host's call, since only it knows.

use std::time::Duration;

use tokio::time::Instant;

/// Idle monitor configuration
#[derive(Debug, Clone)]
pub struct IdleConfig {
    /// Silence duration before a firing
    pub timeout: Duration,
    /// Firings after which the host should end the session
    pub max_retries: u32,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 3,
        }
    }
}

/// What the host wants after an idle firing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleDecision {
    /// Keep monitoring
    Continue,
    /// Stop monitoring; the session is ending
    Stop,
}

/// Timer-driven silence tracker for one session
pub struct IdleMonitor {
    config: IdleConfig,
    deadline: Instant,
    retries: u32,
    armed: bool,
}

impl IdleMonitor {
    /// Create a monitor; it stays disarmed until the first input
    #[must_use]
    pub fn new(config: IdleConfig) -> Self {
        Self {
            deadline: Instant::now() + config.timeout,
            config,
            retries: 0,
            armed: false,
        }
    }

    /// Record user input: reset the retry count and push the deadline
    pub fn observe_input(&mut self) {
        self.retries = 0;
        self.deadline = Instant::now() + self.config.timeout;
        self.armed = true;
    }

    /// Push the deadline without touching the retry count, arming if the
    /// monitor was idle.
    ///
    /// Called after the assistant finishes speaking, and when a firing was
    /// suppressed, so idle detection never competes with an active turn and
    /// silence is measured from the end of the assistant's speech.
    pub fn snooze(&mut self) {
        self.deadline = Instant::now() + self.config.timeout;
        self.armed = true;
    }

    /// Stop firing until the next `observe_input`
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Count this firing and rearm the timer. Returns the new retry count.
    pub fn fire(&mut self) -> u32 {
        self.retries += 1;
        self.deadline = Instant::now() + self.config.timeout;
        self.retries
    }

    /// Whether the retry budget is exhausted
    #[must_use]
    pub const fn exhausted(&self) -> bool {
        self.retries >= self.config.max_retries
    }

    /// Current retry count
    #[must_use]
    pub const fn retries(&self) -> u32 {
        self.retries
    }

    /// Resolve when the idle deadline expires; pends forever while disarmed
    pub async fn expired(&self) {
        if self.armed {
            tokio::time::sleep_until(self.deadline).await;
        } else {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(timeout_secs: u64, max_retries: u32) -> IdleConfig {
        IdleConfig {
            timeout: Duration::from_secs(timeout_secs),
            max_retries,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn disarmed_monitor_never_expires() {
        let monitor = IdleMonitor::new(config(1, 3));
        let expired = tokio::time::timeout(Duration::from_secs(30), monitor.expired()).await;
        assert!(expired.is_err(), "disarmed monitor must pend");
    }

    #[tokio::test(start_paused = true)]
    async fn expires_after_timeout_once_armed() {
        let mut monitor = IdleMonitor::new(config(10, 3));
        monitor.observe_input();

        let early = tokio::time::timeout(Duration::from_secs(5), monitor.expired()).await;
        assert!(early.is_err());

        let late = tokio::time::timeout(Duration::from_secs(6), monitor.expired()).await;
        assert!(late.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn input_resets_retries_and_deadline() {
        let mut monitor = IdleMonitor::new(config(10, 3));
        monitor.observe_input();
        assert_eq!(monitor.fire(), 1);
        assert_eq!(monitor.fire(), 2);

        monitor.observe_input();
        assert_eq!(monitor.retries(), 0);
        assert_eq!(monitor.fire(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_after_max_retries() {
        let mut monitor = IdleMonitor::new(config(1, 2));
        monitor.observe_input();
        monitor.fire();
        assert!(!monitor.exhausted());
        monitor.fire();
        assert!(monitor.exhausted());
    }

    #[tokio::test(start_paused = true)]
    async fn snooze_pushes_deadline_without_counting() {
        let mut monitor = IdleMonitor::new(config(10, 3));
        monitor.observe_input();
        monitor.fire();

        tokio::time::advance(Duration::from_secs(8)).await;
        monitor.snooze();
        assert_eq!(monitor.retries(), 1);

        let early = tokio::time::timeout(Duration::from_secs(9), monitor.expired()).await;
        assert!(early.is_err(), "snooze must push the deadline");
    }
}
