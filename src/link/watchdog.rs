//! # Connection Watchdog
//!
//! Receive-side freshness check. When no packet has arrived for
//! `timeout`, a loss-of-link observation fires and the timer restarts, so a
//! long outage reports once per timeout window rather than every cycle.
//!
//! The watchdog only observes. What happens to the actuators is the vehicle's
//! failsafe policy.

use std::time::{Duration, Instant};

/// Receive-side loss-of-signal detector
#[derive(Debug, Clone)]
pub struct ConnectionWatchdog {
    timeout: Duration,
    /// Restarted on every packet and on every loss report.
    window_start: Instant,
    last_packet: Instant,
    lost: bool,
    lost_count: u64,
}

impl ConnectionWatchdog {
    /// Starts the watchdog at `now` as if a packet had just arrived.
    #[must_use]
    pub fn new(timeout: Duration, now: Instant) -> Self {
        Self {
            timeout,
            window_start: now,
            last_packet: now,
            lost: false,
            lost_count: 0,
        }
    }

    /// True between a loss report and the next packet.
    #[must_use]
    pub fn is_lost(&self) -> bool {
        self.lost
    }

    /// Number of loss reports so far.
    #[must_use]
    pub fn lost_count(&self) -> u64 {
        self.lost_count
    }

    /// Checks freshness at `now`.
    ///
    /// Returns the silence since the last packet when a loss report fires.
    pub fn check(&mut self, now: Instant) -> Option<Duration> {
        if now.saturating_duration_since(self.window_start) < self.timeout {
            return None;
        }

        self.window_start = now;
        self.lost = true;
        self.lost_count += 1;
        Some(now.saturating_duration_since(self.last_packet))
    }

    /// Records a packet arrival at `now`.
    ///
    /// Returns the outage length if this packet ends a reported loss.
    pub fn feed(&mut self, now: Instant) -> Option<Duration> {
        let outage = self
            .lost
            .then(|| now.saturating_duration_since(self.last_packet));

        self.window_start = now;
        self.last_packet = now;
        self.lost = false;
        outage
    }
}
