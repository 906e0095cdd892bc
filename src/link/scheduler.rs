//! # Link Scheduler
//!
//! Decides when the controller transmits. A packet goes out when:
//!
//! - the previous attempt failed (retry on the very next cycle),
//! - any channel changed since the last delivered packet, or
//! - `min_send_interval` has elapsed since the last delivery.
//!
//! Failures are retried indefinitely with no backoff: the link is a
//! continuous best-effort stream, not a guaranteed-delivery protocol.

use serde::Serialize;
use std::time::{Duration, Instant};

use super::transport::Transport;
use crate::conditioning::channel::ChannelState;
use crate::packet::encoder::{encode_channels, encode_frame};
use crate::packet::protocol::PACKET_SIZE;

/// Why a packet was sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SendTrigger {
    /// Previous attempt was not acknowledged
    Retry,
    /// A channel differs from the last delivered packet
    Changed,
    /// Fallback cadence elapsed
    Periodic,
}

/// Result of one transmission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered {
        trigger: SendTrigger,
        payload: [u8; PACKET_SIZE],
        latency: Duration,
    },
    Failed {
        trigger: SendTrigger,
        payload: [u8; PACKET_SIZE],
    },
}

impl SendOutcome {
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self, SendOutcome::Delivered { .. })
    }

    #[must_use]
    pub fn trigger(&self) -> SendTrigger {
        match *self {
            SendOutcome::Delivered { trigger, .. } | SendOutcome::Failed { trigger, .. } => trigger,
        }
    }

    #[must_use]
    pub fn payload(&self) -> [u8; PACKET_SIZE] {
        match *self {
            SendOutcome::Delivered { payload, .. } | SendOutcome::Failed { payload, .. } => payload,
        }
    }
}

/// Transmit counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub attempts: u64,
    pub delivered: u64,
    pub failed: u64,
    pub retries: u64,
    pub last_latency: Option<Duration>,
}

/// Transmitter-side send timing
#[derive(Debug, Clone)]
pub struct LinkScheduler {
    min_send_interval: Duration,
    last_send: Option<Instant>,
    resend: bool,
    stats: LinkStats,
}

impl LinkScheduler {
    #[must_use]
    pub fn new(min_send_interval: Duration) -> Self {
        Self {
            min_send_interval,
            last_send: None,
            resend: false,
            stats: LinkStats::default(),
        }
    }

    #[must_use]
    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Whether the last attempt failed and a retry is pending.
    #[must_use]
    pub fn resend_pending(&self) -> bool {
        self.resend
    }

    /// Time of the last acknowledged send.
    #[must_use]
    pub fn last_send(&self) -> Option<Instant> {
        self.last_send
    }

    /// Which trigger, if any, fires at `now`.
    ///
    /// The first call always fires periodically so the vehicle hears from the
    /// controller as soon as it starts.
    #[must_use]
    pub fn next_trigger(&self, now: Instant, changed: bool) -> Option<SendTrigger> {
        if self.resend {
            return Some(SendTrigger::Retry);
        }
        if changed {
            return Some(SendTrigger::Changed);
        }
        match self.last_send {
            None => Some(SendTrigger::Periodic),
            Some(last) if now.saturating_duration_since(last) >= self.min_send_interval => {
                Some(SendTrigger::Periodic)
            }
            Some(_) => None,
        }
    }

    /// Send the current channel fields if a trigger fires.
    ///
    /// On delivery the change flags are cleared and the cadence timer restarts.
    /// On failure nothing is cleared and a retry is forced next cycle.
    pub fn poll<T: Transport + ?Sized>(
        &mut self,
        now: Instant,
        throttle: &mut ChannelState,
        steering: &mut ChannelState,
        transport: &mut T,
    ) -> Option<SendOutcome> {
        let changed = throttle.changed_since_last_send() || steering.changed_since_last_send();
        let trigger = self.next_trigger(now, changed)?;

        let packet = encode_channels(throttle, steering);
        let payload = encode_frame(&packet);

        self.stats.attempts += 1;
        if trigger == SendTrigger::Retry {
            self.stats.retries += 1;
        }

        let started = Instant::now();
        let acknowledged = transport.send(&payload);
        let latency = started.elapsed();

        if acknowledged {
            throttle.mark_sent(packet.throttle());
            steering.mark_sent(packet.steering());
            self.last_send = Some(now);
            self.resend = false;
            self.stats.delivered += 1;
            self.stats.last_latency = Some(latency);
            Some(SendOutcome::Delivered {
                trigger,
                payload,
                latency,
            })
        } else {
            self.resend = true;
            self.stats.failed += 1;
            Some(SendOutcome::Failed { trigger, payload })
        }
    }
}
