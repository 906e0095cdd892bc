//! Link telemetry record types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::conditioning::channel::Channel;
use crate::link::scheduler::{SendOutcome, SendTrigger};
use crate::packet::protocol::PACKET_SIZE;

/// Which end of the link produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Controller,
    Vehicle,
}

impl Role {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Role::Controller => "controller",
            Role::Vehicle => "vehicle",
        }
    }
}

/// Something worth reporting about the link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LinkEvent {
    TransmitSucceeded {
        trigger: SendTrigger,
        latency_us: u64,
        packet: [u8; PACKET_SIZE],
    },
    TransmitFailed {
        trigger: SendTrigger,
        packet: [u8; PACKET_SIZE],
    },
    PacketReceived {
        packet: [u8; PACKET_SIZE],
    },
    PacketRejected {
        length: usize,
    },
    /// Accepted packet whose field the strategy can only read approximately
    /// (saturated magnitude or unknown direction code).
    FieldOutOfRange {
        channel: Channel,
        magnitude: u8,
        direction: u8,
    },
    LinkLost {
        silence_ms: u64,
    },
    LinkRestored {
        outage_ms: u64,
    },
}

impl LinkEvent {
    #[must_use]
    pub fn link_lost(silence: Duration) -> Self {
        LinkEvent::LinkLost {
            silence_ms: silence.as_millis() as u64,
        }
    }

    #[must_use]
    pub fn link_restored(outage: Duration) -> Self {
        LinkEvent::LinkRestored {
            outage_ms: outage.as_millis() as u64,
        }
    }
}

impl From<SendOutcome> for LinkEvent {
    fn from(outcome: SendOutcome) -> Self {
        match outcome {
            SendOutcome::Delivered {
                trigger,
                payload,
                latency,
            } => LinkEvent::TransmitSucceeded {
                trigger,
                latency_us: latency.as_micros() as u64,
                packet: payload,
            },
            SendOutcome::Failed { trigger, payload } => LinkEvent::TransmitFailed {
                trigger,
                packet: payload,
            },
        }
    }
}

/// One JSONL line
#[derive(Debug, Serialize)]
pub struct TelemetryRecord<'a> {
    pub timestamp: DateTime<Utc>,
    pub role: Role,
    #[serde(flatten)]
    pub event: &'a LinkEvent,
}
