//! # Channel State
//!
//! Per-axis mutable state owned by a role for the lifetime of the process.
//! The controller uses it for change detection against the last delivered
//! field; both roles use its smoothing history.

use serde::Serialize;

use super::filter::ema;
use crate::packet::protocol::{AxisField, VALUE_NEUTRAL};

/// Control axes carried by the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Throttle,
    Steering,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Throttle, Channel::Steering];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Channel::Throttle => "throttle",
            Channel::Steering => "steering",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Mutable state for one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelState {
    /// Field computed on the most recent cycle.
    current: AxisField,
    /// Field carried by the last delivered packet.
    last_sent: AxisField,
    smoothed_value: f32,
    previous_smoothed_value: f32,
    changed_since_last_send: bool,
}

impl ChannelState {
    /// Creates a channel resting at `neutral`, with smoothing history at the
    /// packet-domain neutral.
    #[must_use]
    pub fn new(neutral: AxisField) -> Self {
        Self {
            current: neutral,
            last_sent: neutral,
            smoothed_value: VALUE_NEUTRAL as f32,
            previous_smoothed_value: VALUE_NEUTRAL as f32,
            changed_since_last_send: false,
        }
    }

    #[must_use]
    pub fn current(&self) -> AxisField {
        self.current
    }

    #[must_use]
    pub fn last_sent(&self) -> AxisField {
        self.last_sent
    }

    #[must_use]
    pub fn smoothed_value(&self) -> f32 {
        self.smoothed_value
    }

    #[must_use]
    pub fn previous_smoothed_value(&self) -> f32 {
        self.previous_smoothed_value
    }

    #[must_use]
    pub fn changed_since_last_send(&self) -> bool {
        self.changed_since_last_send
    }

    /// Records the field computed this cycle and flags a change if it differs
    /// from the last delivered field. The flag stays set until delivery.
    ///
    /// Returns the flag after the update.
    pub fn observe(&mut self, field: AxisField) -> bool {
        self.current = field;
        if field != self.last_sent {
            self.changed_since_last_send = true;
        }
        self.changed_since_last_send
    }

    /// Marks `field` as delivered and clears the change flag.
    pub fn mark_sent(&mut self, field: AxisField) {
        self.last_sent = field;
        self.changed_since_last_send = false;
    }

    /// Applies one EMA step towards `requested` and returns the new value.
    pub fn smooth(&mut self, requested: f32, alpha: f32) -> f32 {
        self.smoothed_value = ema(requested, self.previous_smoothed_value, alpha);
        self.previous_smoothed_value = self.smoothed_value;
        self.smoothed_value
    }

    /// Discards smoothing history so the next output starts at `value`.
    pub fn reset_smoothing(&mut self, value: f32) {
        self.smoothed_value = value;
        self.previous_smoothed_value = value;
    }
}
