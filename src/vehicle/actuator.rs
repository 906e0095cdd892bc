//! Trait abstraction for actuator output to enable testing

use crate::conditioning::channel::Channel;

/// Position-controlled actuator (servo or ESC)
#[cfg_attr(test, mockall::automock)]
pub trait Actuator {
    /// Command `channel` to `angle` (0-180).
    fn write(&mut self, channel: Channel, angle: u8);
}

/// Actuator that remembers the last angle written per channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingActuator {
    pub throttle: Option<u8>,
    pub steering: Option<u8>,
    pub writes: u64,
}

impl RecordingActuator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last angle written to `channel`, if any.
    #[must_use]
    pub fn angle(&self, channel: Channel) -> Option<u8> {
        match channel {
            Channel::Throttle => self.throttle,
            Channel::Steering => self.steering,
        }
    }
}

impl Actuator for RecordingActuator {
    fn write(&mut self, channel: Channel, angle: u8) {
        match channel {
            Channel::Throttle => self.throttle = Some(angle),
            Channel::Steering => self.steering = Some(angle),
        }
        self.writes += 1;
    }
}
