//! Trait abstraction for analog input acquisition to enable testing

use crate::conditioning::channel::Channel;

/// Source of raw analog readings (0-1023 for a 10-bit ADC)
#[cfg_attr(test, mockall::automock)]
pub trait InputSource {
    /// Read the current raw value for `channel`.
    fn read(&mut self, channel: Channel) -> u16;
}

/// Fixed readings, useful for bench testing a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedInput {
    pub throttle: u16,
    pub steering: u16,
}

impl InputSource for FixedInput {
    fn read(&mut self, channel: Channel) -> u16 {
        match channel {
            Channel::Throttle => self.throttle,
            Channel::Steering => self.steering,
        }
    }
}
