//! # Bench Simulation
//!
//! Stand-ins for the hardware ends of the link so both roles can run in one
//! process over a loopback transport.

use std::time::{Duration, Instant};
use tracing::debug;

use crate::conditioning::channel::Channel;
use crate::config::ADC_MAX;
use crate::controller::input::InputSource;
use crate::vehicle::actuator::{Actuator, RecordingActuator};

/// Input that sweeps both sticks through their full travel
///
/// Each channel follows a triangle wave over `0..=ADC_MAX`. Steering runs a
/// quarter period ahead of throttle.
#[derive(Debug, Clone)]
pub struct SweepInput {
    start: Instant,
    period: Duration,
}

impl SweepInput {
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            start: Instant::now(),
            period,
        }
    }

    /// Reading for `channel` at `elapsed` since the sweep started.
    #[must_use]
    pub fn reading_at(&self, channel: Channel, elapsed: Duration) -> u16 {
        let period = self.period.as_millis().max(1);
        let offset = match channel {
            Channel::Throttle => 0,
            Channel::Steering => period / 4,
        };
        let phase = (elapsed.as_millis() + offset) % period;
        let half = period / 2;

        let rising = if phase < half { phase } else { period - phase };
        let value = rising * u128::from(ADC_MAX) / half.max(1);
        value.min(u128::from(ADC_MAX)) as u16
    }
}

impl InputSource for SweepInput {
    fn read(&mut self, channel: Channel) -> u16 {
        self.reading_at(channel, self.start.elapsed())
    }
}

/// Actuator that logs angle changes instead of driving hardware
#[derive(Debug, Clone, Default)]
pub struct LoggingActuator {
    inner: RecordingActuator,
}

impl LoggingActuator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn angle(&self, channel: Channel) -> Option<u8> {
        self.inner.angle(channel)
    }
}

impl Actuator for LoggingActuator {
    fn write(&mut self, channel: Channel, angle: u8) {
        if self.inner.angle(channel) != Some(angle) {
            debug!("{} servo -> {}", channel, angle);
        }
        self.inner.write(channel, angle);
    }
}
