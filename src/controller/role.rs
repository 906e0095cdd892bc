//! # Controller Role
//!
//! Transmitter logic run once per cycle:
//!
//! 1. Read raw throttle and steering inputs
//! 2. Clamp, remap and encode them into packet fields
//! 3. Flag channels whose field differs from the last delivered packet
//! 4. Let the [`LinkScheduler`] decide whether to transmit

use std::time::Instant;
use tracing::info;

use super::input::InputSource;
use crate::conditioning::axis::InputConditioner;
use crate::conditioning::channel::{Channel, ChannelState};
use crate::config::Config;
use crate::link::scheduler::{LinkScheduler, LinkStats, SendOutcome};
use crate::link::transport::Transport;
use crate::telemetry::Telemetry;

/// Hand-held controller
pub struct ControllerRole<I, T> {
    input: I,
    transport: T,
    throttle_conditioner: InputConditioner,
    steering_conditioner: InputConditioner,
    throttle: ChannelState,
    steering: ChannelState,
    scheduler: LinkScheduler,
    telemetry: Telemetry,
}

impl<I: InputSource, T: Transport> ControllerRole<I, T> {
    /// Build the controller from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `input` - Analog input source
    /// * `transport` - Radio transport
    /// * `telemetry` - Event sink
    pub fn new(config: &Config, input: I, transport: T, telemetry: Telemetry) -> Self {
        let strategy = config.conditioning.strategy;
        let throttle_limit = config.controller.effective_throttle_limit_percent();

        if config.controller.training_mode {
            info!("Training mode enabled, throttle limited to {}%", throttle_limit);
        }

        Self {
            input,
            transport,
            throttle_conditioner: InputConditioner::new(
                &config.controller.throttle,
                strategy,
                throttle_limit,
            ),
            steering_conditioner: InputConditioner::new(&config.controller.steering, strategy, 100),
            throttle: ChannelState::new(strategy.neutral_field()),
            steering: ChannelState::new(strategy.neutral_field()),
            scheduler: LinkScheduler::new(config.link.send_interval()),
            telemetry,
        }
    }

    /// Run one control cycle at `now`
    ///
    /// Returns the transmission outcome if a packet was attempted.
    pub fn tick(&mut self, now: Instant) -> Option<SendOutcome> {
        let throttle_raw = self.input.read(Channel::Throttle);
        let steering_raw = self.input.read(Channel::Steering);

        let throttle_field = self.throttle_conditioner.condition(throttle_raw, &mut self.throttle);
        let steering_field = self.steering_conditioner.condition(steering_raw, &mut self.steering);

        self.throttle.observe(throttle_field);
        self.steering.observe(steering_field);

        let outcome = self.scheduler.poll(
            now,
            &mut self.throttle,
            &mut self.steering,
            &mut self.transport,
        )?;

        self.telemetry.record(outcome.into());
        Some(outcome)
    }

    #[must_use]
    pub fn channel(&self, channel: Channel) -> &ChannelState {
        match channel {
            Channel::Throttle => &self.throttle,
            Channel::Steering => &self.steering,
        }
    }

    #[must_use]
    pub fn stats(&self) -> LinkStats {
        self.scheduler.stats()
    }

    #[must_use]
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn telemetry_mut(&mut self) -> &mut Telemetry {
        &mut self.telemetry
    }
}
