//! # Vehicle Role
//!
//! Receiver logic run once per cycle, in this order:
//!
//! 1. Watchdog check (report loss, apply the failsafe policy)
//! 2. Non-blocking receive; decode and refresh the watchdog on success
//! 3. On the actuator timer, condition the latest packet and write actuators
//!
//! Actuators are refreshed on their own timer from the most recent packet,
//! so irregular packet arrival does not show up as jitter at the servos.

use std::time::{Duration, Instant};
use tracing::info;

use super::actuator::Actuator;
use crate::conditioning::axis::OutputConditioner;
use crate::conditioning::channel::{Channel, ChannelState};
use crate::conditioning::strategy::ConditioningStrategy;
use crate::config::{Config, FailsafePolicy};
use crate::link::transport::Transport;
use crate::link::watchdog::ConnectionWatchdog;
use crate::packet::decoder::{decode_fields, decode_frame};
use crate::packet::protocol::ControlPacket;
use crate::telemetry::types::LinkEvent;
use crate::telemetry::Telemetry;

/// Receive counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiveStats {
    pub received: u64,
    pub rejected: u64,
    pub out_of_range_fields: u64,
    pub link_lost: u64,
    pub actuator_updates: u64,
}

/// Vehicle receiver
pub struct VehicleRole<T, A> {
    transport: T,
    actuator: A,
    strategy: ConditioningStrategy,
    throttle_conditioner: OutputConditioner,
    steering_conditioner: OutputConditioner,
    throttle: ChannelState,
    steering: ChannelState,
    watchdog: ConnectionWatchdog,
    failsafe: FailsafePolicy,
    latest: ControlPacket,
    actuator_interval: Duration,
    last_actuator_update: Option<Instant>,
    stats: ReceiveStats,
    telemetry: Telemetry,
}

impl<T: Transport, A: Actuator> VehicleRole<T, A> {
    /// Build the vehicle from configuration, starting its watchdog at `now`
    pub fn new(config: &Config, transport: T, actuator: A, telemetry: Telemetry, now: Instant) -> Self {
        let strategy = config.conditioning.strategy;

        if config.link.failsafe == FailsafePolicy::Neutral {
            info!("Failsafe: actuators return to neutral on link loss");
        }

        Self {
            transport,
            actuator,
            strategy,
            throttle_conditioner: OutputConditioner::new(&config.vehicle.throttle, strategy),
            steering_conditioner: OutputConditioner::new(&config.vehicle.steering, strategy),
            throttle: ChannelState::new(strategy.neutral_field()),
            steering: ChannelState::new(strategy.neutral_field()),
            watchdog: ConnectionWatchdog::new(config.link.receive_timeout(), now),
            failsafe: config.link.failsafe,
            latest: strategy.neutral_packet(),
            actuator_interval: config.link.actuator_update_interval(),
            last_actuator_update: None,
            stats: ReceiveStats::default(),
            telemetry,
        }
    }

    /// Run one receive cycle at `now`
    pub fn tick(&mut self, now: Instant) {
        if let Some(silence) = self.watchdog.check(now) {
            self.stats.link_lost += 1;
            self.telemetry.record(LinkEvent::link_lost(silence));
            if self.failsafe == FailsafePolicy::Neutral {
                self.latest = self.strategy.neutral_packet();
            }
        }

        if let Some(payload) = self.transport.try_receive() {
            match decode_frame(&payload) {
                Ok(packet) => {
                    if let Some(outage) = self.watchdog.feed(now) {
                        self.telemetry.record(LinkEvent::link_restored(outage));
                    }
                    self.latest = packet;
                    self.stats.received += 1;
                    self.telemetry.record(LinkEvent::PacketReceived {
                        packet: packet.to_bytes(),
                    });
                    self.report_out_of_range(&packet);
                }
                Err(_) => {
                    self.stats.rejected += 1;
                    self.telemetry.record(LinkEvent::PacketRejected {
                        length: payload.len(),
                    });
                }
            }
        }

        let due = match self.last_actuator_update {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.actuator_interval,
        };
        if due {
            self.last_actuator_update = Some(now);
            self.update_actuators();
        }
    }

    /// Flag fields the strategy cannot read exactly. The packet is still used.
    fn report_out_of_range(&mut self, packet: &ControlPacket) {
        let (throttle, steering) = decode_fields(packet);
        for (channel, field) in [(Channel::Throttle, throttle), (Channel::Steering, steering)] {
            if !self.strategy.is_valid(field) {
                self.stats.out_of_range_fields += 1;
                self.telemetry.record(LinkEvent::FieldOutOfRange {
                    channel,
                    magnitude: field.magnitude,
                    direction: field.direction,
                });
            }
        }
    }

    fn update_actuators(&mut self) {
        let (throttle_field, steering_field) = decode_fields(&self.latest);

        let throttle_angle = self.throttle_conditioner.condition(throttle_field, &mut self.throttle);
        let steering_angle = self.steering_conditioner.condition(steering_field, &mut self.steering);

        self.actuator.write(Channel::Throttle, throttle_angle);
        self.actuator.write(Channel::Steering, steering_angle);
        self.stats.actuator_updates += 1;
    }

    /// Most recently accepted packet (or the failsafe packet)
    #[must_use]
    pub fn latest_packet(&self) -> ControlPacket {
        self.latest
    }

    #[must_use]
    pub fn is_link_lost(&self) -> bool {
        self.watchdog.is_lost()
    }

    #[must_use]
    pub fn stats(&self) -> ReceiveStats {
        self.stats
    }

    #[must_use]
    pub fn channel(&self, channel: Channel) -> &ChannelState {
        match channel {
            Channel::Throttle => &self.throttle,
            Channel::Steering => &self.steering,
        }
    }

    #[must_use]
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    #[must_use]
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn telemetry_mut(&mut self) -> &mut Telemetry {
        &mut self.telemetry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::transport::MockTransport;
    use crate::telemetry::types::Role;
    use crate::vehicle::actuator::{MockActuator, RecordingActuator};
    use mockall::predicate::eq;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn unsmoothed_config() -> Config {
        let mut config = Config::default();
        config.vehicle.throttle.smoothing = 0.0;
        config.vehicle.steering.smoothing = 0.0;
        config
    }

    /// Transport that yields the given payloads then nothing.
    fn scripted(payloads: Vec<Option<Vec<u8>>>) -> MockTransport {
        let mut transport = MockTransport::new();
        let mut queue = payloads.into_iter();
        transport
            .expect_try_receive()
            .returning(move || queue.next().flatten());
        transport
    }

    #[test]
    fn test_writes_neutral_at_startup() {
        let mut actuator = MockActuator::new();
        actuator
            .expect_write()
            .with(eq(Channel::Throttle), eq(90))
            .times(1)
            .return_const(());
        actuator
            .expect_write()
            .with(eq(Channel::Steering), eq(90))
            .times(1)
            .return_const(());

        let t0 = Instant::now();
        let mut role = VehicleRole::new(
            &Config::default(),
            scripted(vec![]),
            actuator,
            Telemetry::new(Role::Vehicle),
            t0,
        );
        role.tick(t0);
    }

    #[test]
    fn test_received_packet_drives_actuators() {
        let t0 = Instant::now();
        let mut role = VehicleRole::new(
            &unsmoothed_config(),
            scripted(vec![Some(vec![180, 20, 90, 90])]),
            RecordingActuator::new(),
            Telemetry::new(Role::Vehicle),
            t0,
        );

        role.tick(t0);
        assert_eq!(role.actuator().angle(Channel::Throttle), Some(180));
        assert_eq!(role.actuator().angle(Channel::Steering), Some(20));
        assert_eq!(role.stats().received, 1);
    }

    #[test]
    fn test_out_of_range_field_reported_but_used() {
        let t0 = Instant::now();
        let mut role = VehicleRole::new(
            &unsmoothed_config(),
            scripted(vec![Some(vec![250, 60, 90, 90])]),
            RecordingActuator::new(),
            Telemetry::new(Role::Vehicle),
            t0,
        );

        role.tick(t0);
        assert_eq!(role.stats().received, 1);
        assert_eq!(role.stats().out_of_range_fields, 1);
        // packet received, field out of range
        assert_eq!(role.telemetry().recorded(), 2);
        assert_eq!(role.actuator().angle(Channel::Throttle), Some(180));
        assert_eq!(role.actuator().angle(Channel::Steering), Some(60));
    }

    #[test]
    fn test_unknown_direction_code_reads_as_stop() {
        let mut config = unsmoothed_config();
        config.conditioning.strategy = ConditioningStrategy::Discrete;

        let t0 = Instant::now();
        let mut role = VehicleRole::new(
            &config,
            scripted(vec![Some(vec![180, 180, b'F', b'?'])]),
            RecordingActuator::new(),
            Telemetry::new(Role::Vehicle),
            t0,
        );

        role.tick(t0);
        assert_eq!(role.stats().out_of_range_fields, 1);
        assert_eq!(role.actuator().angle(Channel::Throttle), Some(180));
        assert_eq!(role.actuator().angle(Channel::Steering), Some(90));
    }

    #[test]
    fn test_valid_packet_reports_nothing_extra() {
        let t0 = Instant::now();
        let mut role = VehicleRole::new(
            &unsmoothed_config(),
            scripted(vec![Some(vec![180, 0, 90, 90])]),
            RecordingActuator::new(),
            Telemetry::new(Role::Vehicle),
            t0,
        );

        role.tick(t0);
        assert_eq!(role.stats().out_of_range_fields, 0);
        assert_eq!(role.telemetry().recorded(), 1);
    }

    #[test]
    fn test_actuator_timer_is_independent_of_packets() {
        let t0 = Instant::now();
        let mut role = VehicleRole::new(
            &unsmoothed_config(),
            scripted(vec![]),
            RecordingActuator::new(),
            Telemetry::new(Role::Vehicle),
            t0,
        );

        for tick in 0..20 {
            role.tick(t0 + ms(tick));
        }
        // Updates at 0, 5, 10, 15 ms
        assert_eq!(role.stats().actuator_updates, 4);
        assert_eq!(role.actuator().writes, 8);
    }

    #[test]
    fn test_malformed_payload_ignored() {
        let t0 = Instant::now();
        let mut role = VehicleRole::new(
            &unsmoothed_config(),
            scripted(vec![Some(vec![180, 180, 90]), Some(vec![180, 180, 90, 90, 0])]),
            RecordingActuator::new(),
            Telemetry::new(Role::Vehicle),
            t0,
        );

        role.tick(t0);
        role.tick(t0 + ms(1));
        assert_eq!(role.stats().rejected, 2);
        assert_eq!(role.stats().received, 0);
        assert_eq!(role.latest_packet(), ConditioningStrategy::Continuous.neutral_packet());
        assert_eq!(role.actuator().angle(Channel::Throttle), Some(90));
    }

    #[test]
    fn test_malformed_payload_does_not_feed_watchdog() {
        let t0 = Instant::now();
        let mut payloads = vec![None; 999];
        payloads.push(Some(vec![1, 2]));
        let mut role = VehicleRole::new(
            &unsmoothed_config(),
            scripted(payloads),
            RecordingActuator::new(),
            Telemetry::new(Role::Vehicle),
            t0,
        );

        for tick in 0..=1000 {
            role.tick(t0 + ms(tick));
        }
        assert!(role.is_link_lost());
    }

    #[test]
    fn test_timeout_holds_last_command() {
        let t0 = Instant::now();
        let mut role = VehicleRole::new(
            &unsmoothed_config(),
            scripted(vec![Some(vec![150, 30, 90, 90])]),
            RecordingActuator::new(),
            Telemetry::new(Role::Vehicle),
            t0,
        );

        for tick in 0..=2500 {
            role.tick(t0 + ms(tick));
        }

        assert!(role.is_link_lost());
        assert_eq!(role.stats().link_lost, 2);
        assert_eq!(role.actuator().angle(Channel::Throttle), Some(150));
        assert_eq!(role.actuator().angle(Channel::Steering), Some(30));
    }

    #[test]
    fn test_timeout_neutral_failsafe() {
        let mut config = unsmoothed_config();
        config.link.failsafe = FailsafePolicy::Neutral;

        let t0 = Instant::now();
        let mut role = VehicleRole::new(
            &config,
            scripted(vec![Some(vec![150, 30, 90, 90])]),
            RecordingActuator::new(),
            Telemetry::new(Role::Vehicle),
            t0,
        );

        role.tick(t0);
        assert_eq!(role.actuator().angle(Channel::Throttle), Some(150));

        for tick in 1..=1010 {
            role.tick(t0 + ms(tick));
        }
        assert_eq!(role.actuator().angle(Channel::Throttle), Some(90));
        assert_eq!(role.actuator().angle(Channel::Steering), Some(90));
    }

    #[test]
    fn test_packet_after_loss_restores_link() {
        let t0 = Instant::now();
        let mut payloads = vec![None; 1200];
        payloads.push(Some(vec![90, 90, 90, 90]));
        let mut role = VehicleRole::new(
            &unsmoothed_config(),
            scripted(payloads),
            RecordingActuator::new(),
            Telemetry::new(Role::Vehicle),
            t0,
        );

        for tick in 0..1200 {
            role.tick(t0 + ms(tick));
        }
        assert!(role.is_link_lost());

        role.tick(t0 + ms(1200));
        assert!(!role.is_link_lost());
        // link lost, link restored, packet received
        assert_eq!(role.telemetry().recorded(), 3);
    }
}
