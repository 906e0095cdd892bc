//! # Axis Conditioners
//!
//! Per-axis conditioning pipelines for each end of the link.
//!
//! Controller side ([`InputConditioner`]):
//!
//! ```text
//! raw ADC -> clamp -> deadzone (raw units) -> centre-preserving remap
//!         -> throttle limit -> optional EMA -> strategy encode
//! ```
//!
//! Vehicle side ([`OutputConditioner`]):
//!
//! ```text
//! packet field -> strategy interpret -> deadzone (packet units)
//!              -> EMA -> remap to actuator angle (optionally reversed)
//! ```
//!
//! The deadzone always runs before smoothing, and a deadzone hit resets the
//! smoothing history so a neutral command lands immediately instead of
//! decaying towards neutral.

use super::channel::ChannelState;
use super::filter::{in_deadzone, LinearMap};
use super::strategy::ConditioningStrategy;
use crate::config::{ActuatorProfile, CalibrationProfile};
use crate::packet::protocol::{AxisField, Magnitude, VALUE_MAX, VALUE_MIN, VALUE_NEUTRAL};

const NEUTRAL: f32 = VALUE_NEUTRAL as f32;

/// Converts raw analog readings into packet fields.
#[derive(Debug, Clone)]
pub struct InputConditioner {
    strategy: ConditioningStrategy,
    dead_zone: f32,
    middle: f32,
    input_min: f32,
    input_max: f32,
    /// `[input_min, middle]` onto `[output_min, neutral]`
    lower: LinearMap,
    /// `[middle, input_max]` onto `[neutral, output_max]`
    upper: LinearMap,
    /// Fraction of deflection allowed (1.0 = full).
    limit: f32,
    smoothing: f32,
}

impl InputConditioner {
    /// Builds a conditioner from a calibration profile.
    ///
    /// # Arguments
    ///
    /// * `profile` - Calibration for this axis
    /// * `strategy` - Packet encoding
    /// * `limit_percent` - Maximum deflection from neutral, in percent
    #[must_use]
    pub fn new(profile: &CalibrationProfile, strategy: ConditioningStrategy, limit_percent: u8) -> Self {
        let input_min = profile.input_min as f32;
        let input_max = profile.input_max as f32;
        let middle = profile.middle as f32;

        Self {
            strategy,
            dead_zone: profile.dead_zone as f32,
            middle,
            input_min,
            input_max,
            lower: LinearMap::new(input_min, middle, profile.output_min as f32, NEUTRAL),
            upper: LinearMap::new(middle, input_max, NEUTRAL, profile.output_max as f32),
            limit: (limit_percent.min(100) as f32) / 100.0,
            smoothing: profile.smoothing,
        }
    }

    /// Packet-domain position for a raw reading, before limiting and smoothing.
    #[must_use]
    pub fn position(&self, raw: u16) -> f32 {
        let raw = (raw as f32).clamp(self.input_min, self.input_max);
        if in_deadzone(raw, self.middle, self.dead_zone) || raw == self.middle {
            NEUTRAL
        } else if raw < self.middle {
            self.lower.apply(raw)
        } else {
            self.upper.apply(raw)
        }
    }

    /// Conditions one raw reading into the field to transmit.
    pub fn condition(&self, raw: u16, state: &mut ChannelState) -> AxisField {
        let mut position = self.position(raw);
        position = NEUTRAL + (position - NEUTRAL) * self.limit;

        if self.smoothing > 0.0 {
            if position == NEUTRAL {
                state.reset_smoothing(position);
            } else {
                position = state.smooth(position, self.smoothing);
            }
        }

        self.strategy.encode(position).to_field()
    }
}

/// Converts received packet fields into actuator angles.
#[derive(Debug, Clone)]
pub struct OutputConditioner {
    strategy: ConditioningStrategy,
    dead_zone: f32,
    smoothing: f32,
    /// Packet domain onto actuator angle.
    map: LinearMap,
}

impl OutputConditioner {
    #[must_use]
    pub fn new(profile: &ActuatorProfile, strategy: ConditioningStrategy) -> Self {
        let map = LinearMap::new(
            VALUE_MIN as f32,
            VALUE_MAX as f32,
            profile.angle_min as f32,
            profile.angle_max as f32,
        );

        Self {
            strategy,
            dead_zone: profile.dead_zone as f32,
            smoothing: profile.smoothing,
            map: if profile.reversed { map.inverted() } else { map },
        }
    }

    /// Angle written for a centred command.
    #[must_use]
    pub fn neutral_angle(&self) -> u8 {
        Magnitude::from_f32(self.map.apply(NEUTRAL)).get()
    }

    /// Angle written for full forward (or full left) deflection.
    #[must_use]
    pub fn max_forward_angle(&self) -> u8 {
        Magnitude::from_f32(self.map.apply(VALUE_MAX as f32)).get()
    }

    /// Conditions one received field into an actuator angle (0-180).
    pub fn condition(&self, field: AxisField, state: &mut ChannelState) -> u8 {
        let command = self.strategy.interpret(field);
        let requested = command.position();
        let middle = command.middle();

        let value = if in_deadzone(requested, middle, self.dead_zone) {
            state.reset_smoothing(middle);
            middle
        } else if self.smoothing > 0.0 {
            state.smooth(requested, self.smoothing)
        } else {
            state.reset_smoothing(requested);
            requested
        };

        Magnitude::from_f32(self.map.apply(value)).get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibration() -> CalibrationProfile {
        CalibrationProfile {
            dead_zone: 10,
            middle: 512,
            input_min: 100,
            input_max: 900,
            output_min: 0,
            output_max: 180,
            smoothing: 0.0,
        }
    }

    fn actuator() -> ActuatorProfile {
        ActuatorProfile {
            dead_zone: 15,
            smoothing: 0.0,
            angle_min: 0,
            angle_max: 180,
            reversed: false,
        }
    }

    fn state(strategy: ConditioningStrategy) -> ChannelState {
        ChannelState::new(strategy.neutral_field())
    }

    // ==================== InputConditioner ====================

    #[test]
    fn test_input_middle_is_neutral() {
        let cond = InputConditioner::new(&calibration(), ConditioningStrategy::Continuous, 100);
        let mut st = state(ConditioningStrategy::Continuous);
        assert_eq!(cond.condition(512, &mut st), AxisField::new(90, 90));
    }

    #[test]
    fn test_input_deadzone_raw_units() {
        let cond = InputConditioner::new(&calibration(), ConditioningStrategy::Continuous, 100);
        assert_eq!(cond.position(503), 90.0);
        assert_eq!(cond.position(521), 90.0);
        assert!(cond.position(530) > 90.0);
    }

    #[test]
    fn test_input_extremes() {
        let cond = InputConditioner::new(&calibration(), ConditioningStrategy::Continuous, 100);
        assert_eq!(cond.position(900), 180.0);
        assert_eq!(cond.position(100), 0.0);
    }

    #[test]
    fn test_input_clamps_outside_calibration() {
        let cond = InputConditioner::new(&calibration(), ConditioningStrategy::Continuous, 100);
        assert_eq!(cond.position(1023), 180.0);
        assert_eq!(cond.position(0), 0.0);
    }

    #[test]
    fn test_input_asymmetric_halves() {
        // Upper half spans 388 raw units, lower half 412
        let cond = InputConditioner::new(&calibration(), ConditioningStrategy::Continuous, 100);
        assert!((cond.position(706) - 135.0).abs() < 0.001);
        assert!((cond.position(306) - 45.0).abs() < 0.001);
    }

    #[test]
    fn test_input_limit_percent() {
        let cond = InputConditioner::new(&calibration(), ConditioningStrategy::Continuous, 50);
        let mut st = state(ConditioningStrategy::Continuous);
        assert_eq!(cond.condition(900, &mut st).magnitude, 135);
        assert_eq!(cond.condition(100, &mut st).magnitude, 45);
    }

    #[test]
    fn test_input_discrete_full_forward() {
        let cond = InputConditioner::new(&calibration(), ConditioningStrategy::Discrete, 100);
        let mut st = state(ConditioningStrategy::Discrete);
        assert_eq!(cond.condition(900, &mut st), AxisField::new(180, b'F'));
        assert_eq!(cond.condition(512, &mut st), AxisField::new(0, b'S'));
        assert_eq!(cond.condition(100, &mut st), AxisField::new(180, b'R'));
    }

    #[test]
    fn test_input_smoothing_rises_gradually() {
        let mut profile = calibration();
        profile.smoothing = 0.5;
        let cond = InputConditioner::new(&profile, ConditioningStrategy::Continuous, 100);
        let mut st = state(ConditioningStrategy::Continuous);

        assert_eq!(cond.condition(900, &mut st).magnitude, 135);
        assert_eq!(cond.condition(900, &mut st).magnitude, 158);
        // Back to centre snaps immediately
        assert_eq!(cond.condition(512, &mut st).magnitude, 90);
    }

    #[test]
    fn test_input_inverted_output() {
        let mut profile = calibration();
        profile.output_min = 180;
        profile.output_max = 0;
        let cond = InputConditioner::new(&profile, ConditioningStrategy::Continuous, 100);
        assert_eq!(cond.position(900), 0.0);
        assert_eq!(cond.position(100), 180.0);
        assert_eq!(cond.position(512), 90.0);
    }

    // ==================== OutputConditioner ====================

    #[test]
    fn test_output_neutral_angle() {
        let cond = OutputConditioner::new(&actuator(), ConditioningStrategy::Continuous);
        let mut st = state(ConditioningStrategy::Continuous);
        assert_eq!(cond.condition(AxisField::new(90, 90), &mut st), 90);
        assert_eq!(cond.neutral_angle(), 90);
    }

    #[test]
    fn test_output_deadzone_ignores_smoothing_state() {
        let mut profile = actuator();
        profile.smoothing = 0.95;
        let cond = OutputConditioner::new(&profile, ConditioningStrategy::Continuous);
        let mut st = state(ConditioningStrategy::Continuous);

        for _ in 0..50 {
            cond.condition(AxisField::new(180, 90), &mut st);
        }
        for requested in 76..=104 {
            assert_eq!(cond.condition(AxisField::new(requested, 90), &mut st), 90);
        }
    }

    #[test]
    fn test_output_deadzone_relative_to_middle_reference() {
        let cond = OutputConditioner::new(&actuator(), ConditioningStrategy::Continuous);
        let mut st = state(ConditioningStrategy::Continuous);
        // Middle reference 108: 120 is inside the deadzone and snaps to 108
        assert_eq!(cond.condition(AxisField::new(120, 108), &mut st), 108);
    }

    #[test]
    fn test_output_reversed() {
        let mut profile = actuator();
        profile.reversed = true;
        let cond = OutputConditioner::new(&profile, ConditioningStrategy::Continuous);
        let mut st = state(ConditioningStrategy::Continuous);
        assert_eq!(cond.condition(AxisField::new(180, 90), &mut st), 0);
        assert_eq!(cond.condition(AxisField::new(0, 90), &mut st), 180);
        assert_eq!(cond.max_forward_angle(), 0);
    }

    #[test]
    fn test_output_angle_limits() {
        let mut profile = actuator();
        profile.angle_min = 30;
        profile.angle_max = 150;
        let cond = OutputConditioner::new(&profile, ConditioningStrategy::Continuous);
        let mut st = state(ConditioningStrategy::Continuous);
        assert_eq!(cond.condition(AxisField::new(255, 90), &mut st), 150);
        assert_eq!(cond.condition(AxisField::new(0, 90), &mut st), 30);
        assert_eq!(cond.max_forward_angle(), 150);
    }

    #[test]
    fn test_output_smoothing_converges() {
        let mut profile = actuator();
        profile.smoothing = 0.85;
        let cond = OutputConditioner::new(&profile, ConditioningStrategy::Continuous);
        let mut st = state(ConditioningStrategy::Continuous);

        let first = cond.condition(AxisField::new(180, 90), &mut st);
        assert!(first < 180);
        let mut angle = first;
        for _ in 0..30 {
            let next = cond.condition(AxisField::new(180, 90), &mut st);
            assert!(next >= angle);
            angle = next;
        }
        assert!(180 - angle <= 1);
    }

    #[test]
    fn test_output_discrete() {
        let cond = OutputConditioner::new(&actuator(), ConditioningStrategy::Discrete);
        let mut st = state(ConditioningStrategy::Discrete);
        assert_eq!(cond.condition(AxisField::new(180, b'F'), &mut st), 180);
        assert_eq!(cond.condition(AxisField::new(180, b'R'), &mut st), 0);
        assert_eq!(cond.condition(AxisField::new(0, b'S'), &mut st), 90);
        // Small deflection falls in the deadzone
        assert_eq!(cond.condition(AxisField::new(20, b'F'), &mut st), 90);
    }
}
