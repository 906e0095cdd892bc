//! # Conditioning Strategy
//!
//! Selects how an axis position is carried in its two packet bytes.
//!
//! | Strategy | Magnitude byte | Direction byte |
//! |----------|----------------|----------------|
//! | Continuous | Position (0-180) | Neutral reference (90) |
//! | Discrete | Deflection from neutral (0-180) | `S` / `F` / `R` code |
//!
//! In the discrete model a full deflection in either direction is magnitude
//! 180, so the resolution is half a packet unit per step.

use serde::{Deserialize, Serialize};

use crate::packet::protocol::{AxisField, ControlPacket, Direction, Magnitude, VALUE_NEUTRAL};

/// Packet-domain units of position per discrete magnitude unit.
const DISCRETE_SCALE: f32 = 2.0;

/// How axis positions are encoded, selected once at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditioningStrategy {
    /// Magnitude carries the absolute position, direction the neutral reference.
    #[default]
    Continuous,
    /// Magnitude carries the deflection, direction a [`Direction`] code.
    Discrete,
}

/// Decoded meaning of one axis's packet bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisCommand {
    Continuous { value: Magnitude, middle: Magnitude },
    Discrete { direction: Direction, magnitude: Magnitude },
}

impl AxisCommand {
    /// Requested position in the packet domain.
    #[must_use]
    pub fn position(&self) -> f32 {
        match *self {
            AxisCommand::Continuous { value, .. } => value.get() as f32,
            AxisCommand::Discrete { direction, magnitude } => {
                let deflection = magnitude.get() as f32 / DISCRETE_SCALE;
                match direction {
                    Direction::Stop => VALUE_NEUTRAL as f32,
                    Direction::Forward => VALUE_NEUTRAL as f32 + deflection,
                    Direction::Reverse => VALUE_NEUTRAL as f32 - deflection,
                }
            }
        }
    }

    /// Neutral reference the position is judged against.
    #[must_use]
    pub fn middle(&self) -> f32 {
        match *self {
            AxisCommand::Continuous { middle, .. } => middle.get() as f32,
            AxisCommand::Discrete { .. } => VALUE_NEUTRAL as f32,
        }
    }

    /// Wire bytes for this command.
    #[must_use]
    pub fn to_field(&self) -> AxisField {
        match *self {
            AxisCommand::Continuous { value, middle } => AxisField::new(value.get(), middle.get()),
            AxisCommand::Discrete { direction, magnitude } => {
                AxisField::new(magnitude.get(), direction.code())
            }
        }
    }
}

impl ConditioningStrategy {
    /// Field for an axis at rest.
    #[must_use]
    pub fn neutral_field(self) -> AxisField {
        self.encode(VALUE_NEUTRAL as f32).to_field()
    }

    /// Packet with both axes at rest.
    #[must_use]
    pub fn neutral_packet(self) -> ControlPacket {
        ControlPacket::from_fields(self.neutral_field(), self.neutral_field())
    }

    /// Encodes a packet-domain position.
    ///
    /// # Examples
    ///
    /// ```
    /// use rc_link::conditioning::strategy::ConditioningStrategy;
    /// use rc_link::packet::protocol::AxisField;
    ///
    /// let field = ConditioningStrategy::Discrete.encode(180.0).to_field();
    /// assert_eq!(field, AxisField::new(180, b'F'));
    ///
    /// let field = ConditioningStrategy::Continuous.encode(180.0).to_field();
    /// assert_eq!(field, AxisField::new(180, 90));
    /// ```
    #[must_use]
    pub fn encode(self, position: f32) -> AxisCommand {
        match self {
            ConditioningStrategy::Continuous => AxisCommand::Continuous {
                value: Magnitude::from_f32(position),
                middle: Magnitude::NEUTRAL,
            },
            ConditioningStrategy::Discrete => {
                let deflection = position - VALUE_NEUTRAL as f32;
                let magnitude = Magnitude::from_f32(deflection.abs() * DISCRETE_SCALE);
                let direction = if magnitude == Magnitude::ZERO {
                    Direction::Stop
                } else if deflection > 0.0 {
                    Direction::Forward
                } else {
                    Direction::Reverse
                };
                let magnitude = if direction == Direction::Stop {
                    Magnitude::ZERO
                } else {
                    magnitude
                };
                AxisCommand::Discrete { direction, magnitude }
            }
        }
    }

    /// Interprets received bytes. Out-of-range magnitudes saturate and
    /// unknown direction codes are read as `Stop`.
    #[must_use]
    pub fn interpret(self, field: AxisField) -> AxisCommand {
        match self {
            ConditioningStrategy::Continuous => AxisCommand::Continuous {
                value: Magnitude::saturating(field.magnitude),
                middle: Magnitude::saturating(field.direction),
            },
            ConditioningStrategy::Discrete => {
                let direction = Direction::from_code(field.direction).unwrap_or(Direction::Stop);
                let magnitude = match direction {
                    Direction::Stop => Magnitude::ZERO,
                    _ => Magnitude::saturating(field.magnitude),
                };
                AxisCommand::Discrete { direction, magnitude }
            }
        }
    }

    /// Whether `field` is a well-formed encoding under this strategy.
    #[must_use]
    pub fn is_valid(self, field: AxisField) -> bool {
        let magnitude_ok = Magnitude::new(field.magnitude).is_some();
        match self {
            ConditioningStrategy::Continuous => {
                magnitude_ok && Magnitude::new(field.direction).is_some()
            }
            ConditioningStrategy::Discrete => {
                magnitude_ok && Direction::from_code(field.direction).is_some()
            }
        }
    }
}
