//! # Control Packet Constants and Types
//!
//! Wire layout shared by both endpoints:
//!
//! | Byte | Field |
//! |------|-------|
//! | 0 | Throttle magnitude |
//! | 1 | Steering magnitude |
//! | 2 | Throttle direction |
//! | 3 | Steering direction |
//!
//! Magnitudes live in the packet domain (0-180, 90 = neutral). What the
//! direction bytes carry depends on the conditioning strategy: the neutral
//! reference (continuous) or a [`Direction`] code (discrete).

/// Control packet size in bytes. Both endpoints agree on this out-of-band.
pub const PACKET_SIZE: usize = 4;

/// Packet domain range (servo-style degrees)
pub const VALUE_MIN: u8 = 0;
pub const VALUE_MAX: u8 = 180;
pub const VALUE_NEUTRAL: u8 = 90;

/// Byte offsets within the packet.
pub mod fields {
    pub const THROTTLE_MAGNITUDE: usize = 0;
    pub const STEERING_MAGNITUDE: usize = 1;
    pub const THROTTLE_DIRECTION: usize = 2;
    pub const STEERING_DIRECTION: usize = 3;
}

/// Discrete direction code carried in a direction byte.
///
/// Steering reuses the same codes: `Forward` means left, `Reverse` means right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Stop,
    Forward,
    Reverse,
}

impl Direction {
    /// Steering alias for [`Direction::Forward`].
    pub const LEFT: Direction = Direction::Forward;
    /// Steering alias for [`Direction::Reverse`].
    pub const RIGHT: Direction = Direction::Reverse;

    /// Wire code for this direction.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Direction::Stop => b'S',
            Direction::Forward => b'F',
            Direction::Reverse => b'R',
        }
    }

    /// Parses a wire code. Unknown codes return `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rc_link::packet::protocol::Direction;
    ///
    /// assert_eq!(Direction::from_code(b'F'), Some(Direction::Forward));
    /// assert_eq!(Direction::from_code(0x00), None);
    /// ```
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            b'S' => Some(Direction::Stop),
            b'F' => Some(Direction::Forward),
            b'R' => Some(Direction::Reverse),
            _ => None,
        }
    }
}

/// A value in the packet domain, guaranteed to be within 0-180.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Magnitude(u8);

impl Magnitude {
    pub const ZERO: Magnitude = Magnitude(VALUE_MIN);
    pub const NEUTRAL: Magnitude = Magnitude(VALUE_NEUTRAL);
    pub const MAX: Magnitude = Magnitude(VALUE_MAX);

    /// Returns `None` if `value` exceeds [`VALUE_MAX`].
    #[must_use]
    pub fn new(value: u8) -> Option<Self> {
        (value <= VALUE_MAX).then_some(Magnitude(value))
    }

    /// Clamps a raw byte into range.
    #[must_use]
    pub fn saturating(value: u8) -> Self {
        Magnitude(value.min(VALUE_MAX))
    }

    /// Rounds and clamps a floating-point position into range.
    ///
    /// # Examples
    ///
    /// ```
    /// use rc_link::packet::protocol::Magnitude;
    ///
    /// assert_eq!(Magnitude::from_f32(89.6).get(), 90);
    /// assert_eq!(Magnitude::from_f32(-4.0).get(), 0);
    /// assert_eq!(Magnitude::from_f32(250.0).get(), 180);
    /// ```
    #[must_use]
    pub fn from_f32(value: f32) -> Self {
        if value.is_nan() {
            return Magnitude::NEUTRAL;
        }
        Magnitude(value.round().clamp(VALUE_MIN as f32, VALUE_MAX as f32) as u8)
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

/// The two raw bytes describing one axis on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisField {
    pub magnitude: u8,
    pub direction: u8,
}

impl AxisField {
    #[must_use]
    pub fn new(magnitude: u8, direction: u8) -> Self {
        Self { magnitude, direction }
    }
}

/// Fixed-size control packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlPacket {
    pub throttle_magnitude: u8,
    pub steering_magnitude: u8,
    pub throttle_direction: u8,
    pub steering_direction: u8,
}

impl ControlPacket {
    /// Builds a packet from per-axis fields.
    #[must_use]
    pub fn from_fields(throttle: AxisField, steering: AxisField) -> Self {
        Self {
            throttle_magnitude: throttle.magnitude,
            steering_magnitude: steering.magnitude,
            throttle_direction: throttle.direction,
            steering_direction: steering.direction,
        }
    }

    #[must_use]
    pub fn throttle(&self) -> AxisField {
        AxisField::new(self.throttle_magnitude, self.throttle_direction)
    }

    #[must_use]
    pub fn steering(&self) -> AxisField {
        AxisField::new(self.steering_magnitude, self.steering_direction)
    }

    /// Wire representation in the fixed field order.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; PACKET_SIZE] {
        let mut bytes = [0u8; PACKET_SIZE];
        bytes[fields::THROTTLE_MAGNITUDE] = self.throttle_magnitude;
        bytes[fields::STEERING_MAGNITUDE] = self.steering_magnitude;
        bytes[fields::THROTTLE_DIRECTION] = self.throttle_direction;
        bytes[fields::STEERING_DIRECTION] = self.steering_direction;
        bytes
    }

    /// Any 4 bytes form a syntactically valid packet.
    #[must_use]
    pub fn from_bytes(bytes: [u8; PACKET_SIZE]) -> Self {
        Self {
            throttle_magnitude: bytes[fields::THROTTLE_MAGNITUDE],
            steering_magnitude: bytes[fields::STEERING_MAGNITUDE],
            throttle_direction: bytes[fields::THROTTLE_DIRECTION],
            steering_direction: bytes[fields::STEERING_DIRECTION],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_size() {
        assert_eq!(PACKET_SIZE, 4);
        assert_eq!(std::mem::size_of::<ControlPacket>(), PACKET_SIZE);
    }

    #[test]
    fn test_field_order() {
        let packet = ControlPacket {
            throttle_magnitude: 1,
            steering_magnitude: 2,
            throttle_direction: 3,
            steering_direction: 4,
        };
        assert_eq!(packet.to_bytes(), [1, 2, 3, 4]);
    }

    #[test]
    fn test_from_fields_places_axes() {
        let packet = ControlPacket::from_fields(AxisField::new(180, b'F'), AxisField::new(10, b'R'));
        assert_eq!(packet.to_bytes(), [180, 10, b'F', b'R']);
        assert_eq!(packet.throttle(), AxisField::new(180, b'F'));
        assert_eq!(packet.steering(), AxisField::new(10, b'R'));
    }

    #[test]
    fn test_direction_codes() {
        for direction in [Direction::Stop, Direction::Forward, Direction::Reverse] {
            assert_eq!(Direction::from_code(direction.code()), Some(direction));
        }
        assert_eq!(Direction::LEFT, Direction::Forward);
        assert_eq!(Direction::RIGHT, Direction::Reverse);
    }

    #[test]
    fn test_direction_unknown_code() {
        assert_eq!(Direction::from_code(VALUE_NEUTRAL), None);
        assert_eq!(Direction::from_code(0xFF), None);
    }

    #[test]
    fn test_magnitude_bounds() {
        assert_eq!(Magnitude::new(180), Some(Magnitude::MAX));
        assert_eq!(Magnitude::new(181), None);
        assert_eq!(Magnitude::saturating(255), Magnitude::MAX);
        assert_eq!(Magnitude::saturating(42).get(), 42);
    }

    #[test]
    fn test_magnitude_from_nan_is_neutral() {
        assert_eq!(Magnitude::from_f32(f32::NAN), Magnitude::NEUTRAL);
    }
}
