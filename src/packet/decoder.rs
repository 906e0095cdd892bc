//! # Control Packet Decoder
//!
//! Decodes received payloads into control packets.

use super::protocol::*;
use crate::error::{RcLinkError, Result};

/// Decode a received payload
///
/// # Arguments
///
/// * `payload` - Raw bytes handed over by the transport
///
/// # Returns
///
/// * `Result<ControlPacket>` - Decoded packet, or error if the size is wrong
///
/// # Errors
///
/// Returns `MalformedPacket` if the payload is not exactly [`PACKET_SIZE`]
/// bytes. No partial decoding is attempted.
pub fn decode_frame(payload: &[u8]) -> Result<ControlPacket> {
    let bytes: [u8; PACKET_SIZE] = payload.try_into().map_err(|_| RcLinkError::MalformedPacket {
        expected: PACKET_SIZE,
        actual: payload.len(),
    })?;

    Ok(ControlPacket::from_bytes(bytes))
}

/// Split a packet into its (throttle, steering) raw fields
pub fn decode_fields(packet: &ControlPacket) -> (AxisField, AxisField) {
    (packet.throttle(), packet.steering())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_frame_valid() {
        let packet = decode_frame(&[180, 0, 90, 90]).unwrap();
        assert_eq!(packet.throttle_magnitude, 180);
        assert_eq!(packet.steering_magnitude, 0);
        assert_eq!(packet.throttle_direction, 90);
        assert_eq!(packet.steering_direction, 90);
    }

    #[test]
    fn test_decode_frame_any_bytes_are_valid() {
        let packet = decode_frame(&[0xFF, 0xFE, 0x00, 0x01]).unwrap();
        assert_eq!(packet.to_bytes(), [0xFF, 0xFE, 0x00, 0x01]);
    }

    #[test]
    fn test_decode_frame_too_short() {
        let result = decode_frame(&[90, 90, 90]);
        match result {
            Err(RcLinkError::MalformedPacket { expected, actual }) => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 3);
            }
            other => panic!("Expected MalformedPacket, got: {:?}", other),
        }
    }

    #[test]
    fn test_decode_frame_too_long() {
        assert!(decode_frame(&[90; 5]).is_err());
    }

    #[test]
    fn test_decode_frame_empty() {
        assert!(decode_frame(&[]).is_err());
    }

    #[test]
    fn test_decode_fields() {
        let packet = decode_frame(&[120, 60, b'F', b'R']).unwrap();
        let (throttle, steering) = decode_fields(&packet);
        assert_eq!(throttle, AxisField::new(120, b'F'));
        assert_eq!(steering, AxisField::new(60, b'R'));
    }
}
