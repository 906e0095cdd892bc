//! # Control Packet Encoder
//!
//! Encodes conditioned channel state into control packets.

use super::protocol::*;
use crate::conditioning::channel::ChannelState;

/// Encode the current field of both channels into a packet
///
/// # Arguments
///
/// * `throttle` - Throttle channel state
/// * `steering` - Steering channel state
///
/// # Returns
///
/// * `ControlPacket` - Packet carrying each channel's current field
pub fn encode_channels(throttle: &ChannelState, steering: &ChannelState) -> ControlPacket {
    ControlPacket::from_fields(throttle.current(), steering.current())
}

/// Encode a packet into its 4-byte wire frame
///
/// # Examples
///
/// ```
/// use rc_link::packet::encoder::encode_frame;
/// use rc_link::packet::protocol::{AxisField, ControlPacket};
///
/// let packet = ControlPacket::from_fields(AxisField::new(90, 90), AxisField::new(90, 90));
/// assert_eq!(encode_frame(&packet), [90, 90, 90, 90]);
/// ```
pub fn encode_frame(packet: &ControlPacket) -> [u8; PACKET_SIZE] {
    packet.to_bytes()
}
