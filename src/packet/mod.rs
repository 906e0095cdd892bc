//! # Control Packet Module
//!
//! The fixed 4-byte control packet exchanged between controller and vehicle.
//!
//! This module handles:
//! - Packet layout and field semantics (magnitude + direction per axis)
//! - Encoding channel state into a packet
//! - Decoding received payloads, rejecting anything not exactly 4 bytes

pub mod protocol;
pub mod encoder;
pub mod decoder;
