//! # Vehicle Module
//!
//! Receiver side of the link.
//!
//! This module handles:
//! - Polling the transport and decoding control packets
//! - Loss-of-signal detection and the failsafe policy
//! - Conditioning received values and driving the actuators on their own,
//!   shorter update timer

pub mod actuator;
pub mod role;
