//! # Link Module
//!
//! Radio link plumbing shared by both roles.
//!
//! This module handles:
//! - The opaque transport primitive (non-blocking send / try-receive)
//! - An in-process loopback link with fault injection
//! - Transmit cadence, change-driven sends and retry on failure
//! - Receive-side loss-of-signal detection

pub mod transport;
pub mod scheduler;
pub mod watchdog;
