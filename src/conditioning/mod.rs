//! # Signal Conditioning Module
//!
//! Turns noisy raw readings and received packet values into stable commands.
//!
//! This module handles:
//! - Deadzone suppression around the neutral reference
//! - Exponential moving-average smoothing
//! - Clamped linear remapping between value domains (with inversion)
//! - Per-axis channel state and change detection
//! - Continuous vs. discrete packet interpretation

pub mod filter;
pub mod channel;
pub mod strategy;
pub mod axis;
