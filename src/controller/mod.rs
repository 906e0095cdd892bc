//! # Controller Module
//!
//! Transmitter side of the link.
//!
//! This module handles:
//! - Reading raw analog inputs behind the [`input::InputSource`] trait
//! - Conditioning readings into packet fields (training-mode throttle limit)
//! - Change-driven and periodic transmission with retry on failure

pub mod input;
pub mod role;
