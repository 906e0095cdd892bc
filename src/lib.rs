//! # RC Link Library
//!
//! Drive an RC vehicle's throttle and steering servos from a hand-held
//! controller over a short-range packet radio.
//!
//! This library provides both ends of the link: the controller conditions
//! analog stick readings into a fixed 4-byte packet and transmits it on
//! change or periodically, and the vehicle validates received packets,
//! smooths them and drives its actuators, holding position through
//! dropouts under a loss-of-signal watchdog.

pub mod conditioning;
pub mod config;
pub mod controller;
pub mod error;
pub mod link;
pub mod packet;
pub mod simulation;
pub mod telemetry;
pub mod vehicle;
