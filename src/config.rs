//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Calibration is a configuration contract: every dead zone is expressed in the
//! units of the domain where it is applied (raw ADC units on the controller,
//! packet units on the vehicle).

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::conditioning::strategy::ConditioningStrategy;
use crate::error::{RcLinkError, Result};

/// Highest raw reading of the 10-bit analog inputs
pub const ADC_MAX: u16 = 1023;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub conditioning: ConditioningConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub vehicle: VehicleConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// What the vehicle does with its actuators when the link times out
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailsafePolicy {
    /// Keep driving the last commanded state
    #[default]
    Hold,
    /// Return both axes to neutral
    Neutral,
}

/// Link timing configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LinkConfig {
    #[serde(default = "default_send_interval_ms")]
    pub send_interval_ms: u64,

    #[serde(default = "default_receive_timeout_ms")]
    pub receive_timeout_ms: u64,

    #[serde(default = "default_actuator_update_interval_ms")]
    pub actuator_update_interval_ms: u64,

    #[serde(default = "default_cycle_interval_ms")]
    pub cycle_interval_ms: u64,

    #[serde(default)]
    pub failsafe: FailsafePolicy,
}

/// Packet encoding configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConditioningConfig {
    #[serde(default)]
    pub strategy: ConditioningStrategy,
}

/// Controller (transmitter) configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ControllerConfig {
    #[serde(default)]
    pub training_mode: bool,

    #[serde(default = "default_training_throttle_limit_percent")]
    pub training_throttle_limit_percent: u8,

    #[serde(default = "default_throttle_limit_percent")]
    pub throttle_limit_percent: u8,

    #[serde(
        default = "default_throttle_calibration",
        deserialize_with = "throttle_calibration"
    )]
    pub throttle: CalibrationProfile,

    #[serde(
        default = "default_steering_calibration",
        deserialize_with = "steering_calibration"
    )]
    pub steering: CalibrationProfile,
}

/// Per-axis calibration of a raw analog input
///
/// Fields missing from a `[controller.<axis>]` section keep that axis's
/// default.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationProfile {
    /// Raw units around `middle` treated as centred
    pub dead_zone: u16,

    /// Raw reading with the stick at rest
    pub middle: u16,

    pub input_min: u16,

    pub input_max: u16,

    /// Packet value at `input_min` (0-180)
    pub output_min: u8,

    /// Packet value at `input_max` (0-180)
    pub output_max: u8,

    /// EMA factor applied before transmission (0.0 = off)
    pub smoothing: f32,
}

/// Vehicle (receiver) configuration
#[derive(Debug, Deserialize, Clone)]
pub struct VehicleConfig {
    #[serde(
        default = "default_throttle_actuator",
        deserialize_with = "throttle_actuator"
    )]
    pub throttle: ActuatorProfile,

    #[serde(
        default = "default_steering_actuator",
        deserialize_with = "steering_actuator"
    )]
    pub steering: ActuatorProfile,
}

/// Per-axis actuator conditioning
///
/// Fields missing from a `[vehicle.<axis>]` section keep that axis's default.
#[derive(Debug, Clone, PartialEq)]
pub struct ActuatorProfile {
    /// Packet units around the middle reference treated as neutral
    pub dead_zone: u8,

    pub smoothing: f32,

    pub angle_min: u8,

    pub angle_max: u8,

    /// Actuator mounted backwards
    pub reversed: bool,
}

/// Fields present in a `[controller.<axis>]` section
#[derive(Debug, Deserialize)]
struct CalibrationOverrides {
    dead_zone: Option<u16>,
    middle: Option<u16>,
    input_min: Option<u16>,
    input_max: Option<u16>,
    output_min: Option<u8>,
    output_max: Option<u8>,
    smoothing: Option<f32>,
}

impl CalibrationOverrides {
    fn over(self, base: CalibrationProfile) -> CalibrationProfile {
        CalibrationProfile {
            dead_zone: self.dead_zone.unwrap_or(base.dead_zone),
            middle: self.middle.unwrap_or(base.middle),
            input_min: self.input_min.unwrap_or(base.input_min),
            input_max: self.input_max.unwrap_or(base.input_max),
            output_min: self.output_min.unwrap_or(base.output_min),
            output_max: self.output_max.unwrap_or(base.output_max),
            smoothing: self.smoothing.unwrap_or(base.smoothing),
        }
    }
}

/// Fields present in a `[vehicle.<axis>]` section
#[derive(Debug, Deserialize)]
struct ActuatorOverrides {
    dead_zone: Option<u8>,
    smoothing: Option<f32>,
    angle_min: Option<u8>,
    angle_max: Option<u8>,
    reversed: Option<bool>,
}

impl ActuatorOverrides {
    fn over(self, base: ActuatorProfile) -> ActuatorProfile {
        ActuatorProfile {
            dead_zone: self.dead_zone.unwrap_or(base.dead_zone),
            smoothing: self.smoothing.unwrap_or(base.smoothing),
            angle_min: self.angle_min.unwrap_or(base.angle_min),
            angle_max: self.angle_max.unwrap_or(base.angle_max),
            reversed: self.reversed.unwrap_or(base.reversed),
        }
    }
}

fn throttle_calibration<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<CalibrationProfile, D::Error> {
    Ok(CalibrationOverrides::deserialize(deserializer)?.over(default_throttle_calibration()))
}

fn steering_calibration<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<CalibrationProfile, D::Error> {
    Ok(CalibrationOverrides::deserialize(deserializer)?.over(default_steering_calibration()))
}

fn throttle_actuator<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<ActuatorProfile, D::Error> {
    Ok(ActuatorOverrides::deserialize(deserializer)?.over(default_throttle_actuator()))
}

fn steering_actuator<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<ActuatorProfile, D::Error> {
    Ok(ActuatorOverrides::deserialize(deserializer)?.over(default_steering_actuator()))
}

/// Telemetry configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,
}

/// Process log configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily rolling log files; console only if unset
    #[serde(default)]
    pub file_dir: Option<String>,
}

/// In-process simulation used by the binary
#[derive(Debug, Deserialize, Clone)]
pub struct SimulationConfig {
    /// Fail every Nth send (0 = lossless)
    #[serde(default)]
    pub drop_every_n: u32,

    #[serde(default = "default_sweep_period_ms")]
    pub sweep_period_ms: u64,
}

// Default value functions
fn default_send_interval_ms() -> u64 { 750 }
fn default_receive_timeout_ms() -> u64 { 1000 }
fn default_actuator_update_interval_ms() -> u64 { 5 }
fn default_cycle_interval_ms() -> u64 { 1 }

fn default_training_throttle_limit_percent() -> u8 { 50 }
fn default_throttle_limit_percent() -> u8 { 100 }

fn default_input_dead_zone() -> u16 { 10 }
fn default_input_middle() -> u16 { 512 }
fn default_input_min() -> u16 { 0 }
fn default_input_max() -> u16 { ADC_MAX }
fn default_output_min() -> u8 { 0 }
fn default_output_max() -> u8 { 180 }

fn default_output_dead_zone() -> u8 { 15 }
fn default_throttle_smoothing() -> f32 { 0.98 }
fn default_steering_smoothing() -> f32 { 0.85 }
fn default_angle_min() -> u8 { 0 }
fn default_angle_max() -> u8 { 180 }

fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }

fn default_log_level() -> String { "info".to_string() }

fn default_sweep_period_ms() -> u64 { 4000 }

fn default_throttle_calibration() -> CalibrationProfile {
    CalibrationProfile::default()
}

fn default_steering_calibration() -> CalibrationProfile {
    CalibrationProfile {
        dead_zone: 25,
        ..CalibrationProfile::default()
    }
}

fn default_throttle_actuator() -> ActuatorProfile {
    ActuatorProfile {
        smoothing: default_throttle_smoothing(),
        ..ActuatorProfile::default()
    }
}

fn default_steering_actuator() -> ActuatorProfile {
    ActuatorProfile::default()
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            send_interval_ms: default_send_interval_ms(),
            receive_timeout_ms: default_receive_timeout_ms(),
            actuator_update_interval_ms: default_actuator_update_interval_ms(),
            cycle_interval_ms: default_cycle_interval_ms(),
            failsafe: FailsafePolicy::default(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            training_mode: false,
            training_throttle_limit_percent: default_training_throttle_limit_percent(),
            throttle_limit_percent: default_throttle_limit_percent(),
            throttle: default_throttle_calibration(),
            steering: default_steering_calibration(),
        }
    }
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        Self {
            dead_zone: default_input_dead_zone(),
            middle: default_input_middle(),
            input_min: default_input_min(),
            input_max: default_input_max(),
            output_min: default_output_min(),
            output_max: default_output_max(),
            smoothing: 0.0,
        }
    }
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            throttle: default_throttle_actuator(),
            steering: default_steering_actuator(),
        }
    }
}

impl Default for ActuatorProfile {
    fn default() -> Self {
        Self {
            dead_zone: default_output_dead_zone(),
            smoothing: default_steering_smoothing(),
            angle_min: default_angle_min(),
            angle_max: default_angle_max(),
            reversed: false,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_dir: None,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            drop_every_n: 0,
            sweep_period_ms: default_sweep_period_ms(),
        }
    }
}

impl LinkConfig {
    /// Periodic fallback transmission interval
    pub fn send_interval(&self) -> Duration {
        Duration::from_millis(self.send_interval_ms)
    }

    /// Silence after which the link is reported lost
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    /// Actuator refresh interval on the vehicle
    pub fn actuator_update_interval(&self) -> Duration {
        Duration::from_millis(self.actuator_update_interval_ms)
    }

    /// Control loop period
    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.cycle_interval_ms)
    }
}

impl SimulationConfig {
    /// Full period of the bench input sweep
    pub fn sweep_period(&self) -> Duration {
        Duration::from_millis(self.sweep_period_ms)
    }
}

impl ControllerConfig {
    /// Throttle deflection limit in effect, honouring training mode
    pub fn effective_throttle_limit_percent(&self) -> u8 {
        if self.training_mode {
            self.training_throttle_limit_percent.min(self.throttle_limit_percent)
        } else {
            self.throttle_limit_percent
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> RcLinkError {
    RcLinkError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rc_link::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Validate timing fields
        for (name, value) in [
            ("send_interval_ms", self.link.send_interval_ms),
            ("receive_timeout_ms", self.link.receive_timeout_ms),
            ("actuator_update_interval_ms", self.link.actuator_update_interval_ms),
            ("cycle_interval_ms", self.link.cycle_interval_ms),
        ] {
            if value == 0 || value > 60000 {
                return Err(invalid(format!("{} must be between 1 and 60000", name)));
            }
        }

        if self.link.cycle_interval_ms > self.link.actuator_update_interval_ms {
            return Err(invalid(
                "cycle_interval_ms must not exceed actuator_update_interval_ms",
            ));
        }

        // Validate throttle limits
        for (name, value) in [
            ("throttle_limit_percent", self.controller.throttle_limit_percent),
            (
                "training_throttle_limit_percent",
                self.controller.training_throttle_limit_percent,
            ),
        ] {
            if value == 0 || value > 100 {
                return Err(invalid(format!("{} must be between 1 and 100", name)));
            }
        }

        // Validate calibration profiles
        for (name, profile) in [
            ("controller.throttle", &self.controller.throttle),
            ("controller.steering", &self.controller.steering),
        ] {
            if profile.input_max > ADC_MAX {
                return Err(invalid(format!("{}: input_max must be at most {}", name, ADC_MAX)));
            }

            if profile.input_min >= profile.middle || profile.middle >= profile.input_max {
                return Err(invalid(format!(
                    "{}: must satisfy input_min < middle < input_max",
                    name
                )));
            }

            if profile.output_min > 180 || profile.output_max > 180 {
                return Err(invalid(format!("{}: output bounds must be within 0-180", name)));
            }

            if !(0.0..1.0).contains(&profile.smoothing) {
                return Err(invalid(format!("{}: smoothing must be in [0.0, 1.0)", name)));
            }
        }

        // Validate actuator profiles
        for (name, profile) in [
            ("vehicle.throttle", &self.vehicle.throttle),
            ("vehicle.steering", &self.vehicle.steering),
        ] {
            if profile.angle_min > 180 || profile.angle_max > 180 {
                return Err(invalid(format!("{}: angles must be within 0-180", name)));
            }

            if profile.angle_min >= profile.angle_max {
                return Err(invalid(format!("{}: angle_min must be less than angle_max", name)));
            }

            if profile.dead_zone > 90 {
                return Err(invalid(format!("{}: dead_zone must be at most 90", name)));
            }

            if !(0.0..1.0).contains(&profile.smoothing) {
                return Err(invalid(format!("{}: smoothing must be in [0.0, 1.0)", name)));
            }
        }

        // Validate telemetry configuration
        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(invalid("telemetry log_dir cannot be empty when enabled"));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        if self.simulation.sweep_period_ms == 0 {
            return Err(invalid("sweep_period_ms must be greater than 0"));
        }

        Ok(())
    }
}
