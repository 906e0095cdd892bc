//! # RC Link
//!
//! Runs a controller and a vehicle against each other over an in-process
//! loopback radio, with a sweeping input standing in for the sticks.

use anyhow::Result;
use std::path::Path;
use std::time::Instant;
use tokio::time::interval;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use rc_link::config::{Config, LoggingConfig};
use rc_link::controller::role::ControllerRole;
use rc_link::link::transport::loopback_pair;
use rc_link::simulation::{LoggingActuator, SweepInput};
use rc_link::telemetry::types::Role;
use rc_link::telemetry::Telemetry;
use rc_link::vehicle::role::VehicleRole;

/// Configuration file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Number of cycles between status log messages
const LOG_INTERVAL_CYCLES: u64 = 5000;

/// Main entry point
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or `config/default.toml`)
///    - Set up logging to stderr and optionally a daily log file
///    - Connect controller and vehicle through a loopback pair
///
/// 2. **Main Loop**
///    - Tick the controller, then the vehicle, once per cycle
///    - Log link statistics every 5000 cycles
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Flush telemetry
///    - Log totals
///
/// # Errors
///
/// Returns error if the configuration file exists but is invalid, or the
/// telemetry directory cannot be created.
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let (config, loaded) = load_config(&config_path)?;

    let _guard = init_logging(&config.logging);

    info!("RC Link v{} starting...", env!("CARGO_PKG_VERSION"));
    if loaded {
        info!("Loaded configuration from {}", config_path);
    } else {
        warn!("{} not found, using built-in defaults", config_path);
    }
    info!(
        "Strategy: {:?}, send interval {} ms, receive timeout {} ms",
        config.conditioning.strategy, config.link.send_interval_ms, config.link.receive_timeout_ms
    );

    let (controller_end, vehicle_end) = loopback_pair();
    let controller_end = controller_end.with_drop_every(config.simulation.drop_every_n);

    let mut controller = ControllerRole::new(
        &config,
        SweepInput::new(config.simulation.sweep_period()),
        controller_end,
        Telemetry::from_config(Role::Controller, &config.telemetry)?,
    );
    let mut vehicle = VehicleRole::new(
        &config,
        vehicle_end,
        LoggingActuator::new(),
        Telemetry::from_config(Role::Vehicle, &config.telemetry)?,
        Instant::now(),
    );

    let mut cycle = interval(config.link.cycle_interval());
    let mut cycles: u64 = 0;

    info!("Press Ctrl+C to exit");

    loop {
        tokio::select! {
            _ = cycle.tick() => {
                let now = Instant::now();
                controller.tick(now);
                vehicle.tick(now);

                cycles += 1;
                if cycles % LOG_INTERVAL_CYCLES == 0 {
                    let sent = controller.stats();
                    let received = vehicle.stats();
                    info!(
                        "Sent {} ({} failed, {} retries), received {}, link lost {} times",
                        sent.delivered, sent.failed, sent.retries, received.received, received.link_lost
                    );
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    controller.telemetry_mut().flush();
    vehicle.telemetry_mut().flush();

    let sent = controller.stats();
    let received = vehicle.stats();
    info!(
        "Total: {} cycles, {} packets delivered, {} received, {} rejected",
        cycles, sent.delivered, received.received, received.rejected
    );
    info!("RC Link stopped");

    Ok(())
}

/// Load configuration, falling back to defaults when the file is missing
///
/// Returns the configuration and whether it came from the file.
fn load_config(path: &str) -> Result<(Config, bool)> {
    if !Path::new(path).exists() {
        return Ok((Config::default(), false));
    }
    Ok((Config::load(path)?, true))
}

/// Initialize the tracing subscriber
///
/// `RUST_LOG` overrides the configured level. When `file_dir` is set, a
/// daily-rolling log file is written alongside stderr; the returned guard
/// must be held for the life of the program.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match &logging.file_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "rc-link.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_interval_constant() {
        // At the default 1 ms cycle, 5000 cycles = 5 seconds
        let seconds = LOG_INTERVAL_CYCLES as f64 * Config::default().link.cycle_interval_ms as f64 / 1000.0;
        assert_eq!(seconds, 5.0);
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let (config, loaded) = load_config("does/not/exist.toml").unwrap();
        assert!(!loaded);
        assert_eq!(config.link.send_interval_ms, 750);
    }

    #[test]
    fn test_default_config_file_loads() {
        let config = Config::load(DEFAULT_CONFIG_PATH).unwrap();
        let defaults = Config::default();
        assert_eq!(config.link.send_interval_ms, defaults.link.send_interval_ms);
        assert_eq!(config.link.failsafe, defaults.link.failsafe);
        assert_eq!(config.controller.throttle, defaults.controller.throttle);
        assert_eq!(config.vehicle.steering, defaults.vehicle.steering);
    }
}
