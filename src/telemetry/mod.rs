//! # Telemetry Module
//!
//! Best-effort observability sink for link events.
//!
//! This module handles:
//! - Logging every link event through `tracing`
//! - Optionally appending events as JSONL (JSON Lines) to rotating files
//! - Managing file rotation (max N records per file, last M files kept)
//!
//! Recording never affects control decisions: write failures are logged and
//! dropped.

pub mod logger;
pub mod types;

use tracing::{debug, info, warn};

use crate::config::TelemetryConfig;
use crate::error::Result;
use logger::JsonlRecorder;
use types::{LinkEvent, Role};

/// Event sink owned by one role
#[derive(Debug)]
pub struct Telemetry {
    role: Role,
    recorder: Option<JsonlRecorder>,
    recorded: u64,
}

impl Telemetry {
    /// Sink that only logs through `tracing`
    #[must_use]
    pub fn new(role: Role) -> Self {
        Self {
            role,
            recorder: None,
            recorded: 0,
        }
    }

    /// Sink that also writes JSONL through `recorder`
    #[must_use]
    pub fn with_recorder(role: Role, recorder: JsonlRecorder) -> Self {
        Self {
            role,
            recorder: Some(recorder),
            recorded: 0,
        }
    }

    /// Build the sink described by the telemetry configuration
    ///
    /// # Errors
    ///
    /// Returns error if the log directory cannot be created
    pub fn from_config(role: Role, config: &TelemetryConfig) -> Result<Self> {
        if !config.enabled {
            return Ok(Self::new(role));
        }

        let recorder = JsonlRecorder::new(
            &config.log_dir,
            role.name(),
            config.max_records_per_file,
            config.max_files_to_keep,
        )?;
        info!("Recording {} telemetry to {}", role.name(), config.log_dir);
        Ok(Self::with_recorder(role, recorder))
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Events seen by this sink
    #[must_use]
    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    /// Report one event
    pub fn record(&mut self, event: LinkEvent) {
        self.recorded += 1;
        let role = self.role.name();

        match &event {
            LinkEvent::TransmitSucceeded {
                trigger,
                latency_us,
                packet,
            } => debug!(
                role,
                ?trigger,
                "Transmission successful in {} us. Throttle: {} Steering: {}",
                latency_us,
                packet[0],
                packet[1]
            ),
            LinkEvent::TransmitFailed { trigger, .. } => {
                debug!(role, ?trigger, "Transmission failed or timed out")
            }
            LinkEvent::PacketReceived { packet } => {
                debug!(role, "Throttle: {} Steering: {}", packet[0], packet[1])
            }
            LinkEvent::PacketRejected { length } => {
                warn!(role, "Discarded {}-byte payload", length)
            }
            LinkEvent::FieldOutOfRange {
                channel,
                magnitude,
                direction,
            } => warn!(
                role,
                %channel,
                "Field out of range (magnitude {}, direction {})",
                magnitude,
                direction
            ),
            LinkEvent::LinkLost { silence_ms } => {
                warn!(role, "Lost connection to transmitter ({} ms silent)", silence_ms)
            }
            LinkEvent::LinkRestored { outage_ms } => {
                info!(role, "Connection restored after {} ms", outage_ms)
            }
        }

        if let Some(recorder) = self.recorder.as_mut() {
            if let Err(e) = recorder.record(self.role, &event) {
                warn!("Failed to record telemetry: {}", e);
            }
        }
    }

    /// Flush buffered records
    pub fn flush(&mut self) {
        if let Some(recorder) = self.recorder.as_mut() {
            if let Err(e) = recorder.flush() {
                warn!("Failed to flush telemetry: {}", e);
            }
        }
    }
}
