//! # JSONL Telemetry Recorder
//!
//! Appends link events as JSON Lines to rotating files.
//!
//! A file holds at most `max_records_per_file` records; only the newest
//! `max_files_to_keep` files written by this recorder are retained.

use chrono::Utc;
use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::types::{LinkEvent, Role, TelemetryRecord};
use crate::error::Result;

/// Rotating JSONL writer
#[derive(Debug)]
pub struct JsonlRecorder {
    dir: PathBuf,
    prefix: String,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    records_in_file: usize,
    file_index: u64,
    files: VecDeque<PathBuf>,
}

impl JsonlRecorder {
    /// Create a recorder writing into `dir` (created if missing)
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn new<P: AsRef<Path>>(
        dir: P,
        prefix: &str,
        max_records_per_file: usize,
        max_files_to_keep: usize,
    ) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            prefix: prefix.to_string(),
            max_records_per_file: max_records_per_file.max(1),
            max_files_to_keep: max_files_to_keep.max(1),
            writer: None,
            records_in_file: 0,
            file_index: 0,
            files: VecDeque::new(),
        })
    }

    /// Files currently retained, oldest first
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    /// Append one event
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the file write fails
    pub fn record(&mut self, role: Role, event: &LinkEvent) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        let record = TelemetryRecord {
            timestamp: Utc::now(),
            role,
            event,
        };
        let line = serde_json::to_string(&record)?;

        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "{}", line)?;
            self.records_in_file += 1;
        }
        Ok(())
    }

    /// Flush buffered records to disk
    ///
    /// # Errors
    ///
    /// Returns error if the flush fails
    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn rotate(&mut self) -> Result<()> {
        self.flush()?;

        self.file_index += 1;
        let name = format!(
            "{}-{}-{:04}.jsonl",
            self.prefix,
            Utc::now().format("%Y%m%d-%H%M%S"),
            self.file_index
        );
        let path = self.dir.join(name);
        let file = File::create(&path)?;
        debug!("Opened telemetry file {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.records_in_file = 0;
        self.files.push_back(path);

        while self.files.len() > self.max_files_to_keep {
            if let Some(oldest) = self.files.pop_front() {
                fs::remove_file(&oldest)?;
                debug!("Removed telemetry file {}", oldest.display());
            }
        }
        Ok(())
    }
}

impl Drop for JsonlRecorder {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
