//! Configuration for a paging simulation run
//!
//! Holds the size of the frame pool, the number of processes and where their
//! trace files live. Built with chained `with_*` calls.

use super::errors::SimError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default file name prefix of per-process trace files (`proc0.txt`, `proc1.txt`, ...)
pub const DEFAULT_TRACE_PREFIX: &str = "proc";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Total number of physical frames
    pub total_frames: usize,
    /// Number of processes to schedule
    pub process_count: usize,
    /// Directory holding the trace files
    pub trace_dir: PathBuf,
    /// File name prefix of trace files
    pub trace_prefix: String,
}

impl SimulationConfig {
    /// Create a configuration reading traces from the working directory
    pub fn new(total_frames: usize, process_count: usize) -> Self {
        Self {
            total_frames,
            process_count,
            trace_dir: PathBuf::from("."),
            trace_prefix: DEFAULT_TRACE_PREFIX.to_string(),
        }
    }

    /// Set the directory trace files are read from
    pub fn with_trace_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.trace_dir = dir.into();
        self
    }

    /// Set the trace file name prefix
    pub fn with_trace_prefix(mut self, prefix: &str) -> Self {
        self.trace_prefix = prefix.to_string();
        self
    }

    /// Path of the trace file for the process at `index`
    pub fn trace_path(&self, index: usize) -> PathBuf {
        self.trace_dir
            .join(format!("{}{}.txt", self.trace_prefix, index))
    }

    /// Frames each process receives at start; the remainder stays idle
    pub fn frames_per_process(&self) -> usize {
        if self.process_count == 0 {
            0
        } else {
            self.total_frames / self.process_count
        }
    }

    /// Reject configurations that cannot run to completion
    pub fn validate(&self) -> Result<(), SimError> {
        if self.process_count == 0 {
            return Err(SimError::InvalidConfig(
                "process count must be positive".to_string(),
            ));
        }
        if self.total_frames == 0 {
            return Err(SimError::InvalidConfig(
                "frame count must be positive".to_string(),
            ));
        }
        if self.total_frames < self.process_count {
            return Err(SimError::InvalidConfig(format!(
                "{} frames cannot give each of {} processes a frame",
                self.total_frames, self.process_count
            )));
        }
        Ok(())
    }
}
