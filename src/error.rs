//! # Error Types
//!
//! Errors surfaced by the streaming pipeline. Everything here is a contract
//! violation or a defect; normal idle conditions (empty queues, re-ticks without
//! focus movement) are `Ok` no-ops and never produce an error.

use std::path::PathBuf;

/// Errors produced by the voxel storage and the schedulers.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    /// A point query on a compressed voxel buffer went past its logical length.
    #[error("voxel index {index} out of range for buffer of length {len}")]
    OutOfRange {
        /// The requested flat index.
        index: usize,
        /// Logical length of the buffer.
        len: usize,
    },

    /// `step_begin` was called while a batch of the same scheduler was in flight.
    #[error("{scheduler} scheduler already has a batch in flight")]
    AlreadyScheduled {
        /// Name of the scheduler that was driven out of order.
        scheduler: &'static str,
    },

    /// A worker thread hung up, which only happens if a task panicked.
    #[error("worker {worker} disconnected")]
    WorkerDisconnected {
        /// Index of the worker channel.
        worker: usize,
    },

    /// The engine was built from a configuration that failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised while loading an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The configuration text was not valid JSON for the schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration parsed but its values are inconsistent.
    #[error(transparent)]
    Invalid(#[from] EngineError),
}
