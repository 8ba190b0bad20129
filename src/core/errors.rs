/*!
 * Error Types
 * Centralized error handling with thiserror and serde support
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Invalid scheduling policy: {0}")]
    InvalidPolicy(String),

    #[error("Invalid quantum: {0} (round-robin requires at least 1 cycle)")]
    InvalidQuantum(u32),

    #[error("Invalid cycle rate: {0} ms (rates must be at least 1 ms)")]
    InvalidCycleRate(u64),

    #[error("Invalid memory ceiling: {0} bytes")]
    InvalidMemoryCeiling(u64),

    #[error("Log target requires a file path")]
    MissingLogPath,
}

/// Workload structure errors
///
/// The operation sequence is validated once at compile time; a workload
/// that passes `Workload::compile` never fails structurally at runtime.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum WorkloadError {
    #[error("Workload is empty")]
    Empty,

    #[error("Workload must begin with a system start marker")]
    MissingSystemStart,

    #[error("Workload must end with a system end marker")]
    MissingSystemEnd,

    #[error("Unbalanced program markers at operation {index}")]
    UnbalancedProgram { index: usize },

    #[error("Operation {index} appears outside any program")]
    OperationOutsideProgram { index: usize },

    #[error("Workload contains no programs")]
    NoPrograms,
}

/// Simulation-level errors
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Workload(#[from] WorkloadError),

    #[error("Simulation stalled: {waiting} process(es) waiting with no pending interrupts")]
    Stalled { waiting: usize },

    #[error("Failed to persist event log to {path}: {source}")]
    LogPersist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
