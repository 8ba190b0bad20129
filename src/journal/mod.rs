/*!
 * Event Journal
 * Append-only sink of timestamped semantic simulation events
 *
 * The journal records what happened, not how to display it: every
 * entry is a structured `Event` stamped with the simulated time it
 * occurred. Formatting to human-readable lines and persistence to the
 * configured log file are this module's responsibility, not the
 * core's.
 */

use crate::clock::SimClock;
use crate::config::LogTarget;
use crate::core::types::{Millis, Pid};
use crate::process::ProcessState;
use crate::workload::{IoDirection, MemAction};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Semantic simulation event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    SystemStart,
    SystemStop,
    SimulatorStart,
    StateChanged {
        pid: Pid,
        from: ProcessState,
        to: ProcessState,
    },
    Selected {
        pid: Pid,
        remaining_ms: Millis,
    },
    IdleBegin,
    IdleEnd,
    BurstStarted {
        pid: Pid,
        label: String,
    },
    BurstEnded {
        pid: Pid,
        label: String,
    },
    QuantumExpired {
        pid: Pid,
        label: String,
    },
    IoStarted {
        pid: Pid,
        device: String,
        direction: IoDirection,
    },
    IoBlocked {
        pid: Pid,
        device: String,
        direction: IoDirection,
    },
    IoCompleted {
        pid: Pid,
        device: String,
        direction: IoDirection,
    },
    InterruptRaised {
        pid: Pid,
        device: String,
        direction: IoDirection,
    },
    MemRequested {
        pid: Pid,
        action: MemAction,
    },
    MemGranted {
        pid: Pid,
        action: MemAction,
    },
    MemDenied {
        pid: Pid,
        action: MemAction,
    },
    SegFault {
        pid: Pid,
    },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SystemStart => write!(f, "OS: System start"),
            Self::SystemStop => write!(f, "OS: System stop"),
            Self::SimulatorStart => write!(f, "OS: Simulator start"),
            Self::StateChanged { pid, from, to } => {
                write!(f, "OS: Process {pid} set from {from} to {to}")
            }
            Self::Selected { pid, remaining_ms } => {
                write!(f, "OS: Process {pid} selected with {remaining_ms} ms remaining")
            }
            Self::IdleBegin => write!(f, "OS: CPU idle, all active processes waiting"),
            Self::IdleEnd => write!(f, "OS: CPU interrupt, end idle"),
            Self::BurstStarted { pid, label } => {
                write!(f, "Process: {pid}, cpu {label} start")
            }
            Self::BurstEnded { pid, label } => {
                write!(f, "Process: {pid}, cpu {label} end")
            }
            Self::QuantumExpired { pid, label } => {
                write!(f, "Process: {pid}, quantum time out, cpu {label} operation end")
            }
            Self::IoStarted {
                pid,
                device,
                direction,
            } => write!(f, "Process: {pid}, {device} {direction} operation start"),
            Self::IoBlocked {
                pid,
                device,
                direction,
            } => write!(f, "Process: {pid}, blocked for {device} {direction} operation"),
            Self::IoCompleted {
                pid,
                device,
                direction,
            } => write!(f, "OS: Process {pid} {device} {direction} operation end"),
            Self::InterruptRaised {
                pid,
                device,
                direction,
            } => write!(f, "OS: Interrupted by process {pid} {device} {direction} operation end"),
            Self::MemRequested { pid, action } => {
                write!(f, "Process: {pid}, attempting mem {action} request")
            }
            Self::MemGranted { pid, action } => {
                write!(f, "Process: {pid}, successful mem {action} request")
            }
            Self::MemDenied { pid, action } => {
                write!(f, "Process: {pid}, failed mem {action} request")
            }
            Self::SegFault { pid } => {
                write!(f, "OS: Process {pid} experiences segmentation fault")
            }
        }
    }
}

/// One journal entry: an event and the simulated time it occurred
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedEvent {
    pub at_ms: Millis,
    #[serde(flatten)]
    pub event: Event,
}

impl TimedEvent {
    /// Format as a single log line, timestamp in seconds
    pub fn line(&self) -> String {
        format!("{:>10.6}, {}", self.at_ms as f64 / 1000.0, self.event)
    }
}

/// Append-only event log
pub struct EventLog {
    clock: Arc<SimClock>,
    target: LogTarget,
    entries: Mutex<Vec<TimedEvent>>,
}

impl EventLog {
    pub fn new(clock: Arc<SimClock>, target: LogTarget) -> Self {
        Self {
            clock,
            target,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Record an event, stamped with the current simulated time
    pub fn record(&self, event: Event) {
        let entry = TimedEvent {
            at_ms: self.clock.elapsed_ms(),
            event,
        };
        if self.target.to_monitor() {
            info!(target: "os_sim_kernel::journal", "{}", entry.line());
        }
        self.entries.lock().push(entry);
    }

    /// Snapshot of all recorded entries, in append order
    pub fn entries(&self) -> Vec<TimedEvent> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Persist all formatted lines to `path`
    pub fn write_to_file(&self, path: &Path) -> std::io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        for entry in self.entries.lock().iter() {
            writeln!(file, "{}", entry.line())?;
        }
        Ok(())
    }
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("target", &self.target)
            .field("entries", &self.len())
            .finish()
    }
}
