/*!
 * OS Behavior Simulator
 * Process scheduling, memory admission, and interrupt-driven I/O
 * reproduced against a scripted workload
 */

pub mod clock;
pub mod config;
pub mod core;
pub mod exec;
pub mod interrupt;
pub mod journal;
pub mod memory;
pub mod monitoring;
pub mod process;
pub mod scheduler;
pub mod sim;
pub mod workload;

// Re-exports
pub use clock::SimClock;
pub use config::{LogTarget, Pacing, Policy, SimConfig};
pub use core::errors::{ConfigError, SimulationError, WorkloadError};
pub use core::types::{Address, Millis, Pid, SimResult, Size};
pub use exec::ExecutionEngine;
pub use interrupt::{InterruptEvent, InterruptQueue};
pub use journal::{Event, EventLog, TimedEvent};
pub use memory::{MemoryBlock, MemoryManager};
pub use monitoring::init_tracing;
pub use process::{Process, ProcessFactory, ProcessSet, ProcessState};
pub use scheduler::{Scheduler, Selection};
pub use sim::{SimReport, SimStats, Simulation};
pub use workload::{IoDirection, MemAction, OpCode, Operation, Workload};
