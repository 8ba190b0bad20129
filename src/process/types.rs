/*!
 * Process Types
 * Process control blocks and the creation-ordered process set
 */

use crate::core::types::{Millis, Pid};
use crate::memory::MemoryBlock;
use serde::{Deserialize, Serialize};

/// Process state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Control block is being constructed
    New,
    /// Process is ready to run
    Ready,
    /// Process is currently executing on the simulated CPU
    Running,
    /// Process is blocked on asynchronous I/O
    Waiting,
    /// Process has terminated (normally or by fault)
    Exiting,
}

impl ProcessState {
    #[inline(always)]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    #[inline(always)]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    #[inline(always)]
    pub const fn is_waiting(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    #[inline(always)]
    pub const fn is_exiting(&self) -> bool {
        matches!(self, Self::Exiting)
    }
}

impl std::fmt::Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::New => "NEW",
            Self::Ready => "READY",
            Self::Running => "RUNNING",
            Self::Waiting => "WAITING",
            Self::Exiting => "EXITING",
        };
        write!(f, "{s}")
    }
}

/// Process control block
///
/// The cursor indexes into the shared workload and only ever moves
/// forward; `first_op..=last_op` is the fixed slice of the workload
/// this process owns (start marker through matching end marker).
#[derive(Debug, Clone)]
pub struct Process {
    pub pid: Pid,
    pub state: ProcessState,
    /// Estimated total remaining simulated time
    pub time_remaining_ms: Millis,
    /// Cycles left in the current CPU burst
    pub cycles_left: u32,
    /// Index of the next instruction in the workload
    pub cursor: usize,
    /// First owned operation (the program start marker)
    pub first_op: usize,
    /// Last owned operation (the program end marker)
    pub last_op: usize,
    /// Allocated memory blocks, in grant order
    pub blocks: Vec<MemoryBlock>,
}

impl Process {
    pub fn new(pid: Pid, first_op: usize, last_op: usize) -> Self {
        Self {
            pid,
            state: ProcessState::New,
            time_remaining_ms: 0,
            cycles_left: 0,
            cursor: first_op,
            first_op,
            last_op,
            blocks: Vec::new(),
        }
    }

    /// Move the instruction cursor to the next operation
    ///
    /// The cursor is strictly increasing; it never moves past the
    /// process's program end marker.
    #[inline]
    pub fn advance_cursor(&mut self) {
        debug_assert!(self.cursor < self.last_op);
        self.cursor += 1;
    }

    /// Subtract simulated time from the remaining-time estimate
    #[inline]
    pub fn consume_time(&mut self, ms: Millis) {
        self.time_remaining_ms = self.time_remaining_ms.saturating_sub(ms);
    }
}

/// Creation-ordered set of all processes in the simulation
///
/// Index equals pid; the order is fixed for the simulation's lifetime
/// and serves as the tie-break order for FCFS and SJF/SRTF.
#[derive(Debug, Clone, Default)]
pub struct ProcessSet {
    procs: Vec<Process>,
}

impl ProcessSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, process: Process) {
        debug_assert_eq!(process.pid as usize, self.procs.len());
        self.procs.push(process);
    }

    #[inline(always)]
    pub fn get(&self, pid: Pid) -> &Process {
        &self.procs[pid as usize]
    }

    #[inline(always)]
    pub fn get_mut(&mut self, pid: Pid) -> &mut Process {
        &mut self.procs[pid as usize]
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.procs.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Process> {
        self.procs.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Process> {
        self.procs.iter_mut()
    }

    /// Number of processes currently in the given state
    pub fn count_in_state(&self, state: ProcessState) -> usize {
        self.procs.iter().filter(|p| p.state == state).count()
    }
}
