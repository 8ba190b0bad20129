/*!
 * Process Factory
 * Builds the process set from the compiled workload
 */

use super::types::{Process, ProcessSet, ProcessState};

use crate::journal::{Event, EventLog};
use crate::workload::{OpCode, Workload};
use tracing::debug;

/// One-shot builder of the creation-ordered process set
#[derive(Debug)]
pub struct ProcessFactory<'a> {
    workload: &'a Workload,
}

impl<'a> ProcessFactory<'a> {
    /// Per-operation costs are already precomputed into the workload's
    /// durations, so the factory needs no further config input.
    pub fn new(workload: &'a Workload) -> Self {
        Self { workload }
    }

    /// Scan the workload once and build one process per program segment
    ///
    /// Each process starts New with its cursor on the program start
    /// marker, gets its initial CPU-cycle allotment and remaining-time
    /// estimate precomputed, then transitions New -> Ready as it is
    /// appended to the set; the transition is journaled.
    pub fn build(&self, journal: &EventLog) -> ProcessSet {
        let mut set = ProcessSet::new();

        for range in self.workload.program_ranges() {
            let (first, last) = (*range.start(), *range.end());
            let pid = set.len() as u32;

            let mut process = Process::new(pid, first, last);
            process.cycles_left = next_cpu_cycles(self.workload, first, last);
            process.time_remaining_ms = self
                .workload
                .ops()
                .iter()
                .take(last)
                .skip(first)
                .map(|op| op.duration_ms)
                .sum();

            debug!(
                pid,
                remaining_ms = process.time_remaining_ms,
                first_burst_cycles = process.cycles_left,
                "process constructed"
            );

            process.state = ProcessState::Ready;
            journal.record(Event::StateChanged {
                pid,
                from: ProcessState::New,
                to: ProcessState::Ready,
            });
            set.push(process);
        }

        set
    }
}

/// Cycle count of the next CPU burst strictly after `cursor`,
/// 0 if none before the program end marker at `last_op`
pub fn next_cpu_cycles(workload: &Workload, cursor: usize, last_op: usize) -> u32 {
    workload
        .ops()
        .iter()
        .take(last_op)
        .skip(cursor + 1)
        .find_map(|op| match &op.code {
            OpCode::Cpu { cycles, .. } => Some(*cycles),
            _ => None,
        })
        .unwrap_or(0)
}
