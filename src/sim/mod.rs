/*!
 * Simulation Driver
 * Top-level loop composing factory, scheduler, engine, and interrupts
 *
 * One sequential timeline: the driver selects a process, lets the
 * engine run one instruction, reconciles completed I/O, and repeats
 * until every process is Exiting. The only suspension points are the
 * clock's pacing waits.
 */

use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::core::errors::SimulationError;
use crate::core::types::{Pid, SimResult};
use crate::exec::ExecutionEngine;
use crate::interrupt::InterruptQueue;
use crate::journal::{Event, EventLog, TimedEvent};
use crate::memory::MemoryManager;
use crate::process::ProcessFactory;
use crate::scheduler::{Scheduler, Selection};
use crate::workload::Workload;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Aggregate counters derived from the event journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct SimStats {
    pub processes: usize,
    pub selections: u64,
    pub quantum_expiries: u64,
    pub interrupts_raised: u64,
    pub io_completions: u64,
    pub mem_denials: u64,
    pub seg_faults: u64,
    pub idle_periods: u64,
}

impl SimStats {
    pub fn from_events(events: &[TimedEvent]) -> Self {
        let mut stats = Self::default();
        for entry in events {
            match entry.event {
                Event::StateChanged { from, to, .. }
                    if from == crate::process::ProcessState::New
                        && to == crate::process::ProcessState::Ready =>
                {
                    stats.processes += 1;
                }
                Event::Selected { .. } => stats.selections += 1,
                Event::QuantumExpired { .. } => stats.quantum_expiries += 1,
                Event::InterruptRaised { .. } => stats.interrupts_raised += 1,
                Event::IoCompleted { .. } => stats.io_completions += 1,
                Event::MemDenied { .. } => stats.mem_denials += 1,
                Event::SegFault { .. } => stats.seg_faults += 1,
                Event::IdleBegin => stats.idle_periods += 1,
                _ => {}
            }
        }
        stats
    }
}

/// Result of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub stats: SimStats,
    pub events: Vec<TimedEvent>,
    pub elapsed_ms: u64,
}

/// The composed simulation
pub struct Simulation {
    config: SimConfig,
    workload: Workload,
    clock: Arc<SimClock>,
    journal: Arc<EventLog>,
}

impl Simulation {
    pub fn new(config: SimConfig, workload: Workload) -> SimResult<Self> {
        config.validate()?;
        let clock = Arc::new(SimClock::new(config.pacing));
        let journal = Arc::new(EventLog::new(Arc::clone(&clock), config.log_target));
        Ok(Self {
            config,
            workload,
            clock,
            journal,
        })
    }

    /// The shared clock (exposed for observation and tests)
    pub fn clock(&self) -> &Arc<SimClock> {
        &self.clock
    }

    /// Run the workload to completion
    pub fn run(&mut self) -> SimResult<SimReport> {
        let preemptive = self.config.policy.is_preemptive();

        self.clock.reset();
        self.journal.record(Event::SystemStart);
        self.journal.record(Event::SimulatorStart);

        let mut set = ProcessFactory::new(&self.workload).build(&self.journal);
        let scheduler = Scheduler::new(self.config.policy);
        let engine = ExecutionEngine::new(self.config.clone(), Arc::clone(&self.clock));
        let memory = MemoryManager::new(self.config.mem_available);
        let mut interrupts = InterruptQueue::new(Arc::clone(&self.clock));

        let mut current: Option<Pid> = None;

        loop {
            let running = current.is_some_and(|pid| set.get(pid).state.is_running());
            if !running {
                let previous = current;
                let mut idling = false;
                let selected = loop {
                    match scheduler.select_next(&mut set, previous) {
                        Selection::Next(pid) => break Some(pid),
                        Selection::AllExiting => break None,
                        Selection::AllWaiting => {
                            if !idling {
                                self.journal.record(Event::IdleBegin);
                                idling = true;
                            }
                            // Nothing can run until an I/O deadline
                            // passes; move time up to the earliest one.
                            match interrupts.next_deadline() {
                                Some(deadline) => self.clock.advance_to(deadline),
                                None => {
                                    return Err(SimulationError::Stalled {
                                        waiting: set
                                            .count_in_state(crate::process::ProcessState::Waiting),
                                    });
                                }
                            }
                            interrupts.clear_all(&mut set, &self.journal);
                        }
                    }
                };
                if idling {
                    self.journal.record(Event::IdleEnd);
                }
                let Some(pid) = selected else {
                    break;
                };
                if previous != Some(pid) {
                    self.journal.record(Event::Selected {
                        pid,
                        remaining_ms: set.get(pid).time_remaining_ms,
                    });
                }
                current = Some(pid);
            }

            if let Some(pid) = current {
                engine.advance(
                    &mut set,
                    pid,
                    &self.workload,
                    &mut interrupts,
                    &memory,
                    &self.journal,
                );
                if preemptive {
                    interrupts.clear_all(&mut set, &self.journal);
                }
                if set.get(pid).state.is_running() {
                    set.get_mut(pid).advance_cursor();
                }
            }
        }

        self.journal.record(Event::SystemStop);
        self.clock.stop();

        if self.config.log_target.to_file() {
            if let Some(path) = &self.config.log_path {
                self.journal
                    .write_to_file(path)
                    .map_err(|source| SimulationError::LogPersist {
                        path: path.display().to_string(),
                        source,
                    })?;
            }
        }

        let events = self.journal.entries();
        let stats = SimStats::from_events(&events);
        info!(
            processes = stats.processes,
            selections = stats.selections,
            seg_faults = stats.seg_faults,
            elapsed_ms = self.clock.elapsed_ms(),
            "simulation complete"
        );

        Ok(SimReport {
            stats,
            events,
            elapsed_ms: self.clock.elapsed_ms(),
        })
    }
}
