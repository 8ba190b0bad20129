/*!
 * Execution Engine
 * Drives the selected process through one instruction per call
 *
 * Each call dispatches on the operation under the process's cursor and
 * runs it to its natural completion point: one full CPU burst (cycle by
 * cycle, with per-cycle interrupt and quantum checks under preemptive
 * policies), one I/O issue or synchronous wait, or one memory admission
 * check. The engine never advances the cursor for an instruction that
 * is still in flight; the driver advances it when the process is left
 * Running, and the interrupt queue advances it when blocked I/O
 * completes.
 */

use crate::clock::SimClock;
use crate::config::{Policy, SimConfig};
use crate::core::types::Pid;
use crate::interrupt::InterruptQueue;
use crate::journal::{Event, EventLog};
use crate::memory::MemoryManager;
use crate::process::{next_cpu_cycles, ProcessSet, ProcessState};
use crate::workload::{IoDirection, MemAction, OpCode, Workload};
use std::sync::Arc;

/// Single-instruction executor
#[derive(Debug)]
pub struct ExecutionEngine {
    config: SimConfig,
    clock: Arc<SimClock>,
}

impl ExecutionEngine {
    pub fn new(config: SimConfig, clock: Arc<SimClock>) -> Self {
        Self { config, clock }
    }

    /// Execute the instruction under `pid`'s cursor
    pub fn advance(
        &self,
        set: &mut ProcessSet,
        pid: Pid,
        workload: &Workload,
        interrupts: &mut InterruptQueue,
        memory: &MemoryManager,
        journal: &EventLog,
    ) {
        let op = workload.op(set.get(pid).cursor).clone();
        match op.code {
            // System markers belong to no process and are never under a
            // cursor; program starts are no-ops.
            OpCode::SysStart | OpCode::SysEnd | OpCode::AppStart => {}
            OpCode::AppEnd => {
                set.get_mut(pid).state = ProcessState::Exiting;
                journal.record(Event::StateChanged {
                    pid,
                    from: ProcessState::Running,
                    to: ProcessState::Exiting,
                });
            }
            OpCode::Cpu { label, .. } => {
                self.run_burst(set, pid, &label, workload, interrupts, journal);
            }
            OpCode::Io { device, direction, .. } => {
                self.run_io(set, pid, device, direction, op.duration_ms, interrupts, journal);
            }
            OpCode::Mem { action, offset, size } => {
                self.run_mem(set, pid, action, offset, size, memory, journal);
            }
        }
    }

    /// Consume the current CPU burst one cycle at a time
    ///
    /// Every cycle costs the configured CPU rate of simulated time.
    /// Under a preemptive policy a completed interrupt observed after a
    /// cycle returns the process to Ready; under round-robin the burst
    /// also stops at the quantum. When the burst's cycles are spent the
    /// next burst's allotment is precomputed.
    fn run_burst(
        &self,
        set: &mut ProcessSet,
        pid: Pid,
        label: &str,
        workload: &Workload,
        interrupts: &mut InterruptQueue,
        journal: &EventLog,
    ) {
        let preemptive = self.config.policy.is_preemptive();
        let rate = self.config.cpu_cycle_rate_ms;
        journal.record(Event::BurstStarted {
            pid,
            label: label.to_string(),
        });

        let mut completed: u32 = 0;
        while set.get(pid).cycles_left > 0 && set.get(pid).state.is_running() {
            self.clock.advance_ms(rate);
            completed += 1;
            {
                let process = set.get_mut(pid);
                process.consume_time(rate);
                process.cycles_left -= 1;
            }

            // An external interrupt preempts the burst; if the burst
            // happens to be complete the cursor still moves on.
            if preemptive && interrupts.check(journal) {
                let process = set.get_mut(pid);
                process.state = ProcessState::Ready;
                if process.cycles_left == 0 {
                    process.advance_cursor();
                }
            }

            if self.config.policy == Policy::RrP && completed == self.config.quantum_cycles {
                journal.record(Event::QuantumExpired {
                    pid,
                    label: label.to_string(),
                });
                let process = set.get_mut(pid);
                if process.cycles_left != 0 {
                    process.state = ProcessState::Ready;
                }
            }
        }

        if set.get(pid).cycles_left == 0 {
            let (cursor, last_op) = {
                let process = set.get(pid);
                (process.cursor, process.last_op)
            };
            set.get_mut(pid).cycles_left = next_cpu_cycles(workload, cursor, last_op);
        }

        if set.get(pid).state.is_running() {
            journal.record(Event::BurstEnded {
                pid,
                label: label.to_string(),
            });
        }
    }

    /// Issue a device operation
    ///
    /// Preemptive: block the process and enqueue a completion deadline;
    /// the cursor advances only when the interrupt queue reconciles it.
    /// Non-preemptive: wait out the full duration synchronously.
    fn run_io(
        &self,
        set: &mut ProcessSet,
        pid: Pid,
        device: String,
        direction: IoDirection,
        duration_ms: u64,
        interrupts: &mut InterruptQueue,
        journal: &EventLog,
    ) {
        if self.config.policy.is_preemptive() {
            journal.record(Event::IoBlocked {
                pid,
                device: device.clone(),
                direction,
            });
            let deadline = self.clock.elapsed_ms() + duration_ms;
            interrupts.signal(pid, device, direction, deadline);
            let process = set.get_mut(pid);
            process.state = ProcessState::Waiting;
            process.consume_time(duration_ms);
        } else {
            journal.record(Event::IoStarted {
                pid,
                device: device.clone(),
                direction,
            });
            self.clock.advance_ms(duration_ms);
            journal.record(Event::IoCompleted {
                pid,
                device,
                direction,
            });
        }
    }

    /// Delegate a memory request to the allocator
    ///
    /// A denied request is a simulated segmentation fault: the process
    /// terminates and executes nothing further.
    fn run_mem(
        &self,
        set: &mut ProcessSet,
        pid: Pid,
        action: MemAction,
        offset: u64,
        size: u64,
        memory: &MemoryManager,
        journal: &EventLog,
    ) {
        journal.record(Event::MemRequested { pid, action });

        let granted = match action {
            MemAction::Allocate => memory.allocate(set, pid, offset, size),
            MemAction::Access => memory.access(set.get(pid), offset, size),
        };

        journal.record(if granted {
            Event::MemGranted { pid, action }
        } else {
            Event::MemDenied { pid, action }
        });

        if !granted {
            journal.record(Event::SegFault { pid });
            set.get_mut(pid).state = ProcessState::Exiting;
            journal.record(Event::StateChanged {
                pid,
                from: ProcessState::Running,
                to: ProcessState::Exiting,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogTarget;
    use crate::process::ProcessFactory;

    fn engine_fixture(
        config: SimConfig,
        codes: Vec<OpCode>,
    ) -> (
        ExecutionEngine,
        Workload,
        ProcessSet,
        InterruptQueue,
        MemoryManager,
        EventLog,
        Arc<SimClock>,
    ) {
        let clock = Arc::new(SimClock::virtual_clock());
        clock.reset();
        let workload = Workload::compile(codes, &config).unwrap();
        let journal = EventLog::new(Arc::clone(&clock), LogTarget::Monitor);
        let set = ProcessFactory::new(&workload).build(&journal);
        let interrupts = InterruptQueue::new(Arc::clone(&clock));
        let memory = MemoryManager::new(config.mem_available);
        let engine = ExecutionEngine::new(config, Arc::clone(&clock));
        (engine, workload, set, interrupts, memory, journal, clock)
    }

    fn cpu(cycles: u32) -> OpCode {
        OpCode::Cpu {
            label: "process".into(),
            cycles,
        }
    }

    #[test]
    fn test_burst_consumes_cycles_and_time() {
        let config = SimConfig::default();
        let codes = vec![
            OpCode::SysStart,
            OpCode::AppStart,
            cpu(4),
            OpCode::AppEnd,
            OpCode::SysEnd,
        ];
        let (engine, workload, mut set, mut interrupts, memory, journal, clock) =
            engine_fixture(config.clone(), codes);

        set.get_mut(0).state = ProcessState::Running;
        set.get_mut(0).cursor = 2;
        engine.advance(&mut set, 0, &workload, &mut interrupts, &memory, &journal);

        assert_eq!(set.get(0).cycles_left, 0);
        assert_eq!(clock.elapsed_ms(), 4 * config.cpu_cycle_rate_ms);
        assert!(set.get(0).state.is_running());
        assert_eq!(set.get(0).time_remaining_ms, 0);
    }

    #[test]
    fn test_quantum_expiry_returns_process_to_ready() {
        let mut config = SimConfig::default();
        config.policy = Policy::RrP;
        config.quantum_cycles = 3;
        let codes = vec![
            OpCode::SysStart,
            OpCode::AppStart,
            cpu(5),
            OpCode::AppEnd,
            OpCode::SysEnd,
        ];
        let (engine, workload, mut set, mut interrupts, memory, journal, _clock) =
            engine_fixture(config, codes);

        set.get_mut(0).state = ProcessState::Running;
        set.get_mut(0).cursor = 2;
        engine.advance(&mut set, 0, &workload, &mut interrupts, &memory, &journal);

        // Exactly the quantum ran; the burst holds its leftover cycles
        assert_eq!(set.get(0).cycles_left, 2);
        assert!(set.get(0).state.is_ready());
        assert!(journal
            .entries()
            .iter()
            .any(|e| matches!(e.event, Event::QuantumExpired { pid: 0, .. })));

        // Resumes for the remaining cycles on the next selection
        set.get_mut(0).state = ProcessState::Running;
        engine.advance(&mut set, 0, &workload, &mut interrupts, &memory, &journal);
        assert_eq!(set.get(0).cycles_left, 0);
        assert!(set.get(0).state.is_running());
    }

    #[test]
    fn test_preemptive_io_blocks_without_cursor_advance() {
        let mut config = SimConfig::default();
        config.policy = Policy::FcfsP;
        let codes = vec![
            OpCode::SysStart,
            OpCode::AppStart,
            OpCode::Io {
                device: "hard drive".into(),
                direction: IoDirection::Out,
                cycles: 5,
            },
            OpCode::AppEnd,
            OpCode::SysEnd,
        ];
        let (engine, workload, mut set, mut interrupts, memory, journal, clock) =
            engine_fixture(config.clone(), codes);

        set.get_mut(0).state = ProcessState::Running;
        set.get_mut(0).cursor = 2;
        engine.advance(&mut set, 0, &workload, &mut interrupts, &memory, &journal);

        assert!(set.get(0).state.is_waiting());
        assert_eq!(set.get(0).cursor, 2);
        assert_eq!(interrupts.len(), 1);
        assert_eq!(
            interrupts.next_deadline(),
            Some(5 * config.io_cycle_rate_ms)
        );
        // Issuing async I/O consumes no simulated time
        assert_eq!(clock.elapsed_ms(), 0);
    }

    #[test]
    fn test_synchronous_io_waits_full_duration() {
        let config = SimConfig::default();
        let codes = vec![
            OpCode::SysStart,
            OpCode::AppStart,
            OpCode::Io {
                device: "keyboard".into(),
                direction: IoDirection::In,
                cycles: 4,
            },
            OpCode::AppEnd,
            OpCode::SysEnd,
        ];
        let (engine, workload, mut set, mut interrupts, memory, journal, clock) =
            engine_fixture(config.clone(), codes);

        set.get_mut(0).state = ProcessState::Running;
        set.get_mut(0).cursor = 2;
        engine.advance(&mut set, 0, &workload, &mut interrupts, &memory, &journal);

        assert_eq!(clock.elapsed_ms(), 4 * config.io_cycle_rate_ms);
        assert!(set.get(0).state.is_running());
        assert!(interrupts.is_empty());
    }

    #[test]
    fn test_denied_allocation_faults_the_process() {
        let mut config = SimConfig::default();
        config.mem_available = 100;
        let codes = vec![
            OpCode::SysStart,
            OpCode::AppStart,
            OpCode::Mem {
                action: MemAction::Allocate,
                offset: 90,
                size: 50,
            },
            OpCode::AppEnd,
            OpCode::SysEnd,
        ];
        let (engine, workload, mut set, mut interrupts, memory, journal, _clock) =
            engine_fixture(config, codes);

        set.get_mut(0).state = ProcessState::Running;
        set.get_mut(0).cursor = 2;
        engine.advance(&mut set, 0, &workload, &mut interrupts, &memory, &journal);

        assert!(set.get(0).state.is_exiting());
        let events = journal.entries();
        assert!(events
            .iter()
            .any(|e| matches!(e.event, Event::SegFault { pid: 0 })));
    }

    #[test]
    fn test_program_end_exits_the_process() {
        let config = SimConfig::default();
        let codes = vec![
            OpCode::SysStart,
            OpCode::AppStart,
            cpu(1),
            OpCode::AppEnd,
            OpCode::SysEnd,
        ];
        let (engine, workload, mut set, mut interrupts, memory, journal, _clock) =
            engine_fixture(config, codes);

        set.get_mut(0).state = ProcessState::Running;
        set.get_mut(0).cursor = 3;
        engine.advance(&mut set, 0, &workload, &mut interrupts, &memory, &journal);
        assert!(set.get(0).state.is_exiting());
    }
}
