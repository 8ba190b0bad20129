/*!
 * CPU Scheduler
 * Selects the next process to run under the configured policy
 */

use crate::config::Policy;
use crate::core::types::Pid;
use crate::process::{ProcessSet, ProcessState};
use tracing::trace;

/// Outcome of one selection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// A Ready process was chosen and transitioned to Running
    Next(Pid),
    /// At least one process is Waiting and every other is Exiting;
    /// the simulated CPU idles
    AllWaiting,
    /// Every process is Exiting; the simulation is over
    AllExiting,
}

/// Policy-driven process selector
///
/// Selection never blocks and never mutates anything except the chosen
/// process's state (Ready -> Running). Creation order is the tie-break
/// order for FCFS and SJF/SRTF and the rotation order for round-robin.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    policy: Policy,
}

impl Scheduler {
    pub const fn new(policy: Policy) -> Self {
        Self { policy }
    }

    #[inline(always)]
    pub const fn policy(&self) -> Policy {
        self.policy
    }

    /// Select the next process to run
    ///
    /// `previous` is the pid handed out by the last successful
    /// selection (None on the first call; selection then begins from
    /// the head of the set for every policy).
    pub fn select_next(&self, set: &mut ProcessSet, previous: Option<Pid>) -> Selection {
        let total = set.len();
        let waiting = set.count_in_state(ProcessState::Waiting);
        let exiting = set.count_in_state(ProcessState::Exiting);

        if exiting == total {
            return Selection::AllExiting;
        }
        if waiting > 0 && waiting + exiting == total {
            return Selection::AllWaiting;
        }

        let chosen = match self.policy {
            Policy::FcfsN | Policy::FcfsP => first_ready(set),
            Policy::RrP => next_ready_after(set, previous),
            Policy::SjfN | Policy::SrtfP => shortest_ready(set),
        };

        match chosen {
            Some(pid) => {
                set.get_mut(pid).state = ProcessState::Running;
                trace!(pid, policy = self.policy.as_str(), "process selected");
                Selection::Next(pid)
            }
            // No Ready process but not all waiting/exiting: treat as an
            // idle verdict and let the driver re-poll interrupts.
            None => Selection::AllWaiting,
        }
    }
}

/// First Ready process in creation order
fn first_ready(set: &ProcessSet) -> Option<Pid> {
    set.iter().find(|p| p.state.is_ready()).map(|p| p.pid)
}

/// Next Ready process after `previous` in creation order, wrapping
/// circularly; from the head when there is no previous selection
fn next_ready_after(set: &ProcessSet, previous: Option<Pid>) -> Option<Pid> {
    let len = set.len();
    let start = match previous {
        Some(prev) => (prev as usize + 1) % len,
        None => 0,
    };
    (0..len)
        .map(|i| ((start + i) % len) as Pid)
        .find(|&pid| set.get(pid).state.is_ready())
}

/// Ready process with minimum remaining estimated time; a left-to-right
/// scan keeps the earliest process on ties
fn shortest_ready(set: &ProcessSet) -> Option<Pid> {
    let mut best: Option<Pid> = None;
    for process in set.iter().filter(|p| p.state.is_ready()) {
        match best {
            Some(pid) if set.get(pid).time_remaining_ms <= process.time_remaining_ms => {}
            _ => best = Some(process.pid),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Process;

    fn set_with_remaining(remaining: &[u64]) -> ProcessSet {
        let mut set = ProcessSet::new();
        for (pid, &ms) in remaining.iter().enumerate() {
            let mut p = Process::new(pid as Pid, 0, 1);
            p.state = ProcessState::Ready;
            p.time_remaining_ms = ms;
            set.push(p);
        }
        set
    }

    #[test]
    fn test_fcfs_ignores_remaining_time() {
        let scheduler = Scheduler::new(Policy::FcfsN);
        let mut set = set_with_remaining(&[90, 10, 50]);
        assert_eq!(scheduler.select_next(&mut set, None), Selection::Next(0));
        assert!(set.get(0).state.is_running());
    }

    #[test]
    fn test_fcfs_skips_non_ready() {
        let scheduler = Scheduler::new(Policy::FcfsP);
        let mut set = set_with_remaining(&[90, 10, 50]);
        set.get_mut(0).state = ProcessState::Waiting;
        assert_eq!(scheduler.select_next(&mut set, None), Selection::Next(1));
    }

    #[test]
    fn test_srtf_picks_first_minimum() {
        let scheduler = Scheduler::new(Policy::SrtfP);
        let mut set = set_with_remaining(&[50, 30, 30]);
        // P1 and P2 tie; the earlier creation order wins
        assert_eq!(scheduler.select_next(&mut set, None), Selection::Next(1));
    }

    #[test]
    fn test_round_robin_wraps_to_head() {
        let scheduler = Scheduler::new(Policy::RrP);
        let mut set = set_with_remaining(&[10, 10, 10]);
        assert_eq!(scheduler.select_next(&mut set, Some(2)), Selection::Next(0));
    }

    #[test]
    fn test_round_robin_skips_waiting() {
        let scheduler = Scheduler::new(Policy::RrP);
        let mut set = set_with_remaining(&[10, 10, 10]);
        set.get_mut(1).state = ProcessState::Waiting;
        assert_eq!(scheduler.select_next(&mut set, Some(0)), Selection::Next(2));
    }

    #[test]
    fn test_all_waiting_verdict() {
        let scheduler = Scheduler::new(Policy::SrtfP);
        let mut set = set_with_remaining(&[10, 10]);
        set.get_mut(0).state = ProcessState::Waiting;
        set.get_mut(1).state = ProcessState::Exiting;
        assert_eq!(scheduler.select_next(&mut set, None), Selection::AllWaiting);
    }

    #[test]
    fn test_all_exiting_verdict() {
        let scheduler = Scheduler::new(Policy::FcfsN);
        let mut set = set_with_remaining(&[10]);
        set.get_mut(0).state = ProcessState::Exiting;
        assert_eq!(scheduler.select_next(&mut set, None), Selection::AllExiting);
    }
}
