/*!
 * Interrupt Queue
 * Tracks asynchronous I/O completion and returns waiters to readiness
 *
 * The queue is append-ordered, not deadline-ordered. Two reconciliation
 * shapes exist and must stay distinct: `check` peeks a single completed
 * event (the preemption signal consumed mid-burst), while `clear_all`
 * drains every completed event and performs the process-side state
 * changes.
 */

use crate::clock::SimClock;
use crate::core::types::{Millis, Pid};
use crate::journal::{Event, EventLog};
use crate::process::{ProcessSet, ProcessState};
use crate::workload::IoDirection;
use std::sync::Arc;
use tracing::trace;

/// A pending I/O completion
#[derive(Debug, Clone, PartialEq)]
pub struct InterruptEvent {
    pub pid: Pid,
    pub device: String,
    pub direction: IoDirection,
    /// Absolute simulated completion deadline
    pub deadline_ms: Millis,
    /// Set once the completion has been reported, to prevent
    /// double-reporting between `check` and `clear_all`
    reported: bool,
}

/// Append-ordered queue of pending I/O completions
#[derive(Debug)]
pub struct InterruptQueue {
    clock: Arc<SimClock>,
    events: Vec<InterruptEvent>,
}

impl InterruptQueue {
    pub fn new(clock: Arc<SimClock>) -> Self {
        Self {
            clock,
            events: Vec::new(),
        }
    }

    /// Enqueue a pending completion with an absolute deadline
    pub fn signal(&mut self, pid: Pid, device: String, direction: IoDirection, deadline_ms: Millis) {
        trace!(pid, %device, deadline_ms, "interrupt signaled");
        self.events.push(InterruptEvent {
            pid,
            device,
            direction,
            deadline_ms,
            reported: false,
        });
    }

    /// Report at most one completed, unreported event
    ///
    /// Scans in append order; the first event past its deadline that
    /// has not been reported is marked reported and journaled. Returns
    /// true iff such an event was found. The event stays queued until
    /// `clear_all` reconciles it.
    pub fn check(&mut self, journal: &EventLog) -> bool {
        let now = self.clock.elapsed_ms();
        for event in &mut self.events {
            if now >= event.deadline_ms && !event.reported {
                event.reported = true;
                journal.record(Event::InterruptRaised {
                    pid: event.pid,
                    device: event.device.clone(),
                    direction: event.direction,
                });
                return true;
            }
        }
        false
    }

    /// Reconcile every completed event
    ///
    /// For each event past its deadline: advance the owning process's
    /// cursor past the blocked I/O instruction, transition it
    /// Waiting -> Ready, journal the completion unless `check` already
    /// reported it, and remove the event from the queue.
    pub fn clear_all(&mut self, set: &mut ProcessSet, journal: &EventLog) {
        let now = self.clock.elapsed_ms();
        let mut index = 0;
        while index < self.events.len() {
            if now < self.events[index].deadline_ms {
                index += 1;
                continue;
            }
            let event = self.events.remove(index);

            let process = set.get_mut(event.pid);
            process.advance_cursor();
            process.state = ProcessState::Ready;

            if !event.reported {
                journal.record(Event::IoCompleted {
                    pid: event.pid,
                    device: event.device,
                    direction: event.direction,
                });
            }
        }
    }

    /// Earliest pending deadline, if any
    pub fn next_deadline(&self) -> Option<Millis> {
        self.events.iter().map(|e| e.deadline_ms).min()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
