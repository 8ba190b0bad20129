/*!
 * Simulated Clock
 * Monotonic elapsed-time source shared by every component
 *
 * Time advances only through explicit `advance` calls on the single
 * logical thread; no background thread moves the clock. Under
 * `Pacing::Realtime` an advance also sleeps for the same wall-clock
 * span, reproducing real-time pacing of the simulated timeline.
 */

use crate::config::Pacing;
use crate::core::types::Millis;
use parking_lot::Mutex;
use std::time::Duration;

#[derive(Debug)]
struct ClockState {
    elapsed: Duration,
    running: bool,
}

/// Monotonic simulated clock
#[derive(Debug)]
pub struct SimClock {
    state: Mutex<ClockState>,
    pacing: Pacing,
}

impl SimClock {
    pub fn new(pacing: Pacing) -> Self {
        Self {
            state: Mutex::new(ClockState {
                elapsed: Duration::ZERO,
                running: false,
            }),
            pacing,
        }
    }

    /// Purely logical clock, the default for tests
    pub fn virtual_clock() -> Self {
        Self::new(Pacing::Virtual)
    }

    /// Zero the clock and start it
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.elapsed = Duration::ZERO;
        state.running = true;
    }

    /// Freeze the clock; further advances are ignored
    pub fn stop(&self) {
        self.state.lock().running = false;
    }

    /// Elapsed simulated time since the last reset
    pub fn elapsed(&self) -> Duration {
        self.state.lock().elapsed
    }

    /// Elapsed simulated time in whole milliseconds
    ///
    /// # Performance
    /// Hot path - read once per executed cycle and per journal entry
    #[inline]
    pub fn elapsed_ms(&self) -> Millis {
        self.elapsed().as_millis() as Millis
    }

    /// Advance simulated time by `span`
    pub fn advance(&self, span: Duration) {
        {
            let mut state = self.state.lock();
            if !state.running {
                return;
            }
            state.elapsed += span;
        }
        // Sleep outside the lock: nothing else advances the clock,
        // but readers must not block behind the pacing wait.
        if self.pacing == Pacing::Realtime {
            std::thread::sleep(span);
        }
    }

    /// Advance simulated time by `ms` milliseconds
    #[inline]
    pub fn advance_ms(&self, ms: Millis) {
        self.advance(Duration::from_millis(ms));
    }

    /// Advance the clock forward to an absolute deadline, if it is
    /// still in the future
    pub fn advance_to(&self, deadline_ms: Millis) {
        let now = self.elapsed_ms();
        if deadline_ms > now {
            self.advance_ms(deadline_ms - now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_and_advance() {
        let clock = SimClock::virtual_clock();
        clock.reset();
        assert_eq!(clock.elapsed_ms(), 0);

        clock.advance_ms(150);
        assert_eq!(clock.elapsed_ms(), 150);

        clock.advance_ms(50);
        assert_eq!(clock.elapsed_ms(), 200);

        clock.reset();
        assert_eq!(clock.elapsed_ms(), 0);
    }

    #[test]
    fn test_advance_ignored_before_reset_and_after_stop() {
        let clock = SimClock::virtual_clock();
        clock.advance_ms(100);
        assert_eq!(clock.elapsed_ms(), 0);

        clock.reset();
        clock.advance_ms(100);
        clock.stop();
        clock.advance_ms(100);
        assert_eq!(clock.elapsed_ms(), 100);
    }

    #[test]
    fn test_advance_to_deadline() {
        let clock = SimClock::virtual_clock();
        clock.reset();
        clock.advance_ms(40);

        clock.advance_to(100);
        assert_eq!(clock.elapsed_ms(), 100);

        // Past deadlines do not move the clock backwards
        clock.advance_to(60);
        assert_eq!(clock.elapsed_ms(), 100);
    }
}
