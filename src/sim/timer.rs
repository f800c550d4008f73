//! Timed pauses behind a trait, so the handshake can run against the wall clock
//! or a virtual clock that never actually waits.

use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

/// A Timer trait to abstract transit, backoff and inter-step pauses.
pub trait Timer {
    fn sleep(&mut self, duration: Duration);

    /// Time elapsed since construction or the last `restart`
    fn elapsed(&self) -> Duration;

    fn restart(&mut self);
}

/// Blocks the calling thread for real.
#[derive(Debug)]
pub struct ThreadTimer {
    started: Instant,
}

impl ThreadTimer {
    pub fn new() -> Self {
        ThreadTimer {
            started: Instant::now(),
        }
    }
}

impl Default for ThreadTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for ThreadTimer {
    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn restart(&mut self) {
        self.started = Instant::now();
    }
}

#[derive(Debug, Default)]
struct Ticks {
    now: Duration,
    pauses: Vec<Duration>,
}

/// Advances simulated time instantly. Clones share the same clock, so a test
/// can keep one handle and give the other to the simulation.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    ticks: Rc<RefCell<Ticks>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pause requested since the last restart, in order
    pub fn pauses(&self) -> Vec<Duration> {
        self.ticks.borrow().pauses.clone()
    }
}

impl Timer for VirtualClock {
    fn sleep(&mut self, duration: Duration) {
        let mut ticks = self.ticks.borrow_mut();
        ticks.now += duration;
        ticks.pauses.push(duration);
    }

    fn elapsed(&self) -> Duration {
        self.ticks.borrow().now
    }

    fn restart(&mut self) {
        *self.ticks.borrow_mut() = Ticks::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_clock_advances_without_waiting() {
        let mut clock = VirtualClock::new();
        let t0 = Instant::now();
        clock.sleep(Duration::from_secs(60));
        clock.sleep(Duration::from_millis(500));

        assert!(t0.elapsed() < Duration::from_secs(1));
        assert_eq!(clock.elapsed(), Duration::from_millis(60_500));
        assert_eq!(clock.pauses(), vec![Duration::from_secs(60), Duration::from_millis(500)]);
    }

    #[test]
    fn test_virtual_clock_clones_share_time() {
        let observer = VirtualClock::new();
        let mut clock = observer.clone();
        clock.sleep(Duration::from_millis(800));
        assert_eq!(observer.elapsed(), Duration::from_millis(800));

        clock.restart();
        assert_eq!(observer.elapsed(), Duration::ZERO);
        assert!(observer.pauses().is_empty());
    }

    #[test]
    fn test_thread_timer_sleeps() {
        let mut timer = ThreadTimer::new();
        timer.sleep(Duration::from_millis(5));
        assert!(timer.elapsed() >= Duration::from_millis(5));
    }
}
