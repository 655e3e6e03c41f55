#![forbid(unsafe_code)]

//! Single-threaded timer queue and the one-outstanding-timer slot.
//!
//! A [`TimerQueue`] stores scheduled callbacks ordered by deadline. Nothing
//! ever blocks: the host decides when to fire due timers, either by polling
//! [`TimerQueue::run_due`] against the wall clock or, in tests, by moving a
//! virtual clock forward with [`TimerQueue::advance`].
//!
//! A [`TimerSlot`] is the debounce pattern: it owns at most one outstanding
//! timer, and scheduling a new one cancels the previous one first.
//!
//! # Invariants
//!
//! 1. Timers fire in deadline order; equal deadlines fire in scheduling order.
//! 2. On a manual clock, `now()` equals a timer's deadline while its callback
//!    runs, so callbacks that schedule follow-up timers measure from there.
//! 3. A cancelled timer never fires. Cancelling a fired or unknown timer is a
//!    no-op that returns `false`.
//! 4. No internal borrow is held while a callback runs; callbacks may
//!    schedule or cancel timers on the same queue.
//!
//! # Failure Modes
//!
//! - A callback that keeps rescheduling itself with zero delay would never
//!   let `advance` return. Firing is capped at [`MAX_FIRES_PER_RUN`] per call;
//!   hitting the cap logs a warning and leaves the rest queued.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use ahash::AHashMap;
use tracing::{debug, trace, warn};
use web_time::Instant;

/// Upper bound on callbacks fired by a single `advance`/`run_due` call.
pub const MAX_FIRES_PER_RUN: usize = 10_000;

/// Identifier of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Get the raw ID value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
enum Clock {
    /// Virtual time, moved only by `advance`.
    Manual { now: Duration },
    /// Wall-clock time since the queue was created.
    System { origin: Instant },
}

impl Clock {
    fn now(&self) -> Duration {
        match self {
            Self::Manual { now } => *now,
            Self::System { origin } => origin.elapsed(),
        }
    }
}

type TimerCallback = Box<dyn FnOnce()>;

struct TimerQueueInner {
    clock: Clock,
    next_id: u64,
    /// Keyed by `(deadline, id)` so iteration order is firing order.
    queue: BTreeMap<(Duration, u64), TimerCallback>,
    deadlines: AHashMap<u64, Duration>,
}

/// Shared queue of scheduled callbacks.
///
/// Cloning a `TimerQueue` creates a new handle to the **same** queue.
#[derive(Clone)]
pub struct TimerQueue {
    inner: Rc<RefCell<TimerQueueInner>>,
}

impl std::fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TimerQueue")
            .field("clock", &inner.clock)
            .field("pending", &inner.queue.len())
            .finish()
    }
}

impl TimerQueue {
    /// Queue driven by a virtual clock starting at zero.
    #[must_use]
    pub fn manual() -> Self {
        Self::with_clock(Clock::Manual {
            now: Duration::ZERO,
        })
    }

    /// Queue driven by the wall clock.
    #[must_use]
    pub fn system() -> Self {
        Self::with_clock(Clock::System {
            origin: Instant::now(),
        })
    }

    fn with_clock(clock: Clock) -> Self {
        Self {
            inner: Rc::new(RefCell::new(TimerQueueInner {
                clock,
                next_id: 1,
                queue: BTreeMap::new(),
                deadlines: AHashMap::new(),
            })),
        }
    }

    /// Whether this queue runs on a virtual clock.
    #[must_use]
    pub fn is_manual(&self) -> bool {
        matches!(self.inner.borrow().clock, Clock::Manual { .. })
    }

    /// Time elapsed on this queue's clock.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.inner.borrow().clock.now()
    }

    /// Schedule `callback` to run once `delay` has elapsed.
    pub fn set_timeout(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let deadline = inner.clock.now().saturating_add(delay);
        inner.queue.insert((deadline, id), Box::new(callback));
        inner.deadlines.insert(id, deadline);
        trace!(
            timer_id = id,
            delay_ms = delay.as_millis() as u64,
            deadline_ms = deadline.as_millis() as u64,
            "timer scheduled"
        );
        TimerId(id)
    }

    /// Cancel a pending timer. Returns `false` if it already fired or never existed.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(deadline) = inner.deadlines.remove(&id.0) else {
            return false;
        };
        let removed = inner.queue.remove(&(deadline, id.0)).is_some();
        debug!(timer_id = id.0, "timer cancelled");
        removed
    }

    /// Whether `id` is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.inner.borrow().deadlines.contains_key(&id.0)
    }

    /// Number of timers waiting to fire.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Deadline of the next timer to fire, measured on this queue's clock.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.inner
            .borrow()
            .queue
            .first_key_value()
            .map(|((deadline, _), _)| *deadline)
    }

    /// Move the virtual clock forward by `by`, firing every timer that falls due.
    ///
    /// On a system clock time cannot be moved; this logs a warning and
    /// behaves like [`run_due`](Self::run_due).
    pub fn advance(&self, by: Duration) -> usize {
        let clock = self.inner.borrow().clock;
        let target = match clock {
            Clock::Manual { now } => now.saturating_add(by),
            Clock::System { .. } => {
                warn!("advance called on a system-clock timer queue");
                return self.run_due();
            }
        };
        let fired = self.fire_until(target);
        if let Clock::Manual { now } = &mut self.inner.borrow_mut().clock {
            *now = (*now).max(target);
        }
        fired
    }

    /// Fire every timer whose deadline has passed on the current clock.
    pub fn run_due(&self) -> usize {
        let limit = self.now();
        self.fire_until(limit)
    }

    fn fire_until(&self, limit: Duration) -> usize {
        let mut fired = 0;
        loop {
            let due = {
                let mut inner = self.inner.borrow_mut();
                let Some(key) = inner.queue.first_key_value().map(|(key, _)| *key) else {
                    break;
                };
                if key.0 > limit {
                    break;
                }
                inner.deadlines.remove(&key.1);
                if let Clock::Manual { now } = &mut inner.clock {
                    *now = (*now).max(key.0);
                }
                inner.queue.remove(&key).map(|callback| (key, callback))
            };
            let Some(((deadline, id), callback)) = due else {
                break;
            };
            trace!(
                timer_id = id,
                deadline_ms = deadline.as_millis() as u64,
                "timer fired"
            );
            callback();
            fired += 1;
            if fired >= MAX_FIRES_PER_RUN {
                warn!(
                    fired,
                    pending = self.pending_count() as u64,
                    "timer firing cap reached; remaining timers left queued"
                );
                break;
            }
        }
        fired
    }
}

/// Owner of at most one outstanding timer.
///
/// Scheduling replaces (cancels) any previous timer; dropping the slot
/// cancels whatever is pending.
pub struct TimerSlot {
    queue: TimerQueue,
    current: Rc<Cell<Option<TimerId>>>,
}

impl TimerSlot {
    /// Create an empty slot on `queue`.
    #[must_use]
    pub fn new(queue: &TimerQueue) -> Self {
        Self {
            queue: queue.clone(),
            current: Rc::new(Cell::new(None)),
        }
    }

    /// Cancel the pending timer (if any) and schedule `callback` after `delay`.
    pub fn schedule(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TimerId {
        self.cancel();
        let current = Rc::clone(&self.current);
        let id = self.queue.set_timeout(delay, move || {
            // Only the newest timer can still be queued, so it owns the slot.
            current.set(None);
            callback();
        });
        self.current.set(Some(id));
        id
    }

    /// Cancel the pending timer. Returns `true` if one was cancelled.
    pub fn cancel(&self) -> bool {
        match self.current.take() {
            Some(id) => self.queue.clear_timeout(id),
            None => false,
        }
    }

    /// Whether a timer is outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.current.get().is_some()
    }

    /// The outstanding timer, if any.
    #[must_use]
    pub fn current(&self) -> Option<TimerId> {
        self.current.get()
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for TimerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerSlot")
            .field("current", &self.current.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce()>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let make = move |name: &'static str| {
            let sink = Rc::clone(&sink);
            Box::new(move || sink.borrow_mut().push(name)) as Box<dyn FnOnce()>
        };
        (log, make)
    }

    #[test]
    fn fires_exactly_at_deadline() {
        let timers = TimerQueue::manual();
        let (log, make) = recorder();
        timers.set_timeout(ms(1000), make("done"));

        assert_eq!(timers.advance(ms(999)), 0);
        assert!(log.borrow().is_empty());
        assert_eq!(timers.advance(ms(1)), 1);
        assert_eq!(*log.borrow(), vec!["done"]);
        assert_eq!(timers.now(), ms(1000));
    }

    #[test]
    fn fires_in_deadline_then_schedule_order() {
        let timers = TimerQueue::manual();
        let (log, make) = recorder();
        timers.set_timeout(ms(20), make("late"));
        timers.set_timeout(ms(10), make("early-a"));
        timers.set_timeout(ms(10), make("early-b"));

        assert_eq!(timers.advance(ms(50)), 3);
        assert_eq!(*log.borrow(), vec!["early-a", "early-b", "late"]);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let timers = TimerQueue::manual();
        let (log, make) = recorder();
        let id = timers.set_timeout(ms(5), make("cancelled"));

        assert!(timers.is_pending(id));
        assert!(timers.clear_timeout(id));
        assert!(!timers.clear_timeout(id));
        timers.advance(ms(10));
        assert!(log.borrow().is_empty());
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn callback_schedules_relative_to_its_deadline() {
        let timers = TimerQueue::manual();
        let (log, make) = recorder();
        let chained = timers.clone();
        let follow_up = make("second");
        timers.set_timeout(ms(10), move || {
            chained.set_timeout(ms(10), follow_up);
        });

        assert_eq!(timers.advance(ms(15)), 1);
        assert_eq!(timers.next_deadline(), Some(ms(20)));
        assert_eq!(timers.advance(ms(5)), 1);
        assert_eq!(*log.borrow(), vec!["second"]);
    }

    #[test]
    fn zero_delay_loop_is_capped() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        fn reschedule(timers: TimerQueue) {
            let next = timers.clone();
            timers.set_timeout(Duration::ZERO, move || reschedule(next));
        }
        let timers = TimerQueue::manual();
        reschedule(timers.clone());

        assert_eq!(timers.advance(Duration::ZERO), MAX_FIRES_PER_RUN);
        assert_eq!(timers.pending_count(), 1);
    }

    #[test]
    fn system_clock_runs_due_timers() {
        let timers = TimerQueue::system();
        assert!(!timers.is_manual());
        let (log, make) = recorder();
        timers.set_timeout(Duration::ZERO, make("now"));
        timers.set_timeout(Duration::from_secs(3600), make("later"));

        assert_eq!(timers.run_due(), 1);
        assert_eq!(timers.advance(ms(1)), 0);
        assert_eq!(*log.borrow(), vec!["now"]);
        assert_eq!(timers.pending_count(), 1);
    }

    #[test]
    fn slot_replaces_previous_timer() {
        let timers = TimerQueue::manual();
        let (log, make) = recorder();
        let slot = TimerSlot::new(&timers);

        let first = slot.schedule(ms(100), make("first"));
        timers.advance(ms(50));
        let second = slot.schedule(ms(100), make("second"));

        assert_ne!(first, second);
        assert!(!timers.is_pending(first));
        assert_eq!(timers.pending_count(), 1);
        timers.advance(ms(99));
        assert!(slot.is_pending());
        timers.advance(ms(1));
        assert!(!slot.is_pending());
        assert_eq!(*log.borrow(), vec!["second"]);
    }

    #[test]
    fn slot_drop_cancels_pending() {
        let timers = TimerQueue::manual();
        let (log, make) = recorder();
        {
            let slot = TimerSlot::new(&timers);
            slot.schedule(ms(10), make("dropped"));
            assert_eq!(slot.current().map(TimerId::id), Some(1));
        }
        timers.advance(ms(20));
        assert!(log.borrow().is_empty());
        assert_eq!(timers.pending_count(), 0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn fires_sorted_by_deadline_then_insertion(
                delays in prop::collection::vec(0u64..1_000, 1..40),
                steps in prop::collection::vec(1u64..300, 1..10),
            ) {
                let timers = TimerQueue::manual();
                let log = Rc::new(RefCell::new(Vec::new()));
                for (index, delay) in delays.iter().enumerate() {
                    let sink = Rc::clone(&log);
                    timers.set_timeout(ms(*delay), move || sink.borrow_mut().push(index));
                }
                for step in steps {
                    timers.advance(ms(step));
                }
                timers.advance(ms(1_000));

                let mut expected: Vec<usize> = (0..delays.len()).collect();
                expected.sort_by_key(|&index| (delays[index], index));
                prop_assert_eq!(&*log.borrow(), &expected);
                prop_assert_eq!(timers.pending_count(), 0);
            }

            #[test]
            fn slot_keeps_at_most_one_timer(delays in prop::collection::vec(1u64..100, 1..20)) {
                let timers = TimerQueue::manual();
                let slot = TimerSlot::new(&timers);
                for delay in &delays {
                    slot.schedule(ms(*delay), || {});
                    prop_assert_eq!(timers.pending_count(), 1);
                }
                let last = *delays.last().unwrap_or(&0);
                prop_assert_eq!(timers.advance(ms(last)), 1);
                prop_assert!(!slot.is_pending());
            }
        }
    }
}
